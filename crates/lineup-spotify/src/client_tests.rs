// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{SpotifyClient, SpotifyError};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KHAN_STONER_ID: &str = "4khanStoner";
    const KHAN_JAZZ_ID: &str = "7khanJazz";

    fn client_for(server: &MockServer) -> SpotifyClient {
        SpotifyClient::builder()
            .base_url(server.uri())
            .access_token("test-token")
            .min_request_interval(Duration::ZERO)
            .build()
            .unwrap()
    }

    fn artist_search_response() -> serde_json::Value {
        serde_json::json!({
            "artists": {
                "href": "https://api.spotify.com/v1/search?query=artist%3AKhan&type=artist",
                "items": [
                    {
                        "id": KHAN_STONER_ID,
                        "name": "Khan",
                        "popularity": 21,
                        "genres": ["stoner rock", "australian psych"],
                        "type": "artist"
                    },
                    {
                        "id": KHAN_JAZZ_ID,
                        "name": "Khan",
                        "popularity": 34,
                        "genres": ["jazz fusion"],
                        "type": "artist"
                    }
                ],
                "limit": 10,
                "next": null,
                "offset": 0,
                "total": 2
            }
        })
    }

    #[tokio::test]
    async fn test_search_artists() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "artist:Khan"))
            .and(query_param("type", "artist"))
            .and(query_param("limit", "10"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_search_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let artists = client.search_artists("Khan", 10).await.unwrap();

        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].id, KHAN_STONER_ID);
        assert_eq!(artists[0].popularity, 21);
        assert_eq!(artists[0].genres, vec!["stoner rock", "australian psych"]);
        assert_eq!(artists[1].name, "Khan");
    }

    #[tokio::test]
    async fn test_search_artists_tolerates_missing_genres() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": {"items": [{"id": "x", "name": "Elder"}], "next": null}
            })))
            .mount(&mock_server)
            .await;

        let artists = client_for(&mock_server)
            .search_artists("Elder", 5)
            .await
            .unwrap();

        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].popularity, 0);
        assert!(artists[0].genres.is_empty());
    }

    #[tokio::test]
    async fn test_artist_top_tracks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artists/{}/top-tracks", KHAN_STONER_ID)))
            .and(query_param("market", "US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": [
                    {"id": "t1", "uri": "spotify:track:t1", "name": "Mountain"},
                    {"id": "t2", "uri": "spotify:track:t2", "name": "Pilgrim"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let tracks = client_for(&mock_server)
            .artist_top_tracks(KHAN_STONER_ID, "US")
            .await
            .unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].uri, "spotify:track:t1");
        assert_eq!(tracks[1].name, "Pilgrim");
    }

    #[tokio::test]
    async fn test_current_user_playlists_follows_next() {
        let mock_server = MockServer::start().await;
        let second_page = format!("{}/me/playlists?offset=50&limit=50", mock_server.uri());

        // Registered first so it wins over the broader first-page matcher.
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "p3", "name": "Roadburn 2024"}],
                "next": null
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "p1", "name": "Desertfest"},
                    {"id": "p2", "name": "Obelisk Picks"}
                ],
                "next": second_page
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let playlists = client_for(&mock_server)
            .current_user_playlists()
            .await
            .unwrap();

        let names: Vec<_> = playlists.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Desertfest", "Obelisk Picks", "Roadburn 2024"]);
    }

    #[tokio::test]
    async fn test_playlist_tracks_skips_null_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/p1/tracks"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"track": {"uri": "spotify:track:a", "name": "A"}},
                    {"track": null},
                    {"track": {"uri": "spotify:track:b"}}
                ],
                "next": null
            })))
            .mount(&mock_server)
            .await;

        let tracks = client_for(&mock_server).playlist_tracks("p1").await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].uri.as_deref(), Some("spotify:track:a"));
        assert_eq!(tracks[1].name, None);
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/user-1/playlists"))
            .and(body_json(serde_json::json!({
                "name": "Desertfest",
                "public": true,
                "description": "Generated automatically"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "new-playlist",
                "name": "Desertfest"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let playlist = client_for(&mock_server)
            .create_playlist("user-1", "Desertfest", true, "Generated automatically")
            .await
            .unwrap();

        assert_eq!(playlist.id, "new-playlist");
    }

    #[tokio::test]
    async fn test_add_and_replace_playlist_tracks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/playlists/p1/tracks"))
            .and(body_json(serde_json::json!({"uris": ["spotify:track:a", "spotify:track:b"]})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"snapshot_id": "s1"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/playlists/p1/tracks"))
            .and(body_json(serde_json::json!({"uris": []})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"snapshot_id": "s2"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .add_playlist_tracks(
                "p1",
                &["spotify:track:a".to_string(), "spotify:track:b".to_string()],
            )
            .await
            .unwrap();
        client.replace_playlist_tracks("p1", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_playlist_tracks_rejects_oversized_batch() {
        let mock_server = MockServer::start().await;
        let uris: Vec<String> = (0..101).map(|i| format!("spotify:track:{}", i)).collect();

        let result = client_for(&mock_server).add_playlist_tracks("p1", &uris).await;

        assert!(matches!(result, Err(SpotifyError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_set_playlist_description_accepts_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/playlists/p1"))
            .and(body_json(serde_json::json!({"description": "Updated"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .set_playlist_description("p1", "Updated")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/artists/missing/top-tracks"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        assert!(matches!(
            client.current_user().await,
            Err(SpotifyError::Unauthorized)
        ));
        assert!(matches!(
            client.artist_top_tracks("missing", "US").await,
            Err(SpotifyError::NotFound(_))
        ));
        assert!(matches!(
            client.search_artists("Khan", 10).await,
            Err(SpotifyError::RateLimited {
                retry_after: Some(d)
            }) if d == Duration::ZERO
        ));
        match client.current_user_playlists().await {
            Err(SpotifyError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).current_user().await;
        assert!(matches!(result, Err(SpotifyError::InvalidResponse(_))));
    }
}
