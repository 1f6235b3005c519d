mod common;

use axum::http::StatusCode;
use common::{list_shows, run_job, send, spawn_app};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upstream_with(body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn cbs() -> Value {
    json!({
        "id": 2,
        "name": "CBS",
        "country": {"name": "United States", "code": "US", "timezone": "America/New_York"}
    })
}

fn two_dramas() -> Value {
    json!([
        {
            "id": 1,
            "name": "Under the Dome",
            "language": "English",
            "genres": ["Drama", "Science-Fiction"],
            "externals": {"imdb": "tt1553656", "tvrage": 25988, "thetvdb": 264492},
            "rating": {"average": 6.5},
            "network": cbs()
        },
        {
            "id": 2,
            "name": "Person of Interest",
            "language": "English",
            "genres": ["Drama", "Action"],
            "externals": {"imdb": "tt1839578", "tvrage": 28376, "thetvdb": 248742},
            "rating": {"average": 8.8},
            "network": cbs()
        }
    ])
}

#[tokio::test]
async fn test_ingest_shares_genres_and_networks() {
    let server = upstream_with(two_dramas()).await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fetched"], 2);
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["skipped"], 0);

    let genres: Vec<String> = state
        .store()
        .list_genres()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(genres.len(), 3);
    assert_eq!(genres.iter().filter(|g| *g == "Drama").count(), 1);

    assert_eq!(state.store().list_networks().await.unwrap().len(), 1);
    assert_eq!(state.store().list_countries().await.unwrap().len(), 1);

    let shows = list_shows(&app).await;
    assert_eq!(shows.len(), 2);
    assert_eq!(shows[0]["network"]["id"], 2);
    assert_eq!(shows[1]["network"]["id"], 2);
}

#[tokio::test]
async fn test_ingest_twice_is_idempotent() {
    let server = upstream_with(two_dramas()).await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, _) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(body["data"]["skipped"], 2);

    assert_eq!(list_shows(&app).await.len(), 2);
    assert_eq!(state.store().list_genres().await.unwrap().len(), 3);
    assert_eq!(state.store().list_networks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ingest_leaves_existing_shows_untouched() {
    let server = upstream_with(two_dramas()).await;
    let (app, _) = spawn_app(&server.uri()).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/shows",
        Some(json!({"id": 1, "name": "Local edit", "language": "Dutch"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["skipped"], 1);

    let (_, body) = send(&app, "GET", "/api/shows/1", None, None).await;
    assert_eq!(body["data"]["name"], "Local edit");
    assert_eq!(body["data"]["language"], "Dutch");
    assert!(body["data"]["network"].is_null());

    let (_, body) = send(&app, "GET", "/api/shows/2", None, None).await;
    assert_eq!(body["data"]["name"], "Person of Interest");
}

#[tokio::test]
async fn test_ingest_reuses_network_created_through_api() {
    let server = upstream_with(two_dramas()).await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/shows",
        Some(json!({"id": 99, "name": "Elsewhere", "network": cbs(), "genres": ["Drama"]})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(state.store().list_networks().await.unwrap().len(), 1);
    assert_eq!(state.store().list_countries().await.unwrap().len(), 1);
    assert_eq!(state.store().list_genres().await.unwrap().len(), 3);
    assert_eq!(list_shows(&app).await.len(), 3);
}

#[tokio::test]
async fn test_null_genre_entries_are_ignored() {
    let server = upstream_with(json!([
        {"id": 1, "name": "Under the Dome", "genres": ["Drama", null, ""]}
    ]))
    .await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 1);

    let (_, body) = send(&app, "GET", "/api/shows/1", None, None).await;
    let genres: Vec<&str> = body["data"]["genres"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(genres, vec!["Drama"]);
    assert_eq!(state.store().list_genres().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upstream_error_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    assert!(list_shows(&app).await.is_empty());
    assert!(state.store().list_genres().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_payload_is_a_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let (app, _) = spawn_app(&server.uri()).await;

    let (status, _) = run_job(&app).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(list_shows(&app).await.is_empty());
}

#[tokio::test]
async fn test_record_without_id_aborts_whole_batch() {
    let server = upstream_with(json!([
        {"id": 1, "name": "Fine", "genres": ["Drama"], "network": cbs()},
        {"name": "No id here", "genres": ["Comedy"]}
    ]))
    .await;
    let (app, state) = spawn_app(&server.uri()).await;

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    assert!(list_shows(&app).await.is_empty());
    assert!(state.store().list_genres().await.unwrap().is_empty());
    assert!(state.store().list_networks().await.unwrap().is_empty());
    assert!(state.store().list_countries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_gateway_error() {
    let (app, _) = spawn_app("http://127.0.0.1:9/").await;

    let (status, _) = run_job(&app).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(list_shows(&app).await.is_empty());
}

#[tokio::test]
async fn test_empty_upstream_list_is_a_no_op() {
    let server = upstream_with(json!([])).await;
    let (app, _) = spawn_app(&server.uri()).await;

    let (status, body) = run_job(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fetched"], 0);
    assert_eq!(body["data"]["created"], 0);
}
