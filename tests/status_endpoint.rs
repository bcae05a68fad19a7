use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use flightsurety_oracle::routes;

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let response = routes::app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn api_route_returns_fixed_message() {
    let (status, body) = get("/api").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "message": "An API for use with your Dapp!" }));
}

#[tokio::test]
async fn api_route_never_varies() {
    let (_, first) = get("/api").await;
    let (_, second) = get("/api?flight=ND1309").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn api_route_sets_json_content_type() {
    let response = routes::app()
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let content_type = response.headers().get("content-type").unwrap();
    assert_eq!(content_type, "application/json");
}

#[tokio::test]
async fn other_routes_are_not_served() {
    let (status, _) = get("/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = routes::app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
