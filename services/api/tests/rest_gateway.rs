//! Integration tests for the REST gateway
//!
//! Each test serves a small axum router on an ephemeral port that answers
//! the way the backend does, and drives `SupabaseGateway` against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use api::{BackendGateway, BearerToken, SupabaseGateway};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use common::{
    LuminError,
    config::LuminConfig,
    models::{AgeGroup, FashionItem, Gender, OutfitPost, Season},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<String>>>;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn gateway(base_url: &str, token: BearerToken) -> SupabaseGateway {
    SupabaseGateway::new(&LuminConfig::for_project(base_url, "anon-key"), token).unwrap()
}

fn sample_post() -> OutfitPost {
    OutfitPost::new(
        "@andrew",
        vec!["https://cdn.example/outfit_1.jpg".to_string()],
        vec![FashionItem::new("Blazer", 8234339, Some(9499.0), Some("Lumin"))],
        Season::Autumn,
        Gender::Male,
        AgeGroup::Adult,
    )
}

#[tokio::test]
async fn test_list_posts_sends_paging_query_and_keys() {
    let seen: Seen = Arc::default();
    let post = sample_post();
    let body = serde_json::to_value(vec![post.clone()]).unwrap();

    let router = Router::new()
        .route(
            "/rest/v1/outfits",
            get(
                |State(seen): State<Seen>,
                 headers: HeaderMap,
                 Query(query): Query<HashMap<String, String>>| async move {
                    let mut seen = seen.lock().unwrap();
                    for key in ["select", "order", "limit", "offset"] {
                        seen.push(format!("{}={}", key, query.get(key).cloned().unwrap_or_default()));
                    }
                    for name in ["apikey", "authorization"] {
                        let value = headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        seen.push(format!("{}: {}", name, value));
                    }
                    Json(body)
                },
            ),
        )
        .with_state(seen.clone());
    let base = serve(router).await;

    let posts = gateway(&base, BearerToken::new()).list_posts(2, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, post.id);
    assert_eq!(posts[0].items[0].external_article_id, 8234339);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            "select=*",
            "order=created_at.desc",
            "limit=10",
            "offset=20",
            "apikey: anon-key",
            "authorization: Bearer anon-key",
        ]
    );
}

#[tokio::test]
async fn test_user_token_replaces_anon_bearer() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/rest/v1/outfits",
            post(|State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let prefer = headers
                    .get("prefer")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let mut seen = seen.lock().unwrap();
                seen.push(auth);
                seen.push(prefer);
                seen.push(body["author"].as_str().unwrap_or_default().to_string());
                StatusCode::CREATED
            }),
        )
        .with_state(seen.clone());
    let base = serve(router).await;

    let token = BearerToken::new();
    token.set("user-access-token");
    gateway(&base, token).create_post(&sample_post()).await.unwrap();

    assert_eq!(
        seen.lock().unwrap().clone(),
        vec!["Bearer user-access-token", "return=minimal", "@andrew"]
    );
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let router = Router::new()
        .route("/rest/v1/outfits", post(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/rest/v1/users",
            get(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "code": "23505", "message": "duplicate key value" })),
                )
            }),
        );
    let base = serve(router).await;
    let gateway = gateway(&base, BearerToken::new());

    let err = gateway.create_post(&sample_post()).await.unwrap_err();
    assert!(matches!(err, LuminError::AuthenticationRequired));

    match gateway.get_user(uuid::Uuid::new_v4()).await.unwrap_err() {
        LuminError::RemoteRejected { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "duplicate key value");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_shape() {
    let router = Router::new().route(
        "/rest/v1/outfits",
        get(|| async { Json(json!({ "not": "a list" })) }),
    );
    let base = serve(router).await;

    let err = gateway(&base, BearerToken::new())
        .list_posts(0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, LuminError::InvalidResponseShape(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{}", addr), BearerToken::new())
        .delete_post(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_upload_falls_back_to_signed_url() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/storage/v1/object/outfit-images/:name",
            post(|State(seen): State<Seen>, Path(name): Path<String>| async move {
                seen.lock().unwrap().push(format!("direct {}", name));
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "row-level security" })))
            }),
        )
        .route(
            "/storage/v1/object/upload/sign/outfit-images/:name",
            post(|State(seen): State<Seen>, Path(name): Path<String>| async move {
                seen.lock().unwrap().push(format!("sign {}", name));
                Json(json!({
                    "url": format!("/object/upload/sign/outfit-images/{}?token=t1", name)
                }))
            })
            .put(
                |State(seen): State<Seen>,
                 Path(name): Path<String>,
                 Query(query): Query<HashMap<String, String>>,
                 body: axum::body::Bytes| async move {
                    seen.lock().unwrap().push(format!(
                        "put {} {} {}",
                        name,
                        query.get("token").cloned().unwrap_or_default(),
                        body.len()
                    ));
                    StatusCode::OK
                },
            ),
        )
        .with_state(seen.clone());
    let base = serve(router).await;

    let url = gateway(&base, BearerToken::new())
        .upload_image(vec![0xFF, 0xD8, 0xFF], "outfit_1_0.jpg")
        .await
        .unwrap();

    assert_eq!(
        url,
        format!("{}/storage/v1/object/public/outfit-images/outfit_1_0.jpg", base)
    );
    assert_eq!(
        seen.lock().unwrap().clone(),
        vec![
            "direct outfit_1_0.jpg",
            "sign outfit_1_0.jpg",
            "put outfit_1_0.jpg t1 3",
        ]
    );
}

#[tokio::test]
async fn test_upload_fails_when_both_paths_fail() {
    let router = Router::new()
        .route(
            "/storage/v1/object/outfit-images/:name",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/storage/v1/object/upload/sign/outfit-images/:name",
            post(|| async { StatusCode::FORBIDDEN }),
        );
    let base = serve(router).await;

    let err = gateway(&base, BearerToken::new())
        .upload_image(vec![1], "outfit_2_0.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, LuminError::UploadFailed(_)));
}

#[test]
fn test_missing_project_is_configuration_error() {
    let result = SupabaseGateway::new(&LuminConfig::default(), BearerToken::new());
    assert!(matches!(result, Err(LuminError::Configuration(_))));
}
