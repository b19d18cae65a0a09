use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    uploads: Arc<Mutex<Vec<(HashMap<String, String>, Vec<u8>)>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn upload_asset(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    if params.get("filename").map(String::as_str) == Some("reject.png") {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({"message": "upload refused by host"})),
        )
            .into_response();
    }
    state.uploads.lock().await.push((params, body.to_vec()));
    Json(json!({"url": "https://media.test/stored.png", "publicId": "stored-1"})).into_response()
}

async fn delete_asset(Path(id): Path<String>, State(state): State<ServerState>) -> StatusCode {
    state.deleted.lock().await.push(id);
    StatusCode::NO_CONTENT
}

async fn spawn_media_server() -> (String, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/media/upload", post(upload_asset))
        .route("/media/assets/:id", delete(delete_asset))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}/media"), state)
}

fn png(filename: &str) -> LocalFile {
    LocalFile {
        filename: filename.to_string(),
        content_type: "image/png".to_string(),
        bytes: b"png-bytes".to_vec(),
    }
}

#[tokio::test]
async fn upload_ships_the_bytes_with_their_metadata() {
    let (base_url, state) = spawn_media_server().await;
    let gateway = HttpMediaGateway::new(base_url);

    let asset = gateway.upload(&png("avatar.png")).await.expect("upload");
    assert_eq!(asset.url, "https://media.test/stored.png");
    assert_eq!(asset.public_id.as_str(), "stored-1");

    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0["filename"], "avatar.png");
    assert_eq!(uploads[0].0["content_type"], "image/png");
    assert_eq!(uploads[0].1, b"png-bytes");
}

#[tokio::test]
async fn rejected_upload_surfaces_the_host_message() {
    let (base_url, state) = spawn_media_server().await;
    let gateway = HttpMediaGateway::new(base_url);

    match gateway.upload(&png("reject.png")).await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, reqwest::StatusCode::PAYLOAD_TOO_LARGE);
            assert_eq!(message, "upload refused by host");
        }
        other => panic!("expected a rejected upload, got {other:?}"),
    }
    assert!(state.uploads.lock().await.is_empty());
}

#[tokio::test]
async fn delete_asset_targets_the_public_id() {
    let (base_url, state) = spawn_media_server().await;
    let gateway = HttpMediaGateway::new(base_url);

    gateway
        .delete_asset(&AssetId::from("stored-1"))
        .await
        .expect("delete");

    assert_eq!(state.deleted.lock().await.clone(), vec!["stored-1".to_string()]);
}
