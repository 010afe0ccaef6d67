use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use board_relay::notify::OutboundMessage;
use board_relay::{
    AccessToken, BoardApi, ConfigError, DecodeError, MiroClient, Notifier, RelayError,
    TelegramNotifier, TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use super::common::test_helpers::secrets;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer miro-token")
}

async fn board(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": 401})));
    }
    match id.as_str() {
        "uXjVOabc" => (
            StatusCode::OK,
            Json(json!({
                "id": "uXjVOabc",
                "name": "Roadmap",
                "viewLink": "https://miro.com/app/board/uXjVOabc="
            })),
        ),
        "nolink" => (StatusCode::OK, Json(json!({"id": "nolink", "name": "Draft"}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"status": 404}))),
    }
}

async fn widgets(Path(_id): Path<String>, headers: HeaderMap) -> (StatusCode, &'static str) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "");
    }
    (StatusCode::OK, r#"{"type":"collection","data":[{"id":"1","type":"sticker"}]}"#)
}

async fn miro_base() -> String {
    let app = Router::new()
        .route("/v1/boards/:id", get(board))
        .route("/v1/boards/:id/widgets/", get(widgets));
    format!("http://{}/v1", spawn(app).await)
}

type Inbox = Arc<Mutex<Vec<(String, OutboundMessage)>>>;

async fn send_message(
    State(inbox): State<Inbox>,
    Path(bot): Path<String>,
    Json(message): Json<OutboundMessage>,
) -> StatusCode {
    if bot != "botbot-token" {
        return StatusCode::UNAUTHORIZED;
    }
    inbox.lock().unwrap().push((bot, message));
    StatusCode::OK
}

async fn telegram_base() -> (String, Inbox) {
    let inbox = Inbox::default();
    let app = Router::new()
        .route("/:bot/sendMessage", post(send_message))
        .with_state(Arc::clone(&inbox));
    (format!("http://{}", spawn(app).await), inbox)
}

#[tokio::test]
async fn test_miro_fetch_info() -> Result<()> {
    let client = MiroClient::new(miro_base().await, TIMEOUT)?;
    let info = client
        .fetch_info("uXjVOabc", &AccessToken::new("miro-token"))
        .await?;

    assert_eq!(info.name, "Roadmap");
    assert_eq!(info.link, "https://miro.com/app/board/uXjVOabc=");
    Ok(())
}

#[tokio::test]
async fn test_miro_fetch_snapshot_returns_raw_body() -> Result<()> {
    let client = MiroClient::new(miro_base().await, TIMEOUT)?;
    let snapshot = client
        .fetch_snapshot("uXjVOabc", &AccessToken::new("miro-token"))
        .await?;

    assert_eq!(
        snapshot.as_bytes(),
        br#"{"type":"collection","data":[{"id":"1","type":"sticker"}]}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_miro_rejected_token_is_status_error() -> Result<()> {
    let client = MiroClient::new(miro_base().await, TIMEOUT)?;
    let err = client
        .fetch_snapshot("uXjVOabc", &AccessToken::new("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::Transport(TransportError::Status { status: 401, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_miro_metadata_without_link() -> Result<()> {
    let client = MiroClient::new(miro_base().await, TIMEOUT)?;
    let err = client
        .fetch_info("nolink", &AccessToken::new("miro-token"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::Decode(DecodeError::MissingField { field, .. }) if field == "viewLink"
    ));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_api_is_request_error() -> Result<()> {
    // Bind then drop to get a port nobody listens on.
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
    let client = MiroClient::new(format!("http://{}/v1", addr), TIMEOUT)?;

    let err = client
        .fetch_info("uXjVOabc", &AccessToken::new("miro-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Transport(TransportError::Request { .. })));
    assert!(err.is_transient());
    Ok(())
}

#[tokio::test]
async fn test_telegram_delivers_message() -> Result<()> {
    let (base, inbox) = telegram_base().await;
    let notifier = TelegramNotifier::new(base, TIMEOUT, Arc::new(secrets(&[("TOKEN_BOT", "bot-token")])))?;

    notifier.notify(-1001, "On board Roadmap changes were made: x").await?;

    let received = inbox.lock().unwrap().clone();
    assert_eq!(
        received,
        vec![(
            "botbot-token".to_string(),
            OutboundMessage {
                chat_id: -1001,
                text: "On board Roadmap changes were made: x".to_string(),
            }
        )]
    );
    Ok(())
}

#[tokio::test]
async fn test_telegram_rejection_hides_token() -> Result<()> {
    let (base, inbox) = telegram_base().await;
    let notifier = TelegramNotifier::new(base, TIMEOUT, Arc::new(secrets(&[("TOKEN_BOT", "stale-token")])))?;

    let err = notifier.notify(1, "hello").await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::Transport(TransportError::Status { status: 401, .. })
    ));
    assert!(!format!("{err} {err:?}").contains("stale-token"));
    assert!(inbox.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_telegram_without_token() -> Result<()> {
    let (base, inbox) = telegram_base().await;
    let notifier = TelegramNotifier::new(base, TIMEOUT, Arc::new(secrets(&[])))?;

    let err = notifier.notify(1, "hello").await.unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(
        err,
        RelayError::Config(ConfigError::Missing { env_var, .. }) if env_var == "TOKEN_BOT"
    ));
    assert!(inbox.lock().unwrap().is_empty());
    Ok(())
}
