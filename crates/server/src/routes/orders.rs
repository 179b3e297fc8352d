//! Order route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;

use orderview_core::OrderRecord;

use crate::error::{AppError, Result};
use crate::state::AppState;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>Orderview</title></head>
<body>
<h1>Orderview</h1>
<form onsubmit="location.href='/orders/'+this.uid.value;return false">
  <label>Order UID <input name="uid"></label>
  <button>Look up</button>
</form>
</body>
</html>"#;

/// Index page with a lookup form. Not part of the core service surface.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /orders/{order_uid}` - look up one order.
///
/// Served from the cache when possible; a miss reads through to the
/// store. Unknown identifiers return 404.
pub async fn show(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<OrderRecord>> {
    let order = state.orders().get_order(&order_uid).await?;
    Ok(Json(order))
}

/// `POST /orders` - transport adapter for the ingestion channel.
///
/// The raw body is forwarded to the consumer unparsed; decoding and
/// validation happen on the consumer side, exactly as for payloads
/// arriving from the message broker. Responds 202 as the message is
/// only queued here.
pub async fn ingest(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
    state
        .ingest_tx()
        .send(body.to_vec())
        .await
        .map_err(|_| AppError::Internal("ingestion channel closed".to_owned()))?;
    Ok(StatusCode::ACCEPTED)
}
