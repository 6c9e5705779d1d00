//! Gateway routes and handlers.

use std::convert::Infallible;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_stream::{Stream, StreamExt};

use event_gateway_broker::BrokerError;

use crate::error::ApiError;
use crate::AppState;

/// Creates the gateway router.
pub fn gateway_routes(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/events/{subject}", post(ingest_event))
        .route("/streams/{subject}", get(stream_events))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// `POST /events/{subject}` - validate one event and publish it.
///
/// The validator resolved at request start is used for the whole request;
/// a schema update racing the request is tolerated.
async fn ingest_event(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let validator = state.cache.resolve(&subject).await?;

    let report = validator.validate(&payload);
    if !report.is_valid() {
        return Err(ApiError::Validation(report.errors));
    }

    let body = serde_json::to_vec(&payload)
        .map_err(|e| ApiError::Broker(BrokerError::Publish(e.to_string())))?;
    state.broker.publish(&subject, body).await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

/// `GET /streams/{subject}` - live tail of a topic as a text event stream.
///
/// Emits an initial comment frame, then one `data:` frame per broker
/// message, until the client disconnects. Dropping the response tears the
/// session (and its consumer) down.
async fn stream_events(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = state.relay.open_session(&subject).await?;

    let frames = session
        .map(|body| Ok(Event::default().data(String::from_utf8_lossy(&body).into_owned())));
    let stream = tokio_stream::once(Ok(Event::default().comment("connected"))).chain(frames);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// `GET /health` - liveness probe, no side effects.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
