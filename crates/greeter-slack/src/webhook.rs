//! Events API webhook
//!
//! Each request runs `read body → verify signature → parse → dispatch`.
//! The signature is checked on the raw bytes before any JSON parsing, and
//! every stage ends the request with its own status code on failure.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::error::WebhookError;
use crate::message;
use crate::server::AppState;
use crate::types::{ChallengeResponse, EventsApiEvent, InnerEvent};
use crate::verify::SecretsVerifier;

/// Upper bound on a buffered event payload
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `POST /events-endpoint`
pub async fn handle_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, WebhookError> {
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| WebhookError::BadRequest(format!("failed to read body: {}", e)))?;

    verify_request(&headers, &body, &state.signing_secret)?;

    let event: EventsApiEvent = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::Internal(format!("failed to parse event: {}", e)))?;

    debug!(event_type = event.event_type(), "Received event");

    match event {
        EventsApiEvent::UrlVerification { .. } => return answer_challenge(&body),
        EventsApiEvent::EventCallback(callback) => {
            debug!(
                event_id = callback.event_id.as_deref().unwrap_or("-"),
                inner = callback.event.event_type(),
                "Dispatching callback event"
            );
            dispatch(&state, callback.event).await;
        }
        EventsApiEvent::AppRateLimited { minute_rate_limited } => {
            warn!(?minute_rate_limited, "Slack rate limited event delivery");
        }
        EventsApiEvent::Other => {
            debug!("Ignoring unsupported event envelope");
        }
    }

    Ok(StatusCode::OK.into_response())
}

fn verify_request(headers: &HeaderMap, body: &[u8], signing_secret: &str) -> Result<(), WebhookError> {
    let mut verifier = SecretsVerifier::new(headers, signing_secret)?;
    verifier.update(body);
    verifier.ensure()?;
    Ok(())
}

/// Echo the `url_verification` challenge verbatim
///
/// The token field is not checked; the signature already authenticated Slack.
fn answer_challenge(body: &Bytes) -> Result<Response, WebhookError> {
    let challenge: ChallengeResponse = serde_json::from_slice(body)
        .map_err(|e| WebhookError::Internal(format!("failed to parse challenge: {}", e)))?;

    info!("Answering URL verification challenge");

    Ok(([(header::CONTENT_TYPE, "text")], challenge.challenge).into_response())
}

async fn dispatch(state: &AppState, event: InnerEvent) {
    match event {
        InnerEvent::AppMention(ev) => {
            info!(channel = %ev.channel, user = ?ev.user, "Bot mentioned");
            state.notifier.send(&ev.channel, message::mention_reply()).await;
        }
        InnerEvent::UserProfileChanged(ev) => {
            info!(user = %ev.user.id, "User profile changed");
            let text = message::status_changed(&ev.user);
            state.notifier.send(&state.status_channel, &text).await;
        }
        InnerEvent::Other => {}
    }
}
