//! HTTP server
//!
//! Routes for the Events API webhook, the OAuth install redirect and a
//! liveness probe.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use greeter_core::{Config, OAuthConfig};

use crate::api::SlackApiClient;
use crate::error::{Result, SlackError};
use crate::sender::Notifier;
use crate::webhook::handle_events;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub signing_secret: String,
    pub status_channel: String,
    pub oauth: OAuthConfig,
    pub api_client: SlackApiClient,
    pub notifier: Notifier,
}

impl AppState {
    /// Build state from configuration; messages go out through `api_client`
    pub fn new(config: &Config, api_client: SlackApiClient) -> Self {
        let notifier = Notifier::new(Arc::new(api_client.clone()));

        Self {
            signing_secret: config.slack.signing_secret.clone(),
            status_channel: config.slack.status_channel.clone(),
            oauth: config.oauth.clone(),
            api_client,
            notifier,
        }
    }

    /// Replace the outbound notifier
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/events-endpoint", post(handle_events))
        .route("/oauth", get(handle_oauth))
        .route("/index", get(handle_index))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server<F>(port: u16, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SlackError::Server(format!("failed to bind {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SlackError::Server(e.to_string()))?;

    Ok(())
}

async fn handle_index() -> &'static str {
    "index"
}

#[derive(Debug, Deserialize)]
pub struct OAuthParams {
    pub code: Option<String>,
}

/// `GET /oauth`: exchange the install `code` for a token
///
/// The outcome is only logged; the caller always gets an empty 200.
async fn handle_oauth(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OAuthParams>,
) -> StatusCode {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!("OAuth callback without code");
        return StatusCode::OK;
    };

    if !state.oauth.is_configured() {
        warn!("OAuth client credentials not configured, skipping token exchange");
        return StatusCode::OK;
    }

    let oauth = &state.oauth;
    match state
        .api_client
        .oauth_v2_access(
            oauth.client_id.as_deref().unwrap_or_default(),
            oauth.client_secret.as_deref().unwrap_or_default(),
            &code,
            oauth.redirect_url.as_deref().filter(|u| !u.is_empty()),
        )
        .await
    {
        Ok(response) => {
            let team = response.team.as_ref().map(|t| t.id.as_str()).unwrap_or("-");
            info!(team, bot_user = ?response.bot_user_id, "OAuth token exchange succeeded");
        }
        Err(e) => error!("OAuth token exchange failed: {}", e),
    }

    StatusCode::OK
}
