//! Slack Web API client
//!
//! Communicates with Slack Web API

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::{Result, SlackError};
use crate::types::*;

/// Default Slack Web API endpoint
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Page size for cursor-paginated methods
const PAGE_LIMIT: &str = "200";

/// Slack Web API client
#[derive(Clone)]
pub struct SlackApiClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl SlackApiClient {
    /// Create a new Slack API client
    pub fn new(bot_token: &str) -> Result<Self> {
        Self::with_base_url(bot_token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API endpoint
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self> {
        if bot_token.is_empty() {
            return Err(SlackError::TokenNotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SlackError::HttpError)?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Add authorization header
    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.bot_token)
    }

    /// Send a request and decode the `{ok, error, ...}` envelope
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<SlackResponse<T>> {
        let response = request.send().await.map_err(SlackError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SlackError::ApiError(format!("{}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))
    }

    /// List every member of the workspace, following pagination cursors
    pub async fn users_list(&self) -> Result<Vec<SlackUser>> {
        let url = self.url("users.list");
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(ref c) = cursor {
                params.push(("cursor", c.clone()));
            }

            debug!("Fetching users page (cursor: {:?})", cursor);

            let response: SlackResponse<UsersListResponse> = self
                .call(self.add_auth(self.client.get(&url).query(&params)))
                .await?;

            let next = response.next_cursor().map(str::to_string);
            users.extend(response.into_result()?.members);

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        info!("Fetched {} workspace users", users.len());
        Ok(users)
    }

    /// Post a message to a channel or user
    pub async fn post_message(&self, message: &PostMessage) -> Result<PostMessageResponse> {
        let url = self.url("chat.postMessage");

        debug!("Posting message to channel: {}", message.channel);

        let response: SlackResponse<PostMessageResponse> = self
            .call(self.add_auth(self.client.post(&url).json(message)))
            .await
            .inspect_err(|e| error!("Post message failed: {}", e))?;

        response.into_result()
    }

    /// Post a simple text message
    pub async fn send_message(&self, channel: &str, text: &str) -> Result<PostMessageResponse> {
        let message = PostMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        };

        self.post_message(&message).await
    }

    /// Exchange an OAuth `code` for an access token
    pub async fn oauth_v2_access(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<OAuthV2Response> {
        let url = self.url("oauth.v2.access");

        let mut form = vec![
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ];
        if let Some(redirect_uri) = redirect_uri {
            form.push(("redirect_uri", redirect_uri));
        }

        debug!("Exchanging OAuth code");

        let response: SlackResponse<OAuthV2Response> =
            self.call(self.client.post(&url).form(&form)).await?;

        response.into_result()
    }
}
