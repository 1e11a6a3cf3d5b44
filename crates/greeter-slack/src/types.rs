//! Slack API types

use serde::{Deserialize, Serialize};

/// Slack user info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub profile: UserProfile,
}

impl SlackUser {
    /// Name used when addressing the user
    pub fn display_name(&self) -> &str {
        [self.real_name.as_deref(), self.profile.real_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Human, active account
    pub fn is_greetable(&self) -> bool {
        !self.is_bot && !self.deleted
    }
}

/// User profile details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

/// Events API envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum EventsApiEvent {
    #[serde(rename = "url_verification")]
    UrlVerification {
        #[serde(default)]
        challenge: String,
    },

    #[serde(rename = "event_callback")]
    EventCallback(CallbackEvent),

    #[serde(rename = "app_rate_limited")]
    AppRateLimited {
        #[serde(default)]
        minute_rate_limited: Option<i64>,
    },

    #[serde(other)]
    Other,
}

impl EventsApiEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UrlVerification { .. } => "url_verification",
            Self::EventCallback(_) => "event_callback",
            Self::AppRateLimited { .. } => "app_rate_limited",
            Self::Other => "other",
        }
    }
}

/// `url_verification` handshake body
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

/// `event_callback` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEvent {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub api_app_id: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_time: Option<i64>,
    pub event: InnerEvent,
}

/// Concrete occurrence inside an `event_callback`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InnerEvent {
    #[serde(rename = "app_mention")]
    AppMention(AppMentionEvent),

    #[serde(rename = "user_profile_changed")]
    UserProfileChanged(UserProfileChangedEvent),

    #[serde(other)]
    Other,
}

impl InnerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AppMention(_) => "app_mention",
            Self::UserProfileChanged(_) => "user_profile_changed",
            Self::Other => "other",
        }
    }
}

/// Bot was mentioned in a channel
#[derive(Debug, Clone, Deserialize)]
pub struct AppMentionEvent {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub channel: String,
    #[serde(default)]
    pub ts: Option<String>,
}

/// A member's profile (including status) changed
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfileChangedEvent {
    pub user: SlackUser,
}

/// Message to send
#[derive(Debug, Clone, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
}

/// API response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct SlackResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> SlackResponse<T> {
    /// Payload of a successful call
    pub fn into_result(self) -> crate::Result<T> {
        if !self.ok {
            return Err(crate::SlackError::ApiError(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| crate::SlackError::ParseError("missing response payload".to_string()))
    }

    /// Cursor of the next page, if any
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .and_then(|m| m.next_cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Response metadata (for pagination, etc.)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// users.list response
#[derive(Debug, Clone, Deserialize)]
pub struct UsersListResponse {
    pub members: Vec<SlackUser>,
}

/// Post message response
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    pub ts: String,
    pub channel: String,
}

/// oauth.v2.access response
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthV2Response {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub bot_user_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub team: Option<OAuthTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTeam {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
