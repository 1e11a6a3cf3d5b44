//! greeter-slack: Slack integration for the greeter bot
//!
//! Slack Web API client, Events API webhook handling (signature
//! verification and dispatch), message templates and the outbound sender.

pub mod api;
pub mod error;
pub mod message;
pub mod sender;
pub mod server;
pub mod types;
pub mod verify;
pub mod webhook;

pub use api::SlackApiClient;
pub use error::{Result, SlackError, WebhookError};
pub use sender::{MessageSender, Notifier};
pub use server::{AppState, create_router, start_server};
pub use types::SlackUser;
