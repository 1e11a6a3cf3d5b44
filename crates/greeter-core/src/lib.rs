//! greeter-core: shared configuration and error types
//!
//! Slack greeter bot の設定読み込みと共通エラー型を提供します。

pub mod config;
pub mod error;

pub use config::{Config, OAuthConfig, ScheduleConfig, ServerConfig, SlackConfig};
pub use error::{Error, Result};
