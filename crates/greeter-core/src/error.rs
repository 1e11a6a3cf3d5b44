//! エラー型定義 (greeter-core)

use thiserror::Error;

/// Main error type for greeter-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for greeter-core
pub type Result<T> = std::result::Result<T, Error>;
