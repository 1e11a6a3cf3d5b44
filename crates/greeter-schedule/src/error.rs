//! エラー型定義 (greeter-schedule)

use thiserror::Error;

/// greeter-schedule のエラー型
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("cron パースエラー: {expr}: {source}")]
    CronParse {
        expr: String,
        #[source]
        source: cron::error::Error,
    },
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ScheduleError>;
