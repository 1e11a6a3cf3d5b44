//! 毎朝の挨拶スケジューラー
//!
//! cron 形式で指定した時刻にワークスペースのメンバー全員へ挨拶を送ります。

mod error;
mod scheduler;

pub use error::{Result, ScheduleError};
pub use scheduler::{GreetingScheduler, SchedulerHandle, run_greeting};
