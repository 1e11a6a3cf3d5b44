//! スケジューラー
//!
//! cron スケジュールに基づいて朝の挨拶を送信します。
//! Missed firings (e.g. while the process was down) are not caught up.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use cron::Schedule as CronSchedule;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use greeter_slack::message::morning_greeting;
use greeter_slack::{Notifier, SlackUser};

use crate::error::{Result, ScheduleError};

/// スケジューラーのハンドル
pub struct SchedulerHandle {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// スケジューラーを停止
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

/// Daily greeting job over a fixed user snapshot
pub struct GreetingScheduler {
    cron: String,
    schedule: CronSchedule,
    users: Arc<Vec<SlackUser>>,
    notifier: Notifier,
}

impl GreetingScheduler {
    /// Fails if `cron_expr` is not a valid seconds-first cron expression
    pub fn new(cron_expr: &str, users: Arc<Vec<SlackUser>>, notifier: Notifier) -> Result<Self> {
        let schedule = parse_cron(cron_expr)?;

        Ok(Self {
            cron: cron_expr.to_string(),
            schedule,
            users,
            notifier,
        })
    }

    /// スケジューラーを開始
    ///
    /// Stopping mid-run abandons the remaining users of that run.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let handle = tokio::spawn(async move {
            info!(cron = %self.cron, users = self.users.len(), "スケジューラーを開始しました");

            loop {
                let now = Local::now();
                let Some(next) = self.schedule.after(&now).next() else {
                    warn!(cron = %self.cron, "次の実行時刻を取得できません");
                    break;
                };

                let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
                info!(next = %next.format("%Y-%m-%d %H:%M:%S"), "次回実行まで待機中");

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        // 送信中でも停止要求で中断する
                        tokio::select! {
                            sent = run_greeting(&self.users, &self.notifier) => {
                                info!(sent, "朝の挨拶を送信しました");
                            }
                            _ = shutdown_rx.recv() => {
                                warn!("挨拶の送信中にシャットダウン要求を受信");
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("シャットダウン要求を受信");
                        break;
                    }
                }
            }

            info!("スケジューラーを停止しました");
        });

        SchedulerHandle {
            shutdown_tx,
            handle,
        }
    }
}

/// Greet every human, active user once
///
/// Bots and deleted accounts are skipped. Returns the number of greetings
/// attempted; individual send failures are logged by the notifier.
pub async fn run_greeting(users: &[SlackUser], notifier: &Notifier) -> usize {
    let mut attempted = 0;

    for user in users.iter().filter(|u| u.is_greetable()) {
        notifier.send(&user.id, &morning_greeting(user)).await;
        attempted += 1;
    }

    attempted
}

/// cron 文字列をパース
fn parse_cron(cron_expr: &str) -> Result<CronSchedule> {
    // cron 形式: "秒 分 時 日 月 曜日"
    // 例: "0 0 10 * * *" = 毎日 10:00
    CronSchedule::from_str(cron_expr).map_err(|source| ScheduleError::CronParse {
        expr: cron_expr.to_string(),
        source,
    })
}
