//! 任务轮询服务 - 业务能力层
//!
//! 只负责"把一个任务轮询到终态"，不关心结果写到哪里

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;

use crate::error::AppError;
use crate::infrastructure::AnalysisService;
use crate::models::{AnalysisSnapshot, JobId};

/// 轮询策略
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// 两次查询之间的等待
    pub interval: Duration,
    /// 最多查询次数，`None` 表示一直等到终态或取消
    pub max_attempts: Option<u32>,
}

/// 轮询失败原因
#[derive(Debug)]
pub enum PollError {
    /// 收到取消信号
    Cancelled { job_id: JobId },
    /// 超过最大查询次数仍未结束
    TimedOut { job_id: JobId, attempts: u32 },
    /// 分析服务调用失败
    Service(AppError),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Cancelled { job_id } => write!(f, "任务 {} 的轮询已取消", job_id),
            PollError::TimedOut { job_id, attempts } => {
                write!(f, "任务 {} 轮询 {} 次后仍未结束", job_id, attempts)
            }
            PollError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Service(e) => Some(e),
            _ => None,
        }
    }
}

/// 任务轮询服务
#[derive(Clone)]
pub struct JobPoller {
    service: Arc<dyn AnalysisService>,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(service: Arc<dyn AnalysisService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// 轮询直到任务进入终态
    ///
    /// # 参数
    /// - `job_id`: 任务 ID
    /// - `cancel`: 取消信号，值变为 `true` 后在下一次等待时退出
    ///
    /// # 返回
    /// 返回 (终态响应, 任务 ID)
    pub async fn poll_until_complete(
        &self,
        job_id: JobId,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<(AnalysisSnapshot, JobId), PollError> {
        let mut attempts = 0u32;

        loop {
            if *cancel.borrow() {
                return Err(PollError::Cancelled { job_id });
            }

            attempts += 1;
            let snapshot = self
                .service
                .get_analysis(&job_id)
                .await
                .map_err(PollError::Service)?;

            if snapshot.status.is_terminal() {
                debug!("[任务 {}] 第 {} 次查询进入终态: {}", job_id, attempts, snapshot.status);
                return Ok((snapshot, job_id));
            }

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    return Err(PollError::TimedOut { job_id, attempts });
                }
            }

            debug!("[任务 {}] 仍在处理中 (第 {} 次查询)", job_id, attempts);

            tokio::select! {
                _ = sleep(self.policy.interval) => {}
                changed = cancel.changed() => {
                    // 发送端已丢弃，不会再有取消信号
                    if changed.is_err() {
                        sleep(self.policy.interval).await;
                    }
                }
            }
        }
    }
}
