//! 收集流程
//!
//! 每个任务一个轮询协程；等到至少一个结束后，把所有已结束的一并处理，
//! 剩下的继续等待，直到全部完成。结果按完成顺序写入，而不是提交顺序。

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::models::{AnalysisSnapshot, JobId, JobMap, JobStatus};
use crate::services::{JobPoller, PollError, ResultWriter};

type PollOutcome = Result<Result<(AnalysisSnapshot, JobId), PollError>, JoinError>;

/// 未能写出结果的任务
#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job_id: JobId,
    pub document_key: Option<String>,
    pub reason: String,
}

/// 收集统计
#[derive(Debug, Default)]
pub struct CollectReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<JobFailure>,
}

impl CollectReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// 轮询 `job_map` 中的所有任务并写出结果
///
/// 失败状态（FAILED 及未知状态）不写文件，记录到 `failures`；
/// 单个任务超时、取消或文档 key 会写出结果目录时同样只记录，不影响其他任务。
/// 分析服务调用失败、写文件失败会中止整批。
pub async fn collect_results(
    poller: &JobPoller,
    job_map: &JobMap,
    writer: &ResultWriter,
    cancel: watch::Receiver<bool>,
) -> Result<CollectReport> {
    let mut tasks = JoinSet::new();
    for job_id in job_map.job_ids() {
        let poller = poller.clone();
        let job_id = job_id.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move { poller.poll_until_complete(job_id, cancel).await });
    }

    info!("⏳ 开始轮询 {} 个任务", tasks.len());

    let mut report = CollectReport::default();

    while let Some(first) = tasks.join_next().await {
        let mut finished = vec![first];
        while let Some(next) = tasks.try_join_next() {
            finished.push(next);
        }

        debug!("本轮完成 {} 个任务，剩余 {} 个", finished.len(), tasks.len());

        for outcome in finished {
            process_outcome(outcome, job_map, writer, &mut report).await?;
        }
    }

    Ok(report)
}

async fn process_outcome(
    outcome: PollOutcome,
    job_map: &JobMap,
    writer: &ResultWriter,
    report: &mut CollectReport,
) -> Result<()> {
    let polled = outcome.context("轮询任务异常退出")?;

    let (snapshot, job_id) = match polled {
        Ok(done) => done,
        Err(PollError::Service(e)) => return Err(e).context("查询任务状态失败"),
        Err(PollError::Cancelled { job_id }) => {
            warn!("[任务 {}] ⚠️ 轮询已取消", job_id);
            report.failures.push(failure(job_map, job_id, "轮询已取消".to_string()));
            return Ok(());
        }
        Err(PollError::TimedOut { job_id, attempts }) => {
            warn!("[任务 {}] ⚠️ 轮询 {} 次仍未结束，放弃等待", job_id, attempts);
            let reason = format!("轮询 {} 次后超时", attempts);
            report.failures.push(failure(job_map, job_id, reason));
            return Ok(());
        }
    };

    let Some(document_key) = job_map.document_key(&job_id) else {
        error!("[任务 {}] ❌ 找不到对应的源文档", job_id);
        report
            .failures
            .push(failure(job_map, job_id, "找不到对应的源文档".to_string()));
        return Ok(());
    };

    if !snapshot.status.has_results() {
        let reason = format!(
            "任务状态 {}: {}",
            snapshot.status,
            snapshot.status_message.as_deref().unwrap_or("无详细信息")
        );
        error!("[任务 {}] ❌ {} ({})", job_id, reason, document_key);
        report.failures.push(failure(job_map, job_id, reason));
        return Ok(());
    }

    if snapshot.status == JobStatus::PartialSuccess {
        warn!(
            "[任务 {}] ⚠️ 部分成功，结果可能不完整: {}",
            job_id,
            snapshot.status_message.as_deref().unwrap_or(document_key)
        );
    }

    if let Err(e) = writer.path_for(document_key) {
        error!("[任务 {}] ❌ {} ({})", job_id, e, document_key);
        report.failures.push(failure(job_map, job_id, e.to_string()));
        return Ok(());
    }

    let path = writer
        .write(document_key, snapshot.blocks)
        .await
        .with_context(|| format!("无法写入结果: {}", document_key))?;

    info!("[任务 {}] ✓ 结果已写入: {}", job_id, path.display());
    report.written.push(path);

    Ok(())
}

fn failure(job_map: &JobMap, job_id: JobId, reason: String) -> JobFailure {
    JobFailure {
        document_key: job_map.document_key(&job_id).map(str::to_string),
        job_id,
        reason,
    }
}
