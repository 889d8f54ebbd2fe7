//! 分析任务相关类型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::block::Block;

/// 分析服务返回的任务 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Succeeded,
    PartialSuccess,
    Failed,
    /// 服务端新增的、本程序不认识的状态
    Unknown(String),
}

impl JobStatus {
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "IN_PROGRESS" => JobStatus::InProgress,
            "SUCCEEDED" => JobStatus::Succeeded,
            "PARTIAL_SUCCESS" => JobStatus::PartialSuccess,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }

    /// 除了 IN_PROGRESS 以外都算终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress)
    }

    /// 终态中可以写结果文件的状态
    pub fn has_results(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::PartialSuccess)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::InProgress => f.write_str("IN_PROGRESS"),
            JobStatus::Succeeded => f.write_str("SUCCEEDED"),
            JobStatus::PartialSuccess => f.write_str("PARTIAL_SUCCESS"),
            JobStatus::Failed => f.write_str("FAILED"),
            JobStatus::Unknown(s) => f.write_str(s),
        }
    }
}

/// 一次状态查询的结果
///
/// `blocks` 只在终态时有内容。
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    pub status: JobStatus,
    pub status_message: Option<String>,
    pub blocks: Vec<Block>,
}

impl AnalysisSnapshot {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            status_message: None,
            blocks: Vec::new(),
        }
    }
}

/// 任务 ID → 源文档 key
///
/// 由提交阶段构建并返回，收集阶段只读。进程退出即丢失。
#[derive(Debug, Clone, Default)]
pub struct JobMap {
    entries: HashMap<JobId, String>,
}

impl JobMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job_id: JobId, document_key: impl Into<String>) {
        self.entries.insert(job_id, document_key.into());
    }

    pub fn document_key(&self, job_id: &JobId) -> Option<&str> {
        self.entries.get(job_id).map(String::as_str)
    }

    pub fn job_ids(&self) -> impl Iterator<Item = &JobId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
