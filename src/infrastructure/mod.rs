//! 基础设施层
//!
//! 持有外部服务的客户端，只暴露能力：
//! - `ObjectStore` - 列举源文档
//! - `AnalysisService` - 提交分析任务、查询任务状态
//!
//! 不认识 JobMap，不处理流程。

pub mod aws;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{AnalysisSnapshot, DocumentRef, JobId, QueryDefinition};

pub use aws::{S3ObjectStore, TextractService};

/// 对象存储能力
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 列出 `prefix` 下的对象，保持服务端返回的顺序
    async fn list_documents(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> AppResult<Vec<DocumentRef>>;
}

/// 文档分析能力
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// 以 QUERIES 特性提交一个异步分析任务
    async fn start_analysis(
        &self,
        document: &DocumentRef,
        queries: &[QueryDefinition],
    ) -> AppResult<JobId>;

    /// 查询一次任务状态；终态时带回完整的 block 列表
    async fn get_analysis(&self, job_id: &JobId) -> AppResult<AnalysisSnapshot>;
}
