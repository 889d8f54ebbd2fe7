//! 文档提交服务 - 业务能力层
//!
//! 只负责"提交一份文档"能力，不关心批量和上限

use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::AnalysisService;
use crate::models::{DocumentRef, JobId, QueryDefinition};

/// 文档提交服务
///
/// 职责：
/// - 判断 key 是否属于待处理前缀
/// - 携带固定问题提交分析任务
/// - 不出现 JobMap
pub struct DocumentSubmitter {
    service: Arc<dyn AnalysisService>,
    prefix: String,
    queries: Vec<QueryDefinition>,
}

impl DocumentSubmitter {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        prefix: impl Into<String>,
        queries: Vec<QueryDefinition>,
    ) -> Self {
        Self {
            service,
            prefix: prefix.into(),
            queries,
        }
    }

    /// 前缀占位对象本身和前缀以外的 key 都不提交
    pub fn accepts(&self, key: &str) -> bool {
        key != self.prefix && key.starts_with(&self.prefix)
    }

    /// 提交单个文档
    ///
    /// # 返回
    /// 被跳过或服务返回空 ID 时为 `None`；提交失败直接返回错误
    pub async fn submit(&self, document: &DocumentRef) -> AppResult<Option<JobId>> {
        if !self.accepts(&document.key) {
            debug!("跳过非文档对象: {}", document.key);
            return Ok(None);
        }

        let job_id = self.service.start_analysis(document, &self.queries).await?;
        if job_id.is_empty() {
            debug!("服务未返回任务 ID: {}", document.key);
            return Ok(None);
        }

        Ok(Some(job_id))
    }
}
