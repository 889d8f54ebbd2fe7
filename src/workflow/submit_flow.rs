//! 提交流程
//!
//! 列举前缀下的文档，逐个提交，直到达到上限

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::infrastructure::ObjectStore;
use crate::models::JobMap;
use crate::services::DocumentSubmitter;

/// 提交前缀下的文档
///
/// # 参数
/// - `store`: 对象存储
/// - `submitter`: 单文档提交服务
/// - `config`: bucket / 前缀 / 上限
///
/// # 返回
/// 返回本次提交得到的 任务 ID → 文档 key 映射；任何一次提交失败都会中止整批
pub async fn submit_documents(
    store: &dyn ObjectStore,
    submitter: &DocumentSubmitter,
    config: &Config,
) -> Result<JobMap> {
    let documents = store
        .list_documents(
            &config.bucket_name,
            &config.document_prefix,
            &config.delimiter,
        )
        .await
        .with_context(|| {
            format!(
                "无法列举文档: {}/{}",
                config.bucket_name, config.document_prefix
            )
        })?;

    info!(
        "✓ 在 {}/{} 下找到 {} 个对象",
        config.bucket_name,
        config.document_prefix,
        documents.len()
    );

    let mut job_map = JobMap::new();

    for document in &documents {
        if job_map.len() >= config.max_requests {
            info!("📋 已达到提交上限 {}，其余文档本次不处理", config.max_requests);
            break;
        }

        if document.key == config.document_prefix {
            continue;
        }

        let submitted = submitter
            .submit(document)
            .await
            .with_context(|| format!("提交文档失败: {}", document.key))?;

        match submitted {
            Some(job_id) => {
                info!("[任务 {}] 📤 已提交: {}", job_id, document.key);
                job_map.insert(job_id, document.key.as_str());
            }
            None => debug!("未提交: {}", document.key),
        }
    }

    Ok(job_map)
}
