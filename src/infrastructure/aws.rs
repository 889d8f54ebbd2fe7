//! AWS 实现：S3 列举 + Textract 异步文档分析
//!
//! 凭证与区域全部交给 `aws-config` 从运行环境解析。

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_textract::types as textract;
use tracing::{debug, error};

use super::{AnalysisService, ObjectStore};
use crate::error::{AnalysisError, AppError, AppResult};
use crate::models::{
    AnalysisSnapshot, Block, BlockType, DocumentRef, JobId, JobStatus, QueryDefinition,
    QueryInfo, Relationship, RelationshipType,
};

/// 加载运行环境中的 AWS 配置
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}

/// S3 对象存储
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_documents(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> AppResult<Vec<DocumentRef>> {
        let mut documents = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter(delimiter)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    error!("列举对象失败 ({}/{}): {}", bucket, prefix, DisplayErrorContext(&e));
                    AppError::list_failed(bucket, prefix, e)
                })?;

            documents.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(|key| DocumentRef::new(bucket, key)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!("{}/{} 下共 {} 个对象", bucket, prefix, documents.len());
        Ok(documents)
    }
}

/// Textract 文档分析
pub struct TextractService {
    client: aws_sdk_textract::Client,
}

impl TextractService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_textract::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl AnalysisService for TextractService {
    async fn start_analysis(
        &self,
        document: &DocumentRef,
        queries: &[QueryDefinition],
    ) -> AppResult<JobId> {
        let location = textract::DocumentLocation::builder()
            .s3_object(
                textract::S3Object::builder()
                    .bucket(&document.bucket)
                    .name(&document.key)
                    .build(),
            )
            .build();

        let output = self
            .client
            .start_document_analysis()
            .document_location(location)
            .feature_types(textract::FeatureType::Queries)
            .queries_config(build_queries_config(queries)?)
            .send()
            .await
            .map_err(|e| {
                error!("提交分析任务失败 ({}): {}", document, DisplayErrorContext(&e));
                AppError::submit_failed(&document.key, e)
            })?;

        Ok(JobId::new(output.job_id().unwrap_or_default()))
    }

    async fn get_analysis(&self, job_id: &JobId) -> AppResult<AnalysisSnapshot> {
        let mut blocks = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .get_document_analysis()
                .job_id(job_id.as_str())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AppError::poll_failed(job_id.as_str(), e))?;

            let status = output
                .job_status()
                .map(|s| JobStatus::from_service_name(s.as_str()))
                .ok_or_else(|| {
                    AppError::Analysis(AnalysisError::MissingStatus {
                        job_id: job_id.to_string(),
                    })
                })?;

            if !status.is_terminal() {
                return Ok(AnalysisSnapshot::in_progress());
            }

            blocks.extend(output.blocks().iter().map(convert_block));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => {
                    return Ok(AnalysisSnapshot {
                        status,
                        status_message: output.status_message().map(str::to_string),
                        blocks,
                    });
                }
            }
        }
    }
}

fn build_queries_config(queries: &[QueryDefinition]) -> AppResult<textract::QueriesConfig> {
    let queries = queries
        .iter()
        .map(|q| {
            textract::Query::builder()
                .text(&q.text)
                .alias(&q.alias)
                .set_pages(Some(q.pages.clone()))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid_request)?;

    textract::QueriesConfig::builder()
        .set_queries(Some(queries))
        .build()
        .map_err(invalid_request)
}

fn invalid_request(err: aws_sdk_textract::error::BuildError) -> AppError {
    AppError::Analysis(AnalysisError::InvalidRequest {
        source: Box::new(err),
    })
}

fn convert_block(block: &textract::Block) -> Block {
    let relationships = block.relationships();
    Block {
        id: block.id().unwrap_or_default().to_string(),
        block_type: block
            .block_type()
            .map(|t| BlockType::from_service_name(t.as_str()))
            .unwrap_or(BlockType::Unknown),
        page: block.page().and_then(|p| u32::try_from(p).ok()),
        text: block.text().map(str::to_string),
        confidence: block.confidence(),
        relationships: (!relationships.is_empty()).then(|| {
            relationships
                .iter()
                .map(|r| Relationship {
                    kind: r
                        .r#type()
                        .map(|t| RelationshipType::from_service_name(t.as_str()))
                        .unwrap_or(RelationshipType::Unknown),
                    ids: r.ids().to_vec(),
                })
                .collect()
        }),
        query: block.query().map(|q| QueryInfo {
            text: q.text().to_string(),
            alias: q.alias().map(str::to_string),
            pages: (!q.pages().is_empty()).then(|| q.pages().to_vec()),
        }),
    }
}
