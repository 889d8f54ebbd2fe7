//! 集成测试共用的内存版存储与分析服务

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use textract_queries::error::AppError;
use textract_queries::models::{
    AnalysisSnapshot, BlockType, JobStatus, QueryInfo, Relationship, RelationshipType,
};
use textract_queries::{
    AnalysisService, AppResult, Block, Config, DocumentRef, JobId, ObjectStore, QueryDefinition,
};

/// 固定返回一组 key 的对象存储
pub struct MemoryStore {
    pub keys: Vec<String>,
}

impl MemoryStore {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_documents(
        &self,
        bucket: &str,
        prefix: &str,
        _delimiter: &str,
    ) -> AppResult<Vec<DocumentRef>> {
        Ok(self
            .keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .map(|k| DocumentRef::new(bucket, k.clone()))
            .collect())
    }
}

/// 单个任务的脚本：先返回若干次处理中，再返回终态
#[derive(Clone)]
pub struct JobScript {
    pub pending_polls: u32,
    pub status: JobStatus,
    pub status_message: Option<String>,
}

impl JobScript {
    pub fn succeeds_after(pending_polls: u32) -> Self {
        Self {
            pending_polls,
            status: JobStatus::Succeeded,
            status_message: None,
        }
    }

    pub fn fails(message: &str) -> Self {
        Self {
            pending_polls: 0,
            status: JobStatus::Failed,
            status_message: Some(message.to_string()),
        }
    }
}

struct JobState {
    key: String,
    queries: Vec<QueryDefinition>,
    polls: u32,
}

/// 内存版分析服务
///
/// 每个文档按 `scripts` 中的脚本推进；终态时返回每个问题一对 QUERY / QUERY_RESULT，
/// 外加若干版面 block。
#[derive(Default)]
pub struct MemoryAnalysis {
    scripts: HashMap<String, JobScript>,
    reject_keys: Vec<String>,
    jobs: Mutex<HashMap<JobId, JobState>>,
    submitted: Mutex<Vec<String>>,
}

impl MemoryAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, key: &str, script: JobScript) -> Self {
        self.scripts.insert(key.to_string(), script);
        self
    }

    /// 提交该 key 时返回服务错误
    pub fn rejecting(mut self, key: &str) -> Self {
        self.reject_keys.push(key.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn script_for(&self, key: &str) -> JobScript {
        self.scripts
            .get(key)
            .cloned()
            .unwrap_or_else(|| JobScript::succeeds_after(1))
    }
}

#[async_trait]
impl AnalysisService for MemoryAnalysis {
    async fn start_analysis(
        &self,
        document: &DocumentRef,
        queries: &[QueryDefinition],
    ) -> AppResult<JobId> {
        if self.reject_keys.contains(&document.key) {
            return Err(AppError::submit_failed(
                &document.key,
                std::io::Error::new(std::io::ErrorKind::Other, "throttled"),
            ));
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(document.key.clone());
        let job_id = JobId::new(format!("job-{}", submitted.len()));

        self.jobs.lock().unwrap().insert(
            job_id.clone(),
            JobState {
                key: document.key.clone(),
                queries: queries.to_vec(),
                polls: 0,
            },
        );
        Ok(job_id)
    }

    async fn get_analysis(&self, job_id: &JobId) -> AppResult<AnalysisSnapshot> {
        let mut jobs = self.jobs.lock().unwrap();
        let state = jobs.get_mut(job_id).expect("未知任务");
        state.polls += 1;

        let script = self.script_for(&state.key);
        if state.polls <= script.pending_polls {
            return Ok(AnalysisSnapshot::in_progress());
        }

        let blocks = if script.status.has_results() {
            answered_blocks(&state.queries)
        } else {
            Vec::new()
        };

        Ok(AnalysisSnapshot {
            status: script.status,
            status_message: script.status_message,
            blocks,
        })
    }
}

/// 每个问题一对 QUERY / QUERY_RESULT，前后夹杂 PAGE / LINE
pub fn answered_blocks(queries: &[QueryDefinition]) -> Vec<Block> {
    let mut blocks = vec![layout_block("page-1", BlockType::Page)];

    for (i, query) in queries.iter().enumerate() {
        let answer_id = format!("r{}", i);
        blocks.push(Block {
            id: format!("q{}", i),
            block_type: BlockType::Query,
            page: Some(1),
            text: None,
            confidence: None,
            relationships: Some(vec![Relationship {
                kind: RelationshipType::Answer,
                ids: vec![answer_id.clone()],
            }]),
            query: Some(QueryInfo {
                text: query.text.clone(),
                alias: Some(query.alias.clone()),
                pages: Some(query.pages.clone()),
            }),
        });
        blocks.push(Block {
            id: answer_id,
            block_type: BlockType::QueryResult,
            page: Some(1),
            text: Some(format!("answer {}", i)),
            confidence: Some(90.0 + i as f32),
            relationships: None,
            query: None,
        });
        blocks.push(layout_block(&format!("line-{}", i), BlockType::Line));
    }

    blocks
}

fn layout_block(id: &str, block_type: BlockType) -> Block {
    Block {
        id: id.to_string(),
        block_type,
        page: Some(1),
        text: Some("layout".to_string()),
        confidence: Some(99.0),
        relationships: None,
        query: None,
    }
}

/// 指向临时目录、轮询间隔为 0 的配置
pub fn test_config(root: &Path) -> Config {
    Config {
        bucket_name: "test-bucket".to_string(),
        poll_interval_secs: 0,
        max_poll_attempts: 50,
        results_dir: root.join("results"),
        summary_path: root.join("summary.json"),
        ..Config::default()
    }
}
