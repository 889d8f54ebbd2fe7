//! 汇总流程
//!
//! 读取结果目录下的所有文件，把 QUERY 与其 QUERY_RESULT 连接成问答记录，
//! 按 (文件名, 问题, 页码) 排序后写成一个汇总文件。

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{Block, BlockType, QueryResultRecord};

/// 汇总统计
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub files: usize,
    pub records: usize,
    pub summary_path: PathBuf,
}

/// 从一个结果文件的 block 列表中提取问答记录
///
/// 答案取第一个 ANSWER 关系的第一个 id 所指向的 block；
/// 没有关系或 id 找不到时，答案为空、置信度为 0。
pub fn extract_query_results(file_name: &str, blocks: &[Block]) -> Vec<QueryResultRecord> {
    blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Query)
        .map(|query| {
            let answer = query
                .answer_id()
                .and_then(|id| blocks.iter().find(|b| b.id == id));

            QueryResultRecord {
                file_name: file_name.to_string(),
                question: query
                    .query
                    .as_ref()
                    .map(|q| q.text.clone())
                    .unwrap_or_default(),
                answer: answer.and_then(|a| a.text.clone()).unwrap_or_default(),
                page: query.page.unwrap_or(0),
                confidence: answer.and_then(|a| a.confidence).unwrap_or(0.0),
            }
        })
        .collect()
}

/// 按 (文件名, 问题, 页码) 升序排序，相等时保持原顺序
pub fn sort_records(records: &mut [QueryResultRecord]) {
    records.sort_by(compare_records);
}

fn compare_records(a: &QueryResultRecord, b: &QueryResultRecord) -> Ordering {
    a.file_name
        .cmp(&b.file_name)
        .then_with(|| a.question.cmp(&b.question))
        .then_with(|| a.page.cmp(&b.page))
}

/// 汇总结果目录
///
/// # 参数
/// - `input_dir`: 单文档结果文件所在目录（子目录忽略）
/// - `summary_path`: 汇总文件路径
///
/// 任何一个文件读取或解析失败都会中止整个汇总。
pub async fn summarize_results(input_dir: &Path, summary_path: &Path) -> Result<SummaryReport> {
    let exists = fs::try_exists(input_dir)
        .await
        .map_err(|e| AppError::file_read_failed(input_dir.display().to_string(), e))?;
    if !exists {
        return Err(AppError::directory_not_found(input_dir.display().to_string()).into());
    }

    let mut entries = fs::read_dir(input_dir)
        .await
        .with_context(|| format!("无法读取文件夹: {}", input_dir.display()))?;

    let mut records = Vec::new();
    let mut files = 0usize;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let blocks: Vec<Block> = serde_json::from_str(&content)
            .map_err(|e| AppError::json_parse_failed(path.display().to_string(), e))?;

        let extracted = extract_query_results(&file_name, &blocks);
        debug!("{}: {} 条问答", file_name, extracted.len());

        records.extend(extracted);
        files += 1;
    }

    sort_records(&mut records);

    if let Some(parent) = summary_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }

    let json = serde_json::to_string(&records)?;
    fs::write(summary_path, json)
        .await
        .with_context(|| format!("无法写入汇总文件: {}", summary_path.display()))?;

    info!(
        "✓ 汇总完成: {} 个文件, {} 条记录 → {}",
        files,
        records.len(),
        summary_path.display()
    );

    Ok(SummaryReport {
        files,
        records: records.len(),
        summary_path: summary_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use crate::models::{QueryInfo, Relationship, RelationshipType};

    fn query_block(id: &str, question: &str, page: u32, answer_ids: &[&str]) -> Block {
        Block {
            id: id.to_string(),
            block_type: BlockType::Query,
            page: Some(page),
            text: None,
            confidence: None,
            relationships: (!answer_ids.is_empty()).then(|| {
                vec![Relationship {
                    kind: RelationshipType::Answer,
                    ids: answer_ids.iter().map(|s| s.to_string()).collect(),
                }]
            }),
            query: Some(QueryInfo {
                text: question.to_string(),
                alias: None,
                pages: None,
            }),
        }
    }

    fn result_block(id: &str, text: &str, confidence: f32) -> Block {
        Block {
            id: id.to_string(),
            block_type: BlockType::QueryResult,
            page: Some(1),
            text: Some(text.to_string()),
            confidence: Some(confidence),
            relationships: None,
            query: None,
        }
    }

    fn record(file: &str, question: &str, page: u32) -> QueryResultRecord {
        QueryResultRecord {
            file_name: file.to_string(),
            question: question.to_string(),
            answer: String::new(),
            page,
            confidence: 0.0,
        }
    }

    #[test]
    fn test_answered_query() {
        let blocks = vec![
            query_block("q1", "What is the loan number?", 1, &["r1"]),
            result_block("r1", "LN-0042", 97.5),
        ];

        let records = extract_query_results("a.pdf.json", &blocks);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "a.pdf.json");
        assert_eq!(records[0].question, "What is the loan number?");
        assert_eq!(records[0].answer, "LN-0042");
        assert_eq!(records[0].confidence, 97.5);
        assert_eq!(records[0].page, 1);
    }

    #[test]
    fn test_unanswered_query_has_defaults() {
        let blocks = vec![
            query_block("q1", "What is the loan number?", 2, &[]),
            query_block("q2", "What is the beneficiary bank name?", 2, &["missing"]),
        ];

        let records = extract_query_results("a.pdf.json", &blocks);

        assert_eq!(records.len(), 2);
        for r in &records {
            assert_eq!(r.answer, "");
            assert_eq!(r.confidence, 0.0);
            assert_eq!(r.page, 2);
        }
    }

    #[test]
    fn test_first_answer_id_wins() {
        let blocks = vec![
            query_block("q1", "What is the ABA number?", 1, &["r2", "r1"]),
            result_block("r1", "111000025", 99.0),
            result_block("r2", "021000021", 40.0),
        ];

        let records = extract_query_results("a.pdf.json", &blocks);
        assert_eq!(records[0].answer, "021000021");
        assert_eq!(records[0].confidence, 40.0);
    }

    #[test]
    fn test_query_without_echo_has_empty_question() {
        let mut q = query_block("q1", "", 1, &[]);
        q.query = None;

        let records = extract_query_results("a.pdf.json", &[q]);
        assert_eq!(records[0].question, "");
    }

    #[test]
    fn test_sort_file_then_question_then_page() {
        let mut records = vec![
            record("b.json", "Q2", 1),
            record("b.json", "Q1", 1),
            record("a.json", "Q2", 1),
            record("a.json", "Q1", 2),
            record("a.json", "Q1", 1),
        ];

        sort_records(&mut records);

        let order: Vec<_> = records
            .iter()
            .map(|r| (r.file_name.as_str(), r.question.as_str(), r.page))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.json", "Q1", 1),
                ("a.json", "Q1", 2),
                ("a.json", "Q2", 1),
                ("b.json", "Q1", 1),
                ("b.json", "Q2", 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_summary_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("documents");
        std::fs::create_dir_all(input.join("nested")).unwrap();

        for name in ["b.json", "a.json"] {
            let blocks = vec![
                query_block("q2", "Q2", 1, &["r2"]),
                query_block("q1", "Q1", 1, &["r1"]),
                result_block("r1", "one", 90.0),
                result_block("r2", "two", 80.0),
            ];
            std::fs::write(input.join(name), serde_json::to_string(&blocks).unwrap()).unwrap();
        }

        let summary_path = dir.path().join("out").join("summary.json");
        let report = summarize_results(&input, &summary_path).await.unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.records, 4);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        let order: Vec<(String, String)> = written
            .as_array()
            .unwrap()
            .iter()
            .map(|r| {
                (
                    r["FileName"].as_str().unwrap().to_string(),
                    r["Question"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.json".to_string(), "Q1".to_string()),
                ("a.json".to_string(), "Q2".to_string()),
                ("b.json".to_string(), "Q1".to_string()),
                ("b.json".to_string(), "Q2".to_string()),
            ]
        );
        assert_eq!(written[0]["Answer"], "one");
        assert_eq!(written[0]["Page"], 1);
    }

    #[tokio::test]
    async fn test_malformed_file_aborts_summary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "not json").unwrap();

        let summary_path = dir.path().join("summary.json");
        let err = summarize_results(dir.path(), &summary_path)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::JsonParseFailed { path, .. })) if path.ends_with("bad.json")
        ));
        assert!(!summary_path.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = summarize_results(&dir.path().join("nope"), &dir.path().join("summary.json"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_not_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("plain.json");
        std::fs::write(&not_a_dir, "[]").unwrap();

        // 父路径是普通文件，检查存在性本身就会出错
        let err = summarize_results(&not_a_dir.join("documents"), &dir.path().join("summary.json"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::ReadFailed { .. }))
        ));
    }
}
