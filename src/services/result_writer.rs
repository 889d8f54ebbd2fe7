//! 结果写入服务 - 业务能力层
//!
//! 只负责"把一份文档的 QUERY 结果写成文件"能力，不关心流程

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::block::{query_blocks, Block};

/// 结果写入服务
///
/// 文件路径为 `<results_dir>/<document_key>.json`，key 中的 `/` 会形成子目录。
/// 含 `..`、绝对路径或盘符的 key 会被拒绝，结果文件始终位于 `results_dir` 之内。
pub struct ResultWriter {
    results_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// 文档对应的结果文件路径
    pub fn path_for(&self, document_key: &str) -> AppResult<PathBuf> {
        let relative = format!("{}.json", document_key);

        if !stays_inside(Path::new(&relative)) {
            return Err(AppError::unsafe_path(relative));
        }

        Ok(self.results_dir.join(relative))
    }

    /// 写入单个文档的结果
    ///
    /// # 参数
    /// - `document_key`: 源文档 key
    /// - `blocks`: 服务返回的完整 block 列表，只保留 QUERY / QUERY_RESULT
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn write(&self, document_key: &str, blocks: Vec<Block>) -> AppResult<PathBuf> {
        let path = self.path_for(document_key)?;
        let blocks = query_blocks(blocks);

        debug!("写入结果: {} | block 数: {}", path.display(), blocks.len());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }

        let json = serde_json::to_string(&blocks)?;
        fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        Ok(path)
    }
}

/// 只允许普通路径段（`.` 可忽略）
fn stays_inside(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockType;

    fn block(id: &str, block_type: BlockType) -> Block {
        Block {
            id: id.to_string(),
            block_type,
            page: Some(1),
            text: None,
            confidence: None,
            relationships: None,
            query: None,
        }
    }

    #[tokio::test]
    async fn test_write_keeps_only_query_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path());

        let path = writer
            .write(
                "documents/a.pdf",
                vec![
                    block("page", BlockType::Page),
                    block("q1", BlockType::Query),
                    block("line", BlockType::Line),
                    block("r1", BlockType::QueryResult),
                ],
            )
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("documents").join("a.pdf.json"));

        let written: Vec<Block> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(Block::is_query_payload));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path());

        writer
            .write("documents/a.pdf", vec![block("q1", BlockType::Query)])
            .await
            .unwrap();
        let path = writer.write("documents/a.pdf", Vec::new()).await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_key_escaping_results_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let writer = ResultWriter::new(&results);

        for key in ["documents/../../escaped", "/etc/escaped", "../escaped"] {
            let err = writer
                .write(key, vec![block("q1", BlockType::Query)])
                .await
                .unwrap_err();
            assert!(
                matches!(err, AppError::File(crate::error::FileError::UnsafePath { .. })),
                "{key} 应该被拒绝"
            );
        }

        assert!(!dir.path().join("escaped.json").exists());
        assert!(!results.exists());
    }

    #[test]
    fn test_dot_segments_stay_inside() {
        let writer = ResultWriter::new("results");

        let path = writer.path_for("documents/./a.pdf").unwrap();
        assert!(path.starts_with("results"));
    }
}
