//! 分析服务输出的 Block 结构
//!
//! 字段命名与服务端保持一致（camelCase），结果文件和汇总阶段共用同一套结构，
//! 保证写出去的文件能被原样读回。

use serde::{Deserialize, Serialize};

/// Block 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    KeyValueSet,
    Table,
    Cell,
    MergedCell,
    SelectionElement,
    Title,
    Signature,
    Query,
    QueryResult,
    #[serde(other)]
    Unknown,
}

impl BlockType {
    /// 按服务端的类型名解析，无法识别的归为 `Unknown`
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "PAGE" => BlockType::Page,
            "LINE" => BlockType::Line,
            "WORD" => BlockType::Word,
            "KEY_VALUE_SET" => BlockType::KeyValueSet,
            "TABLE" => BlockType::Table,
            "CELL" => BlockType::Cell,
            "MERGED_CELL" => BlockType::MergedCell,
            "SELECTION_ELEMENT" => BlockType::SelectionElement,
            "TITLE" => BlockType::Title,
            "SIGNATURE" => BlockType::Signature,
            "QUERY" => BlockType::Query,
            "QUERY_RESULT" => BlockType::QueryResult,
            _ => BlockType::Unknown,
        }
    }
}

/// 关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Value,
    Child,
    ComplexFeatures,
    MergedCell,
    Title,
    Answer,
    Table,
    #[serde(other)]
    Unknown,
}

impl RelationshipType {
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "VALUE" => RelationshipType::Value,
            "CHILD" => RelationshipType::Child,
            "COMPLEX_FEATURES" => RelationshipType::ComplexFeatures,
            "MERGED_CELL" => RelationshipType::MergedCell,
            "TITLE" => RelationshipType::Title,
            "ANSWER" => RelationshipType::Answer,
            "TABLE" => RelationshipType::Table,
            _ => RelationshipType::Unknown,
        }
    }
}

/// Block 之间的关系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// QUERY block 上回显的问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<String>>,
}

/// 分析结果中的一个 block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryInfo>,
}

impl Block {
    /// 是否属于需要写入结果文件的 QUERY / QUERY_RESULT
    pub fn is_query_payload(&self) -> bool {
        matches!(self.block_type, BlockType::Query | BlockType::QueryResult)
    }

    /// 第一个 ANSWER 关系里的第一个 id
    ///
    /// 关系格式异常时只取第一个匹配，不做置信度比较。
    pub fn answer_id(&self) -> Option<&str> {
        self.relationships
            .as_deref()?
            .iter()
            .find(|r| r.kind == RelationshipType::Answer)?
            .ids
            .first()
            .map(String::as_str)
    }
}

/// 只保留 QUERY / QUERY_RESULT
pub fn query_blocks(blocks: Vec<Block>) -> Vec<Block> {
    blocks.into_iter().filter(Block::is_query_payload).collect()
}
