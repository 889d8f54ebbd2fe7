use serde::{Deserialize, Serialize};

/// 汇总报告中的一行：某个文件某一页上某个问题的答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResultRecord {
    pub file_name: String,
    pub question: String,
    /// 未回答时为空字符串
    pub answer: String,
    pub page: u32,
    /// 未回答时为 0
    pub confidence: f32,
}
