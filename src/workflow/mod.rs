//! 流程层（Workflow Layer）
//!
//! 每个模块对应一个完整阶段：
//! - `submit_flow` - 列举 → 提交（受上限约束）→ 返回 JobMap
//! - `collect_flow` - 并发轮询 → 增量收割 → 写单文档结果
//! - `summary_flow` - 读取结果文件 → 提取问答 → 排序 → 写汇总
//!
//! 阶段之间只通过显式参数（JobMap）或磁盘文件通信。

pub mod collect_flow;
pub mod submit_flow;
pub mod summary_flow;

pub use collect_flow::{collect_results, CollectReport, JobFailure};
pub use submit_flow::submit_documents;
pub use summary_flow::{extract_query_results, sort_records, summarize_results, SummaryReport};
