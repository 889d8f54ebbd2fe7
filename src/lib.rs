//! # Textract Queries
//!
//! 批量把对象存储中的扫描文档提交给文档分析服务，轮询异步任务，
//! 提取固定问题的答案并生成排序后的汇总报告。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部服务客户端，只暴露能力
//! - `ObjectStore` - 列举源文档
//! - `AnalysisService` - 提交分析任务、查询任务状态
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文档 / 单个任务
//! - `DocumentSubmitter` - 提交一份文档
//! - `JobPoller` - 把一个任务轮询到终态
//! - `ResultWriter` - 写一份结果文件
//!
//! ### ③ 流程层（Workflow）
//! - `submit_flow` - 列举 → 提交 → JobMap
//! - `collect_flow` - 并发轮询 → 增量写结果
//! - `summary_flow` - 读结果 → 问答记录 → 排序 → 汇总文件
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 两条独立流水线：`analyze` 与 `summarize`

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AnalysisService, ObjectStore};
pub use models::{Block, DocumentRef, JobId, JobMap, QueryDefinition, QueryResultRecord};
pub use orchestrator::App;
pub use workflow::{CollectReport, SummaryReport};
