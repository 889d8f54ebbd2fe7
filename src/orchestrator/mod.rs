//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有配置和外部服务客户端，把流程层串成两条可以独立调用的流水线：
//!
//! - `analyze` - 提交 + 轮询收集（submit_flow → collect_flow）
//! - `summarize` - 只汇总已有结果文件（summary_flow）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App
//!     ↓
//! workflow (submit_flow / collect_flow / summary_flow)
//!     ↓
//! services (DocumentSubmitter / JobPoller / ResultWriter)
//!     ↓
//! infrastructure (ObjectStore / AnalysisService)
//! ```
//!
//! 只做调度和统计，不做具体业务判断。

pub mod batch_processor;

pub use batch_processor::App;
