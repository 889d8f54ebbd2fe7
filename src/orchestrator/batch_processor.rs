//! 批量分析处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：首次分析时加载 AWS 配置，创建存储和分析客户端
//! 2. **分析流水线**：提交文档 → 得到 JobMap → 并发轮询 → 写单文档结果
//! 3. **汇总流水线**：读取结果目录 → 写汇总文件
//! 4. **全局统计**：汇总各阶段的处理结果
//!
//! JobMap 由提交阶段返回、显式传入收集阶段，不存在全局状态。

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{watch, OnceCell};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{aws, AnalysisService, ObjectStore, S3ObjectStore, TextractService};
use crate::services::{DocumentSubmitter, JobPoller, PollPolicy, ResultWriter};
use crate::utils::logging;
use crate::workflow::{self, CollectReport, SummaryReport};

/// 分析流水线使用的外部客户端
struct Clients {
    store: Arc<dyn ObjectStore>,
    service: Arc<dyn AnalysisService>,
}

/// 应用主结构
///
/// 汇总流水线只读本地文件；AWS 客户端在第一次分析时才创建。
pub struct App {
    config: Config,
    clients: OnceCell<Clients>,
}

impl App {
    /// 创建应用（不触碰 AWS）
    pub fn new(config: Config) -> Self {
        logging::log_startup(&config);
        Self {
            config,
            clients: OnceCell::new(),
        }
    }

    /// 使用指定的客户端创建应用
    pub fn with_clients(
        config: Config,
        store: Arc<dyn ObjectStore>,
        service: Arc<dyn AnalysisService>,
    ) -> Self {
        Self {
            config,
            clients: OnceCell::new_with(Some(Clients { store, service })),
        }
    }

    /// 取得客户端，首次调用时用运行环境中的 AWS 凭证初始化
    async fn clients(&self) -> &Clients {
        self.clients
            .get_or_init(|| async {
                let sdk_config = aws::load_sdk_config().await;
                info!(
                    "☁️ AWS 区域: {}",
                    sdk_config
                        .region()
                        .map(|r| r.as_ref().to_string())
                        .unwrap_or_else(|| "未设置".to_string())
                );

                Clients {
                    store: Arc::new(S3ObjectStore::new(&sdk_config)),
                    service: Arc::new(TextractService::new(&sdk_config)),
                }
            })
            .await
    }

    /// 分析流水线：提交 + 轮询收集
    pub async fn analyze(&self, cancel: watch::Receiver<bool>) -> Result<CollectReport> {
        let clients = self.clients().await;

        info!("\n📁 正在提交待处理的文档...");

        let submitter = DocumentSubmitter::new(
            clients.service.clone(),
            self.config.document_prefix.clone(),
            self.config.queries.clone(),
        );
        let job_map =
            workflow::submit_documents(clients.store.as_ref(), &submitter, &self.config).await?;

        if job_map.is_empty() {
            warn!("⚠️ 没有提交任何分析任务，程序结束");
            return Ok(CollectReport::default());
        }

        logging::log_jobs_submitted(job_map.len(), &self.config);

        let poller = JobPoller::new(
            clients.service.clone(),
            PollPolicy {
                interval: self.config.poll_interval(),
                max_attempts: self.config.poll_attempt_limit(),
            },
        );
        let writer = ResultWriter::new(&self.config.results_dir);

        let report = workflow::collect_results(&poller, &job_map, &writer, cancel).await?;

        logging::print_collect_stats(&report);

        Ok(report)
    }

    /// 汇总流水线：只读取已有结果文件
    pub async fn summarize(&self) -> Result<SummaryReport> {
        let input_dir = self.config.summary_input_dir();
        info!("\n📊 正在汇总结果: {}", input_dir.display());

        workflow::summarize_results(&input_dir, &self.config.summary_path).await
    }

    /// 先分析再汇总
    pub async fn run_all(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<(CollectReport, SummaryReport)> {
        let collected = self.analyze(cancel).await?;
        let summary = self.summarize().await?;
        Ok((collected, summary))
    }
}
