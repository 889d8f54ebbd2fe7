use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::{default_queries, QueryDefinition};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 程序配置文件
///
/// 优先级：环境变量 > TOML 配置文件 > 默认值
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 源文档所在 bucket
    pub bucket_name: String,
    /// 源文档 key 前缀（同时也是前缀占位对象的 key）
    pub document_prefix: String,
    /// 列举对象时使用的分隔符
    pub delimiter: String,
    /// 单次最多提交的分析任务数
    pub max_requests: usize,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 单个任务最多轮询次数，0 表示不限制
    pub max_poll_attempts: u32,
    /// 单文档结果文件根目录
    pub results_dir: PathBuf,
    /// 汇总文件路径
    pub summary_path: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 随每个文档提交的问题
    pub queries: Vec<QueryDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_name: "textract-console-us-east-2-a88e6f2e-e02e-4010-b10e-a2b83471239d"
                .to_string(),
            document_prefix: "documents/".to_string(),
            delimiter: "/".to_string(),
            max_requests: 10,
            poll_interval_secs: 5,
            max_poll_attempts: 720,
            results_dir: PathBuf::from("output/results"),
            summary_path: PathBuf::from("output/summary.json"),
            verbose_logging: false,
            queries: default_queries(),
        }
    }
}

impl Config {
    /// 加载配置：可选的 TOML 文件，再叠加环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只使用默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::load(None)
    }

    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            bucket_name: env_string("BUCKET_NAME").unwrap_or(self.bucket_name),
            document_prefix: env_string("DOCUMENT_PREFIX").unwrap_or(self.document_prefix),
            delimiter: env_string("LIST_DELIMITER").unwrap_or(self.delimiter),
            max_requests: env_parse("MAX_REQUESTS", "usize")?.unwrap_or(self.max_requests),
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", "u64")?
                .unwrap_or(self.poll_interval_secs),
            max_poll_attempts: env_parse("MAX_POLL_ATTEMPTS", "u32")?
                .unwrap_or(self.max_poll_attempts),
            results_dir: env_string("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.results_dir),
            summary_path: env_string("SUMMARY_PATH")
                .map(PathBuf::from)
                .unwrap_or(self.summary_path),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            queries: self.queries,
        })
    }

    fn validate(&self) -> AppResult<()> {
        if self.document_prefix.is_empty() {
            return Err(invalid("document_prefix", "不能为空"));
        }
        if self.queries.is_empty() {
            return Err(invalid("queries", "至少需要一个问题"));
        }
        if self.queries.iter().any(|q| q.text.trim().is_empty()) {
            return Err(invalid("queries", "问题文本不能为空"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// 轮询次数上限，0 视为不限制
    pub fn poll_attempt_limit(&self) -> Option<u32> {
        (self.max_poll_attempts > 0).then_some(self.max_poll_attempts)
    }

    /// 汇总阶段读取的目录：收集阶段按文档 key 写入，key 自带前缀
    pub fn summary_input_dir(&self) -> PathBuf {
        let prefix = self.document_prefix.trim_matches('/');
        if prefix.is_empty() {
            self.results_dir.clone()
        } else {
            self.results_dir.join(prefix)
        }
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
    }
}

fn invalid(field: &str, reason: &str) -> AppError {
    AppError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    })
}
