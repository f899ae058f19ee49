//! 配置管理
//!
//! 引擎配置与可观测性配置统一从配置文件和环境变量加载。

use crate::error::Result;
use crate::models::{DEFAULT_PARALLEL_WORKERS, ExecutionMode, MessageMode};
use config::{Config, Environment, File};
use rule_engine_shared::observability::ObservabilityConfig;
use serde::Deserialize;
use std::path::Path;

/// 环境变量前缀（RULE_ENGINE_ENGINE__WORKER_THREADS -> engine.worker_threads）
pub const ENV_PREFIX: &str = "RULE_ENGINE";

/// 引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 是否使用并行 worker 池
    pub parallel: bool,
    /// 并行模式下的 worker 数量
    pub worker_threads: usize,
    pub stop_on_any_failure: bool,
    pub message_mode: MessageMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            worker_threads: DEFAULT_PARALLEL_WORKERS,
            stop_on_any_failure: false,
            message_mode: MessageMode::Combined,
        }
    }
}

impl EngineConfig {
    pub fn execution_mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Parallel {
                workers: self.worker_threads,
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "rule-engine".to_string(),
            environment: "development".to_string(),
            engine: EngineConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml
    /// 2. config/{environment}.toml
    /// 3. config/{service_name}.toml
    /// 4. 环境变量（RULE_ENGINE_ 前缀，嵌套字段用 `__` 分隔）
    pub fn load(service_name: &str) -> Result<Self> {
        let env =
            std::env::var("RULE_ENGINE_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self> {
        Self::load_with_env(service_name, env, config_dir, env_source())
    }

    fn load_with_env(
        service_name: &str,
        env: &str,
        config_dir: &Path,
        env_source: Environment,
    ) -> Result<Self> {
        let config = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .set_default("observability.service_name", service_name)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(env_source)
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// 环境变量配置源，最后加载，覆盖所有配置文件
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
