//! 并发规则引擎
//!
//! 提供可组合的规则评估能力，支持：
//! - 叶子规则与 AND / OR / NOT 组合
//! - 顺序或固定大小 worker 池的并行执行
//! - 规则级与引擎级的失败即停止
//! - 只收集失败结果或收集全部结果

pub mod args;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rule;

pub use args::RuleArgs;
pub use config::{AppConfig, EngineConfig};
pub use engine::RuleEngine;
pub use error::{EngineError, Result};
pub use models::{
    Collect, DEFAULT_PARALLEL_WORKERS, ExecutionMode, MessageMode, RuleOutcome, RunReport,
};
pub use rule::{LeafRule, MessageFormatter, Predicate, Rule, RuleNode, Verdict};
