//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `check` - 用内置示例规则评估输入字符串
//! - `rules` - 列出内置示例规则
//!
//! # 使用示例
//!
//! ```bash
//! # 只输出失败的规则
//! rule-engine check "Business global 911"
//!
//! # 并行执行、输出全部结果、任意失败即停止
//! rule-engine check TEST --parallel --workers 4 --all --stop-on-any-failure
//! ```

pub mod catalog;
pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
