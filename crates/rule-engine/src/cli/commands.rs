//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

/// 规则引擎命令行工具
#[derive(Parser, Debug)]
#[command(name = "rule-engine")]
#[command(version, about = "并发规则引擎命令行工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 输出 JSON 格式日志
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 用内置示例规则评估输入
    ///
    /// 以 JSON 输出 规则名称 -> 结果消息；存在失败规则时退出码为 1。
    Check {
        /// 待评估的输入字符串
        input: String,

        /// 输出所有执行过的规则（默认只输出失败的规则）
        #[arg(long)]
        all: bool,

        /// 使用并行 worker 池
        #[arg(long)]
        parallel: bool,

        /// 并行 worker 数量
        #[arg(long)]
        workers: Option<usize>,

        /// 任意规则失败时停止尚未开始的规则
        #[arg(long)]
        stop_on_any_failure: bool,

        /// 组合规则按每个操作数自身的结果渲染消息
        #[arg(long)]
        per_operand_messages: bool,

        /// 透传给规则的附加参数（JSON，可重复）
        #[arg(long = "arg", value_name = "JSON")]
        args: Vec<String>,
    },

    /// 列出内置示例规则
    Rules,
}
