//! 规则引擎领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// 默认并行 worker 数量
pub const DEFAULT_PARALLEL_WORKERS: usize = 3;

/// 执行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// 单 worker，严格按声明顺序逐条执行
    #[default]
    Sequential,
    /// 固定大小的 worker 池，规则可以并发执行、以任意顺序完成
    Parallel { workers: usize },
}

impl ExecutionMode {
    pub fn worker_count(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel { workers } => *workers,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel { .. })
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel { workers } => write!(f, "parallel({})", workers),
        }
    }
}

/// 派生规则的消息渲染方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageMode {
    /// 用组合结果重新渲染所有操作数的消息（与既有消息文本逐字节兼容）
    #[default]
    Combined,
    /// 每个操作数按自身的实际结果渲染
    PerOperand,
}

/// 结果收集策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    /// 只记录失败（及评估出错）的规则
    Failures,
    /// 记录所有实际执行过的规则
    All,
}

/// 单条规则的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed(String),
    Failed(String),
    /// 谓词或消息格式化发生 panic
    Errored(String),
}

impl RuleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed(_) => "passed",
            Self::Failed(_) => "failed",
            Self::Errored(_) => "errored",
        }
    }

    /// 评估出错同样视为失败
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Passed(_))
    }
}

/// 单次运行报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// 规则名称 -> 结果消息
    pub results: HashMap<String, String>,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    /// 因停止信号而未执行的规则数
    pub skipped: usize,
    /// 本次运行是否触发了停止信号
    pub stopped: bool,
    pub elapsed_ms: i64,
}

impl RunReport {
    /// 实际执行过的规则数
    pub fn evaluated(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    pub fn has_failures(&self) -> bool {
        self.failed + self.errored > 0
    }
}
