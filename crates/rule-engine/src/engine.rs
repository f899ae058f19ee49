//! 规则引擎
//!
//! 每条规则作为一个任务按声明顺序投递到引擎的 worker 池中执行，全部完成后汇总结果。
//!
//! 停止信号只在任务开始时检查：
//! - 顺序模式下，第 k+1 条规则在第 k 条执行完毕后才开始，触发停止后不会再执行任何规则；
//! - 并行模式下，已经越过检查点的任务会继续执行并写入结果，额外执行哪些规则取决于线程调度。

use crate::args::RuleArgs;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{Collect, ExecutionMode, MessageMode, RuleOutcome, RunReport};
use crate::rule::{Rule, Verdict};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// 规则引擎
pub struct RuleEngine<T> {
    rules: Vec<Rule<T>>,
    stop_on_any_failure: bool,
    message_mode: MessageMode,
    mode: ExecutionMode,
    /// 关闭后为 None；运行中持有自己的引用，关闭不会等待
    pool: RwLock<Option<Arc<ThreadPool>>>,
}

/// 单次运行的共享状态，每次运行重新创建
#[derive(Default)]
struct RunState {
    stop: AtomicBool,
    results: DashMap<String, String>,
    passed: AtomicUsize,
    failed: AtomicUsize,
    errored: AtomicUsize,
    skipped: AtomicUsize,
}

impl<T> RuleEngine<T> {
    /// 按指定模式创建引擎，worker 池在此时创建
    pub fn new(mode: ExecutionMode) -> Result<Self> {
        let workers = mode.worker_count();
        if workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker 数量必须大于 0".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("rule-engine-{}", i))
            .build()?;

        debug!(%mode, "Rule engine worker pool created");

        Ok(Self {
            rules: Vec::new(),
            stop_on_any_failure: false,
            message_mode: MessageMode::default(),
            mode,
            pool: RwLock::new(Some(Arc::new(pool))),
        })
    }

    /// 创建顺序执行的引擎
    pub fn sequential() -> Result<Self> {
        Self::new(ExecutionMode::Sequential)
    }

    /// 创建并行执行的引擎
    pub fn parallel(workers: usize) -> Result<Self> {
        Self::new(ExecutionMode::Parallel { workers })
    }

    /// 从配置创建引擎
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut engine = Self::new(config.execution_mode())?;
        engine
            .set_stop_on_any_failure(config.stop_on_any_failure)
            .set_message_mode(config.message_mode);
        Ok(engine)
    }

    /// 添加规则，规则按添加顺序投递
    pub fn add_rule(&mut self, rule: Rule<T>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// 任意规则失败时停止尚未开始的规则
    pub fn set_stop_on_any_failure(&mut self, stop_on_any_failure: bool) -> &mut Self {
        self.stop_on_any_failure = stop_on_any_failure;
        self
    }

    pub fn set_message_mode(&mut self, message_mode: MessageMode) -> &mut Self {
        self.message_mode = message_mode;
        self
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn stop_on_any_failure(&self) -> bool {
        self.stop_on_any_failure
    }

    pub fn message_mode(&self) -> MessageMode {
        self.message_mode
    }

    pub fn is_closed(&self) -> bool {
        self.pool.read().is_none()
    }

    /// 释放 worker 池
    ///
    /// 可重复调用，不阻塞：正在进行的运行使用各自持有的 worker 池引用执行完毕，
    /// 最后一个引用释放时 worker 线程退出。关闭后新的运行调用返回 [`EngineError::Closed`]。
    /// 可以在规则内部调用。
    pub fn shutdown(&self) {
        let pool = self.pool.write().take();
        match pool {
            Some(_) => info!(mode = %self.mode, "Rule engine shut down"),
            None => debug!("Rule engine already shut down"),
        }
    }
}

impl<T: Sync> RuleEngine<T> {
    /// 运行所有规则，只返回失败的规则：规则名称 -> 失败消息
    pub fn run_collecting_failures(
        &self,
        input: &T,
        args: &RuleArgs,
    ) -> Result<HashMap<String, String>> {
        Ok(self.run(input, args, Collect::Failures)?.results)
    }

    /// 运行所有规则，返回每条实际执行过的规则：规则名称 -> 结果消息
    pub fn run_collecting_all(
        &self,
        input: &T,
        args: &RuleArgs,
    ) -> Result<HashMap<String, String>> {
        Ok(self.run(input, args, Collect::All)?.results)
    }

    /// 运行所有规则并返回完整的运行报告
    pub fn run(&self, input: &T, args: &RuleArgs, collect: Collect) -> Result<RunReport> {
        // 只在取引用时持锁，分发期间不持锁
        let pool = self.pool.read().clone().ok_or(EngineError::Closed)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let span = info_span!(
            "rule_engine_run",
            %run_id,
            rules = self.rules.len(),
            mode = %self.mode
        );
        let state = RunState::default();

        // FIFO 投递：单线程池中任务严格按声明顺序逐个执行
        pool.scope_fifo(|scope| {
            for rule in &self.rules {
                let (span, state) = (&span, &state);
                scope.spawn_fifo(move |_| {
                    span.in_scope(|| self.execute_rule(rule, input, args, collect, state))
                });
            }
        });
        drop(pool);

        let elapsed = start.elapsed();
        let report = RunReport {
            run_id,
            started_at,
            results: state.results.into_iter().collect(),
            passed: state.passed.into_inner(),
            failed: state.failed.into_inner(),
            errored: state.errored.into_inner(),
            skipped: state.skipped.into_inner(),
            stopped: state.stop.into_inner(),
            elapsed_ms: elapsed.as_millis() as i64,
        };

        metrics::counter!("rule_engine_runs_total", "mode" => self.mode_label()).increment(1);
        metrics::histogram!("rule_engine_run_duration_seconds").record(elapsed.as_secs_f64());

        span.in_scope(|| {
            info!(
                evaluated = report.evaluated(),
                failed = report.failed,
                errored = report.errored,
                skipped = report.skipped,
                stopped = report.stopped,
                "RuleEngine run completed"
            );
            for (rule, message) in &report.results {
                debug!(%rule, "{}", message);
            }
        });

        Ok(report)
    }

    fn execute_rule(
        &self,
        rule: &Rule<T>,
        input: &T,
        args: &RuleArgs,
        collect: Collect,
        state: &RunState,
    ) {
        let name = rule.name();

        if state.stop.load(Ordering::Acquire) {
            state.skipped.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("rule_skips_total").increment(1);
            info!(rule = %name, "Skipping rule due to stop flag");
            return;
        }

        debug!(rule = %name, "Evaluating rule");
        let outcome = self.evaluate_rule(rule, input, args);
        metrics::counter!("rule_evaluations_total", "outcome" => outcome.label()).increment(1);
        let failed = outcome.is_failure();

        match outcome {
            RuleOutcome::Passed(message) => {
                state.passed.fetch_add(1, Ordering::Relaxed);
                debug!(rule = %name, %message, "Rule passed");
                if collect == Collect::All {
                    state.results.insert(name.to_string(), message);
                }
            }
            RuleOutcome::Failed(message) => {
                state.failed.fetch_add(1, Ordering::Relaxed);
                warn!(rule = %name, %message, "Rule failed");
                state.results.insert(name.to_string(), message);
            }
            RuleOutcome::Errored(detail) => {
                state.errored.fetch_add(1, Ordering::Relaxed);
                error!(rule = %name, error = %detail, "Rule evaluation panicked");
                state
                    .results
                    .insert(name.to_string(), format!("evaluation error: {}", detail));
            }
        }

        if failed {
            self.request_stop(rule, state);
        }
    }

    /// 评估单条规则，谓词和消息格式化中的 panic 被捕获为评估错误
    fn evaluate_rule(&self, rule: &Rule<T>, input: &T, args: &RuleArgs) -> RuleOutcome {
        let evaluation = panic::catch_unwind(AssertUnwindSafe(|| match self.message_mode {
            MessageMode::Combined => {
                let passed = rule.evaluate(input, args);
                Verdict {
                    passed,
                    message: rule.message_with_args(passed, args),
                }
            }
            MessageMode::PerOperand => rule.verdict(input, args),
        }));

        match evaluation {
            Ok(verdict) if verdict.passed => RuleOutcome::Passed(verdict.message),
            Ok(verdict) => RuleOutcome::Failed(verdict.message),
            Err(payload) => RuleOutcome::Errored(panic_message(payload.as_ref())),
        }
    }

    fn request_stop(&self, rule: &Rule<T>, state: &RunState) {
        if !(rule.stop_on_failure() || self.stop_on_any_failure) {
            return;
        }
        if !state.stop.swap(true, Ordering::AcqRel) {
            warn!(rule = %rule.name(), "Execution stopped due to failure in rule");
        }
    }

    fn mode_label(&self) -> &'static str {
        if self.mode.is_parallel() {
            "parallel"
        } else {
            "sequential"
        }
    }
}

impl<T> std::fmt::Debug for RuleEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rules)
            .field("stop_on_any_failure", &self.stop_on_any_failure)
            .field("message_mode", &self.message_mode)
            .field("mode", &self.mode)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
