//! 指标描述
//!
//! 规则引擎通过 metrics crate 记录指标。这里只注册指标描述，
//! 由宿主进程决定安装哪种 recorder；未安装时所有指标调用都是空操作。

/// 注册规则引擎指标的描述
pub fn describe_metrics() {
    metrics::describe_counter!(
        "rule_evaluations_total",
        "Total number of rule evaluations, labelled by outcome"
    );
    metrics::describe_counter!(
        "rule_skips_total",
        "Total number of rules skipped because the run's stop signal was set"
    );
    metrics::describe_counter!(
        "rule_engine_runs_total",
        "Total number of engine runs, labelled by execution mode"
    );
    metrics::describe_histogram!(
        "rule_engine_run_duration_seconds",
        metrics::Unit::Seconds,
        "Rule engine run duration in seconds"
    );
}
