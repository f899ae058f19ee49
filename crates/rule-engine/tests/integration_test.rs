//! 规则引擎集成测试
//!
//! 测试完整的规则构建、组合、投递与结果收集工作流。

use rule_engine::cli::catalog::{contains, demo_rules, min_length};
use rule_engine::{Collect, MessageMode, Rule, RuleArgs, RuleEngine};
use rule_engine_shared::observability::init_for_tests;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 创建装载了全部示例规则的顺序引擎
fn demo_engine() -> RuleEngine<String> {
    init_for_tests();
    let mut engine = RuleEngine::sequential().unwrap();
    for rule in demo_rules() {
        engine.add_rule(rule);
    }
    engine
}

fn no_args() -> RuleArgs {
    RuleArgs::default()
}

/// 带执行计数器的规则，计数器只用于测试观察规则是否被执行
fn counted(name: &str, passes: bool, stop_on_failure: bool, counter: &Arc<AtomicUsize>) -> Rule<String> {
    let counter = Arc::clone(counter);
    Rule::new(name, format!("{} check", name), stop_on_failure, move |_: &String, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        passes
    })
}

// ==================== 示例规则场景 ====================

#[test]
fn test_all_rules_pass() {
    let engine = demo_engine();

    let failures = engine
        .run_collecting_failures(&"Business global 911".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 0);
}

#[test]
fn test_all_rules_fail_without_stop() {
    let mut engine = demo_engine();
    engine.set_stop_on_any_failure(false);

    let failures = engine
        .run_collecting_failures(&"TEST".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 4);
    assert_eq!(failures["CheckRule1"], "Input must be longer than 5 characters : false");
    assert_eq!(failures["CheckRule2"], "Input must contain Business : false");
    assert_eq!(failures["CheckRule3"], "Input must contain global : false");
    assert_eq!(failures["CheckRule4"], "Input must contain 911 : false");
}

#[test]
fn test_length_passes_others_fail() {
    let engine = demo_engine();

    let failures = engine
        .run_collecting_failures(&"TEST_RULES".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 3);
    assert!(!failures.contains_key("CheckRule1"));
    assert_eq!(failures["CheckRule2"], "Input must contain Business : false");
    assert_eq!(failures["CheckRule3"], "Input must contain global : false");
    assert_eq!(failures["CheckRule4"], "Input must contain 911 : false");
}

#[test]
fn test_stop_on_any_failure_halts_after_first_failure() {
    let mut engine = demo_engine();
    engine.set_stop_on_any_failure(true);

    let report = engine
        .run(&"TEST_RULES".to_string(), &no_args(), Collect::Failures)
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results["CheckRule2"], "Input must contain Business : false");
    assert_eq!(report.passed, 1);
    assert_eq!(report.skipped, 2);
    assert!(report.stopped);
}

#[test]
fn test_collect_all_reports_passing_rules() {
    let engine = demo_engine();

    let all = engine
        .run_collecting_all(&"TEST_RULES".to_string(), &no_args())
        .unwrap();

    assert_eq!(all.len(), 4);
    assert_eq!(all["CheckRule1"], "Input must be longer than 5 characters : true");
    assert_eq!(all["CheckRule4"], "Input must contain 911 : false");
}

#[test]
fn test_collect_failures_is_failed_subset_of_collect_all() {
    let engine = demo_engine();

    for input in ["", "TEST", "TEST_RULES", "Business", "global 911 Business", "911"] {
        let input = input.to_string();
        let all = engine.run_collecting_all(&input, &no_args()).unwrap();
        let failures = engine.run_collecting_failures(&input, &no_args()).unwrap();

        let failed_in_all: HashMap<String, String> = all
            .into_iter()
            .filter(|(_, message)| message.ends_with(": false"))
            .collect();
        assert_eq!(failed_in_all, failures, "input {:?}", input);
    }
}

// ==================== 单规则性质 ====================

#[test]
fn test_single_passing_rule_yields_empty_mapping() {
    init_for_tests();
    let mut engine = RuleEngine::sequential().unwrap();
    engine.add_rule(min_length());

    let failures = engine
        .run_collecting_failures(&"long enough".to_string(), &no_args())
        .unwrap();

    assert!(failures.is_empty());
}

#[test]
fn test_single_failing_rule_yields_its_failure_message() {
    init_for_tests();
    let rule = min_length();
    let mut engine = RuleEngine::sequential().unwrap();
    engine.add_rule(rule.clone());

    let failures = engine
        .run_collecting_failures(&"tiny".to_string(), &no_args())
        .unwrap();

    let expected = HashMap::from([(rule.name().to_string(), rule.message(false))]);
    assert_eq!(failures, expected);
}

// ==================== 组合规则 ====================

#[test]
fn test_and_compound_passes() {
    let mut engine = RuleEngine::parallel(3).unwrap();
    engine.add_rule(min_length().and(&contains("CheckRule2", "Business")));

    let failures = engine
        .run_collecting_failures(&"This store has Business".to_string(), &no_args())
        .unwrap();

    assert!(failures.is_empty());
    engine.shutdown();
}

#[test]
fn test_and_compound_fails_with_combined_message() {
    let mut engine = RuleEngine::parallel(3).unwrap();
    engine.add_rule(min_length().and(&contains("CheckRule2", "Business")));

    let failures = engine
        .run_collecting_failures(&"This store has Speedways".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 1);
    let message = failures.values().next().unwrap();
    assert!(message.contains(
        "Input must be longer than 5 characters : false and Input must contain Business : false"
    ));
    engine.shutdown();
}

#[test]
fn test_or_compound_passes_when_either_side_passes() {
    let mut engine = RuleEngine::parallel(3).unwrap();
    engine
        .add_rule(min_length().or(&contains("CheckRule2", "Business")))
        .add_rule(contains("CheckRule2", "Business").or(&contains("CheckRule3", "global")));

    let failures = engine
        .run_collecting_failures(&"This store is global".to_string(), &no_args())
        .unwrap();

    assert!(failures.is_empty());
    engine.shutdown();
}

#[test]
fn test_or_compound_fails_when_both_fail() {
    let mut engine = RuleEngine::parallel(3).unwrap();
    engine.add_rule(contains("CheckRule2", "Business").or(&contains("CheckRule3", "global")));

    let failures = engine
        .run_collecting_failures(&"This store has Fuels".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures["CheckRule2 OR CheckRule3"],
        "Input must contain Business : false OR Input must contain global : false"
    );
    engine.shutdown();
}

#[test]
fn test_negated_rule_passes_when_inner_fails() {
    let mut engine = RuleEngine::sequential().unwrap();
    engine.add_rule(contains("CheckRule2", "Business").negate());

    let failures = engine
        .run_collecting_failures(&"This store has Fuels".to_string(), &no_args())
        .unwrap();
    assert!(failures.is_empty());

    let failures = engine
        .run_collecting_failures(&"Business".to_string(), &no_args())
        .unwrap();
    assert_eq!(failures["!CheckRule2"], "Input must contain Business : true");
}

#[test]
fn test_per_operand_messages_through_engine() {
    let mut engine = RuleEngine::sequential().unwrap();
    engine
        .add_rule(min_length().and(&contains("CheckRule2", "Business")).renamed("LongBusiness"))
        .set_message_mode(MessageMode::PerOperand);

    let failures = engine
        .run_collecting_failures(&"This store has Speedways".to_string(), &no_args())
        .unwrap();

    assert_eq!(
        failures["LongBusiness"],
        "Input must be longer than 5 characters : true and Input must contain Business : false"
    );
}

// ==================== 停止语义 ====================

#[test]
fn test_engine_level_stop_sequential_never_runs_later_rules() {
    init_for_tests();
    let counter = Arc::new(AtomicUsize::new(0));
    let r3_counter = Arc::new(AtomicUsize::new(0));
    let mut engine = RuleEngine::sequential().unwrap();
    engine
        .add_rule(counted("R1", true, false, &counter))
        .add_rule(counted("R2", false, false, &counter))
        .add_rule(counted("R3", true, false, &r3_counter))
        .set_stop_on_any_failure(true);

    let failures = engine
        .run_collecting_failures(&"input".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures, HashMap::from([("R2".to_string(), "R2 check : false".to_string())]));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(r3_counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rule_level_stop_without_engine_flag() {
    let later = Arc::new(AtomicUsize::new(0));
    let first = Arc::new(AtomicUsize::new(0));
    let mut engine = RuleEngine::sequential().unwrap();
    engine
        .add_rule(counted("Gate", false, true, &first))
        .add_rule(counted("After1", false, false, &later))
        .add_rule(counted("After2", true, false, &later));
    assert!(!engine.stop_on_any_failure());

    let report = engine
        .run(&"input".to_string(), &no_args(), Collect::All)
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.results.contains_key("Gate"));
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(report.skipped, 2);
}

#[test]
fn test_failure_without_any_stop_flag_continues() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut engine = RuleEngine::sequential().unwrap();
    engine
        .add_rule(counted("R1", false, false, &counter))
        .add_rule(counted("R2", false, false, &counter))
        .add_rule(counted("R3", false, false, &counter));

    let failures = engine
        .run_collecting_failures(&"input".to_string(), &no_args())
        .unwrap();

    assert_eq!(failures.len(), 3);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_engine_is_reusable_after_stopped_run() {
    let mut engine = demo_engine();
    engine.set_stop_on_any_failure(true);

    let stopped = engine
        .run_collecting_failures(&"TEST".to_string(), &no_args())
        .unwrap();
    assert_eq!(stopped.len(), 1);

    let passing = engine
        .run_collecting_all(&"Business global 911".to_string(), &no_args())
        .unwrap();
    assert_eq!(passing.len(), 4);
}

// ==================== 附加参数 ====================

#[test]
fn test_args_forwarded_to_predicates_and_formatters() {
    let mut engine: RuleEngine<String> = RuleEngine::sequential().unwrap();
    engine.add_rule(Rule::with_formatter(
        "ContainsArg",
        false,
        |input: &String, args: &RuleArgs| {
            args.iter()
                .filter_map(|v| v.as_str())
                .all(|needle| input.contains(needle))
        },
        |passed, args: &RuleArgs| format!("Input must contain {} args : {}", args.len(), passed),
    ));

    let args = RuleArgs::new().with("Business").with("911");
    let all = engine
        .run_collecting_all(&"Business global 911".to_string(), &args)
        .unwrap();
    assert_eq!(all["ContainsArg"], "Input must contain 2 args : true");

    let args = args.with("missing");
    let failures = engine
        .run_collecting_failures(&"Business global 911".to_string(), &args)
        .unwrap();
    assert_eq!(failures["ContainsArg"], "Input must contain 3 args : false");
}
