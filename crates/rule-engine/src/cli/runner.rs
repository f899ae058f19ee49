//! 命令执行器
//!
//! 将命令行参数与配置合并为引擎配置，执行示例规则并输出结果。

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use super::catalog;
use crate::args::RuleArgs;
use crate::config::EngineConfig;
use crate::engine::RuleEngine;
use crate::models::{Collect, MessageMode, RunReport};
use crate::rule::{Rule, RuleNode};

/// check 命令的选项
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub all: bool,
    pub parallel: bool,
    pub workers: Option<usize>,
    pub stop_on_any_failure: bool,
    pub per_operand_messages: bool,
    pub args: Vec<String>,
}

/// 命令执行器
///
/// 持有从配置文件加载的引擎配置，命令行参数在其基础上覆盖。
pub struct CommandRunner {
    engine_config: EngineConfig,
}

impl CommandRunner {
    pub fn new(engine_config: EngineConfig) -> Self {
        Self { engine_config }
    }

    /// 合并命令行选项后的引擎配置
    pub fn effective_config(&self, options: &CheckOptions) -> EngineConfig {
        let mut config = self.engine_config.clone();
        if options.parallel {
            config.parallel = true;
        }
        if let Some(workers) = options.workers {
            config.worker_threads = workers;
        }
        if options.stop_on_any_failure {
            config.stop_on_any_failure = true;
        }
        if options.per_operand_messages {
            config.message_mode = MessageMode::PerOperand;
        }
        config
    }

    /// 评估输入并返回运行报告
    pub fn check(&self, input: &str, options: &CheckOptions) -> Result<RunReport> {
        let config = self.effective_config(options);
        let mut engine = RuleEngine::from_config(&config).context("创建规则引擎失败")?;
        for rule in catalog::demo_rules() {
            engine.add_rule(rule);
        }

        let args = parse_args(&options.args);
        let collect = if options.all {
            Collect::All
        } else {
            Collect::Failures
        };

        info!(input, mode = %engine.mode(), "Running demo rules");
        let report = engine.run(&input.to_string(), &args, collect);
        engine.shutdown();

        Ok(report?)
    }

    /// 执行 check 命令，返回进程退出码
    pub fn run_check(&self, input: &str, options: &CheckOptions) -> Result<i32> {
        let report = self.check(input, options)?;

        let sorted: BTreeMap<&String, &String> = report.results.iter().collect();
        println!("{}", serde_json::to_string_pretty(&sorted)?);

        let code = if !options.all && report.has_failures() {
            1
        } else {
            0
        };
        Ok(code)
    }

    /// 执行 rules 命令
    pub fn run_rules(&self) -> Result<()> {
        for rule in catalog::demo_rules() {
            println!("{:<12} {}", rule.name(), describe(&rule));
        }
        Ok(())
    }
}

/// 规则的描述文本，组合规则按逻辑结构展开
pub fn describe(rule: &Rule<String>) -> String {
    match rule.node() {
        RuleNode::Leaf(leaf) => leaf
            .description()
            .map(str::to_string)
            .unwrap_or_else(|| "<custom message>".to_string()),
        RuleNode::And(left, right) => format!("({} and {})", describe(left), describe(right)),
        RuleNode::Or(left, right) => format!("({} OR {})", describe(left), describe(right)),
        RuleNode::Not(inner) => format!("!{}", describe(inner)),
    }
}

/// 解析附加参数：合法 JSON 按 JSON 解析，否则作为字符串
pub fn parse_args(raw: &[String]) -> RuleArgs {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_args() {
        let args = parse_args(&["10".to_string(), "plain".to_string(), "{\"a\":1}".to_string()]);

        assert_eq!(args.get(0), Some(&json!(10)));
        assert_eq!(args.get(1), Some(&json!("plain")));
        assert_eq!(args.get(2), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_describe_uses_rule_descriptions() {
        let length = catalog::min_length();
        assert_eq!(describe(&length), "Input must be longer than 5 characters");

        let compound = length.and(&catalog::contains("CheckRule2", "Business").negate());
        assert_eq!(
            describe(&compound),
            "(Input must be longer than 5 characters and !Input must contain Business)"
        );

        let custom = Rule::with_formatter("Custom", false, |_: &String, _| true, |_, _| String::new());
        assert_eq!(describe(&custom), "<custom message>");
    }

    #[test]
    fn test_cli_options_override_config() {
        let runner = CommandRunner::new(EngineConfig::default());
        let options = CheckOptions {
            parallel: true,
            workers: Some(5),
            per_operand_messages: true,
            ..Default::default()
        };

        let config = runner.effective_config(&options);

        assert!(config.parallel);
        assert_eq!(config.worker_threads, 5);
        assert!(!config.stop_on_any_failure);
        assert_eq!(config.message_mode, MessageMode::PerOperand);
    }

    #[test]
    fn test_check_reports_failures() {
        let runner = CommandRunner::new(EngineConfig::default());

        let report = runner.check("TEST_RULES", &CheckOptions::default()).unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(report.has_failures());
        assert_eq!(runner.run_check("Business global 911", &CheckOptions::default()).unwrap(), 0);
        assert_eq!(runner.run_check("TEST", &CheckOptions::default()).unwrap(), 1);
    }
}
