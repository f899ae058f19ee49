//! 内置示例规则
//!
//! 供命令行工具、集成测试和基准测试使用的字符串规则集。

use crate::rule::Rule;

/// 输入长度大于 5（按 Unicode 字符计数）
pub fn min_length() -> Rule<String> {
    Rule::new(
        "CheckRule1",
        "Input must be longer than 5 characters",
        false,
        |input: &String, _| input.chars().count() > 5,
    )
}

/// 输入包含指定子串
pub fn contains(name: &str, needle: &str) -> Rule<String> {
    let needle = needle.to_string();
    Rule::new(
        name,
        format!("Input must contain {}", needle),
        false,
        move |input: &String, _| input.contains(needle.as_str()),
    )
}

/// 示例规则集，按声明顺序返回
pub fn demo_rules() -> Vec<Rule<String>> {
    vec![
        min_length(),
        contains("CheckRule2", "Business"),
        contains("CheckRule3", "global"),
        contains("CheckRule4", "911"),
    ]
}
