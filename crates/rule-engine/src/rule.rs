//! 规则与组合子
//!
//! 规则是不可变的求值单元：谓词 + 名称 + 消息格式化 + 失败即停止标志。
//! AND / OR / NOT 组合子生成派生规则，派生规则通过引用计数共享操作数，不复制任何状态。

use crate::args::RuleArgs;
use std::fmt;
use std::sync::Arc;

/// 规则谓词
pub type Predicate<T> = dyn Fn(&T, &RuleArgs) -> bool + Send + Sync;

/// 自定义消息格式化函数
pub type MessageFormatter = dyn Fn(bool, &RuleArgs) -> String + Send + Sync;

/// 规则
///
/// 克隆只复制名称和标志，规则树本身是共享的。
pub struct Rule<T> {
    name: String,
    stop_on_failure: bool,
    node: Arc<RuleNode<T>>,
}

/// 规则节点（叶子或逻辑组合）
pub enum RuleNode<T> {
    Leaf(LeafRule<T>),
    And(Rule<T>, Rule<T>),
    Or(Rule<T>, Rule<T>),
    Not(Rule<T>),
}

/// 叶子规则
pub struct LeafRule<T> {
    predicate: Box<Predicate<T>>,
    message: MessageTemplate,
}

enum MessageTemplate {
    /// 渲染为 "<description> : <passed>"
    Description(String),
    Custom(Box<MessageFormatter>),
}

impl<T> LeafRule<T> {
    /// 规则描述（使用自定义格式化函数时为 None）
    pub fn description(&self) -> Option<&str> {
        match &self.message {
            MessageTemplate::Description(desc) => Some(desc),
            MessageTemplate::Custom(_) => None,
        }
    }

    fn format(&self, passed: bool, args: &RuleArgs) -> String {
        match &self.message {
            MessageTemplate::Description(desc) => format!("{} : {}", desc, passed),
            MessageTemplate::Custom(formatter) => formatter(passed, args),
        }
    }
}

/// 规则评估结论：结果以及按各操作数自身结果渲染的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub message: String,
}

impl<T> Rule<T> {
    /// 创建叶子规则，消息格式为 "<description> : <passed>"
    ///
    /// 不校验名称，同一引擎中的重名规则会互相覆盖结果。
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        stop_on_failure: bool,
        predicate: F,
    ) -> Self
    where
        F: Fn(&T, &RuleArgs) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            stop_on_failure,
            node: Arc::new(RuleNode::Leaf(LeafRule {
                predicate: Box::new(predicate),
                message: MessageTemplate::Description(description.into()),
            })),
        }
    }

    /// 创建使用自定义消息格式化函数的叶子规则
    pub fn with_formatter<F, M>(
        name: impl Into<String>,
        stop_on_failure: bool,
        predicate: F,
        formatter: M,
    ) -> Self
    where
        F: Fn(&T, &RuleArgs) -> bool + Send + Sync + 'static,
        M: Fn(bool, &RuleArgs) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            stop_on_failure,
            node: Arc::new(RuleNode::Leaf(LeafRule {
                predicate: Box::new(predicate),
                message: MessageTemplate::Custom(Box::new(formatter)),
            })),
        }
    }

    fn derived(name: String, node: RuleNode<T>) -> Self {
        Self {
            name,
            stop_on_failure: false,
            node: Arc::new(node),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }

    pub fn node(&self) -> &RuleNode<T> {
        &self.node
    }

    /// 返回改名后的副本（共享同一规则树）
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// 返回修改了失败即停止标志的副本
    pub fn with_stop_on_failure(&self, stop_on_failure: bool) -> Self {
        Self {
            stop_on_failure,
            ..self.clone()
        }
    }

    /// AND 组合：两个操作数都会被求值
    pub fn and(&self, other: &Rule<T>) -> Rule<T> {
        Self::derived(
            format!("{} and {}", self.name, other.name),
            RuleNode::And(self.clone(), other.clone()),
        )
    }

    /// OR 组合：两个操作数都会被求值
    pub fn or(&self, other: &Rule<T>) -> Rule<T> {
        Self::derived(
            format!("{} OR {}", self.name, other.name),
            RuleNode::Or(self.clone(), other.clone()),
        )
    }

    pub fn negate(&self) -> Rule<T> {
        Self::derived(format!("!{}", self.name), RuleNode::Not(self.clone()))
    }

    /// 评估规则
    pub fn evaluate(&self, input: &T, args: &RuleArgs) -> bool {
        match self.node() {
            RuleNode::Leaf(leaf) => (leaf.predicate)(input, args),
            RuleNode::And(left, right) => {
                let left_passed = left.evaluate(input, args);
                let right_passed = right.evaluate(input, args);
                left_passed && right_passed
            }
            RuleNode::Or(left, right) => {
                let left_passed = left.evaluate(input, args);
                let right_passed = right.evaluate(input, args);
                left_passed || right_passed
            }
            RuleNode::Not(inner) => !inner.evaluate(input, args),
        }
    }

    pub fn message(&self, passed: bool) -> String {
        self.message_with_args(passed, &RuleArgs::default())
    }

    /// 渲染结果消息
    ///
    /// AND / OR 使用同一个 `passed` 重新渲染两个操作数的消息，而不是各自的实际结果，
    /// 因此 AND 失败时两侧都显示为失败形式。需要按实际结果渲染时使用 [`Rule::verdict`]。
    pub fn message_with_args(&self, passed: bool, args: &RuleArgs) -> String {
        match self.node() {
            RuleNode::Leaf(leaf) => leaf.format(passed, args),
            RuleNode::And(left, right) => format!(
                "{} and {}",
                left.message_with_args(passed, args),
                right.message_with_args(passed, args)
            ),
            RuleNode::Or(left, right) => format!(
                "{} OR {}",
                left.message_with_args(passed, args),
                right.message_with_args(passed, args)
            ),
            RuleNode::Not(inner) => inner.message_with_args(!passed, args),
        }
    }

    /// 评估规则并按每个操作数自身的结果渲染消息
    ///
    /// 每个操作数只求值一次。
    pub fn verdict(&self, input: &T, args: &RuleArgs) -> Verdict {
        match self.node() {
            RuleNode::Leaf(leaf) => {
                let passed = (leaf.predicate)(input, args);
                Verdict {
                    passed,
                    message: leaf.format(passed, args),
                }
            }
            RuleNode::And(left, right) => {
                let left = left.verdict(input, args);
                let right = right.verdict(input, args);
                Verdict {
                    passed: left.passed && right.passed,
                    message: format!("{} and {}", left.message, right.message),
                }
            }
            RuleNode::Or(left, right) => {
                let left = left.verdict(input, args);
                let right = right.verdict(input, args);
                Verdict {
                    passed: left.passed || right.passed,
                    message: format!("{} OR {}", left.message, right.message),
                }
            }
            RuleNode::Not(inner) => {
                let inner = inner.verdict(input, args);
                Verdict {
                    passed: !inner.passed,
                    message: inner.message,
                }
            }
        }
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            stop_on_failure: self.stop_on_failure,
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.node() {
            RuleNode::Leaf(_) => "leaf",
            RuleNode::And(..) => "and",
            RuleNode::Or(..) => "or",
            RuleNode::Not(_) => "not",
        };
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("stop_on_failure", &self.stop_on_failure)
            .finish()
    }
}
