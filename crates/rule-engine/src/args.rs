//! 规则附加参数
//!
//! 运行时传入的附加参数按原样透传给每个谓词和消息格式化函数，引擎本身不做任何检查。

use serde_json::Value;

/// 有序、弱类型的附加参数列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleArgs {
    values: Vec<Value>,
}

impl RuleArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// 追加一个参数（链式调用）
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// 按位置获取参数
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// 按位置获取字符串参数
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    /// 按位置获取数值参数（整数和浮点数统一转为 f64）
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for RuleArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

impl FromIterator<Value> for RuleArgs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
