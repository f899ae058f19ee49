//! 共享库
//!
//! 包含规则引擎二进制、测试和基准测试共用的可观测性基础设施代码。

pub mod observability;
