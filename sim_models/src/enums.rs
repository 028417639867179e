//! 通用枚举模块。
//!
//! 本模块定义了桥接层多个组件之间共享的固定枚举类型，
//! 以保证对系统控制操作等概念在整个系统中有一致的、类型安全的表示。
//!
//! 所有在此模块中定义的枚举都应派生 `Serialize`, `Deserialize`, `Debug`,
//! `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`，以支持数据交换、调试、
//! 比较和集合操作。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 系统控制服务的操作码。
///
/// 仿真端的系统控制服务只接受这三种操作，客户端按名称从该固定枚举中
/// 选取操作码并放入 `PduRequest::SystemControl` 请求。
/// 枚举成员的序列化形式为其名称字符串（例如 `"Activate"`），
/// 具体的线上编码由外部通信库负责，本层不关心。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemControlOpCode {
    /// 激活仿真环境（使其进入可开始状态）。
    Activate,
    /// 开始仿真推进。
    Start,
    /// 终止仿真并释放远端资源。
    Terminate,
}

// 为 SystemControlOpCode 实现 Display trait，日志中直接打印成员名称。
impl fmt::Display for SystemControlOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 使用 Debug 格式化，它已经为我们生成了枚举成员的名称字符串
        write!(f, "{:?}", self)
    }
}
