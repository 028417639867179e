// sim_bridge/src/error.rs

//! 桥接层的自定义错误处理模块。

use thiserror::Error;

/// 桥接层的统一错误类型。
///
/// 错误派生 `Clone`（载荷均为字符串），以便初始化尝试能以共享
/// future 的形式被多个并发调用方等待。传播策略：
/// - `Load` / `Initialization` 从 `initialize()` 传播给触发方，并使
///   会话状态回退以允许重试；
/// - `Registration` 从 `create_client()` 传播；
/// - 在服务客户端边界，所有错误都被捕获并转换为失败的归一化结果，
///   指令层永远只拿到字符串返回值。
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// 通信库或配置模块获取/解析失败。
    #[error("模块加载失败: {0}")]
    Load(String),

    /// 通信服务或服务管理器启动失败。
    #[error("通信会话初始化失败: {0}")]
    Initialization(String),

    /// 协议客户端的注册握手未完成。
    #[error("服务客户端注册失败: {0}")]
    Registration(String),

    /// 远程调用没有得到可用响应或在执行中出错。
    #[error("远程调用失败: {0}")]
    Call(String),
}
