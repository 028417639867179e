// pdu_rpc_utils/src/error.rs

//! 定义通信契约层相关的错误类型。

use thiserror::Error;

/// 通信契约层的统一错误类型。
#[derive(Error, Debug, Clone)]
pub enum PduError {
    /// 服务管理器初始化远端服务表失败。
    #[error("服务初始化失败: {0}")]
    InitializationFailed(String),

    /// 客户端服务启动失败。
    #[error("客户端服务启动失败: {0}")]
    StartFailed(String),

    /// 协议客户端注册握手未完成。
    #[error("客户端注册失败: {0}")]
    RegistrationFailed(String),

    /// 按服务名查找不到对应的远端服务。
    #[error("未找到服务: {0}")]
    ServiceNotFound(String),

    /// 无效的连接 URI。
    #[error("无效的URI: {0}")]
    InvalidUri(String),

    /// 通用消息错误，用于其他未明确分类的错误。
    #[error("消息错误: {0}")]
    Message(String),
}
