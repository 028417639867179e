//! `pdu_rpc_utils` 是仿真桥接层与外部 PDU 通信库之间的契约 crate。
//!
//! 真正的 PDU 编解码、WebSocket 传输和请求/响应关联都由外部通信库
//! 完成，本层只配置并调用它。本 crate 把这条协作边界固化为一组
//! trait（通信服务、服务管理器、协议客户端、库句柄），并附带一个
//! 进程内环回实现，供本地联调与单元/集成测试在不依赖网络的情况下
//! 走通完整调用链。
//!
//! 主要模块包括：
//! - `contract`: 定义协作契约 trait 与协议客户端构造参数。
//! - `error`: 定义库中使用的统一错误类型 `PduError`。
//! - `memory`: 进程内环回实现（按服务名路由的处理器 + 调用记录）。

pub mod contract;
pub mod error;
pub mod memory;

pub use contract::{
    CommunicationService, PduLibrary, PduServiceManager, ProtocolClient, ProtocolClientSpec,
};
pub use error::PduError;
pub use memory::MemoryPduLibrary;
