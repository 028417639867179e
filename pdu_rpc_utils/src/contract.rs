// pdu_rpc_utils/src/contract.rs

//! 外部 PDU 通信库的协作契约。
//!
//! 本模块把桥接层对外部通信库的全部期望固化为四个 trait：
//! - [`CommunicationService`]: 基于 WebSocket 的底层通信服务句柄，
//!   由协议版本标签构造，对本层不透明。
//! - [`PduServiceManager`]: 服务管理器，负责远端多个命名服务客户端的
//!   注册与生命周期协调，提供服务表初始化与客户端服务启动/停止操作。
//! - [`ProtocolClient`]: 绑定到单个命名远端服务的句柄，提供注册握手
//!   与带超时/轮询策略的调用操作。
//! - [`PduLibrary`]: 已加载的通信库句柄本体，是上述各组件的工厂。
//!
//! 生产环境由宿主把真实通信库绑定到这些 trait；测试与本地联调使用
//! `memory` 模块中的进程内环回实现。

use crate::error::PduError;
use async_trait::async_trait;
use serde_json::Value;
use sim_models::PduRequest;
use std::sync::Arc;

/// `call` 操作中表示"无限等待"的超时标记值（毫秒）。
pub const WAIT_FOREVER_MSEC: i64 = -1;

/// 基于 WebSocket 的通信服务句柄。
///
/// 对本层而言是不透明的：构造后仅被传入服务管理器，
/// 唯一可观测的属性是构造时使用的协议版本标签。
pub trait CommunicationService: Send + Sync {
    /// 构造该服务时使用的协议版本标签（例如 `"v2"`）。
    fn protocol_version(&self) -> &str;
}

/// 服务管理器：协调一条传输之上的多个命名远端服务客户端。
#[async_trait]
pub trait PduServiceManager: Send + Sync {
    /// 按服务配置表初始化远端服务，`delta_time_usec` 为仿真步长（微秒）。
    async fn initialize_services(
        &self,
        service_config_url: &str,
        delta_time_usec: u64,
    ) -> Result<(), PduError>;

    /// 启动客户端服务（开始收发）。
    async fn start_client_service(&self) -> Result<(), PduError>;

    /// 请求停止传输。尽力而为，不报告失败。
    fn stop_service(&self);
}

/// 构造协议客户端所需的标识参数。
#[derive(Debug, Clone)]
pub struct ProtocolClientSpec {
    /// 远端服务标识（例如 `Service/SystemControl`）。
    pub service_name: String,
    /// 注册时上报的客户端名称。
    pub client_name: String,
    /// 请求/响应模式名（srv）。
    pub srv: String,
    /// 模式所在的包命名空间（pkg）。
    pub pkg: String,
}

/// 绑定到单个命名远端服务的协议客户端。
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// 与远端完成注册握手。未完成握手前不允许调用 [`ProtocolClient::call`]。
    async fn register(&self) -> Result<(), PduError>;

    /// 发起一次远程调用。
    ///
    /// `timeout_msec` 为调用超时（毫秒），[`WAIT_FOREVER_MSEC`] 表示无限等待；
    /// `poll_interval_sec` 为响应轮询间隔（秒）。超时与取消由通信库负责，
    /// 本层只传递策略值。返回 `Ok(None)` 表示调用结束但没有可用响应。
    async fn call(
        &self,
        request: PduRequest,
        timeout_msec: i64,
        poll_interval_sec: f64,
    ) -> Result<Option<Value>, PduError>;
}

/// 已加载的通信库句柄：通信服务 / 服务管理器 / 协议客户端的工厂。
#[async_trait]
pub trait PduLibrary: Send + Sync {
    /// 以协议版本标签构造 WebSocket 通信服务。
    fn create_communication_service(
        &self,
        version: &str,
    ) -> Result<Arc<dyn CommunicationService>, PduError>;

    /// 构造服务管理器。
    ///
    /// `asset_name` 为本端资产名，`pdu_config_url` 为 PDU 配置表位置，
    /// `uri` 为远端连接地址。
    fn create_service_manager(
        &self,
        asset_name: &str,
        pdu_config_url: &str,
        comm: Arc<dyn CommunicationService>,
        uri: &str,
    ) -> Result<Arc<dyn PduServiceManager>, PduError>;

    /// 在给定的服务管理器之上构造一个协议客户端（不含注册握手，
    /// 握手由调用方随后通过 [`ProtocolClient::register`] 发起）。
    async fn make_protocol_client(
        &self,
        manager: Arc<dyn PduServiceManager>,
        spec: ProtocolClientSpec,
    ) -> Result<Arc<dyn ProtocolClient>, PduError>;
}
