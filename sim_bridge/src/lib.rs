//! `sim_bridge` 仿真桥接层核心库。
//!
//! 把远端机器人仿真控制服务（激活/开始/终止仿真；无人机离陆、
//! 着陆、移动、相机俯仰、磁铁吸附）以离散命名指令的形式暴露给
//! 积木编程宿主。PDU 编解码、WebSocket 传输与请求/响应关联由
//! 外部通信库完成（契约见 `pdu_rpc_utils`），本层只负责：
//!
//! - `config`: 配置项的分层解析与成套通信配置。
//! - `loader`: 通信库与配置模块的获取与记忆化。
//! - `session`: 唯一共享通信会话的生命周期与协议客户端缓存。
//! - `clients`: 命名服务客户端（系统控制、无人机）。
//! - `commands`: 宿主可见的指令目录与分发。
//! - `error`: 本层的统一错误类型。
//!
//! [`SimBridge`] 是把上述组件装配起来的门面，宿主只需提供一个
//! 模块提供者（以及可选的配置覆盖表）即可得到完整的指令层。

pub mod clients;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod session;

pub use clients::{DroneClient, SystemControlClient};
pub use commands::BridgeCommands;
pub use config::{BridgeSettings, ConfigResolver};
pub use error::BridgeError;
pub use loader::{ModuleLoader, ModuleProvider, StaticModuleProvider};
pub use session::CoreSession;

use log::error;
use std::collections::HashMap;
use std::sync::Arc;

/// 桥接层门面：解析器 → 加载器 → 会话 → 客户端 → 指令层的装配。
pub struct SimBridge {
    session: Arc<CoreSession>,
    commands: BridgeCommands,
}

impl SimBridge {
    /// 以宿主提供的模块提供者与配置覆盖表装配桥接层。
    pub fn new(provider: Arc<dyn ModuleProvider>, overrides: HashMap<String, String>) -> Self {
        Self::with_resolver(provider, ConfigResolver::new(overrides))
    }

    /// 以现成的配置解析器装配（测试中用于指定偏好文件位置）。
    pub fn with_resolver(provider: Arc<dyn ModuleProvider>, resolver: ConfigResolver) -> Self {
        let loader = Arc::new(ModuleLoader::new(provider, resolver));
        let session = Arc::new(CoreSession::new(loader));
        let system = Arc::new(SystemControlClient::new(session.clone()));
        let drone = Arc::new(DroneClient::new(session.clone()));
        Self {
            commands: BridgeCommands::new(system, drone),
            session,
        }
    }

    /// 宿主可见的指令层。
    pub fn commands(&self) -> &BridgeCommands {
        &self.commands
    }

    /// 共享的核心会话。
    pub fn session(&self) -> &Arc<CoreSession> {
        &self.session
    }

    /// 在后台发起初始化（注册桥接层时的预热，不等待结果）。
    ///
    /// 失败只记录日志——指令执行时仍会各自确保就绪并重试。
    /// 需要在 tokio 运行时内调用。
    pub fn warm_up(&self) {
        let session = self.session.clone();
        tokio::spawn(async move {
            if let Err(e) = session.initialize().await {
                error!("[桥接器] 后台预热初始化失败: {}", e);
            }
        });
    }

    /// 尽力而为地停止传输。
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}
