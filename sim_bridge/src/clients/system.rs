// sim_bridge/src/clients/system.rs

//! 系统控制（activate / start / terminate）的通信处理。

use crate::error::BridgeError;
use crate::session::CoreSession;
use log::{error, info};
use pdu_rpc_utils::ProtocolClient;
use pdu_rpc_utils::contract::WAIT_FOREVER_MSEC;
use serde_json::Value;
use sim_models::{PduRequest, RpcResult, SystemControlOpCode};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// 控制类指令的响应轮询间隔（秒）。
const CONTROL_POLL_SEC: f64 = 0.05;

/// 系统控制服务的客户端。
///
/// 持有共享的核心会话；首次调用时惰性完成协议客户端的创建与
/// 注册，之后复用。所有方法都返回归一化结果，绝不抛出错误。
pub struct SystemControlClient {
    session: Arc<CoreSession>,
    client: OnceCell<Arc<dyn ProtocolClient>>,
}

impl SystemControlClient {
    pub fn new(session: Arc<CoreSession>) -> Self {
        Self {
            session,
            client: OnceCell::new(),
        }
    }

    /// 惰性初始化：会话就绪 + 系统控制客户端创建/注册（至多一次，
    /// 失败后下次调用会重新尝试）。
    async fn client(&self) -> Result<Arc<dyn ProtocolClient>, BridgeError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let core = self.session.initialize().await?;
                let service = core.settings().system_control_service.clone();
                self.session
                    .create_client(&service, "SystemControl", "sim_srv_msgs")
                    .await
            })
            .await?;
        Ok(client.clone())
    }

    /// 通用调用路径：控制指令不限时等待。
    async fn call_opcode(&self, opcode: SystemControlOpCode) -> RpcResult {
        info!("[系统控制客户端] 调用 {}。", opcode);
        let outcome: Result<Option<Value>, BridgeError> = async {
            let client = self.client().await?;
            client
                .call(
                    PduRequest::system_control(opcode),
                    WAIT_FOREVER_MSEC,
                    CONTROL_POLL_SEC,
                )
                .await
                .map_err(|e| BridgeError::Call(e.to_string()))
        }
        .await;

        match outcome {
            Ok(response) => RpcResult::from_response(response),
            Err(e) => {
                error!("[系统控制客户端] 调用 {} 出错: {}", opcode, e);
                RpcResult::failure(e.to_string())
            }
        }
    }

    /// 激活仿真环境。
    pub async fn activate(&self) -> RpcResult {
        self.call_opcode(SystemControlOpCode::Activate).await
    }

    /// 开始仿真推进。
    pub async fn start(&self) -> RpcResult {
        self.call_opcode(SystemControlOpCode::Start).await
    }

    /// 终止仿真。
    pub async fn terminate(&self) -> RpcResult {
        self.call_opcode(SystemControlOpCode::Terminate).await
    }
}
