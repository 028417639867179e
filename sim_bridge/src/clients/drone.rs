// sim_bridge/src/clients/drone.rs

//! 无人机控制的通信处理（与宿主 UI 无关）。

use crate::error::BridgeError;
use crate::session::CoreSession;
use log::{error, info};
use pdu_rpc_utils::ProtocolClient;
use pdu_rpc_utils::contract::WAIT_FOREVER_MSEC;
use serde_json::Value;
use sim_models::{GoToParams, PduRequest, RpcResult};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// 短指令的响应轮询间隔（秒）。
const SHORT_POLL_SEC: f64 = 0.05;
/// 长航程移动指令的响应轮询间隔（秒），比短指令更粗。
const NAV_POLL_SEC: f64 = 0.1;
/// 状态查询的调用超时（毫秒）。查询应当很快返回，不值得无限等待。
const STATE_TIMEOUT_MSEC: i64 = 3000;

/// 无人机各操作对应的协议客户端，惰性初始化时一次性创建。
struct DroneEndpoints {
    set_ready: Arc<dyn ProtocolClient>,
    takeoff: Arc<dyn ProtocolClient>,
    land: Arc<dyn ProtocolClient>,
    get_state: Arc<dyn ProtocolClient>,
    go_to: Arc<dyn ProtocolClient>,
    camera_tilt: Arc<dyn ProtocolClient>,
    magnet: Arc<dyn ProtocolClient>,
}

/// 无人机控制服务的客户端。
///
/// 一个实例管理七个远端服务的协议客户端，全部经由共享的核心
/// 会话创建并缓存。所有方法都返回归一化结果，绝不抛出错误。
pub struct DroneClient {
    session: Arc<CoreSession>,
    endpoints: OnceCell<DroneEndpoints>,
}

impl DroneClient {
    pub fn new(session: Arc<CoreSession>) -> Self {
        Self {
            session,
            endpoints: OnceCell::new(),
        }
    }

    /// 惰性初始化：会话就绪 + 七个服务客户端的创建/注册。
    async fn endpoints(&self) -> Result<&DroneEndpoints, BridgeError> {
        self.endpoints
            .get_or_try_init(|| async {
                let core = self.session.initialize().await?;
                let names = core.settings().drone_services.clone();
                let endpoints = DroneEndpoints {
                    set_ready: self
                        .session
                        .create_client(&names.set_ready, "DroneSetReady", "drone_srv_msgs")
                        .await?,
                    takeoff: self
                        .session
                        .create_client(&names.takeoff, "DroneTakeOff", "drone_srv_msgs")
                        .await?,
                    land: self
                        .session
                        .create_client(&names.land, "DroneLand", "drone_srv_msgs")
                        .await?,
                    get_state: self
                        .session
                        .create_client(&names.get_state, "DroneGetState", "drone_srv_msgs")
                        .await?,
                    go_to: self
                        .session
                        .create_client(&names.go_to, "DroneGoTo", "drone_srv_msgs")
                        .await?,
                    camera_tilt: self
                        .session
                        .create_client(&names.camera_tilt, "CameraSetTilt", "drone_srv_msgs")
                        .await?,
                    magnet: self
                        .session
                        .create_client(&names.magnet_grab, "MagnetGrab", "drone_srv_msgs")
                        .await?,
                };
                info!("[无人机客户端] 全部服务客户端就绪。");
                Ok(endpoints)
            })
            .await
    }

    /// 通用调用路径：选端点、发请求、归一化结果。
    async fn dispatch(
        &self,
        pick: fn(&DroneEndpoints) -> &Arc<dyn ProtocolClient>,
        request: PduRequest,
        timeout_msec: i64,
        poll_interval_sec: f64,
    ) -> RpcResult {
        let operation = request.operation_name();
        info!("[无人机客户端] 调用 {}。", operation);
        let outcome: Result<Option<Value>, BridgeError> = async {
            let endpoints = self.endpoints().await?;
            pick(endpoints)
                .call(request, timeout_msec, poll_interval_sec)
                .await
                .map_err(|e| BridgeError::Call(e.to_string()))
        }
        .await;

        match outcome {
            Ok(response) => RpcResult::from_response(response),
            Err(e) => {
                error!("[无人机客户端] 调用 {} 出错: {}", operation, e);
                RpcResult::failure(e.to_string())
            }
        }
    }

    /// 使无人机进入待命状态。
    pub async fn set_ready(&self, drone_name: Option<String>) -> RpcResult {
        self.dispatch(
            |e| &e.set_ready,
            PduRequest::drone_set_ready(drone_name),
            WAIT_FOREVER_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }

    /// 离陆到指定高度（缺省 1.5 米）。
    pub async fn takeoff(&self, drone_name: Option<String>, alt_m: Option<f64>) -> RpcResult {
        self.dispatch(
            |e| &e.takeoff,
            PduRequest::drone_take_off(drone_name, alt_m),
            WAIT_FOREVER_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }

    /// 着陆。
    pub async fn land(&self, drone_name: Option<String>) -> RpcResult {
        self.dispatch(
            |e| &e.land,
            PduRequest::drone_land(drone_name),
            WAIT_FOREVER_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }

    /// 查询机体状态（有界超时）。
    pub async fn get_state(&self, drone_name: Option<String>) -> RpcResult {
        self.dispatch(
            |e| &e.get_state,
            PduRequest::drone_get_state(drone_name),
            STATE_TIMEOUT_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }

    /// 移动到目标位姿（长航程指令，轮询更粗）。
    pub async fn go_to(&self, params: GoToParams) -> RpcResult {
        self.dispatch(
            |e| &e.go_to,
            PduRequest::drone_go_to(params),
            WAIT_FOREVER_MSEC,
            NAV_POLL_SEC,
        )
        .await
    }

    /// 设置相机俯仰角（缺省 0.0 度）。
    pub async fn set_camera_tilt(
        &self,
        drone_name: Option<String>,
        tilt_angle_deg: Option<f64>,
    ) -> RpcResult {
        self.dispatch(
            |e| &e.camera_tilt,
            PduRequest::camera_set_tilt(drone_name, tilt_angle_deg),
            WAIT_FOREVER_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }

    /// 磁铁吸附开关。
    pub async fn set_magnet(
        &self,
        drone_name: Option<String>,
        grab_on: bool,
        timeout_sec: Option<f64>,
    ) -> RpcResult {
        self.dispatch(
            |e| &e.magnet,
            PduRequest::magnet_grab(drone_name, grab_on, timeout_sec),
            WAIT_FOREVER_MSEC,
            SHORT_POLL_SEC,
        )
        .await
    }
}
