//! 远程操作请求模型。
//!
//! 每个远程操作对应 `PduRequest` 的一个变体，字段名与远端服务的
//! 请求模式保持一致（`drone_name`, `alt_m`, `target_pose` 等）。
//! 请求一律通过显式构造函数创建，调用方传入的可选参数在构造时
//! 按文档化的默认值补齐，之后不再修改字段。

use crate::enums::SystemControlOpCode;
use serde::{Deserialize, Serialize};

/// 未指定机体名称时使用的默认无人机名。
pub const DEFAULT_DRONE_NAME: &str = "Drone";
/// 默认离陆目标高度（米）。
pub const DEFAULT_TAKEOFF_ALT_M: f64 = 1.5;
/// goTo 目标高度 z 的默认值（米）。
pub const DEFAULT_GOTO_Z_M: f64 = 1.0;
/// goTo 移动速度的默认值（米/秒）。
pub const DEFAULT_GOTO_SPEED_M_S: f64 = 1.0;
/// goTo 到达判定容差的默认值（米）。
pub const DEFAULT_GOTO_TOLERANCE_M: f64 = 0.5;
/// "不限时"的超时标记值（秒）。传输层将负值解释为无限等待。
pub const NO_TIMEOUT_SEC: f64 = -1.0;

/// 三维向量，用于表示目标位姿等空间量。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// `go_to` 操作的调用参数集合。
///
/// 所有字段都是可选的；缺失（或被宿主传成无法解析的值）的字段
/// 在构造请求时按如下默认值补齐：
/// x = 0.0, y = 0.0, z = 1.0, speed = 1.0 m/s, yaw = 0.0 deg,
/// tolerance = 0.5 m, timeout = -1（不限时）。
#[derive(Debug, Clone, Default)]
pub struct GoToParams {
    pub drone_name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub speed_m_s: Option<f64>,
    pub yaw_deg: Option<f64>,
    pub tolerance_m: Option<f64>,
    pub timeout_sec: Option<f64>,
}

/// 远程操作请求，每个操作一个变体。
///
/// 序列化形式为邻接标签结构（`op` + `params`），字段名即远端请求
/// 模式的字段名；外部通信库负责将其编码为 PDU。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", content = "params")]
pub enum PduRequest {
    /// 系统控制（activate / start / terminate）。
    SystemControl { opcode: SystemControlOpCode },
    /// 使指定无人机进入待命状态。
    DroneSetReady { drone_name: String },
    /// 离陆到指定高度。
    DroneTakeOff { drone_name: String, alt_m: f64 },
    /// 着陆。
    DroneLand { drone_name: String },
    /// 查询机体状态。
    DroneGetState { drone_name: String },
    /// 移动到目标位姿。
    DroneGoTo {
        drone_name: String,
        target_pose: Vector3,
        speed_m_s: f64,
        yaw_deg: f64,
        tolerance_m: f64,
        timeout_sec: f64,
    },
    /// 设置相机俯仰角。
    CameraSetTilt { drone_name: String, tilt_angle_deg: f64 },
    /// 磁铁吸附开关。
    MagnetGrab {
        drone_name: String,
        grab_on: bool,
        timeout_sec: f64,
    },
}

impl PduRequest {
    /// 构造系统控制请求。
    pub fn system_control(opcode: SystemControlOpCode) -> Self {
        Self::SystemControl { opcode }
    }

    /// 构造待命请求。机体名缺省为 [`DEFAULT_DRONE_NAME`]。
    pub fn drone_set_ready(drone_name: Option<String>) -> Self {
        Self::DroneSetReady {
            drone_name: name_or_default(drone_name),
        }
    }

    /// 构造离陆请求。高度缺省为 [`DEFAULT_TAKEOFF_ALT_M`]。
    pub fn drone_take_off(drone_name: Option<String>, alt_m: Option<f64>) -> Self {
        Self::DroneTakeOff {
            drone_name: name_or_default(drone_name),
            alt_m: alt_m.unwrap_or(DEFAULT_TAKEOFF_ALT_M),
        }
    }

    /// 构造着陆请求。
    pub fn drone_land(drone_name: Option<String>) -> Self {
        Self::DroneLand {
            drone_name: name_or_default(drone_name),
        }
    }

    /// 构造状态查询请求。
    pub fn drone_get_state(drone_name: Option<String>) -> Self {
        Self::DroneGetState {
            drone_name: name_or_default(drone_name),
        }
    }

    /// 构造移动请求，缺失字段按 [`GoToParams`] 文档中的默认值补齐。
    pub fn drone_go_to(params: GoToParams) -> Self {
        Self::DroneGoTo {
            drone_name: name_or_default(params.drone_name),
            target_pose: Vector3::new(
                params.x.unwrap_or(0.0),
                params.y.unwrap_or(0.0),
                params.z.unwrap_or(DEFAULT_GOTO_Z_M),
            ),
            speed_m_s: params.speed_m_s.unwrap_or(DEFAULT_GOTO_SPEED_M_S),
            yaw_deg: params.yaw_deg.unwrap_or(0.0),
            tolerance_m: params.tolerance_m.unwrap_or(DEFAULT_GOTO_TOLERANCE_M),
            timeout_sec: params.timeout_sec.unwrap_or(NO_TIMEOUT_SEC),
        }
    }

    /// 构造相机俯仰请求。角度缺省为 0.0 度。
    pub fn camera_set_tilt(drone_name: Option<String>, tilt_angle_deg: Option<f64>) -> Self {
        Self::CameraSetTilt {
            drone_name: name_or_default(drone_name),
            tilt_angle_deg: tilt_angle_deg.unwrap_or(0.0),
        }
    }

    /// 构造磁铁开关请求。超时缺省为不限时。
    pub fn magnet_grab(drone_name: Option<String>, grab_on: bool, timeout_sec: Option<f64>) -> Self {
        Self::MagnetGrab {
            drone_name: name_or_default(drone_name),
            grab_on,
            timeout_sec: timeout_sec.unwrap_or(NO_TIMEOUT_SEC),
        }
    }

    /// 返回请求对应的操作名称，用于日志输出。
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::SystemControl { .. } => "SystemControl",
            Self::DroneSetReady { .. } => "DroneSetReady",
            Self::DroneTakeOff { .. } => "DroneTakeOff",
            Self::DroneLand { .. } => "DroneLand",
            Self::DroneGetState { .. } => "DroneGetState",
            Self::DroneGoTo { .. } => "DroneGoTo",
            Self::CameraSetTilt { .. } => "CameraSetTilt",
            Self::MagnetGrab { .. } => "MagnetGrab",
        }
    }
}

fn name_or_default(drone_name: Option<String>) -> String {
    drone_name.unwrap_or_else(|| DEFAULT_DRONE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 缺省参数的离陆请求应补齐默认机体名与默认高度。
    fn test_take_off_defaults() {
        let req = PduRequest::drone_take_off(None, None);
        match req {
            PduRequest::DroneTakeOff { drone_name, alt_m } => {
                assert_eq!(drone_name, DEFAULT_DRONE_NAME, "默认机体名应为 Drone");
                assert_eq!(alt_m, DEFAULT_TAKEOFF_ALT_M, "默认离陆高度应为 1.5 米");
            }
            other => panic!("构造出了错误的请求变体: {:?}", other),
        }
    }

    #[test]
    /// goTo 请求的每个缺失字段都应按文档默认值补齐。
    fn test_go_to_defaults() {
        let req = PduRequest::drone_go_to(GoToParams::default());
        match req {
            PduRequest::DroneGoTo {
                drone_name,
                target_pose,
                speed_m_s,
                yaw_deg,
                tolerance_m,
                timeout_sec,
            } => {
                assert_eq!(drone_name, "Drone");
                assert_eq!(target_pose, Vector3::new(0.0, 0.0, DEFAULT_GOTO_Z_M));
                assert_eq!(speed_m_s, DEFAULT_GOTO_SPEED_M_S);
                assert_eq!(yaw_deg, 0.0);
                assert_eq!(tolerance_m, DEFAULT_GOTO_TOLERANCE_M);
                assert_eq!(timeout_sec, NO_TIMEOUT_SEC, "未指定超时应为不限时");
            }
            other => panic!("构造出了错误的请求变体: {:?}", other),
        }
    }

    #[test]
    /// 显式传入的字段不应被默认值覆盖。
    fn test_go_to_explicit_fields_survive() {
        let req = PduRequest::drone_go_to(GoToParams {
            drone_name: Some("Scout".to_string()),
            x: Some(2.5),
            z: Some(0.8),
            tolerance_m: Some(0.1),
            ..GoToParams::default()
        });
        match req {
            PduRequest::DroneGoTo {
                drone_name,
                target_pose,
                tolerance_m,
                ..
            } => {
                assert_eq!(drone_name, "Scout");
                assert_eq!(target_pose.x, 2.5);
                assert_eq!(target_pose.y, 0.0, "未指定的 y 仍应为默认值");
                assert_eq!(target_pose.z, 0.8);
                assert_eq!(tolerance_m, 0.1);
            }
            other => panic!("构造出了错误的请求变体: {:?}", other),
        }
    }

    #[test]
    /// 请求序列化后应带有邻接标签结构，字段名与远端模式一致。
    fn test_request_wire_shape() {
        let req = PduRequest::magnet_grab(None, true, None);
        let value = serde_json::to_value(&req).expect("序列化 MagnetGrab 请求失败");
        assert_eq!(value["op"], "MagnetGrab");
        assert_eq!(value["params"]["drone_name"], "Drone");
        assert_eq!(value["params"]["grab_on"], true);
        assert_eq!(value["params"]["timeout_sec"], -1.0);
    }
}
