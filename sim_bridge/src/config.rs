// sim_bridge/src/config.rs

//! 桥接层的配置管理模块。
//!
//! 包含两部分：
//! - [`ConfigResolver`]: 按"显式覆盖 > 持久化偏好 > 编译期默认值"的
//!   顺序解析单个配置项。前两个来源的任何读取失败都按"缺失"处理，
//!   解析永远成功并返回字符串，不产生副作用。
//! - [`BridgeSettings`]: 通信会话所需的成套配置（连接 URI、配置表
//!   位置、注册用的资产/客户端名称、各远端服务标识等），可从 JSON
//!   反序列化，缺失字段由编译期默认值补齐。

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// 远端连接的默认 URI。
pub const DEFAULT_BRIDGE_URI: &str = "ws://localhost:8080";
/// PDU 配置表的默认位置。
pub const DEFAULT_PDU_CONFIG_URL: &str = "http://127.0.0.1:8090/config/pdu_config.json";
/// 服务配置表的默认位置。
pub const DEFAULT_SERVICE_CONFIG_URL: &str = "http://127.0.0.1:8090/config/drone_service.json";
/// 配置模块（[`BridgeSettings`] 文档）的默认获取位置。
pub const DEFAULT_SETTINGS_URL: &str = "http://127.0.0.1:8090/config/bridge_settings.json";
/// 通信库绑定的默认获取位置。
pub const DEFAULT_LIBRARY_URL: &str = "http://127.0.0.1:8090/pdu-runtime/index.json";
/// 注册时上报的默认资产名。
pub const DEFAULT_ASSET_NAME: &str = "SimBridge";
/// 注册时上报的默认客户端名。
pub const DEFAULT_CLIENT_NAME: &str = "SimBridgeClient";
/// 仿真步长（微秒）。
pub const DELTA_TIME_USEC: u64 = 1_000_000;
/// 通信服务的协议版本标签。
pub const PROTOCOL_VERSION: &str = "v2";
/// 系统控制服务的标识。
pub const SYSTEM_CONTROL_SERVICE_NAME: &str = "Service/SystemControl";

/// 持久化偏好文件名。宿主负责写入，本层只读取。
pub const PREFS_FILE_NAME: &str = "bridge_prefs.json";

/// 配置解析器：三个有序来源合成一个字符串值。
///
/// 覆盖表由嵌入宿主在构造时提供（启动参数的对应物）；持久化偏好
/// 是一个 JSON 字符串表文件，依次在工作目录和用户配置目录下探测。
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    overrides: HashMap<String, String>,
    prefs_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// 以宿主提供的覆盖表构造解析器，偏好文件按默认顺序探测。
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            prefs_path: None,
        }
    }

    /// 指定偏好文件的明确位置（跳过默认探测）。
    pub fn with_prefs_path(overrides: HashMap<String, String>, prefs_path: PathBuf) -> Self {
        Self {
            overrides,
            prefs_path: Some(prefs_path),
        }
    }

    /// 按优先级解析一个配置项。
    ///
    /// 顺序：(a) 覆盖表中 `override_key` 对应的非空值；
    /// (b) 偏好文件中 `persisted_key` 对应的值；(c) `default`。
    /// 任一来源读取失败都视为"缺失"而非错误。
    pub fn resolve(&self, override_key: &str, persisted_key: &str, default: &str) -> String {
        if let Some(value) = self.overrides.get(override_key) {
            if !value.is_empty() {
                debug!(
                    "[配置模块] 配置项 '{}' 命中显式覆盖: {}",
                    override_key, value
                );
                return value.clone();
            }
        }
        if let Some(value) = self.lookup_persisted(persisted_key) {
            debug!(
                "[配置模块] 配置项 '{}' 命中持久化偏好: {}",
                persisted_key, value
            );
            return value;
        }
        default.to_string()
    }

    /// 从偏好文件读取一个键。读取或解析失败时记录日志并返回 None。
    fn lookup_persisted(&self, key: &str) -> Option<String> {
        let path = self.prefs_file_path()?;
        match Self::read_prefs(&path) {
            Ok(prefs) => prefs.get(key).cloned(),
            Err(e) => {
                warn!(
                    "[配置模块] 读取偏好文件 {:?} 失败，按无偏好处理: {:#}",
                    path, e
                );
                None
            }
        }
    }

    fn read_prefs(path: &PathBuf) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取偏好文件 {:?} 的内容", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("偏好文件 {:?} 不是有效的 JSON 字符串表", path))
    }

    /// 确定偏好文件位置：显式指定 > 工作目录 > 用户配置目录。
    /// 找不到已存在的文件时返回 None（属正常情况）。
    fn prefs_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.prefs_path {
            return Some(path.clone());
        }

        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let local = current_dir.join(PREFS_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        if let Ok(home) = env::var("HOME") {
            let home_prefs = PathBuf::from(home)
                .join(".config")
                .join("sim_bridge")
                .join(PREFS_FILE_NAME);
            if home_prefs.exists() {
                return Some(home_prefs);
            }
        }

        None
    }
}

/// 无人机各操作对应的远端服务标识。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DroneServiceNames {
    pub set_ready: String,
    pub takeoff: String,
    pub land: String,
    pub get_state: String,
    pub go_to: String,
    pub camera_tilt: String,
    pub magnet_grab: String,
}

impl Default for DroneServiceNames {
    fn default() -> Self {
        Self {
            set_ready: "Service/DroneSetReady".to_string(),
            takeoff: "Service/DroneTakeOff".to_string(),
            land: "Service/DroneLand".to_string(),
            get_state: "Service/DroneGetState".to_string(),
            go_to: "Service/DroneGoTo".to_string(),
            camera_tilt: "Service/CameraSetTilt".to_string(),
            magnet_grab: "Service/MagnetGrab".to_string(),
        }
    }
}

/// 通信会话所需的成套配置。
///
/// 通常由模块提供者随通信库一起给出；JSON 文档中缺失的字段
/// 一律按编译期默认值补齐（容器级 `serde(default)`）。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BridgeSettings {
    /// 远端连接 URI。
    pub uri: String,
    /// PDU 配置表位置。
    pub pdu_config_url: String,
    /// 服务配置表位置。
    pub service_config_url: String,
    /// 注册时上报的资产名。
    pub asset_name: String,
    /// 注册时上报的客户端名。
    pub client_name: String,
    /// 仿真步长（微秒）。
    pub delta_time_usec: u64,
    /// 系统控制服务的标识。
    pub system_control_service: String,
    /// 无人机各操作的服务标识。
    pub drone_services: DroneServiceNames,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_BRIDGE_URI.to_string(),
            pdu_config_url: DEFAULT_PDU_CONFIG_URL.to_string(),
            service_config_url: DEFAULT_SERVICE_CONFIG_URL.to_string(),
            asset_name: DEFAULT_ASSET_NAME.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            delta_time_usec: DELTA_TIME_USEC,
            system_control_service: SYSTEM_CONTROL_SERVICE_NAME.to_string(),
            drone_services: DroneServiceNames::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_prefs(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(PREFS_FILE_NAME);
        let mut file = fs::File::create(&path).expect("创建临时偏好文件失败");
        file.write_all(content.as_bytes()).expect("写入临时偏好文件失败");
        path
    }

    #[test]
    /// 解析顺序应为 覆盖 > 持久化偏好 > 默认值。
    fn test_resolution_precedence() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let prefs = write_prefs(&dir, r#"{"endpoint_url": "ws://persisted:9000"}"#);

        // 覆盖命中时优先
        let mut overrides = HashMap::new();
        overrides.insert("endpoint".to_string(), "ws://override:9999".to_string());
        let resolver = ConfigResolver::with_prefs_path(overrides, prefs.clone());
        assert_eq!(
            resolver.resolve("endpoint", "endpoint_url", DEFAULT_BRIDGE_URI),
            "ws://override:9999"
        );

        // 无覆盖时取持久化偏好
        let resolver = ConfigResolver::with_prefs_path(HashMap::new(), prefs.clone());
        assert_eq!(
            resolver.resolve("endpoint", "endpoint_url", DEFAULT_BRIDGE_URI),
            "ws://persisted:9000"
        );

        // 两者皆无时落到默认值
        let resolver = ConfigResolver::with_prefs_path(HashMap::new(), prefs);
        assert_eq!(
            resolver.resolve("endpoint", "no_such_key", DEFAULT_BRIDGE_URI),
            DEFAULT_BRIDGE_URI
        );
    }

    #[test]
    /// 偏好文件缺失或损坏都不应让解析失败，而是落到默认值。
    fn test_unreadable_prefs_fall_back_to_default() {
        // 指向不存在的文件
        let resolver = ConfigResolver::with_prefs_path(
            HashMap::new(),
            PathBuf::from("/nonexistent/bridge_prefs.json"),
        );
        assert_eq!(
            resolver.resolve("endpoint", "endpoint_url", DEFAULT_BRIDGE_URI),
            DEFAULT_BRIDGE_URI
        );

        // 内容不是 JSON 字符串表
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let prefs = write_prefs(&dir, "这不是 JSON");
        let resolver = ConfigResolver::with_prefs_path(HashMap::new(), prefs);
        assert_eq!(
            resolver.resolve("endpoint", "endpoint_url", DEFAULT_BRIDGE_URI),
            DEFAULT_BRIDGE_URI
        );
    }

    #[test]
    /// 空的覆盖值应被忽略（视为未提供）。
    fn test_empty_override_is_ignored() {
        let mut overrides = HashMap::new();
        overrides.insert("endpoint".to_string(), String::new());
        let resolver = ConfigResolver::with_prefs_path(
            overrides,
            PathBuf::from("/nonexistent/bridge_prefs.json"),
        );
        assert_eq!(
            resolver.resolve("endpoint", "endpoint_url", DEFAULT_BRIDGE_URI),
            DEFAULT_BRIDGE_URI
        );
    }

    #[test]
    /// 部分 JSON 文档应由编译期默认值补齐缺失字段。
    fn test_settings_partial_document_completed_by_defaults() {
        let settings: BridgeSettings =
            serde_json::from_str(r#"{"uri": "ws://sim-host:8080"}"#).expect("反序列化部分配置失败");
        assert_eq!(settings.uri, "ws://sim-host:8080");
        assert_eq!(settings.asset_name, DEFAULT_ASSET_NAME);
        assert_eq!(settings.delta_time_usec, DELTA_TIME_USEC);
        assert_eq!(settings.drone_services, DroneServiceNames::default());
    }
}
