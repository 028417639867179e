//! `bridgetest`：桥接层的环回场景演练程序。
//!
//! 不依赖真实仿真端：把进程内环回通信库注入桥接层，然后按
//! 典型剧本依次下发全部指令（激活 → 开始 → 待命 → 离陆 →
//! 移动 → 相机 → 磁铁 → 状态 → 着陆 → 终止），打印每条指令
//! 的归一化结果。用于人工确认整条调用链的装配与日志形态。

use log::{LevelFilter, info};
use pdu_rpc_utils::{MemoryPduLibrary, PduLibrary};
use serde_json::{Map, Value, json};
use sim_bridge::{BridgeSettings, SimBridge, StaticModuleProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// 为剧本路由全部远端服务。
fn build_library(settings: &BridgeSettings) -> Arc<MemoryPduLibrary> {
    let library = Arc::new(MemoryPduLibrary::new());
    library.route_message(&settings.system_control_service, "system control acknowledged");
    library.route_message(&settings.drone_services.set_ready, "drone is ready");
    library.route_message(&settings.drone_services.takeoff, "drone is airborne");
    library.route_message(&settings.drone_services.land, "drone has landed");
    library.route_message(&settings.drone_services.go_to, "drone arrived at target");
    library.route_message(&settings.drone_services.camera_tilt, "camera tilt applied");
    library.route_message(&settings.drone_services.magnet_grab, "magnet state changed");
    library.route(&settings.drone_services.get_state, |_req| {
        Ok(Some(json!({
            "pos": {"x": 1.0, "y": 2.0, "z": 1.5},
            "yaw_deg": 90.0,
            "mode": "hover"
        })))
    });
    library
}

fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[tokio::main]
async fn main() {
    // 初始化日志记录器
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .init();
    info!("[主程序] 日志系统已成功初始化 (env_logger)，默认级别: Info。");

    let settings = BridgeSettings::default();
    let library = build_library(&settings);
    info!("[主程序] 进程内环回通信库已构造并完成服务路由。");

    let provider = Arc::new(StaticModuleProvider::new(
        library.clone() as Arc<dyn PduLibrary>,
        settings,
    ));
    let bridge = SimBridge::new(provider, HashMap::new());
    info!("[主程序] 桥接层装配完成，开始执行剧本。");

    // 注册后即发起后台预热（不等待，指令执行时会各自确保就绪）
    bridge.warm_up();

    let script: Vec<(&str, Map<String, Value>)> = vec![
        ("activate", Map::new()),
        ("start", Map::new()),
        ("droneSetReady", args(&[("NAME", json!("Scout"))])),
        ("droneTakeOff", args(&[("NAME", json!("Scout")), ("HEIGHT", json!(1.2))])),
        (
            "droneGoTo",
            args(&[
                ("NAME", json!("Scout")),
                ("X", json!(1.0)),
                ("Y", json!(2.0)),
                ("Z", json!(1.5)),
                ("S", json!("0.8")), // 数字文本也应被收敛
                ("YAW", json!(90)),
            ]),
        ),
        ("cameraSetTilt", args(&[("NAME", json!("Scout")), ("ANGLE", json!(-30))])),
        ("magnetGrab", args(&[("NAME", json!("Scout")), ("ONOFF", json!("on"))])),
        ("magnetGrab", args(&[("NAME", json!("Scout")), ("ONOFF", json!("OFF"))])),
        ("droneGetState", args(&[("NAME", json!("Scout"))])),
        ("droneLand", args(&[("NAME", json!("Scout"))])),
        ("terminate", Map::new()),
    ];

    for (name, command_args) in script {
        let message = bridge.commands().invoke(name, &command_args).await;
        info!("[主程序] 指令 '{}' => {}", name, message);
    }

    info!(
        "[主程序] 剧本执行完毕。管理器构造 {} 次，服务启动 {} 次，共记录 {} 次远程调用。",
        library.managers_created(),
        library.start_calls(),
        library.recorded_calls().len()
    );

    bridge.shutdown().await;
    info!("[主程序] 已请求停止传输，程序退出。");
}
