// sim_bridge/src/commands/drone_cmds.rs

//! 无人机指令。
//!
//! 处理器只负责把宿主下发的松散参数收敛为可选的类型化参数，
//! 然后委托给无人机客户端；缺省值的补齐发生在请求构造函数里。
//! 目录中的 `default_value` 是宿主界面展示的默认字面量。

use super::{ArgKind, ArgSpec, BridgeCommands, CommandArgs, CommandDescriptor, CommandKind};
use log::info;
use sim_models::GoToParams;
use sim_models::coerce::{opt_num, opt_text, switch_on};

/// 无人机指令目录。
pub static DRONE_CATALOG: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "droneSetReady",
        text: "drone [NAME] set ready",
        kind: CommandKind::Command,
        args: &[ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" }],
    },
    CommandDescriptor {
        name: "droneTakeOff",
        text: "drone [NAME] takeoff to [HEIGHT] m",
        kind: CommandKind::Command,
        args: &[
            ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" },
            ArgSpec { name: "HEIGHT", kind: ArgKind::Number, default_value: "0.5" },
        ],
    },
    CommandDescriptor {
        name: "droneLand",
        text: "drone [NAME] land",
        kind: CommandKind::Command,
        args: &[ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" }],
    },
    CommandDescriptor {
        name: "droneGetState",
        text: "drone [NAME] state (json)",
        kind: CommandKind::Reporter,
        args: &[ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" }],
    },
    CommandDescriptor {
        name: "droneGoTo",
        text: "drone [NAME] go to x:[X] y:[Y] z:[Z] speed:[S] yaw:[YAW] tol:[TOL]",
        kind: CommandKind::Command,
        args: &[
            ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" },
            ArgSpec { name: "X", kind: ArgKind::Number, default_value: "0.0" },
            ArgSpec { name: "Y", kind: ArgKind::Number, default_value: "0.0" },
            ArgSpec { name: "Z", kind: ArgKind::Number, default_value: "0.5" },
            ArgSpec { name: "S", kind: ArgKind::Number, default_value: "1.0" },
            ArgSpec { name: "YAW", kind: ArgKind::Number, default_value: "0.0" },
            ArgSpec { name: "TOL", kind: ArgKind::Number, default_value: "0.1" },
        ],
    },
    CommandDescriptor {
        name: "cameraSetTilt",
        text: "drone [NAME] camera tilt [ANGLE] deg",
        kind: CommandKind::Command,
        args: &[
            ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" },
            ArgSpec { name: "ANGLE", kind: ArgKind::Number, default_value: "0" },
        ],
    },
    CommandDescriptor {
        name: "magnetGrab",
        text: "drone [NAME] magnet [ONOFF]",
        kind: CommandKind::Command,
        args: &[
            ArgSpec { name: "NAME", kind: ArgKind::Text, default_value: "Drone" },
            ArgSpec { name: "ONOFF", kind: ArgKind::Switch, default_value: "on" },
        ],
    },
];

impl BridgeCommands {
    pub async fn drone_set_ready(&self, args: &CommandArgs) -> String {
        self.drone.set_ready(opt_text(args.get("NAME"))).await.message
    }

    pub async fn drone_take_off(&self, args: &CommandArgs) -> String {
        self.drone
            .takeoff(opt_text(args.get("NAME")), opt_num(args.get("HEIGHT")))
            .await
            .message
    }

    pub async fn drone_land(&self, args: &CommandArgs) -> String {
        self.drone.land(opt_text(args.get("NAME"))).await.message
    }

    /// 报告型指令：返回状态的 JSON 负载文本。
    pub async fn drone_get_state(&self, args: &CommandArgs) -> String {
        self.drone.get_state(opt_text(args.get("NAME"))).await.message
    }

    pub async fn drone_go_to(&self, args: &CommandArgs) -> String {
        let params = GoToParams {
            drone_name: opt_text(args.get("NAME")),
            x: opt_num(args.get("X")),
            y: opt_num(args.get("Y")),
            z: opt_num(args.get("Z")),
            speed_m_s: opt_num(args.get("S")),
            yaw_deg: opt_num(args.get("YAW")),
            tolerance_m: opt_num(args.get("TOL")),
            timeout_sec: None,
        };
        self.drone.go_to(params).await.message
    }

    pub async fn camera_set_tilt(&self, args: &CommandArgs) -> String {
        self.drone
            .set_camera_tilt(opt_text(args.get("NAME")), opt_num(args.get("ANGLE")))
            .await
            .message
    }

    pub async fn magnet_grab(&self, args: &CommandArgs) -> String {
        let token = opt_text(args.get("ONOFF")).unwrap_or_default();
        let grab_on = switch_on(&token);
        info!("[DroneCMD::magnet_grab] 开关令牌 '{}' 解析为 grab_on={}。", token, grab_on);
        self.drone
            .set_magnet(opt_text(args.get("NAME")), grab_on, None)
            .await
            .message
    }
}
