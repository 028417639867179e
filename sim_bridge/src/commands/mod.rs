// sim_bridge/src/commands/mod.rs

//! 指令层模块根文件。
//!
//! 每个远端操作对应一条宿主可见的指令：声明式的指令目录
//! （名称、展示文本、指令/报告类型、参数规格与宿主侧默认值）
//! 加上一行式的委托处理器。处理器只做参数收敛与透传，不含
//! 业务逻辑；返回值永远是一个字符串（归一化消息，报告型指令
//! 为 JSON 负载文本），未知指令返回描述性错误文本而不是恐慌。

pub mod drone_cmds;
pub mod system_cmds;

use crate::clients::{DroneClient, SystemControlClient};
use log::warn;
use serde_json::Value;
use std::sync::Arc;

/// 指令种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// 普通指令：执行动作，返回执行消息。
    Command,
    /// 报告型指令：返回 JSON 负载文本。
    Reporter,
}

/// 参数种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// 文本参数。
    Text,
    /// 数值参数（接受数字或数字文本）。
    Number,
    /// 两值开关令牌（on / off）。
    Switch,
}

/// 单个参数的声明。`default_value` 是宿主界面展示的默认字面量，
/// 实际的缺省补齐由请求构造函数负责。
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub default_value: &'static str,
}

/// 单条指令的声明。
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// 宿主用来调用的指令名。
    pub name: &'static str,
    /// 宿主界面的展示文本。
    pub text: &'static str,
    pub kind: CommandKind,
    pub args: &'static [ArgSpec],
}

/// 宿主下发的命名参数表。
pub type CommandArgs = serde_json::Map<String, Value>;

/// 指令层本体：持有两个服务客户端，按指令名分发。
pub struct BridgeCommands {
    system: Arc<SystemControlClient>,
    drone: Arc<DroneClient>,
}

impl BridgeCommands {
    pub fn new(system: Arc<SystemControlClient>, drone: Arc<DroneClient>) -> Self {
        Self { system, drone }
    }

    /// 完整的指令目录（系统控制 + 无人机）。
    pub fn catalog() -> Vec<&'static CommandDescriptor> {
        system_cmds::SYSTEM_CATALOG
            .iter()
            .chain(drone_cmds::DRONE_CATALOG.iter())
            .collect()
    }

    /// 按指令名调用。宿主期望拿到返回值而不是异常，因此本方法
    /// 对任何输入都返回字符串。
    pub async fn invoke(&self, name: &str, args: &CommandArgs) -> String {
        match name {
            "activate" => self.activate().await,
            "start" => self.start().await,
            "terminate" => self.terminate().await,
            "droneSetReady" => self.drone_set_ready(args).await,
            "droneTakeOff" => self.drone_take_off(args).await,
            "droneLand" => self.drone_land(args).await,
            "droneGetState" => self.drone_get_state(args).await,
            "droneGoTo" => self.drone_go_to(args).await,
            "cameraSetTilt" => self.camera_set_tilt(args).await,
            "magnetGrab" => self.magnet_grab(args).await,
            unknown => {
                warn!("[指令层] 收到未知指令 '{}'。", unknown);
                format!("未知指令: {}", unknown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 指令目录应覆盖全部十个操作，且指令名唯一。
    fn test_catalog_is_complete_and_unique() {
        let catalog = BridgeCommands::catalog();
        assert_eq!(catalog.len(), 10, "指令目录应恰好有 10 条指令");

        let mut names: Vec<&str> = catalog.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10, "指令名不应重复");

        // 状态查询是唯一的报告型指令
        let reporters: Vec<&str> = catalog
            .iter()
            .filter(|d| d.kind == CommandKind::Reporter)
            .map(|d| d.name)
            .collect();
        assert_eq!(reporters, vec!["droneGetState"]);
    }
}
