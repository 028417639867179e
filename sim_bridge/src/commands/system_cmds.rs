// sim_bridge/src/commands/system_cmds.rs

//! 系统控制指令（activate / start / terminate）。
//!
//! 三条指令都不带参数，直接委托给系统控制客户端并返回归一化消息。

use super::{BridgeCommands, CommandDescriptor, CommandKind};
use log::info;

/// 系统控制指令目录。
pub static SYSTEM_CATALOG: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "activate",
        text: "Simulation activate",
        kind: CommandKind::Command,
        args: &[],
    },
    CommandDescriptor {
        name: "start",
        text: "Simulation start",
        kind: CommandKind::Command,
        args: &[],
    },
    CommandDescriptor {
        name: "terminate",
        text: "Simulation terminate",
        kind: CommandKind::Command,
        args: &[],
    },
];

impl BridgeCommands {
    pub async fn activate(&self) -> String {
        info!("[SysCMD::activate] 指令被调用。");
        self.system.activate().await.message
    }

    pub async fn start(&self) -> String {
        info!("[SysCMD::start] 指令被调用。");
        self.system.start().await.message
    }

    pub async fn terminate(&self) -> String {
        info!("[SysCMD::terminate] 指令被调用。");
        self.system.terminate().await.message
    }
}
