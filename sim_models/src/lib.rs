//! `sim_models` 公共模型库 crate。
//!
//! 本 crate 集中定义了仿真桥接层各个 Rust 组件（`sim_bridge` 适配层、
//! `pdu_rpc_utils` 通信契约层、`bridgetest` 场景演练程序）之间共享的
//! 核心数据结构和枚举类型。
//!
//! 主要包含以下类型的模型：
//! - **请求变体 (`requests`)**: 每个远程操作对应一个带命名字段的请求变体，
//!   由显式构造函数配合文档化的默认值创建，禁止"先构造后补字段"的松散写法。
//! - **归一化结果 (`rpc_result`)**: 所有远程调用统一归一化为
//!   `{success, message, data?}` 形态，指令层只消费这一种结果。
//! - **通用枚举 (`enums`)**: 系统控制操作码等固定枚举。
//! - **宽松参数收敛 (`coerce`)**: 积木宿主传入的松散 JSON 参数向
//!   类型化字段收敛时使用的辅助函数。
//!
//! 设计原则：
//! - **共享性**: 所有在此 crate 中定义的模型都旨在被多个其他 crate 共享使用。
//! - **序列化/反序列化**: 所有模型（结构体和枚举）都必须派生
//!   `serde::Serialize` 和 `serde::Deserialize`，以便在网络通信和
//!   配置持久化时轻松地在 JSON 等格式之间转换。
//! - **可调试性与克隆**: 所有模型也必须派生 `Debug` 和 `Clone`。

pub mod coerce;
pub mod enums;
pub mod requests;
pub mod rpc_result;

pub use enums::SystemControlOpCode;
pub use requests::{GoToParams, PduRequest, Vector3};
pub use rpc_result::RpcResult;
