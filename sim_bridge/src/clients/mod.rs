// sim_bridge/src/clients/mod.rs

//! 命名服务客户端模块根文件。
//!
//! 每个客户端包装一个或一组远端服务，遵循统一的调用契约：
//! 确保自身惰性初始化完成（内部会确保核心会话就绪、协议客户端
//! 已创建并注册）→ 从宽松参数构造请求 → 以操作对应的超时/轮询
//! 策略发起调用 → 把结局归一化为 `RpcResult`。任何错误都不会
//! 越过客户端边界。

pub mod drone;
pub mod system;

pub use drone::DroneClient;
pub use system::SystemControlClient;
