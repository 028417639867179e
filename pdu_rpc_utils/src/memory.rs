// pdu_rpc_utils/src/memory.rs

//! 通信契约的进程内环回实现。
//!
//! 该实现不开网络连接：按服务名路由到进程内注册的处理器，
//! 并记录所有初始化/启动/注册/调用动作，供本地联调与单元、
//! 集成测试观测调用链的形态（构造了几次管理器、某服务注册了
//! 几次、每次调用携带了什么超时策略等）。
//!
//! 路由表、计数器与调用记录都挂在一个共享的 `MemoryHub` 上，
//! 由同一个 [`MemoryPduLibrary`] 派生出的所有组件共用。

use crate::contract::{
    CommunicationService, PduLibrary, PduServiceManager, ProtocolClient, ProtocolClientSpec,
};
use crate::error::PduError;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Value, json};
use sim_models::PduRequest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 环回处理器：收到请求后给出响应（或模拟一次传输层错误）。
pub type MemoryHandler = Arc<dyn Fn(&PduRequest) -> Result<Option<Value>, PduError> + Send + Sync>;

/// 一次被记录下来的远程调用。
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// 目标服务名。
    pub service_name: String,
    /// 调用携带的请求值。
    pub request: PduRequest,
    /// 调用方传入的超时（毫秒，负值表示无限等待）。
    pub timeout_msec: i64,
    /// 调用方传入的轮询间隔（秒）。
    pub poll_interval_sec: f64,
}

/// 所有环回组件共享的状态中枢。
struct MemoryHub {
    handlers: Mutex<HashMap<String, MemoryHandler>>,
    comm_created: AtomicUsize,
    managers_created: AtomicUsize,
    init_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    registrations: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<RecordedCall>>,
    fail_next_start: AtomicBool,
}

impl MemoryHub {
    fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            comm_created: AtomicUsize::new(0),
            managers_created: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            registrations: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_next_start: AtomicBool::new(false),
        }
    }
}

/// 进程内环回通信库。
///
/// 作为 [`PduLibrary`] 的实现注入到桥接层后，整条调用链
/// （会话初始化 → 客户端注册 → 远程调用）都在本进程内完成。
pub struct MemoryPduLibrary {
    hub: Arc<MemoryHub>,
}

impl MemoryPduLibrary {
    pub fn new() -> Self {
        Self {
            hub: Arc::new(MemoryHub::new()),
        }
    }

    /// 为指定服务注册一个处理器。同名服务的旧处理器会被替换。
    pub fn route<F>(&self, service_name: &str, handler: F)
    where
        F: Fn(&PduRequest) -> Result<Option<Value>, PduError> + Send + Sync + 'static,
    {
        let mut handlers = self.hub.handlers.lock().expect("环回路由表锁中毒");
        handlers.insert(service_name.to_string(), Arc::new(handler));
    }

    /// 便捷路由：对任何请求都回以固定的 `{"message": ...}` 响应。
    pub fn route_message(&self, service_name: &str, message: &str) {
        let canned = message.to_string();
        self.route(service_name, move |_req| Ok(Some(json!({ "message": canned }))));
    }

    /// 注入一次启动失败：下一次 `start_client_service` 将返回错误，
    /// 之后恢复正常。
    pub fn fail_next_start(&self) {
        self.hub.fail_next_start.store(true, Ordering::SeqCst);
    }

    // --- 观测接口 ---

    /// 已构造的通信服务数量。
    pub fn communication_services_created(&self) -> usize {
        self.hub.comm_created.load(Ordering::SeqCst)
    }

    /// 已构造的服务管理器数量。
    pub fn managers_created(&self) -> usize {
        self.hub.managers_created.load(Ordering::SeqCst)
    }

    /// `initialize_services` 被调用的次数。
    pub fn initialize_calls(&self) -> usize {
        self.hub.init_calls.load(Ordering::SeqCst)
    }

    /// `start_client_service` 被调用的次数（含失败的那次）。
    pub fn start_calls(&self) -> usize {
        self.hub.start_calls.load(Ordering::SeqCst)
    }

    /// `stop_service` 被调用的次数。
    pub fn stop_calls(&self) -> usize {
        self.hub.stop_calls.load(Ordering::SeqCst)
    }

    /// 指定服务完成注册握手的次数。
    pub fn registration_count(&self, service_name: &str) -> usize {
        let registrations = self.hub.registrations.lock().expect("环回注册表锁中毒");
        registrations.get(service_name).copied().unwrap_or(0)
    }

    /// 全部已记录调用的快照。
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.hub.calls.lock().expect("环回调用记录锁中毒").clone()
    }
}

impl Default for MemoryPduLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// 环回通信服务：只记住协议版本标签。
struct MemoryCommunicationService {
    version: String,
}

impl CommunicationService for MemoryCommunicationService {
    fn protocol_version(&self) -> &str {
        &self.version
    }
}

/// 环回服务管理器。
struct MemoryServiceManager {
    hub: Arc<MemoryHub>,
    uri: String,
}

#[async_trait]
impl PduServiceManager for MemoryServiceManager {
    async fn initialize_services(
        &self,
        service_config_url: &str,
        delta_time_usec: u64,
    ) -> Result<(), PduError> {
        self.hub.init_calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            "[环回管理器] initialize_services: 服务配置='{}', 步长={}微秒, 目标URI='{}'",
            service_config_url, delta_time_usec, self.uri
        );
        Ok(())
    }

    async fn start_client_service(&self) -> Result<(), PduError> {
        self.hub.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.hub.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(PduError::StartFailed("主动注入的启动失败".to_string()));
        }
        info!("[环回管理器] 客户端服务已启动 (进程内环回，无网络连接)。");
        Ok(())
    }

    fn stop_service(&self) {
        self.hub.stop_calls.fetch_add(1, Ordering::SeqCst);
        info!("[环回管理器] 已请求停止服务。");
    }
}

/// 环回协议客户端：注册后按服务名把调用分发给对应处理器。
struct MemoryProtocolClient {
    hub: Arc<MemoryHub>,
    service_name: String,
    client_name: String,
    registered: AtomicBool,
}

#[async_trait]
impl ProtocolClient for MemoryProtocolClient {
    async fn register(&self) -> Result<(), PduError> {
        let routed = {
            let handlers = self.hub.handlers.lock().expect("环回路由表锁中毒");
            handlers.contains_key(&self.service_name)
        };
        if !routed {
            return Err(PduError::RegistrationFailed(format!(
                "服务 '{}' 不在环回路由表中，握手无法完成",
                self.service_name
            )));
        }
        {
            let mut registrations = self.hub.registrations.lock().expect("环回注册表锁中毒");
            *registrations.entry(self.service_name.clone()).or_insert(0) += 1;
        }
        self.registered.store(true, Ordering::SeqCst);
        debug!(
            "[环回客户端] '{}' 已注册到服务 '{}'。",
            self.client_name, self.service_name
        );
        Ok(())
    }

    async fn call(
        &self,
        request: PduRequest,
        timeout_msec: i64,
        poll_interval_sec: f64,
    ) -> Result<Option<Value>, PduError> {
        if !self.registered.load(Ordering::SeqCst) {
            return Err(PduError::Message(format!(
                "客户端 '{}' 尚未完成注册，不能调用服务 '{}'",
                self.client_name, self.service_name
            )));
        }
        let handler = {
            let handlers = self.hub.handlers.lock().expect("环回路由表锁中毒");
            handlers
                .get(&self.service_name)
                .cloned()
                .ok_or_else(|| PduError::ServiceNotFound(self.service_name.clone()))?
        };
        {
            let mut calls = self.hub.calls.lock().expect("环回调用记录锁中毒");
            calls.push(RecordedCall {
                service_name: self.service_name.clone(),
                request: request.clone(),
                timeout_msec,
                poll_interval_sec,
            });
        }
        debug!(
            "[环回客户端] 调用 '{}' (操作: {}, 超时: {}毫秒, 轮询: {}秒)",
            self.service_name,
            request.operation_name(),
            timeout_msec,
            poll_interval_sec
        );
        handler(&request)
    }
}

#[async_trait]
impl PduLibrary for MemoryPduLibrary {
    fn create_communication_service(
        &self,
        version: &str,
    ) -> Result<Arc<dyn CommunicationService>, PduError> {
        self.hub.comm_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryCommunicationService {
            version: version.to_string(),
        }))
    }

    fn create_service_manager(
        &self,
        asset_name: &str,
        pdu_config_url: &str,
        comm: Arc<dyn CommunicationService>,
        uri: &str,
    ) -> Result<Arc<dyn PduServiceManager>, PduError> {
        self.hub.managers_created.fetch_add(1, Ordering::SeqCst);
        debug!(
            "[环回库] 构造服务管理器: 资产='{}', PDU配置='{}', 协议版本='{}', URI='{}'",
            asset_name,
            pdu_config_url,
            comm.protocol_version(),
            uri
        );
        Ok(Arc::new(MemoryServiceManager {
            hub: self.hub.clone(),
            uri: uri.to_string(),
        }))
    }

    async fn make_protocol_client(
        &self,
        _manager: Arc<dyn PduServiceManager>,
        spec: ProtocolClientSpec,
    ) -> Result<Arc<dyn ProtocolClient>, PduError> {
        debug!(
            "[环回库] 构造协议客户端: 服务='{}', 客户端='{}', srv='{}', pkg='{}'",
            spec.service_name, spec.client_name, spec.srv, spec.pkg
        );
        Ok(Arc::new(MemoryProtocolClient {
            hub: self.hub.clone(),
            service_name: spec.service_name,
            client_name: spec.client_name,
            registered: AtomicBool::new(false),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::WAIT_FOREVER_MSEC;
    use sim_models::SystemControlOpCode;

    fn spec_for(service_name: &str) -> ProtocolClientSpec {
        ProtocolClientSpec {
            service_name: service_name.to_string(),
            client_name: "TestClient".to_string(),
            srv: "SystemControl".to_string(),
            pkg: "sim_srv_msgs".to_string(),
        }
    }

    #[tokio::test]
    /// 完整环回链路：构造 → 初始化 → 启动 → 注册 → 调用 → 响应。
    async fn test_full_loopback_chain() {
        let library = MemoryPduLibrary::new();
        library.route_message("Service/SystemControl", "activated");

        let comm = library.create_communication_service("v2").expect("构造通信服务失败");
        assert_eq!(comm.protocol_version(), "v2");

        let manager = library
            .create_service_manager("TestAsset", "http://127.0.0.1/pdu.json", comm, "ws://localhost:8080")
            .expect("构造服务管理器失败");
        manager
            .initialize_services("http://127.0.0.1/service.json", 1_000_000)
            .await
            .expect("初始化服务表失败");
        manager.start_client_service().await.expect("启动客户端服务失败");

        let client = library
            .make_protocol_client(manager, spec_for("Service/SystemControl"))
            .await
            .expect("构造协议客户端失败");
        client.register().await.expect("注册握手失败");

        let response = client
            .call(
                PduRequest::system_control(SystemControlOpCode::Activate),
                WAIT_FOREVER_MSEC,
                0.05,
            )
            .await
            .expect("环回调用失败");
        assert_eq!(
            response.and_then(|v| v["message"].as_str().map(str::to_string)),
            Some("activated".to_string())
        );

        // 计数器与调用记录应完整反映上面的动作
        assert_eq!(library.communication_services_created(), 1);
        assert_eq!(library.managers_created(), 1);
        assert_eq!(library.initialize_calls(), 1);
        assert_eq!(library.start_calls(), 1);
        assert_eq!(library.registration_count("Service/SystemControl"), 1);
        let calls = library.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].timeout_msec, WAIT_FOREVER_MSEC);
    }

    #[tokio::test]
    /// 未路由的服务注册握手应失败；注册前调用应被拒绝。
    async fn test_registration_guards() {
        let library = MemoryPduLibrary::new();
        let comm = library.create_communication_service("v2").unwrap();
        let manager = library
            .create_service_manager("TestAsset", "pdu.json", comm, "ws://localhost:8080")
            .unwrap();

        let client = library
            .make_protocol_client(manager, spec_for("Service/Nowhere"))
            .await
            .unwrap();
        let err = client.register().await.expect_err("未路由的服务注册竟然成功了");
        assert!(matches!(err, PduError::RegistrationFailed(_)), "错误类型应为注册失败: {:?}", err);

        let err = client
            .call(PduRequest::drone_land(None), WAIT_FOREVER_MSEC, 0.05)
            .await
            .expect_err("未注册的客户端调用竟然成功了");
        assert!(matches!(err, PduError::Message(_)));
    }

    #[tokio::test]
    /// 注入的启动失败只生效一次，之后恢复正常。
    async fn test_fail_next_start_is_one_shot() {
        let library = MemoryPduLibrary::new();
        let comm = library.create_communication_service("v2").unwrap();
        let manager = library
            .create_service_manager("TestAsset", "pdu.json", comm, "ws://localhost:8080")
            .unwrap();

        library.fail_next_start();
        let err = manager.start_client_service().await.expect_err("注入失败后启动竟然成功了");
        assert!(matches!(err, PduError::StartFailed(_)));

        manager.start_client_service().await.expect("第二次启动应恢复正常");
        assert_eq!(library.start_calls(), 2, "两次启动尝试都应被计数");
    }
}
