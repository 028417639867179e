// sim_bridge/src/session.rs

//! 核心通信会话。
//!
//! 本模块负责管理桥接层唯一的一条底层通信链路：模块加载、通信
//! 服务与服务管理器的构造、客户端服务的启动，以及按服务名缓存
//! 协议客户端。显式状态机 `Uninitialized → Initializing → Ready`
//! 配合"缓存进行中尝试"的共享 future，保证：
//! - 通信服务与服务管理器在会话生命周期内至多创建并启动一次；
//! - 并发的初始化调用方等待同一次进行中的尝试，而不是各自发起；
//! - 初始化失败时状态回退到未初始化（丢弃半成品），允许之后重试；
//! - 每个服务名至多存在一个协议客户端（进行中的创建同样被缓存）。

use crate::config::{self, BridgeSettings};
use crate::error::BridgeError;
use crate::loader::ModuleLoader;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use log::{debug, info, warn};
use pdu_rpc_utils::{PduLibrary, PduServiceManager, ProtocolClient, ProtocolClientSpec};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// 一次初始化尝试的共享 future。
type InitFuture = Shared<BoxFuture<'static, Result<Arc<SessionCore>, BridgeError>>>;
/// 一次客户端创建（构造 + 注册握手）的共享 future。
type ClientFuture = Shared<BoxFuture<'static, Result<Arc<dyn ProtocolClient>, BridgeError>>>;

/// 会话状态机。
enum SessionPhase {
    /// 尚未初始化（或上次尝试失败后已回退）。
    Uninitialized,
    /// 初始化进行中，后到的调用方克隆并等待同一个 future。
    Initializing { attempt: u64, task: InitFuture },
    /// 初始化完成，底层链路可用。
    Ready(Arc<SessionCore>),
}

/// 已缓存的客户端槽位（可能仍在创建中）。
struct ClientSlot {
    attempt: u64,
    task: ClientFuture,
}

/// 初始化成功后的会话本体：已加载的库、配置与已启动的服务管理器。
pub struct SessionCore {
    settings: Arc<BridgeSettings>,
    library: Arc<dyn PduLibrary>,
    manager: Arc<dyn PduServiceManager>,
    stopped: AtomicBool,
}

impl SessionCore {
    /// 会话使用的成套配置。
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// 请求停止传输。幂等且绝不失败，通常在进程收尾时调用。
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            debug!("[核心会话] 传输已停止过，本次 shutdown 为空操作。");
            return;
        }
        self.manager.stop_service();
        info!("[核心会话] 已请求停止传输。");
    }
}

// 会话本体被丢弃时兜底停止传输（页面离开钩子的 Rust 对应物）。
impl Drop for SessionCore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 核心会话：一条共享通信链路 + 按服务名缓存的协议客户端。
pub struct CoreSession {
    loader: Arc<ModuleLoader>,
    phase: Mutex<SessionPhase>,
    clients: Mutex<HashMap<String, ClientSlot>>,
    attempt_seq: AtomicU64,
}

impl CoreSession {
    pub fn new(loader: Arc<ModuleLoader>) -> Self {
        Self {
            loader,
            phase: Mutex::new(SessionPhase::Uninitialized),
            clients: Mutex::new(HashMap::new()),
            attempt_seq: AtomicU64::new(0),
        }
    }

    /// 初始化底层通信链路（至多成功一次）。
    ///
    /// 已就绪时立即返回；初始化进行中时等待同一次尝试；否则发起
    /// 新的尝试。失败时状态回退到未初始化并把错误抛给调用方，
    /// 之后的调用可以从头重试。
    pub async fn initialize(&self) -> Result<Arc<SessionCore>, BridgeError> {
        let (attempt, task) = {
            let mut phase = self.phase.lock().await;
            match &*phase {
                SessionPhase::Ready(core) => return Ok(core.clone()),
                SessionPhase::Initializing { attempt, task } => (*attempt, task.clone()),
                SessionPhase::Uninitialized => {
                    let attempt = self.attempt_seq.fetch_add(1, Ordering::SeqCst) + 1;
                    info!("[核心会话] 开始第 {} 次初始化尝试。", attempt);
                    let loader = self.loader.clone();
                    let task: InitFuture = bring_up(loader).shared();
                    *phase = SessionPhase::Initializing {
                        attempt,
                        task: task.clone(),
                    };
                    (attempt, task)
                }
            }
        };

        let result = task.await;

        // 结算状态。只有当存储的仍是本次尝试时才改写，避免覆盖
        // 失败回退后已经发起的新尝试。
        let mut phase = self.phase.lock().await;
        let stored_attempt = match &*phase {
            SessionPhase::Initializing { attempt, .. } => Some(*attempt),
            _ => None,
        };
        if stored_attempt == Some(attempt) {
            match &result {
                Ok(core) => {
                    *phase = SessionPhase::Ready(core.clone());
                    info!("[核心会话] 第 {} 次初始化尝试成功，会话就绪。", attempt);
                }
                Err(e) => {
                    *phase = SessionPhase::Uninitialized;
                    warn!(
                        "[核心会话] 第 {} 次初始化尝试失败，状态已回退以允许重试: {}",
                        attempt, e
                    );
                }
            }
        }
        result
    }

    /// 获取（或创建并注册）绑定到 `service_name` 的协议客户端。
    ///
    /// 每个服务名的构造与注册握手至多成功执行一次；并发调用方
    /// 等待同一次进行中的创建。注册失败的槽位会被移除，之后的
    /// 调用可以重试。
    pub async fn create_client(
        &self,
        service_name: &str,
        srv: &str,
        pkg: &str,
    ) -> Result<Arc<dyn ProtocolClient>, BridgeError> {
        let core = self.initialize().await?;

        let (attempt, task) = {
            let mut clients = self.clients.lock().await;
            if let Some(slot) = clients.get(service_name) {
                debug!("[核心会话] 复用服务 '{}' 的已缓存客户端。", service_name);
                (slot.attempt, slot.task.clone())
            } else {
                let attempt = self.attempt_seq.fetch_add(1, Ordering::SeqCst) + 1;
                info!("[核心会话] 为服务 '{}' 创建协议客户端。", service_name);
                let spec = ProtocolClientSpec {
                    service_name: service_name.to_string(),
                    client_name: core.settings().client_name.clone(),
                    srv: srv.to_string(),
                    pkg: pkg.to_string(),
                };
                let core = core.clone();
                let service = service_name.to_string();
                let task: ClientFuture = async move {
                    let client = core
                        .library
                        .make_protocol_client(core.manager.clone(), spec)
                        .await
                        .map_err(|e| BridgeError::Registration(e.to_string()))?;
                    client
                        .register()
                        .await
                        .map_err(|e| BridgeError::Registration(format!("服务 '{}': {}", service, e)))?;
                    Ok(client)
                }
                .boxed()
                .shared();
                clients.insert(
                    service_name.to_string(),
                    ClientSlot {
                        attempt,
                        task: task.clone(),
                    },
                );
                (attempt, task)
            }
        };

        let result = task.await;

        if result.is_err() {
            // 失败的槽位不留在缓存里（仅当它仍是本次尝试时移除）。
            let mut clients = self.clients.lock().await;
            if clients
                .get(service_name)
                .is_some_and(|slot| slot.attempt == attempt)
            {
                clients.remove(service_name);
            }
        }
        result
    }

    /// 尽力而为地停止传输。幂等、绝不失败。
    pub async fn shutdown(&self) {
        let phase = self.phase.lock().await;
        match &*phase {
            SessionPhase::Ready(core) => core.shutdown(),
            _ => debug!("[核心会话] 会话尚未就绪，无传输可停止。"),
        }
    }
}

/// 执行一次完整的初始化：加载模块 → 构造通信服务与服务管理器 →
/// 初始化服务表 → 启动客户端服务。
fn bring_up(loader: Arc<ModuleLoader>) -> BoxFuture<'static, Result<Arc<SessionCore>, BridgeError>> {
    async move {
        let settings = loader.load_settings().await?;
        let library = loader.load_library().await?;

        let comm = library
            .create_communication_service(config::PROTOCOL_VERSION)
            .map_err(|e| BridgeError::Initialization(e.to_string()))?;
        let manager = library
            .create_service_manager(
                &settings.asset_name,
                &settings.pdu_config_url,
                comm,
                &settings.uri,
            )
            .map_err(|e| BridgeError::Initialization(e.to_string()))?;

        manager
            .initialize_services(&settings.service_config_url, settings.delta_time_usec)
            .await
            .map_err(|e| BridgeError::Initialization(e.to_string()))?;
        manager
            .start_client_service()
            .await
            .map_err(|e| BridgeError::Initialization(e.to_string()))?;

        info!(
            "[核心会话] 通信链路已建立 (URI: {}, 资产: {}).",
            settings.uri, settings.asset_name
        );
        Ok(Arc::new(SessionCore {
            settings,
            library,
            manager,
            stopped: AtomicBool::new(false),
        }))
    }
    .boxed()
}
