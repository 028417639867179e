// sim_bridge/src/loader.rs

//! 外部模块的加载与记忆化。
//!
//! 通信库绑定与配置模块都由 [`ModuleProvider`] 能力接口供给：
//! 生产实现从远端位置获取真实绑定，测试与本地联调注入进程内实现。
//! [`ModuleLoader`] 在提供者之上做记忆化——每个模块在进程内最多
//! 成功加载一次，之后的调用直接返回首次成功的结果；两个模块可
//! 独立重置以便重新加载。
//!
//! 获取位置通过配置解析器按"覆盖 > 偏好 > 默认"确定，并在调用
//! 提供者之前做 URL 校验；加载失败以 `BridgeError::Load` 上抛，
//! 调用方（核心会话）绝不会拿到加载了一半的库。

use crate::config::{self, BridgeSettings, ConfigResolver};
use crate::error::BridgeError;
use async_trait::async_trait;
use log::{debug, info};
use pdu_rpc_utils::PduLibrary;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// 通信库位置的覆盖键（启动参数对应物）。
pub const OVERRIDE_KEY_LIBRARY: &str = "pdu";
/// 通信库位置的持久化偏好键。
pub const PERSISTED_KEY_LIBRARY: &str = "pdu_library_url";
/// 配置模块位置的覆盖键。
pub const OVERRIDE_KEY_SETTINGS: &str = "settings";
/// 配置模块位置的持久化偏好键。
pub const PERSISTED_KEY_SETTINGS: &str = "settings_url";

/// 模块提供能力：给定已解析的位置，交付通信库绑定或配置模块。
#[async_trait]
pub trait ModuleProvider: Send + Sync {
    /// 获取通信库绑定。
    async fn fetch_library(&self, url: &str) -> Result<Arc<dyn PduLibrary>, BridgeError>;

    /// 获取配置模块。
    async fn fetch_settings(&self, url: &str) -> Result<BridgeSettings, BridgeError>;
}

/// 静态注入的模块提供者。
///
/// 宿主在进程内完成真实通信库的绑定后，用本类型把库句柄与配置
/// 直接交给加载器；`bridgetest` 与所有测试也经由它注入环回实现。
pub struct StaticModuleProvider {
    library: Arc<dyn PduLibrary>,
    settings: BridgeSettings,
}

impl StaticModuleProvider {
    pub fn new(library: Arc<dyn PduLibrary>, settings: BridgeSettings) -> Self {
        Self { library, settings }
    }
}

#[async_trait]
impl ModuleProvider for StaticModuleProvider {
    async fn fetch_library(&self, url: &str) -> Result<Arc<dyn PduLibrary>, BridgeError> {
        debug!("[模块加载器] 静态提供者交付通信库绑定 (请求位置: {})", url);
        Ok(self.library.clone())
    }

    async fn fetch_settings(&self, url: &str) -> Result<BridgeSettings, BridgeError> {
        debug!("[模块加载器] 静态提供者交付配置模块 (请求位置: {})", url);
        Ok(self.settings.clone())
    }
}

/// 记忆化的模块加载器。
pub struct ModuleLoader {
    provider: Arc<dyn ModuleProvider>,
    resolver: ConfigResolver,
    library: Mutex<Option<Arc<dyn PduLibrary>>>,
    settings: Mutex<Option<Arc<BridgeSettings>>>,
}

impl ModuleLoader {
    pub fn new(provider: Arc<dyn ModuleProvider>, resolver: ConfigResolver) -> Self {
        Self {
            provider,
            resolver,
            library: Mutex::new(None),
            settings: Mutex::new(None),
        }
    }

    /// 加载通信库绑定（进程内最多成功一次）。
    ///
    /// 持有槽位锁直到加载结束，因此并发调用也只会触发一次获取。
    pub async fn load_library(&self) -> Result<Arc<dyn PduLibrary>, BridgeError> {
        let mut slot = self.library.lock().await;
        if let Some(library) = slot.as_ref() {
            return Ok(library.clone());
        }

        let location = self.resolver.resolve(
            OVERRIDE_KEY_LIBRARY,
            PERSISTED_KEY_LIBRARY,
            config::DEFAULT_LIBRARY_URL,
        );
        validate_location(&location)?;
        info!("[模块加载器] 正在加载通信库绑定: {}", location);

        let library = self.provider.fetch_library(&location).await?;
        *slot = Some(library.clone());
        Ok(library)
    }

    /// 加载配置模块（进程内最多成功一次）。
    pub async fn load_settings(&self) -> Result<Arc<BridgeSettings>, BridgeError> {
        let mut slot = self.settings.lock().await;
        if let Some(settings) = slot.as_ref() {
            return Ok(settings.clone());
        }

        let location = self.resolver.resolve(
            OVERRIDE_KEY_SETTINGS,
            PERSISTED_KEY_SETTINGS,
            config::DEFAULT_SETTINGS_URL,
        );
        validate_location(&location)?;
        info!("[模块加载器] 正在加载配置模块: {}", location);

        let settings = Arc::new(self.provider.fetch_settings(&location).await?);
        *slot = Some(settings.clone());
        Ok(settings)
    }

    /// 清除已加载的通信库，下次加载时重新获取。
    pub async fn reset_library(&self) {
        *self.library.lock().await = None;
        debug!("[模块加载器] 通信库缓存已清除。");
    }

    /// 清除已加载的配置模块。
    pub async fn reset_settings(&self) {
        *self.settings.lock().await = None;
        debug!("[模块加载器] 配置模块缓存已清除。");
    }
}

/// 校验解析出的获取位置是合法 URL。
fn validate_location(location: &str) -> Result<(), BridgeError> {
    Url::parse(location)
        .map(|_| ())
        .map_err(|e| BridgeError::Load(format!("模块位置无效 '{}': {}", location, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdu_rpc_utils::MemoryPduLibrary;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 统计获取次数的提供者，可按开关模拟获取失败。
    struct CountingProvider {
        library: Arc<dyn PduLibrary>,
        fetches: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                library: Arc::new(MemoryPduLibrary::new()),
                fetches: AtomicUsize::new(0),
                fail: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ModuleProvider for CountingProvider {
        async fn fetch_library(&self, _url: &str) -> Result<Arc<dyn PduLibrary>, BridgeError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(BridgeError::Load("模拟的获取失败".to_string()));
            }
            Ok(self.library.clone())
        }

        async fn fetch_settings(&self, _url: &str) -> Result<BridgeSettings, BridgeError> {
            Ok(BridgeSettings::default())
        }
    }

    fn resolver_with(overrides: HashMap<String, String>) -> ConfigResolver {
        // 指向不存在的偏好文件，避免测试机器上的真实偏好干扰
        ConfigResolver::with_prefs_path(overrides, PathBuf::from("/nonexistent/bridge_prefs.json"))
    }

    #[tokio::test]
    /// 重复加载应命中缓存；重置后才重新获取。
    async fn test_library_is_memoized_and_resettable() {
        let provider = Arc::new(CountingProvider::new());
        let loader = ModuleLoader::new(provider.clone(), resolver_with(HashMap::new()));

        loader.load_library().await.expect("首次加载失败");
        loader.load_library().await.expect("二次加载失败");
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1, "缓存命中时不应再次获取");

        loader.reset_library().await;
        loader.load_library().await.expect("重置后加载失败");
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2, "重置后应重新获取一次");
    }

    #[tokio::test]
    /// 获取失败应以 Load 错误上抛，且不留下半加载的缓存。
    async fn test_fetch_failure_propagates_and_leaves_no_cache() {
        let provider = Arc::new(CountingProvider::new());
        provider.fail.store(true, Ordering::SeqCst);
        let loader = ModuleLoader::new(provider.clone(), resolver_with(HashMap::new()));

        let err = loader.load_library().await.err().expect("模拟失败的加载竟然成功了");
        assert!(matches!(err, BridgeError::Load(_)), "错误类型应为模块加载失败: {:?}", err);

        // 解除故障后重试应成功（失败不留缓存）
        provider.fail.store(false, Ordering::SeqCst);
        loader.load_library().await.expect("解除故障后的加载失败");
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    /// 解析出的获取位置不是合法 URL 时，应在调用提供者之前报错。
    async fn test_invalid_location_is_rejected() {
        let provider = Arc::new(CountingProvider::new());
        let mut overrides = HashMap::new();
        overrides.insert(OVERRIDE_KEY_LIBRARY.to_string(), "不是一个URL".to_string());
        let loader = ModuleLoader::new(provider.clone(), resolver_with(overrides));

        let err = loader.load_library().await.err().expect("无效位置的加载竟然成功了");
        assert!(matches!(err, BridgeError::Load(_)));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 0, "不应触发任何获取动作");
    }
}
