use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::storage::RecordStore;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn RecordStore>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
///
/// 按配置选择后端；redis 连不上或配置的后端不存在时回退到 moka，
/// 认证缓存失效只影响性能，不影响正确性。
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("缓存后端 {} 初始化完成", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => {
                warn!("缓存后端 {} 初始化失败: {}", cache_type, e);
            }
        }
    } else {
        warn!("缓存后端 '{}' 未注册", cache_type);
    }

    // 回退到进程内 moka 缓存
    if cache_type != "moka" {
        if let Some(fallback) = get_object_cache_plugin("moka") {
            match fallback().await {
                Ok(cache) => {
                    warn!("已回退到 moka 进程内缓存");
                    return Ok(Arc::from(cache));
                }
                Err(e) => {
                    warn!("moka 回退缓存初始化失败: {}", e);
                }
            }
        }
    }

    Err(format!("没有可用的缓存后端（已尝试: {cache_type}）").into())
}

/// 准备服务器启动的上下文
/// 包括存储和缓存的初始化
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("存储后端初始化完成，迁移已执行");

    let cache = create_cache().await.expect("Failed to create cache");

    let config = AppConfig::get();
    warn!("仪表盘提供者: {}", config.dashboard.provider);

    StartupContext { storage, cache }
}
