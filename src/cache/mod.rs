//! 对象缓存模块
//!
//! 通过注册表 + ctor 自动注册的插件机制选择缓存后端：
//! - moka：进程内缓存，默认后端
//! - redis：跨进程共享，多实例部署时使用
//!
//! 启动时按 `cache.type` 配置取插件，失败回退 moka。

pub mod object_cache;
pub mod register;
mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明一个对象缓存插件
///
/// 在模块加载时（main 之前）把构造函数注册进全局注册表，
/// 类型需要提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $cache:ident) => {
        paste::paste! {
            #[ctor::ctor]
            fn [<__register_object_cache_ $cache:snake>]() {
                $crate::cache::register::register_object_cache_plugin(
                    $name,
                    std::sync::Arc::new(|| {
                        Box::pin(async {
                            let cache = $cache::new()
                                .map_err($crate::errors::LPSystemError::cache_connection)?;
                            Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                        })
                    }),
                );
            }
        }
    };
}
