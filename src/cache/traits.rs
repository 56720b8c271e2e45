use async_trait::async_trait;

/// 缓存查询结果
///
/// 区分「不存在」和「存在但取不到值」（连接失败等），
/// 调用方据此决定是否回源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue,
}

/// 字符串键值对象缓存
///
/// 值为序列化后的 JSON 文本，序列化由调用方负责。
/// 写入和删除失败只记录日志，不向上传播：缓存不可用时
/// 业务照常回源。
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;

    /// ttl 单位为秒，0 表示使用后端默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);

    async fn remove(&self, key: &str);

    async fn invalidate_all(&self);
}
