//! Asynchronous mapper configuration
//!
//! 异步映射器配置

use std::num::NonZeroUsize;

const FALLBACK_POOL_SIZE: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Configuration of an [`AsyncMapper`](super::AsyncMapper)
///
/// [`AsyncMapper`](super::AsyncMapper) 的配置
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use twin_mmap::MapperConfig;
///
/// let config = MapperConfig::default().with_pool_size(NonZeroUsize::new(2).unwrap());
/// assert_eq!(config.pool_size().get(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapperConfig {
    /// Maximum number of map operations in flight at once
    ///
    /// 同时进行的映射操作的最大数量
    pool_size: NonZeroUsize,
}

impl MapperConfig {
    pub fn with_pool_size(mut self, pool_size: NonZeroUsize) -> Self {
        self.pool_size = pool_size;
        self
    }

    #[inline]
    pub fn pool_size(&self) -> NonZeroUsize {
        self.pool_size
    }
}

/// Pool size defaults to the available parallelism
///
/// 池大小默认为可用并行度
impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            pool_size: std::thread::available_parallelism().unwrap_or(FALLBACK_POOL_SIZE),
        }
    }
}
