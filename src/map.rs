//! Memory-mapped file acquisition
//!
//! 内存映射文件获取
//!
//! Two entry points produce the same [`MappingHandle`]:
//! - [`map_sync`]: blocks the calling thread for the open and map calls
//! - [`map_async`] / [`AsyncMapper::map`]: runs them on a bounded worker pool
//!   and returns a [`MapTask`] future
//!
//! 两个入口产生相同的 [`MappingHandle`]：
//! - [`map_sync`]：在调用线程上阻塞执行打开和映射
//! - [`map_async`] / [`AsyncMapper::map`]：在有界工作池中执行，并返回 [`MapTask`] future
//!
//! Requests are checked by the platform layer first: offsets must be
//! multiples of [`page_size`] and the region must lie inside the file.
//!
//! 请求首先由平台层检查：偏移必须是 [`page_size`] 的整数倍，且范围必须位于文件内。

mod async_mapper;
mod config;
mod error;
mod handle;
pub mod platform;
mod request;
mod sync_mapper;
mod sys;


// Re-export public API
// 重新导出公共 API
pub use async_mapper::{AsyncMapper, MapTask, map_async};
pub use config::MapperConfig;
pub use error::{Error, Result};
pub use handle::MappingHandle;
pub use platform::page_size;
pub use request::{MapMode, MapRequest};
pub use sync_mapper::map_sync;
