//! Memory-mapped file access with blocking and asynchronous entry points
//!
//! 提供阻塞与异步入口的内存映射文件访问
//!
//! # Features
//!
//! - **Two entry points, one result**: [`map_sync`] and [`map_async`] return the
//!   same [`MappingHandle`] and the same [`Error`] variants
//! - **Release exactly once**: a handle unmaps on [`MappingHandle::release`] or on
//!   drop, whichever comes first
//! - **No use-after-unmap**: views of a released handle return
//!   [`Error::AlreadyReleased`]
//! - **Bounded concurrency**: asynchronous requests share a fixed number of
//!   worker slots
//!
//! # 特性
//!
//! - **两个入口，一种结果**：[`map_sync`] 与 [`map_async`] 返回相同的
//!   [`MappingHandle`] 和相同的 [`Error`] 变体
//! - **只释放一次**：句柄在 [`MappingHandle::release`] 或 drop 时解除映射
//! - **不会访问已解除的映射**：已释放句柄的视图返回 [`Error::AlreadyReleased`]
//! - **有界并发**：异步请求共享固定数量的工作空位
//!
//! # Quick Start
//!
//! ```
//! use twin_mmap::{map_async, map_sync, MapMode, MapRequest, Result};
//! # use tempfile::tempdir;
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! # let dir = tempdir()?;
//! # let path = dir.path().join("data.bin");
//! # std::fs::write(&path, vec![42u8; 4096])?;
//!
//! // Blocking
//! // 阻塞
//! let handle = map_sync(&MapRequest::new(&path))?;
//! assert_eq!(handle.view()?.len(), 4096);
//!
//! // Non-blocking
//! // 非阻塞
//! let handle = map_async(MapRequest::new(&path).mode(MapMode::CopyOnWrite)).await?;
//! assert!(handle.view()?.iter().all(|&b| b == 42));
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`MapRequest`]: Path, offset, length and [`MapMode`] of a mapping
//! - [`MappingHandle`]: Owned live mapping
//! - [`AsyncMapper`]: Worker pool for asynchronous requests
//! - [`MapTask`]: Future of an asynchronous request
//!
//! # 主要类型
//!
//! - [`MapRequest`]：映射的路径、偏移、长度与 [`MapMode`]
//! - [`MappingHandle`]：持有的有效映射
//! - [`AsyncMapper`]：异步请求的工作池
//! - [`MapTask`]：异步请求的 future

mod map;

pub use map::{
    AsyncMapper, Error, MapMode, MapRequest, MapTask, MapperConfig, MappingHandle, Result,
    map_async, map_sync, page_size, platform,
};
