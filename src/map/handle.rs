//! Owned handle to a live mapping
//!
//! 持有有效映射的句柄

use super::error::{Error, Result};
use super::request::MapMode;
use super::sys::Region;
use std::fmt;
use std::path::{Path, PathBuf};

/// Exclusively owned memory-mapped region of a file
///
/// 独占持有的文件内存映射区域
///
/// Created by [`map_sync`](super::map_sync) or [`map_async`](super::map_async).
/// The region is unmapped exactly once, either by [`release`](Self::release)
/// or when the handle is dropped.
///
/// 由 [`map_sync`](super::map_sync) 或 [`map_async`](super::map_async) 创建。
/// 映射区域只会被解除一次：调用 [`release`](Self::release) 或句柄被 drop 时。
///
/// # Features
///
/// - **Borrow-checked views**: [`view`](Self::view) borrows the handle, so a
///   release cannot happen while a view is alive
/// - **Rejected use-after-release**: access after release returns
///   [`Error::AlreadyReleased`] instead of touching unmapped memory
/// - **Independent mappings**: mapping the same file twice yields two handles
///   with separate OS mappings
///
/// # 特性
///
/// - **借用检查的视图**：[`view`](Self::view) 借用句柄，视图存活期间无法释放
/// - **拒绝释放后访问**：释放后的访问返回 [`Error::AlreadyReleased`]，不会访问已解除的内存
/// - **独立映射**：同一文件映射两次得到两个拥有独立系统映射的句柄
///
/// # Shared file contents
///
/// Shared mappings reflect writes made to the file by other processes. The
/// library cannot prevent such writes; callers that need stable contents must
/// coordinate access to the file themselves.
///
/// # 共享文件内容
///
/// 共享映射会反映其他进程对文件的写入。本库无法阻止这类写入，
/// 需要稳定内容的调用者必须自行协调文件访问。
///
/// # Examples
///
/// ```
/// use twin_mmap::{map_sync, Error, MapRequest, Result};
/// # use tempfile::tempdir;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("data.bin");
/// # std::fs::write(&path, b"hello")?;
/// let mut handle = map_sync(&MapRequest::new(&path))?;
/// assert_eq!(handle.view()?, b"hello");
///
/// handle.release();
/// assert!(matches!(handle.view(), Err(Error::AlreadyReleased)));
/// # Ok(())
/// # }
/// ```
pub struct MappingHandle {
    /// `None` once released
    ///
    /// 释放后为 `None`
    region: Option<Region>,
    path: PathBuf,
    offset: u64,
    len: usize,
    mode: MapMode,
}

impl MappingHandle {
    pub(crate) fn new(region: Region, path: PathBuf, offset: u64, mode: MapMode) -> Self {
        let len = region.len();
        Self {
            region: Some(region),
            path,
            offset,
            len,
            mode,
        }
    }

    /// Borrow the mapped bytes
    ///
    /// 借用映射的字节
    ///
    /// # Errors
    /// Returns `AlreadyReleased` after [`release`](Self::release)
    ///
    /// # Errors
    /// 调用 [`release`](Self::release) 后返回 `AlreadyReleased`
    pub fn view(&self) -> Result<&[u8]> {
        let region = self.region.as_ref().ok_or(Error::AlreadyReleased)?;

        // Safety: the region stays mapped while `self` is borrowed; release needs `&mut self`
        // Safety: 借用 `self` 期间区域保持映射；释放需要 `&mut self`
        Ok(unsafe { std::slice::from_raw_parts(region.as_ptr(), region.len()) })
    }

    /// Mutably borrow the mapped bytes
    ///
    /// 可变借用映射的字节
    ///
    /// Writes through a [`MapMode::ReadWrite`] view reach the file; writes
    /// through a [`MapMode::CopyOnWrite`] view stay private to this handle.
    ///
    /// 通过 [`MapMode::ReadWrite`] 视图的写入会落到文件；
    /// 通过 [`MapMode::CopyOnWrite`] 视图的写入仅对本句柄可见。
    ///
    /// # Errors
    /// - `AlreadyReleased` after release
    /// - `ReadOnly` for [`MapMode::ReadOnly`] mappings
    ///
    /// # Errors
    /// - 释放后返回 `AlreadyReleased`
    /// - [`MapMode::ReadOnly`] 映射返回 `ReadOnly`
    pub fn view_mut(&mut self) -> Result<&mut [u8]> {
        let mode = self.mode;
        let region = self.region.as_mut().ok_or(Error::AlreadyReleased)?;
        if !mode.is_writable() {
            return Err(Error::ReadOnly);
        }

        // Safety: the region is mapped writable and exclusively borrowed
        // Safety: 区域以可写方式映射且被独占借用
        Ok(unsafe { std::slice::from_raw_parts_mut(region.as_mut_ptr(), region.len()) })
    }

    /// Write modified pages of a `ReadWrite` mapping back to the file
    ///
    /// 将 `ReadWrite` 映射中修改的页写回文件
    ///
    /// A no-op for `CopyOnWrite`, whose writes never reach the file.
    ///
    /// 对 `CopyOnWrite` 为空操作，其写入不会落到文件。
    pub fn flush(&self) -> Result<()> {
        let region = self.region.as_ref().ok_or(Error::AlreadyReleased)?;
        match self.mode {
            MapMode::ReadOnly => Err(Error::ReadOnly),
            MapMode::CopyOnWrite => Ok(()),
            MapMode::ReadWrite => Ok(region.flush()?),
        }
    }

    /// Unmap the region
    ///
    /// 解除映射
    ///
    /// Idempotent: only the first call unmaps, later calls do nothing. On unix
    /// an unmap failure is logged and not returned; on other targets the
    /// underlying `memmap2` mapping does not report unmap failures at all.
    ///
    /// 幂等：只有第一次调用会解除映射，之后的调用不做任何事。
    /// 在 unix 上解除映射失败只记录日志，不返回错误；
    /// 在其他平台上底层的 `memmap2` 映射不会报告解除映射失败。
    pub fn release(&mut self) {
        let Some(region) = self.region.take() else {
            return;
        };

        match region.unmap() {
            Ok(()) => log::debug!(
                "unmapped {} bytes of {} at offset {}",
                self.len,
                self.path.display(),
                self.offset
            ),
            Err(err) => log::warn!(
                "failed to unmap {} bytes of {} at offset {}: {}",
                self.len,
                self.path.display(),
                self.offset,
                err
            ),
        }
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.region.is_none()
    }

    /// Length of the mapping in bytes
    ///
    /// 映射长度（字节）
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn mode(&self) -> MapMode {
        self.mode
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MappingHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for MappingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingHandle")
            .field("path", &self.path)
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("mode", &self.mode)
            .field("released", &self.is_released())
            .finish()
    }
}
