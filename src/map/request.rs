//! Map request description
//!
//! 映射请求描述

use std::path::{Path, PathBuf};

/// Access mode of a mapping
///
/// 映射的访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapMode {
    /// Read-only, shared with the file
    ///
    /// 只读，与文件共享
    #[default]
    ReadOnly,

    /// Read-write, writes reach the file
    ///
    /// 读写，写入会落到文件
    ReadWrite,

    /// Read-write, private; writes never reach the file
    ///
    /// 读写，私有；写入不会落到文件
    CopyOnWrite,
}

impl MapMode {
    /// Whether views of this mode may be written through
    ///
    /// 此模式的视图是否可写
    #[inline]
    pub fn is_writable(self) -> bool {
        !matches!(self, MapMode::ReadOnly)
    }
}

/// Description of a region of a file to map
///
/// 待映射文件区域的描述
///
/// A `length` of 0 means "to the end of the file".
///
/// `length` 为 0 表示映射到文件末尾。
///
/// # Examples
///
/// ```
/// use twin_mmap::{MapMode, MapRequest};
///
/// let request = MapRequest::new("data.bin")
///     .offset(0)
///     .length(4096)
///     .mode(MapMode::ReadWrite);
/// assert_eq!(request.get_length(), 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapRequest {
    path: PathBuf,
    offset: u64,
    length: u64,
    mode: MapMode,
    #[cfg_attr(feature = "serde", serde(default))]
    extend_file: bool,
}

impl MapRequest {
    /// Request a read-only mapping of the whole file
    ///
    /// 请求只读映射整个文件
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset: 0,
            length: 0,
            mode: MapMode::ReadOnly,
            extend_file: false,
        }
    }

    /// Set the start offset (must be page-aligned)
    ///
    /// 设置起始偏移（必须按页对齐）
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the length in bytes, 0 maps to the end of the file
    ///
    /// 设置长度，0 表示映射到文件末尾
    pub fn length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn mode(mut self, mode: MapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Grow the file when the region exceeds it
    ///
    /// 当范围超出文件时扩展文件
    ///
    /// Only honored for [`MapMode::ReadWrite`].
    ///
    /// 仅对 [`MapMode::ReadWrite`] 生效。
    pub fn extend_file(mut self, extend: bool) -> Self {
        self.extend_file = extend;
        self
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn get_offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn get_length(&self) -> u64 {
        self.length
    }

    #[inline]
    pub fn get_mode(&self) -> MapMode {
        self.mode
    }

    #[inline]
    pub fn extends_file(&self) -> bool {
        self.extend_file
    }
}
