//! Translation of map requests into OS mapping parameters
//!
//! 将映射请求转换为系统映射参数

use super::error::{Error, Result};
use super::request::{MapMode, MapRequest};
use std::sync::OnceLock;

/// Memory protection of the mapped pages
///
/// 映射页的内存保护
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Read,
    ReadWrite,
}

/// Whether writes are shared with the file or private to the mapping
///
/// 写入是与文件共享还是映射私有
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    Shared,
    Private,
}

/// OS-level parameters for a single map call
///
/// 单次映射调用的系统级参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformParams {
    /// Page-aligned file offset
    ///
    /// 按页对齐的文件偏移
    pub offset: u64,

    /// Number of bytes to map, never 0
    ///
    /// 映射字节数，不为 0
    pub len: usize,

    pub protection: Protection,
    pub sharing: Sharing,

    /// New file length to set before mapping
    ///
    /// 映射前需要设置的新文件长度
    pub extend_to: Option<u64>,
}

static PAGE_SIZE: OnceLock<u64> = OnceLock::new();

/// Page size (mapping offset granularity) of the current platform
///
/// 当前平台的页大小（映射偏移粒度）
///
/// Queried from the OS on first use and cached for the life of the process.
///
/// 首次使用时向系统查询，之后在进程内缓存。
pub fn page_size() -> u64 {
    *PAGE_SIZE.get_or_init(query_page_size)
}

#[cfg(unix)]
fn query_page_size() -> u64 {
    // Safety: sysconf has no preconditions
    // Safety: sysconf 没有前置条件
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        size if size > 0 => size as u64,
        _ => 4096,
    }
}

// Windows requires view offsets aligned to the allocation granularity, which
// is a fixed 64 KiB on every supported Windows version
// Windows 要求视图偏移按分配粒度对齐，所有受支持的 Windows 版本上均固定为 64 KiB
#[cfg(windows)]
fn query_page_size() -> u64 {
    64 * 1024
}

#[cfg(not(any(unix, windows)))]
fn query_page_size() -> u64 {
    4096
}

/// Translate a mode into protection and sharing flags
///
/// 将模式转换为保护和共享标志
pub fn flags_for(mode: MapMode) -> (Protection, Sharing) {
    match mode {
        MapMode::ReadOnly => (Protection::Read, Sharing::Shared),
        MapMode::ReadWrite => (Protection::ReadWrite, Sharing::Shared),
        MapMode::CopyOnWrite => (Protection::ReadWrite, Sharing::Private),
    }
}

/// Checks that need no access to the file
///
/// 无需访问文件的检查
///
/// # Errors
/// - `InvalidOffset` if the offset is not page-aligned
/// - `InvalidLength` if the length does not fit in `usize`
///
/// # Errors
/// - 偏移未按页对齐时返回 `InvalidOffset`
/// - 长度超出 `usize` 时返回 `InvalidLength`
pub fn validate(request: &MapRequest) -> Result<()> {
    let page_size = page_size();
    let offset = request.get_offset();

    if offset % page_size != 0 {
        return Err(Error::InvalidOffset { offset, page_size });
    }

    if usize::try_from(request.get_length()).is_err() {
        return Err(Error::InvalidLength);
    }

    Ok(())
}

/// Resolve a request against the current length of the file
///
/// 根据文件当前长度解析请求
///
/// # Errors
/// - Everything [`validate`] reports
/// - `InvalidLength` if `length` is 0 and nothing remains past `offset`
/// - `RegionExceedsFile` if the region ends past `file_len`, unless the
///   request is `ReadWrite` with `extend_file` set
///
/// # Errors
/// - [`validate`] 返回的所有错误
/// - `length` 为 0 且 `offset` 之后没有内容时返回 `InvalidLength`
/// - 范围超出 `file_len` 时返回 `RegionExceedsFile`，
///   除非请求为 `ReadWrite` 且设置了 `extend_file`
pub fn resolve(request: &MapRequest, file_len: u64) -> Result<PlatformParams> {
    validate(request)?;

    let offset = request.get_offset();
    let mode = request.get_mode();
    let mut extend_to = None;

    let len = match request.get_length() {
        0 if offset > file_len => {
            return Err(Error::RegionExceedsFile { end: offset, file_len });
        }
        0 if offset == file_len => return Err(Error::InvalidLength),
        0 => file_len - offset,
        length => {
            let end = offset.checked_add(length).ok_or(Error::RegionExceedsFile {
                end: u64::MAX,
                file_len,
            })?;

            if end > file_len {
                if mode == MapMode::ReadWrite && request.extends_file() {
                    extend_to = Some(end);
                } else {
                    return Err(Error::RegionExceedsFile { end, file_len });
                }
            }
            length
        }
    };

    let len = usize::try_from(len).map_err(|_| Error::InvalidLength)?;
    let (protection, sharing) = flags_for(mode);

    Ok(PlatformParams {
        offset,
        len,
        protection,
        sharing,
        extend_to,
    })
}
