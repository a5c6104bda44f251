//! Blocking map operation
//!
//! 阻塞映射操作

use super::error::Result;
use super::handle::MappingHandle;
use super::platform;
use super::request::{MapMode, MapRequest};
use super::sys::Region;
use std::fs::{File, OpenOptions};

/// Map a file region, blocking the calling thread
///
/// 映射文件区域，阻塞调用线程
///
/// Offset and length checks run before the file is opened. The file is closed
/// before returning on every path, including errors; the mapping stays valid
/// without it. A file grown by `extend_file` is shrunk back if mapping fails.
///
/// 偏移和长度检查在打开文件之前进行。所有返回路径（包括错误）都会关闭文件；
/// 映射在文件关闭后依然有效。若映射失败，由 `extend_file` 扩展的文件会恢复原长度。
///
/// # Examples
///
/// ```
/// use twin_mmap::{map_sync, MapMode, MapRequest, Result};
/// # use tempfile::tempdir;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("data.bin");
/// # std::fs::write(&path, vec![7u8; 8192])?;
/// let handle = map_sync(&MapRequest::new(&path).mode(MapMode::CopyOnWrite))?;
/// assert_eq!(handle.len(), 8192);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// - `InvalidOffset` / `InvalidLength` / `RegionExceedsFile` for requests that
///   do not fit the file
/// - `NotFound` / `PermissionDenied` / `OsFailure` when opening or mapping fails
///
/// # Errors
/// - 请求与文件不匹配时返回 `InvalidOffset` / `InvalidLength` / `RegionExceedsFile`
/// - 打开或映射失败时返回 `NotFound` / `PermissionDenied` / `OsFailure`
pub fn map_sync(request: &MapRequest) -> Result<MappingHandle> {
    platform::validate(request)?;

    let file = open(request)?;
    let file_len = file.metadata()?.len();
    let params = platform::resolve(request, file_len)?;

    if let Some(new_len) = params.extend_to {
        file.set_len(new_len)?;
    }

    // Safety: params were resolved against this file
    // Safety: params 是针对该文件解析得到的
    let region = match unsafe { Region::map(&file, &params) } {
        Ok(region) => region,
        Err(err) => {
            if params.extend_to.is_some() {
                restore_len(&file, request, file_len);
            }
            return Err(err.into());
        }
    };

    log::debug!(
        "mapped {} bytes of {} at offset {} ({:?})",
        params.len,
        request.path().display(),
        params.offset,
        request.get_mode()
    );

    Ok(MappingHandle::new(
        region,
        request.path().to_path_buf(),
        params.offset,
        request.get_mode(),
    ))
}

/// Undo a file extension after the map call failed
///
/// 映射失败后撤销文件扩展
fn restore_len(file: &File, request: &MapRequest, file_len: u64) {
    if let Err(err) = file.set_len(file_len) {
        log::warn!(
            "failed to restore {} to {} bytes after a failed map: {}",
            request.path().display(),
            file_len,
            err
        );
    }
}

fn open(request: &MapRequest) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    if request.get_mode() == MapMode::ReadWrite {
        options.write(true);
    }
    Ok(options.open(request.path())?)
}
