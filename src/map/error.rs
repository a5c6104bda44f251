//! Error types for twin-mmap
//!
//! twin-mmap 的错误类型

use std::io;
use thiserror::Error;

/// Error type for mapping operations
///
/// 映射操作的错误类型
///
/// Synchronous and asynchronous mapping report failures through the same
/// variants.
///
/// 同步与异步映射使用相同的错误变体。
#[derive(Debug, Error)]
pub enum Error {
    /// The file does not exist
    ///
    /// 文件不存在
    #[error("file not found / 文件不存在")]
    NotFound,

    /// The file could not be opened with the access the mode requires
    ///
    /// 无法以映射模式所需的权限打开文件
    #[error("permission denied / 权限不足")]
    PermissionDenied,

    /// Offset is not a multiple of the page size
    ///
    /// 偏移量不是页大小的整数倍
    #[error("offset {offset} is not aligned to page size {page_size} / 偏移量未按页对齐")]
    InvalidOffset { offset: u64, page_size: u64 },

    /// Nothing to map, or the length does not fit the address space
    ///
    /// 没有可映射的内容，或长度超出地址空间
    #[error("invalid mapping length / 无效的映射长度")]
    InvalidLength,

    /// The requested range ends past the end of the file
    ///
    /// 请求的范围超出文件末尾
    #[error("region end {end} exceeds file length {file_len} / 映射范围超出文件大小")]
    RegionExceedsFile { end: u64, file_len: u64 },

    /// The handle has already been released
    ///
    /// 句柄已被释放
    #[error("mapping already released / 映射已释放")]
    AlreadyReleased,

    /// A write operation was requested on a read-only mapping
    ///
    /// 在只读映射上请求了写操作
    #[error("mapping is read-only / 映射为只读")]
    ReadOnly,

    /// The asynchronous request was cancelled before it was dispatched
    ///
    /// 异步请求在派发前被取消
    #[error("map request cancelled / 映射请求已取消")]
    Cancelled,

    /// Unrecognized OS failure, carrying the raw platform code
    ///
    /// 无法识别的系统错误，携带原始错误码
    #[error("OS failure (code {code}) / 系统错误")]
    OsFailure { code: i32 },

    /// I/O error without a raw OS code
    ///
    /// 不含原始错误码的 I/O 错误
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl Error {
    /// Raw platform code of an [`Error::OsFailure`]
    ///
    /// [`Error::OsFailure`] 的原始错误码
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::OsFailure { code } => Some(*code),
            Error::Io(err) => err.raw_os_error(),
            _ => None,
        }
    }

    /// Translate a raw OS error code
    ///
    /// 转换原始系统错误码
    pub(crate) fn from_os_code(code: i32) -> Self {
        match io::Error::from_raw_os_error(code).kind() {
            io::ErrorKind::NotFound => Error::NotFound,
            io::ErrorKind::PermissionDenied => Error::PermissionDenied,
            _ => Error::OsFailure { code },
        }
    }
}

/// Convert from io::Error to Error
///
/// 从 io::Error 转换到 Error
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Error::from_os_code(code),
            None => match err.kind() {
                io::ErrorKind::NotFound => Error::NotFound,
                io::ErrorKind::PermissionDenied => Error::PermissionDenied,
                _ => Error::Io(err),
            },
        }
    }
}

/// Convert from Error to io::Error for compatibility
///
/// 从 Error 转换到 io::Error 以保持兼容性
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            Error::OsFailure { code } => io::Error::from_raw_os_error(code),
            Error::NotFound => io::Error::new(io::ErrorKind::NotFound, err.to_string()),
            Error::PermissionDenied => {
                io::Error::new(io::ErrorKind::PermissionDenied, err.to_string())
            }
            Error::Cancelled => io::Error::new(io::ErrorKind::Interrupted, err.to_string()),
            Error::InvalidOffset { .. }
            | Error::InvalidLength
            | Error::RegionExceedsFile { .. }
            | Error::AlreadyReleased
            | Error::ReadOnly => io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
        }
    }
}

/// Result type alias using our custom Error type
///
/// 使用自定义 Error 类型的 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;
