//! OS mapping primitives, selected at compile time
//!
//! 编译期选择的系统映射原语
//!
//! Unix maps through `mmap`/`munmap`/`msync` directly so that unmap failures
//! can be observed. Other targets go through `memmap2`.
//!
//! Unix 直接使用 `mmap`/`munmap`/`msync`，以便观察解除映射的失败。
//! 其他平台通过 `memmap2` 实现。

pub(crate) use imp::Region;

#[cfg(unix)]
mod imp {
    use crate::map::platform::{PlatformParams, Protection, Sharing};
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;
    use std::ptr::{self, NonNull};

    /// A live mapped region
    ///
    /// 一个有效的映射区域
    ///
    /// Has no destructor: the owner must call [`Region::unmap`].
    ///
    /// 没有析构函数：持有者必须调用 [`Region::unmap`]。
    pub(crate) struct Region {
        ptr: NonNull<u8>,
        len: usize,
    }

    // Safety: the region is plain memory; access is synchronized by the owner's borrows
    // Safety: 区域是普通内存，访问由持有者的借用规则同步
    unsafe impl Send for Region {}
    unsafe impl Sync for Region {}

    impl Region {
        /// Map `params.len` bytes of `file` starting at `params.offset`
        ///
        /// 从 `params.offset` 开始映射 `file` 的 `params.len` 字节
        ///
        /// # Safety
        ///
        /// `params` must come from `platform::resolve` against this file, and the
        /// caller accepts that other processes may modify the file underneath
        /// the mapping.
        ///
        /// # Safety
        ///
        /// `params` 必须由 `platform::resolve` 针对该文件生成，
        /// 且调用者接受其他进程可能在映射期间修改文件。
        pub(crate) unsafe fn map(file: &File, params: &PlatformParams) -> io::Result<Self> {
            let prot = match params.protection {
                Protection::Read => libc::PROT_READ,
                Protection::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
            };
            let flags = match params.sharing {
                Sharing::Shared => libc::MAP_SHARED,
                Sharing::Private => libc::MAP_PRIVATE,
            };
            let offset = libc::off_t::try_from(params.offset)
                .map_err(|_| io::Error::from_raw_os_error(libc::EOVERFLOW))?;

            let addr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    params.len,
                    prot,
                    flags,
                    file.as_raw_fd(),
                    offset,
                )
            };
            if addr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }

            match NonNull::new(addr.cast::<u8>()) {
                Some(ptr) => Ok(Self { ptr, len: params.len }),
                None => Err(io::Error::from_raw_os_error(libc::ENOMEM)),
            }
        }

        #[inline]
        pub(crate) fn as_ptr(&self) -> *const u8 {
            self.ptr.as_ptr()
        }

        #[inline]
        pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
            self.ptr.as_ptr()
        }

        #[inline]
        pub(crate) fn len(&self) -> usize {
            self.len
        }

        /// Synchronously write dirty pages back to the file
        ///
        /// 同步将脏页写回文件
        pub(crate) fn flush(&self) -> io::Result<()> {
            let rc = unsafe { libc::msync(self.ptr.as_ptr().cast(), self.len, libc::MS_SYNC) };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        pub(crate) fn unmap(self) -> io::Result<()> {
            let rc = unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::map::platform::{PlatformParams, Protection, Sharing};
    use memmap2::{Mmap, MmapMut, MmapOptions};
    use std::fs::File;
    use std::io;

    enum Inner {
        ReadOnly(Mmap),
        Writable(MmapMut),
    }

    /// A live mapped region
    ///
    /// 一个有效的映射区域
    pub(crate) struct Region {
        inner: Inner,
    }

    impl Region {
        /// # Safety
        ///
        /// See the unix implementation.
        ///
        /// 参见 unix 实现。
        pub(crate) unsafe fn map(file: &File, params: &PlatformParams) -> io::Result<Self> {
            let mut options = MmapOptions::new();
            options.offset(params.offset).len(params.len);

            let inner = unsafe {
                match (params.protection, params.sharing) {
                    (Protection::Read, _) => Inner::ReadOnly(options.map(file)?),
                    (Protection::ReadWrite, Sharing::Shared) => {
                        Inner::Writable(options.map_mut(file)?)
                    }
                    (Protection::ReadWrite, Sharing::Private) => {
                        Inner::Writable(options.map_copy(file)?)
                    }
                }
            };
            Ok(Self { inner })
        }

        #[inline]
        pub(crate) fn as_ptr(&self) -> *const u8 {
            match &self.inner {
                Inner::ReadOnly(mmap) => mmap.as_ptr(),
                Inner::Writable(mmap) => mmap.as_ptr(),
            }
        }

        // Only reached for writable modes; the handle rejects ReadOnly first
        // 仅用于可写模式；句柄会先拒绝只读模式
        #[inline]
        pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
            match &mut self.inner {
                Inner::ReadOnly(mmap) => mmap.as_ptr().cast_mut(),
                Inner::Writable(mmap) => mmap.as_mut_ptr(),
            }
        }

        #[inline]
        pub(crate) fn len(&self) -> usize {
            match &self.inner {
                Inner::ReadOnly(mmap) => mmap.len(),
                Inner::Writable(mmap) => mmap.len(),
            }
        }

        pub(crate) fn flush(&self) -> io::Result<()> {
            match &self.inner {
                Inner::ReadOnly(_) => Ok(()),
                Inner::Writable(mmap) => mmap.flush(),
            }
        }

        // memmap2 unmaps on drop and does not report failures
        // memmap2 在 drop 时解除映射且不报告失败
        pub(crate) fn unmap(self) -> io::Result<()> {
            drop(self.inner);
            Ok(())
        }
    }
}
