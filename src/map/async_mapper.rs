//! Non-blocking map operation backed by a bounded worker pool
//!
//! 基于有界工作池的非阻塞映射操作

use super::config::MapperConfig;
use super::error::{Error, Result};
use super::handle::MappingHandle;
use super::platform;
use super::request::MapRequest;
use super::sync_mapper::map_sync;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll, ready};
use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

const QUEUED: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;

static DEFAULT_PERMITS: OnceLock<Arc<Semaphore>> = OnceLock::new();

/// Dispatch state shared between a [`MapTask`] and its spawned work
///
/// [`MapTask`] 与其派发任务共享的派发状态
struct Dispatch {
    stage: AtomicU8,
    cancelled: Notify,
}

impl Dispatch {
    fn new() -> Self {
        Self {
            stage: AtomicU8::new(QUEUED),
            cancelled: Notify::new(),
        }
    }

    /// Move from queued to running; fails if cancelled first
    ///
    /// 从排队进入运行；若已取消则失败
    fn start(&self) -> bool {
        self.stage
            .compare_exchange(QUEUED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn cancel(&self) -> bool {
        let cancelled = self
            .stage
            .compare_exchange(QUEUED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            // notify_one stores a permit when nobody is waiting yet
            // 无人等待时 notify_one 会保存一个许可
            self.cancelled.notify_one();
        }
        cancelled
    }

    fn is_running(&self) -> bool {
        self.stage.load(Ordering::Acquire) == RUNNING
    }
}

/// Dispatches blocking map operations to the runtime's blocking pool
///
/// 将阻塞的映射操作派发到运行时的阻塞线程池
///
/// At most [`MapperConfig::pool_size`] operations run at once per mapper (and
/// its clones); further requests wait for a slot. Requests are independent and
/// complete in no particular order.
///
/// 每个映射器（及其克隆）最多同时运行 [`MapperConfig::pool_size`] 个操作，
/// 其余请求等待空位。请求之间相互独立，完成顺序不确定。
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use twin_mmap::{AsyncMapper, MapRequest, MapperConfig, Result};
/// # use tempfile::tempdir;
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("data.bin");
/// # std::fs::write(&path, vec![1u8; 4096])?;
/// let config = MapperConfig::default().with_pool_size(NonZeroUsize::new(2).unwrap());
/// let mapper = AsyncMapper::new(tokio::runtime::Handle::current(), config);
///
/// let handle = mapper.map(MapRequest::new(&path)).await?;
/// assert_eq!(handle.len(), 4096);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncMapper {
    runtime: Handle,
    permits: Arc<Semaphore>,
    config: MapperConfig,
}

impl AsyncMapper {
    /// Create a mapper with its own pool of `config.pool_size()` slots
    ///
    /// 创建拥有 `config.pool_size()` 个空位的映射器
    pub fn new(runtime: Handle, config: MapperConfig) -> Self {
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(config.pool_size().get())),
            config,
        }
    }

    /// Mapper on the current runtime sharing the process-wide default pool
    ///
    /// 使用当前运行时并共享进程级默认池的映射器
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    ///
    /// # Panics
    /// 在 Tokio 运行时之外调用会 panic。
    pub fn current() -> Self {
        let config = MapperConfig::default();
        let permits = DEFAULT_PERMITS
            .get_or_init(|| Arc::new(Semaphore::new(config.pool_size().get())))
            .clone();
        Self {
            runtime: Handle::current(),
            permits,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Start mapping `request` without blocking the caller
    ///
    /// 开始映射 `request`，不阻塞调用者
    ///
    /// Requests that fail offset or length validation resolve immediately
    /// without spawning any work.
    ///
    /// 未通过偏移或长度校验的请求会立即完成，不派发任何任务。
    pub fn map(&self, request: MapRequest) -> MapTask {
        if let Err(err) = platform::validate(&request) {
            return MapTask::ready(Err(err));
        }

        let dispatch = Arc::new(Dispatch::new());
        let state = Arc::clone(&dispatch);
        let permits = Arc::clone(&self.permits);

        let join = self.runtime.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = state.cancelled.notified() => return Err(Error::Cancelled),
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Err(Error::Cancelled),
                },
            };

            if !state.start() {
                return Err(Error::Cancelled);
            }
            log::trace!("dispatching map of {}", request.path().display());

            let outcome = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                map_sync(&request)
            })
            .await;

            match outcome {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => Err(Error::Cancelled),
            }
        });

        MapTask {
            inner: TaskInner::Spawned(join),
            dispatch: Some(dispatch),
        }
    }
}

/// Map `request` on the current runtime using the default pool
///
/// 在当前运行时上使用默认池映射 `request`
///
/// # Examples
///
/// ```
/// use twin_mmap::{map_async, Error, MapRequest};
/// # #[tokio::main]
/// # async fn main() {
/// let result = map_async(MapRequest::new("/definitely/not/here")).await;
/// assert!(matches!(result, Err(Error::NotFound)));
/// # }
/// ```
///
/// # Panics
/// Panics when called outside a Tokio runtime.
///
/// # Panics
/// 在 Tokio 运行时之外调用会 panic。
pub fn map_async(request: MapRequest) -> MapTask {
    AsyncMapper::current().map(request)
}

enum TaskInner {
    Ready(Option<Result<MappingHandle>>),
    Spawned(JoinHandle<Result<MappingHandle>>),
}

/// Pending result of an asynchronous map
///
/// 异步映射的待定结果
///
/// Resolves exactly once, to a [`MappingHandle`] or to an [`Error`] from the
/// same set [`map_sync`] returns, plus [`Error::Cancelled`]. Dropping an
/// unresolved task cancels it if its work has not been dispatched yet.
///
/// 只会完成一次，结果为 [`MappingHandle`] 或与 [`map_sync`] 相同的 [`Error`]，
/// 另加 [`Error::Cancelled`]。未完成的任务被 drop 时，若尚未派发则会被取消。
#[must_use = "futures do nothing unless awaited"]
pub struct MapTask {
    inner: TaskInner,
    dispatch: Option<Arc<Dispatch>>,
}

impl MapTask {
    fn ready(result: Result<MappingHandle>) -> Self {
        Self {
            inner: TaskInner::Ready(Some(result)),
            dispatch: None,
        }
    }

    /// Cancel the task if its work has not been dispatched
    ///
    /// 若任务尚未派发则取消
    ///
    /// Returns `true` if the work will not run; the task then resolves to
    /// [`Error::Cancelled`]. Returns `false` once the open and map calls have
    /// started, since they cannot be interrupted.
    ///
    /// 返回 `true` 表示任务不会运行，之后结果为 [`Error::Cancelled`]。
    /// 一旦打开和映射调用已经开始则返回 `false`，因为它们无法被中断。
    pub fn cancel(&self) -> bool {
        let cancelled = self.dispatch.as_ref().is_some_and(|d| d.cancel());
        if cancelled {
            log::trace!("map task cancelled before dispatch");
        }
        cancelled
    }

    /// Whether the blocking work has started
    ///
    /// 阻塞任务是否已经开始
    pub fn is_dispatched(&self) -> bool {
        self.dispatch.as_ref().is_some_and(|d| d.is_running())
    }
}

impl Future for MapTask {
    type Output = Result<MappingHandle>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            TaskInner::Ready(result) => {
                Poll::Ready(result.take().expect("MapTask polled after completion"))
            }
            TaskInner::Spawned(join) => match ready!(Pin::new(join).poll(cx)) {
                Ok(result) => Poll::Ready(result),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => Poll::Ready(Err(Error::Cancelled)),
            },
        }
    }
}

impl Drop for MapTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
