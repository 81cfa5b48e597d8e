//! Worker pool used by a single engine call.

use std::num::NonZeroUsize;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;

/// Each worker gets at least this many bytes of source pixels.
const MIN_BYTES_PER_THREAD: usize = 4096;

/// A dedicated rayon pool. Every parallel stage of a call runs inside
/// [`Executor::install`], so the pool size bounds the call's concurrency
/// without touching the global pool.
pub struct Executor {
    pool: ThreadPool,
}

impl Executor {
    /// Builds a pool with `max_threads` workers, or half the available
    /// hardware threads (at least one) when `max_threads` is 0. The count is
    /// capped so that every worker has `MIN_BYTES_PER_THREAD` of the
    /// `work_bytes` to process.
    pub fn new(max_threads: usize, work_bytes: usize) -> Result<Self> {
        let threads = resolve_thread_count(max_threads).min(thread_cap(work_bytes));
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mipflood-{i}"))
            .build()?;

        tracing::debug!(threads, "Worker pool ready");

        Ok(Self { pool })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

fn thread_cap(work_bytes: usize) -> usize {
    (work_bytes / MIN_BYTES_PER_THREAD).max(1)
}

pub fn resolve_thread_count(max_threads: usize) -> usize {
    if max_threads > 0 {
        return max_threads;
    }
    let available = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (available / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_thread_count_is_respected() {
        let executor = Executor::new(3, 1 << 20).unwrap();
        assert_eq!(executor.thread_count(), 3);
        assert_eq!(executor.install(rayon::current_num_threads), 3);
    }

    #[test]
    fn small_work_caps_thread_count() {
        // 4x4 RGBA u8 is 64 bytes
        let executor = Executor::new(64, 64).unwrap();
        assert_eq!(executor.thread_count(), 1);

        let executor = Executor::new(64, 3 * MIN_BYTES_PER_THREAD + 1).unwrap();
        assert_eq!(executor.thread_count(), 3);

        let executor = Executor::new(2, 0).unwrap();
        assert_eq!(executor.thread_count(), 1);
    }

    #[test]
    fn zero_uses_half_the_hardware() {
        let threads = resolve_thread_count(0);
        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        assert!(threads >= 1);
        assert!(threads <= available.max(1));
    }
}
