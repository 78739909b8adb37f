//! Pooled offscreen render targets.
//!
//! Offscreen targets are a shared resource: leaking one starves the
//! pool. [`TargetPool::with_target`] scopes the acquisition to a
//! closure so release happens on every exit path, including error
//! returns. The pool is generic over the resource type, which keeps
//! the accounting testable without a GPU device.

use std::collections::HashMap;
use tracing::trace;

/// Acquire/release accounting, exposed for leak checks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total acquisitions served.
    pub acquired: u64,
    /// Total targets returned to the pool.
    pub released: u64,
    /// Targets created because no pooled one matched.
    pub created: u64,
}

impl PoolStats {
    /// True when every acquired target has been returned.
    pub fn balanced(&self) -> bool {
        self.acquired == self.released
    }
}

/// A free-list of reusable targets keyed by size.
pub struct TargetPool<T> {
    free: HashMap<(u32, u32), Vec<T>>,
    stats: PoolStats,
}

impl<T> TargetPool<T> {
    pub fn new() -> Self {
        Self {
            free: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Run `f` with a target of the given size, creating one through
    /// `create` if the pool has none. The target returns to the pool
    /// whether `f` succeeds or fails.
    pub fn with_target<R, E>(
        &mut self,
        size: (u32, u32),
        create: impl FnOnce((u32, u32)) -> Result<T, E>,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut target = match self.free.get_mut(&size).and_then(|list| list.pop()) {
            Some(target) => {
                trace!("Reusing pooled {}x{} target", size.0, size.1);
                target
            }
            None => {
                trace!("Creating {}x{} target", size.0, size.1);
                let target = create(size)?;
                self.stats.created += 1;
                target
            }
        };
        self.stats.acquired += 1;

        let result = f(&mut target);

        self.free.entry(size).or_default().push(target);
        self.stats.released += 1;

        result
    }
}

impl<T> Default for TargetPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Dummy(u32, u32);

    fn make(size: (u32, u32)) -> Result<Dummy, String> {
        Ok(Dummy(size.0, size.1))
    }

    #[test]
    fn test_release_on_success() {
        let mut pool = TargetPool::new();
        let out: Result<i32, String> = pool.with_target((224, 224), make, |_t| Ok(7));
        assert_eq!(out.unwrap(), 7);
        assert!(pool.stats().balanced());
        assert_eq!(pool.stats().acquired, 1);
    }

    #[test]
    fn test_release_on_failure() {
        let mut pool = TargetPool::new();
        let out: Result<i32, String> =
            pool.with_target((224, 224), make, |_t| Err("readback failed".to_string()));
        assert!(out.is_err());
        // The target is not leaked on the error path.
        assert!(pool.stats().balanced());
        assert_eq!(pool.stats().acquired, 1);
        assert_eq!(pool.stats().released, 1);
    }

    #[test]
    fn test_targets_reused_per_size() {
        let mut pool = TargetPool::new();
        for _ in 0..5 {
            let _: Result<(), String> = pool.with_target((224, 224), make, |_t| Ok(()));
        }
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().acquired, 5);
        assert!(pool.stats().balanced());
    }

    #[test]
    fn test_distinct_sizes_get_distinct_targets() {
        let mut pool = TargetPool::new();
        let _: Result<(), String> = pool.with_target((224, 224), make, |t| {
            assert_eq!(*t, Dummy(224, 224));
            Ok(())
        });
        let _: Result<(), String> = pool.with_target((512, 256), make, |t| {
            assert_eq!(*t, Dummy(512, 256));
            Ok(())
        });
        assert_eq!(pool.stats().created, 2);
    }

    #[test]
    fn test_failed_create_acquires_nothing() {
        let mut pool: TargetPool<Dummy> = TargetPool::new();
        let out: Result<(), String> = pool.with_target(
            (64, 64),
            |_| Err("out of memory".to_string()),
            |_t| Ok(()),
        );
        assert!(out.is_err());
        assert_eq!(pool.stats().acquired, 0);
        assert_eq!(pool.stats().released, 0);
        assert!(pool.stats().balanced());
    }
}
