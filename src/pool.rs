//! A small object pool for reusing scratch buffers.
//!
//! [`Pool`] hands out values wrapped in a [`Pooled`] guard. The guard derefs to
//! the value and gives it back to the pool when dropped. Values are reset when
//! they are acquired, never while another caller could still hold them.
//!
//! Anything that must outlive the guard has to be copied out first: once the
//! guard is gone the pool may give the same value to another caller.
//!
//! ```rust
//! use serde_vdf::pool::Pool;
//!
//! let pool = Pool::new(Vec::<u8>::new, Vec::clear);
//!
//! let bytes = {
//!     let mut buffer = pool.acquire();
//!     buffer.extend_from_slice(b"scratch");
//!     buffer.to_vec()
//! };
//!
//! assert_eq!(bytes, b"scratch");
//! assert_eq!(pool.idle(), 1);
//! assert!(pool.acquire().is_empty());
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, OnceLock};

/// Upper bound on idle values a pool keeps around.
const MAX_IDLE: usize = 64;

/// A thread-safe pool of reusable values.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    create: fn() -> T,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    /// Creates an empty pool. `create` builds new values when none are idle;
    /// `reset` clears a value each time it is acquired.
    pub const fn new(create: fn() -> T, reset: fn(&mut T)) -> Self {
        Pool {
            idle: Mutex::new(Vec::new()),
            create,
            reset,
        }
    }

    /// Takes an idle value, or creates one.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let idle = self.lock().pop();
        let mut value = idle.unwrap_or_else(self.create);
        (self.reset)(&mut value);
        Pooled {
            pool: self,
            value: Some(value),
        }
    }

    /// Number of values currently waiting to be reused.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, value: T) {
        let mut idle = self.lock();
        if idle.len() < MAX_IDLE {
            idle.push(value);
        }
    }

    // A panic while holding the lock cannot leave the Vec half-updated, so a
    // poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A value borrowed from a [`Pool`], returned on drop.
pub struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    value: Option<T>,
}

impl<T> Pooled<'_, T> {
    /// Returns the value to the pool now.
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on drop"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on drop"),
        }
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}

/// The process-wide pool of encoder output buffers.
pub(crate) fn buffers() -> &'static Pool<Vec<u8>> {
    static BUFFERS: OnceLock<Pool<Vec<u8>>> = OnceLock::new();
    BUFFERS.get_or_init(|| Pool::new(|| Vec::with_capacity(1024), Vec::clear))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_values_are_reused_and_reset() {
        let pool = Pool::new(String::new, String::clear);
        {
            let mut value = pool.acquire();
            value.push_str("dirty");
        }
        assert_eq!(pool.idle(), 1);
        let value = pool.acquire();
        assert!(value.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_explicit_release() {
        let pool = Pool::new(Vec::<u8>::new, Vec::clear);
        let value = pool.acquire();
        assert_eq!(pool.idle(), 0);
        value.release();
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_concurrent_acquirers_never_share() {
        let pool = Arc::new(Pool::new(Vec::<u8>::new, Vec::clear));
        let handles: Vec<_> = (0..8u8)
            .map(|id| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let mut buffer = pool.acquire();
                        buffer.extend_from_slice(&[id; 16]);
                        assert!(buffer.iter().all(|&b| b == id));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.idle() <= 8);
    }
}
