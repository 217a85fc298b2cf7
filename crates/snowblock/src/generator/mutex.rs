#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard};

/// Acquires `mutex`, blocking until it is available.
///
/// With the std mutex a poisoned lock is recovered rather than propagated.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    #[cfg(feature = "parking-lot")]
    {
        mutex.lock()
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_gives_exclusive_access() {
        let mutex = Mutex::new(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1_000 {
                        *lock(&mutex) += 1;
                    }
                });
            }
        });
        assert_eq!(*lock(&mutex), 4_000);
    }

    #[cfg(not(feature = "parking-lot"))]
    #[test]
    fn poisoned_lock_is_recovered() {
        let mutex = Mutex::new(1);
        let joined = std::thread::scope(|s| {
            s.spawn(|| {
                let mut guard = lock(&mutex);
                *guard = 2;
                panic!("panic while holding the lock");
            })
            .join()
        });

        assert!(joined.is_err());
        assert!(mutex.is_poisoned());
        assert_eq!(*lock(&mutex), 2);
        *lock(&mutex) = 3;
        assert_eq!(*lock(&mutex), 3);
    }
}
