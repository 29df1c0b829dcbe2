//! Fixed-size pool of [`FindState`]s.
//!
//! Subscribers are registered and unregistered at high frequency (screens
//! appearing and disappearing), so the finder reuses its working state
//! instead of allocating fresh maps for every cache miss. Passes beyond the
//! pool capacity allocate a new state rather than wait.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;
use tracing::trace;

use super::state::FindState;

pub(crate) struct FindStatePool {
    slots: Mutex<Vec<Option<FindState>>>,
}

impl FindStatePool {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            slots: Mutex::new((0..size).map(|_| None).collect()),
        }
    }

    /// Takes a parked state, or allocates one if none is parked.
    pub(crate) fn acquire(&self) -> PooledState<'_> {
        let parked = self.slots.lock().iter_mut().find_map(Option::take);
        let state = parked.unwrap_or_else(|| {
            trace!("No pooled find state available, allocating");
            FindState::default()
        });

        PooledState { pool: self, state }
    }

    /// Clears `state` and parks it in the first free slot, if any.
    fn release(&self, mut state: FindState) {
        state.recycle();
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(state);
        }
    }

    /// Returns the number of parked states.
    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        self.slots.lock().iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns the number of slots.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.lock().len()
    }
}

/// A [`FindState`] borrowed from the pool, returned on drop.
pub(crate) struct PooledState<'a> {
    pool: &'a FindStatePool,
    state: FindState,
}

impl Deref for PooledState<'_> {
    type Target = FindState;

    fn deref(&self) -> &FindState {
        &self.state
    }
}

impl DerefMut for PooledState<'_> {
    fn deref_mut(&mut self) -> &mut FindState {
        &mut self.state
    }
}

impl Drop for PooledState<'_> {
    fn drop(&mut self) {
        // An empty `FindState` owns no allocation.
        self.pool.release(std::mem::take(&mut self.state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_reused() {
        let pool = FindStatePool::new(2);
        assert_eq!(pool.available(), 0);

        drop(pool.acquire());
        assert_eq!(pool.available(), 1);

        let first = pool.acquire();
        assert_eq!(pool.available(), 0);
        drop(first);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_overflow_allocates_and_drops_extra_states() {
        let pool = FindStatePool::new(1);

        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        drop(a);
        drop(b);
        drop(c);

        assert_eq!(pool.available(), pool.capacity());
    }

    #[test]
    fn test_released_state_is_cleared() {
        let pool = FindStatePool::new(1);
        {
            let mut state = pool.acquire();
            state.skip_super_types = true;
            state.subscriber_type = Some(crate::foundation::TypeKey::of::<u8>());
        }

        let state = pool.acquire();
        assert!(state.is_clear());
    }

    #[test]
    fn test_zero_sized_pool_still_works() {
        let pool = FindStatePool::new(0);
        let state = pool.acquire();
        assert!(state.is_clear());
        drop(state);
        assert_eq!(pool.available(), 0);
    }
}
