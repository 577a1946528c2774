//! Per-(room, day) locks serializing check-then-reserve

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type SlotKey = (String, i32);

/// Lazily created async locks keyed by room and day
#[derive(Debug, Default)]
pub struct SlotLocks {
    locks: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(room, day)`; released when the guard drops
    pub async fn acquire(&self, room: &str, day: i32) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry((room.to_string(), day))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Lock every listed day of `room`, in order
    pub async fn acquire_days(
        &self,
        room: &str,
        days: impl IntoIterator<Item = i32>,
    ) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::new();
        for day in days {
            guards.push(self.acquire(room, day).await);
        }
        guards
    }

    /// Drop the idle locks of a removed room
    pub fn forget_room(&self, room: &str) {
        self.locks
            .lock()
            .retain(|(name, _), lock| name != room || Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
