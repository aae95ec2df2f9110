use std::sync::atomic::{AtomicU64, Ordering};

use thicket_types::Timestamp;

/// Source of `createdAt` / `updatedAt` timestamps for the reducer.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time that never runs backwards.
///
/// If the system clock steps back (NTP adjustment, manual change), the last
/// returned value is repeated until wall time catches up, so an edit can
/// never be stamped earlier than the creation it follows.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_ms: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Timestamp::now().as_millis();
        let previous = self.last_ms.fetch_max(wall, Ordering::AcqRel);
        Timestamp::from_millis(wall.max(previous))
    }
}

/// A clock that only moves when told to. Used by tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            ms: AtomicU64::new(start.as_millis()),
        }
    }

    pub fn set(&self, to: Timestamp) {
        self.ms.store(to.as_millis(), Ordering::Release);
    }

    pub fn advance(&self, by_ms: u64) {
        self.ms.fetch_add(by_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.ms.load(Ordering::Acquire))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
