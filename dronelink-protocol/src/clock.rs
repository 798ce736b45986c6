//! Monotonic time source
//!
//! The receiver never sleeps. It only compares the current reading of a
//! [`Clock`] against the instant the frame's first marker byte arrived.

use core::cell::Cell;

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch
    ///
    /// Must never go backwards.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock driven by the caller
///
/// Useful on hosts that timestamp bytes themselves, and in tests. Share it
/// with a receiver by reference: `Receiver::new(&clock)`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Jump to an absolute reading
    ///
    /// Readings earlier than the current one are ignored.
    pub fn set(&self, now_ms: u64) {
        if now_ms > self.now_ms.get() {
            self.now_ms.set(now_ms);
        }
    }

    /// Move forward by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
