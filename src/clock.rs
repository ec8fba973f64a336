//! Millisecond timebase for readiness polling and settle delays.
//!
//! All waiting in the driver is a busy-poll bounded by a [`Clock`], which is
//! injected rather than read from a global timer so tests can simulate time
//! deterministically. The production implementation, [`TickClock`], is a
//! plain counter advanced by an external 1 ms periodic callback; see
//! [`crate::pool::DriverPool::tick`].

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::Error;

/// An elapsed-milliseconds counter that can be zeroed at the start of a wait.
pub trait Clock {
    /// Zero the elapsed counter ahead of a bounded wait.
    fn restart(&mut self);

    /// Milliseconds elapsed since the last `restart`.
    fn elapsed_ms(&self) -> u32;
}

/// A source of 1 ms ticks. Implemented by clocks whose counter is advanced
/// externally; the host invokes this once per millisecond, typically from a
/// timer interrupt.
pub trait Tick {
    fn tick(&self);
}

/// The production clock: a counter the host's periodic tick advances.
///
/// The tick callback must only increment counters; it must never call back
/// into the driver, since re-entering a blocking wait from the tick context
/// would deadlock. Load/store (rather than read-modify-write) atomics are
/// used so the type works on targets without atomic RMW support; this is
/// sound for the intended single-tick-writer arrangement.
#[derive(Debug, Default)]
pub struct TickClock {
    elapsed: AtomicU32,
}

impl TickClock {
    pub fn new() -> Self {
        TickClock {
            elapsed: AtomicU32::new(0),
        }
    }
}

impl Clock for TickClock {
    fn restart(&mut self) {
        self.elapsed.store(0, Ordering::Relaxed);
    }

    fn elapsed_ms(&self) -> u32 {
        self.elapsed.load(Ordering::Relaxed)
    }
}

impl Tick for TickClock {
    fn tick(&self) {
        let now = self.elapsed.load(Ordering::Relaxed);
        self.elapsed.store(now.wrapping_add(1), Ordering::Relaxed);
    }
}

/// Poll `ready` until it returns true or `bound_ms` milliseconds elapse.
///
/// The clock is restarted first, so the bound is always measured from the
/// call. The predicate is polled at least once even with a zero bound; a
/// timeout is reported only once the counter reaches the bound, no earlier.
pub fn wait_until<C, F>(clock: &mut C, bound_ms: u32, mut ready: F) -> Result<(), Error>
where
    C: Clock,
    F: FnMut() -> bool,
{
    clock.restart();
    loop {
        if ready() {
            return Ok(());
        }
        if clock.elapsed_ms() >= bound_ms {
            return Err(Error::CommTimeout);
        }
    }
}

/// Busy-wait for a fixed settle time. A bounded wait whose predicate never
/// fires; the timeout is the point, so there is no failure to report.
pub fn delay<C: Clock>(clock: &mut C, ms: u32) {
    let _ = wait_until(clock, ms, || false);
}

#[cfg(test)]
pub(crate) mod testing {
    //! A deterministic clock for unit tests: every `elapsed_ms` poll
    //! advances simulated time by one millisecond.

    use core::cell::Cell;

    use super::{Clock, Tick};

    pub struct SimClock {
        now: Cell<u32>,
    }

    impl SimClock {
        pub fn new() -> Self {
            SimClock { now: Cell::new(0) }
        }
    }

    impl Clock for SimClock {
        fn restart(&mut self) {
            self.now.set(0);
        }

        fn elapsed_ms(&self) -> u32 {
            let now = self.now.get();
            self.now.set(now + 1);
            now
        }
    }

    impl Tick for SimClock {
        fn tick(&self) {
            self.now.set(self.now.get() + 1);
        }
    }
}
