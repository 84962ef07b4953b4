//! Tick cost measurement.
//!
//! The adaptive controller reacts to how long each tick takes. [`TickTimer`]
//! wraps `std::time::Instant` to measure that cost in milliseconds, and can be
//! pinned to a fixed synthetic cost so controller behaviour is reproducible.
//!
//! # Example
//!
//! ```ignore
//! use attractors::time::TickTimer;
//!
//! let mut timer = TickTimer::new();
//!
//! timer.begin();
//! // ... integrate ...
//! let cost = timer.finish();
//!
//! println!("Tick {}: {:.3}ms", timer.ticks(), cost);
//! ```

use std::time::Instant;

/// Wall-clock timer for simulation ticks.
#[derive(Debug)]
pub struct TickTimer {
    /// Start of the tick being measured.
    tick_start: Instant,
    /// Cost of the last finished tick in milliseconds.
    last_ms: f64,
    /// Sum of all finished tick costs in milliseconds.
    total_ms: f64,
    /// Ticks finished since start.
    tick_count: u64,
    /// Fixed cost reported instead of the measured one (optional).
    fixed_cost: Option<f64>,
}

impl TickTimer {
    /// Create a new timer starting from now.
    pub fn new() -> Self {
        Self {
            tick_start: Instant::now(),
            last_ms: 0.0,
            total_ms: 0.0,
            tick_count: 0,
            fixed_cost: None,
        }
    }

    /// Mark the start of a tick.
    #[inline]
    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Mark the end of a tick and return its cost in milliseconds.
    pub fn finish(&mut self) -> f64 {
        let measured = self.tick_start.elapsed().as_secs_f64() * 1000.0;
        self.last_ms = self.fixed_cost.unwrap_or(measured);
        self.total_ms += self.last_ms;
        self.tick_count += 1;
        self.last_ms
    }

    /// Cost of the last finished tick in milliseconds.
    #[inline]
    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    /// Mean cost over all finished ticks, 0 before the first.
    pub fn mean_ms(&self) -> f64 {
        if self.tick_count == 0 {
            0.0
        } else {
            self.total_ms / self.tick_count as f64
        }
    }

    /// Ticks finished since start.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Report `cost_ms` for every tick instead of measuring.
    ///
    /// Useful for deterministic controller behaviour in tests and benchmarks.
    /// Pass `None` to use real timing.
    pub fn set_fixed_cost(&mut self, cost_ms: Option<f64>) {
        self.fixed_cost = cost_ms.map(|c| c.max(0.0));
    }

    /// Reset counters. A fixed cost stays in place.
    pub fn reset(&mut self) {
        self.tick_start = Instant::now();
        self.last_ms = 0.0;
        self.total_ms = 0.0;
        self.tick_count = 0;
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timer_new() {
        let timer = TickTimer::new();
        assert_eq!(timer.ticks(), 0);
        assert_eq!(timer.mean_ms(), 0.0);
    }

    #[test]
    fn test_timer_measures() {
        let mut timer = TickTimer::new();
        timer.begin();
        thread::sleep(Duration::from_millis(10));
        let cost = timer.finish();

        assert!(cost >= 10.0);
        assert_eq!(timer.ticks(), 1);
        assert_eq!(timer.last_ms(), cost);
    }

    #[test]
    fn test_fixed_cost() {
        let mut timer = TickTimer::new();
        timer.set_fixed_cost(Some(40.0));

        timer.begin();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.finish(), 40.0);

        // Negative cost should clamp to 0
        timer.set_fixed_cost(Some(-1.0));
        timer.begin();
        assert_eq!(timer.finish(), 0.0);
        assert_eq!(timer.mean_ms(), 20.0);
    }

    #[test]
    fn test_reset_keeps_fixed_cost() {
        let mut timer = TickTimer::new();
        timer.set_fixed_cost(Some(3.0));
        timer.begin();
        timer.finish();
        timer.reset();
        assert_eq!(timer.ticks(), 0);
        timer.begin();
        assert_eq!(timer.finish(), 3.0);
    }
}
