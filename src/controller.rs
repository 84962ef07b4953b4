//! Adaptive particle budget.
//!
//! The controller watches per-tick costs and nudges the number of active
//! particles toward a frame budget. It is a multiplicative hill climber with a
//! hysteresis band, not a PID loop:
//!
//! 1. Every tick cost goes into a FIFO history (30 samples by default).
//! 2. Every 60th recorded tick the mean of the history is compared with the
//!    target frame time (`1000 / target_fps` milliseconds).
//! 3. Above `shrink_threshold × target` the active count is multiplied by
//!    `shrink_factor` (never below the floor). Below `grow_threshold × target`
//!    it is multiplied by `grow_factor` (never above the total).
//! 4. Anything in between holds steady.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = AdaptiveController::new(ControllerConfig::default(), 10_000);
//! for _ in 0..60 {
//!     controller.record_tick(40.0);
//! }
//! assert!(controller.active_count() < 10_000);
//! ```

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Controller constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Frame rate the budget is derived from.
    pub target_fps: f64,
    /// Number of tick costs kept for averaging.
    pub history_capacity: usize,
    /// Ticks between adjustment checks.
    pub check_interval: u64,
    /// Minimum history length before any adjustment.
    pub min_samples: usize,
    /// Shrink when the mean exceeds this multiple of the target.
    pub shrink_threshold: f64,
    /// Grow when the mean is below this multiple of the target.
    pub grow_threshold: f64,
    /// Multiplier applied when shrinking.
    pub shrink_factor: f64,
    /// Multiplier applied when growing.
    pub grow_factor: f64,
    /// Lowest active count the controller will shrink to.
    pub floor: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            history_capacity: 30,
            check_interval: 60,
            min_samples: 10,
            shrink_threshold: 1.2,
            grow_threshold: 0.8,
            shrink_factor: 0.9,
            grow_factor: 1.1,
            floor: 1_000,
        }
    }
}

impl ControllerConfig {
    /// Frame budget in milliseconds.
    #[inline]
    pub fn target_frame_time(&self) -> f64 {
        1000.0 / self.target_fps
    }

    /// Check that the constants describe a working controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(ConfigError::InvalidController("target_fps must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidController("history_capacity must be at least 1"));
        }
        if self.check_interval == 0 {
            return Err(ConfigError::InvalidController("check_interval must be at least 1"));
        }
        if self.floor == 0 {
            return Err(ConfigError::InvalidController("floor must be at least 1"));
        }
        if self.min_samples > self.history_capacity {
            return Err(ConfigError::InvalidController(
                "min_samples cannot exceed history_capacity",
            ));
        }
        if !(self.grow_threshold < self.shrink_threshold) {
            return Err(ConfigError::InvalidController(
                "grow_threshold must be below shrink_threshold",
            ));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(ConfigError::InvalidController("shrink_factor must be in (0, 1)"));
        }
        if !(self.grow_factor > 1.0 && self.grow_factor.is_finite()) {
            return Err(ConfigError::InvalidController("grow_factor must be greater than 1"));
        }
        Ok(())
    }
}

/// Outcome of one controller observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    /// Active count unchanged.
    Hold,
    /// Active count reduced.
    Shrink { from: usize, to: usize },
    /// Active count increased.
    Grow { from: usize, to: usize },
}

/// Hill-climbing controller for the active particle count.
#[derive(Clone, Debug)]
pub struct AdaptiveController {
    config: ControllerConfig,
    history: VecDeque<f64>,
    ticks: u64,
    active: usize,
    total: usize,
    floor: usize,
}

impl AdaptiveController {
    /// Create a controller for a buffer of `total` particles, all active.
    ///
    /// A floor larger than `total` is lowered to `total`. Zero history
    /// capacity, check interval and floor are raised to 1; use
    /// [`ControllerConfig::validate`] to reject such configs instead.
    pub fn new(config: ControllerConfig, total: usize) -> Self {
        let config = ControllerConfig {
            history_capacity: config.history_capacity.max(1),
            check_interval: config.check_interval.max(1),
            floor: config.floor.max(1),
            ..config
        };
        Self {
            history: VecDeque::with_capacity(config.history_capacity),
            ticks: 0,
            active: total,
            total,
            floor: config.floor.min(total),
            config,
        }
    }

    /// Record the cost of one tick in milliseconds.
    ///
    /// Runs [`maybe_adjust`](Self::maybe_adjust) on every `check_interval`-th
    /// call and returns its result; other calls return [`Adjustment::Hold`].
    pub fn record_tick(&mut self, cost_ms: f64) -> Adjustment {
        if self.history.len() == self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(cost_ms);

        self.ticks += 1;
        if self.ticks % self.config.check_interval == 0 {
            self.maybe_adjust()
        } else {
            Adjustment::Hold
        }
    }

    /// Compare the mean cost with the budget and resize if outside the band.
    pub fn maybe_adjust(&mut self) -> Adjustment {
        if self.history.len() < self.config.min_samples {
            return Adjustment::Hold;
        }
        let mean = match self.mean_cost() {
            Some(mean) => mean,
            None => return Adjustment::Hold,
        };
        let target = self.config.target_frame_time();
        let from = self.active;

        if mean > target * self.config.shrink_threshold && self.active > self.floor {
            let scaled = (self.active as f64 * self.config.shrink_factor).floor() as usize;
            // always make progress, even for tiny budgets
            self.active = scaled.min(from - 1).max(self.floor);
            log::debug!(
                "mean tick cost {:.2}ms over budget {:.2}ms, active {} -> {}",
                mean,
                target,
                from,
                self.active
            );
            Adjustment::Shrink { from, to: self.active }
        } else if mean < target * self.config.grow_threshold && self.active < self.total {
            let scaled = (self.active as f64 * self.config.grow_factor).floor() as usize;
            self.active = scaled.max(from + 1).min(self.total);
            log::debug!(
                "mean tick cost {:.2}ms under budget {:.2}ms, active {} -> {}",
                mean,
                target,
                from,
                self.active
            );
            Adjustment::Grow { from, to: self.active }
        } else {
            Adjustment::Hold
        }
    }

    /// Mean of the recorded history, if any.
    pub fn mean_cost(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
        }
    }

    /// Forget the history and tick count.
    ///
    /// With `restore_active` the active count also returns to the total.
    pub fn reset(&mut self, restore_active: bool) {
        self.history.clear();
        self.ticks = 0;
        if restore_active {
            self.active = self.total;
        }
    }

    /// Number of particles to update this tick.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Buffer capacity.
    #[inline]
    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Effective lower bound on the active count.
    #[inline]
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// Ticks recorded since creation or the last reset.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Recorded tick costs, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Number of recorded tick costs.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The constants this controller runs with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
