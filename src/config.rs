//! Simulation configuration.
//!
//! A [`SimulationConfig`] names the system and overrides the catalogue
//! defaults. It can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!     "system": "lozi",
//!     "total_count": 15000,
//!     "seed": 7,
//!     "reset_policy": "restore_active_count",
//!     "resonance": true
//! }
//! ```
//!
//! Every field is optional except `system`.

use crate::controller::ControllerConfig;
use crate::error::ConfigError;
use crate::system::{SystemDefinition, SystemKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which cost signal drives the adaptive controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    /// Integration time measured inside [`Simulation::tick`](crate::Simulation::tick).
    #[default]
    Integration,
    /// Frame time reported by the host through
    /// [`Simulation::record_external_frame_cost`](crate::Simulation::record_external_frame_cost).
    External,
}

/// What an explicit reset does to the active particle count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep whatever count the controller has converged to.
    #[default]
    KeepActiveCount,
    /// Go back to the full particle count.
    RestoreActiveCount,
}

/// Everything needed to build a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// System name, matched loosely ("Rössler", "rossler attractor", ...).
    pub system: String,
    /// Buffer capacity. `None` uses the system's default count.
    pub total_count: Option<usize>,
    /// Time step override.
    pub dt: Option<f32>,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Controller constants override. `None` uses the system preset.
    pub controller: Option<ControllerConfig>,
    /// Cost signal fed to the controller.
    pub cost_source: CostSource,
    /// Active count behaviour on reset.
    pub reset_policy: ResetPolicy,
    /// Neighbour coupling, for systems that support it.
    pub swarm: bool,
    /// Resonance waves.
    pub resonance: bool,
    /// Extra fractal term in the parameter drift.
    pub fractal_drift: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            system: String::new(),
            total_count: None,
            dt: None,
            seed: None,
            controller: None,
            cost_source: CostSource::default(),
            reset_policy: ResetPolicy::default(),
            swarm: true,
            resonance: false,
            fractal_drift: true,
        }
    }
}

impl SimulationConfig {
    /// Configuration for `system` with every other field at its default.
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Set the particle capacity.
    pub fn with_total_count(mut self, count: usize) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Override the time step.
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the controller constants.
    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Choose the controller's cost signal.
    pub fn with_cost_source(mut self, source: CostSource) -> Self {
        self.cost_source = source;
        self
    }

    /// Choose what reset does to the active count.
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Enable or disable swarm coupling.
    pub fn with_swarm(mut self, enabled: bool) -> Self {
        self.swarm = enabled;
        self
    }

    /// Enable or disable resonance waves.
    pub fn with_resonance(mut self, enabled: bool) -> Self {
        self.resonance = enabled;
        self
    }

    /// Enable or disable the fractal drift term.
    pub fn with_fractal_drift(mut self, enabled: bool) -> Self {
        self.fractal_drift = enabled;
        self
    }

    /// Check the configuration and resolve it against the catalogue.
    pub fn resolve(&self) -> Result<Resolved, ConfigError> {
        let kind: SystemKind = self.system.parse()?;
        let definition = kind.definition();

        let total = self.total_count.unwrap_or(definition.default_count);
        if total == 0 {
            return Err(ConfigError::ZeroParticles);
        }

        let dt = self.dt.unwrap_or(definition.dt);
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(dt));
        }

        let controller = self.controller.unwrap_or(definition.controller);
        controller.validate()?;

        Ok(Resolved {
            definition,
            total,
            dt,
            controller,
        })
    }
}

/// A validated configuration merged with its catalogue entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// Catalogue entry of the chosen system.
    pub definition: SystemDefinition,
    /// Buffer capacity.
    pub total: usize,
    /// Effective time step.
    pub dt: f32,
    /// Effective controller constants.
    pub controller: ControllerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_catalogue() {
        let resolved = SimulationConfig::new("Ikeda").resolve().unwrap();
        assert_eq!(resolved.total, 12_000);
        assert_eq!(resolved.dt, 0.015);
        assert_eq!(resolved.controller.floor, 2_000);
    }

    #[test]
    fn test_json_partial() {
        let config = SimulationConfig::from_json_str(
            r#"{ "system": "lozi", "total_count": 5000, "reset_policy": "restore_active_count" }"#,
        )
        .unwrap();
        assert_eq!(config.total_count, Some(5_000));
        assert_eq!(config.reset_policy, ResetPolicy::RestoreActiveCount);
        assert_eq!(config.cost_source, CostSource::Integration);
        assert!(config.swarm);
        assert!(!config.resonance);
    }

    #[test]
    fn test_json_controller_override() {
        let config = SimulationConfig::from_json_str(
            r#"{ "system": "chen", "controller": { "floor": 50, "target_fps": 30.0 } }"#,
        )
        .unwrap();
        let controller = config.resolve().unwrap().controller;
        assert_eq!(controller.floor, 50);
        assert_eq!(controller.target_fps, 30.0);
        assert_eq!(controller.history_capacity, 30);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            SimulationConfig::new("lorenz").resolve(),
            Err(ConfigError::UnknownSystem(_))
        ));
        assert!(matches!(
            SimulationConfig::new("chen").with_total_count(0).resolve(),
            Err(ConfigError::ZeroParticles)
        ));
        assert!(matches!(
            SimulationConfig::new("chen").with_dt(-0.1).resolve(),
            Err(ConfigError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_file("/nonexistent/attractors.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
