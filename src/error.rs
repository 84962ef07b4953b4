//! Error types for attractor simulations.
//!
//! Only configuration can fail. Once a [`Simulation`](crate::Simulation) exists,
//! ticking, resetting and the adaptive controller are total operations.

use std::fmt;

/// Errors that can occur while building a simulation from a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The system name does not match any known attractor.
    UnknownSystem(String),
    /// A simulation needs at least one particle.
    ZeroParticles,
    /// The time step must be finite and strictly positive.
    InvalidTimeStep(f32),
    /// A controller constant is out of range.
    InvalidController(&'static str),
    /// Failed to parse a JSON configuration.
    Parse(serde_json::Error),
    /// Failed to read a configuration file from disk.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownSystem(name) => write!(
                f,
                "Unknown attractor system '{}'. Known systems: {}",
                name,
                crate::SystemKind::names().join(", ")
            ),
            ConfigError::ZeroParticles => write!(f, "Particle count must be at least 1"),
            ConfigError::InvalidTimeStep(dt) => {
                write!(f, "Time step must be finite and positive, got {}", dt)
            }
            ConfigError::InvalidController(msg) => write!(f, "Invalid controller config: {}", msg),
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
            ConfigError::Io(e) => write!(f, "Failed to read configuration file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
