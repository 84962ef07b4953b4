//! # Attractors - chaotic particle integration with an adaptive budget
//!
//! Advances large particle populations through chaotic dynamical systems and
//! sizes the population to a frame budget.
//!
//! The crate is a headless core. A host renderer calls [`Simulation::tick`]
//! once per frame and draws [`Simulation::particles`], a segment from each
//! particle's `previous` to its current `position`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use attractors::prelude::*;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let mut sim = Simulation::initialize("thomas", 10_000)?;
//!     for _ in 0..600 {
//!         sim.tick();
//!         for p in sim.particles() {
//!             // draw p.previous -> p.position
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Systems
//!
//! Every [`SystemKind`] has a catalogue entry ([`SystemDefinition`]) with
//! its parameters, time step, seed box, containment bounds and lifecycle
//! rules. Names are matched loosely, so `"Rössler"`, `"rossler"` and
//! `"rossler attractor"` all work.
//!
//! | Scheme | Systems |
//! |--------|---------|
//! | Euler | Chen, Pickover, Thomas, Zaslavskii |
//! | RK4 | Chua, Rössler |
//! | Map | Hopalong, Ikeda, Lozi, Tinkerbell |
//!
//! ### Instances
//!
//! Ikeda and Lozi split their particles into blocks, one per sub-attractor
//! [`Instance`]. Instance parameters drift slowly with time; see
//! [`evolution`].
//!
//! ### Adaptive budget
//!
//! The full buffer stays allocated, but only the first
//! [`Simulation::active_count`] particles are updated. The
//! [`AdaptiveController`] shrinks or grows that count every 60 ticks based
//! on the mean tick cost. See [`controller`].
//!
//! ### Configuration
//!
//! [`SimulationConfig`] overrides the catalogue and can be loaded from JSON.
//! Only configuration can fail; see [`ConfigError`].

pub mod config;
pub mod controller;
pub mod dynamics;
mod error;
pub mod evolution;
pub mod integrator;
pub mod interactions;
pub mod lifecycle;
mod particle;
mod simulation;
pub mod spawn;
pub mod system;
pub mod time;

pub use bytemuck;
pub use config::{CostSource, ResetPolicy, SimulationConfig};
pub use controller::{AdaptiveController, Adjustment, ControllerConfig};
pub use dynamics::{Dynamics, Scheme};
pub use error::ConfigError;
pub use evolution::{Evolution, Instance};
pub use glam::Vec3;
pub use integrator::{Integrator, StepReport};
pub use lifecycle::Lifecycle;
pub use particle::{ParticleState, NEUTRAL_ENERGY};
pub use simulation::{Simulation, TickReport};
pub use spawn::SpawnContext;
pub use system::{Containment, InstanceLayout, SystemDefinition, SystemKind};
pub use time::TickTimer;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use attractors::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`] - the simulation handle
/// - [`SimulationConfig`] - configuration and its policies
/// - [`SystemKind`] - the system catalogue
/// - [`ParticleState`] - the per-particle record
/// - [`Adjustment`] - controller decisions
/// - [`Vec3`] - glam vector type
pub mod prelude {
    pub use crate::config::{CostSource, ResetPolicy, SimulationConfig};
    pub use crate::controller::{Adjustment, ControllerConfig};
    pub use crate::error::ConfigError;
    pub use crate::particle::ParticleState;
    pub use crate::simulation::{Simulation, TickReport};
    pub use crate::system::SystemKind;
    pub use crate::Vec3;
}
