//! Per-particle state record.
//!
//! The layout is `#[repr(C)]` and [`bytemuck::Pod`] so a renderer can upload
//! the active slice of the buffer without conversion:
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `position` | `Vec3` | Current coordinates |
//! | `previous` | `Vec3` | Coordinates before the last tick (segment start) |
//! | `age` | `u32` | Ticks since spawn or last reset |
//! | `energy` | `f32` | Bounded scalar, only evolved by energy-aware systems |
//! | `instance` | `u32` | Index of the sub-attractor this particle belongs to |

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Energy assigned to particles of systems without an energy model.
pub const NEUTRAL_ENERGY: f32 = 1.0;

/// State of one particle in the simulation buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleState {
    /// Current position.
    pub position: Vec3,
    /// Position before the most recent tick.
    pub previous: Vec3,
    /// Ticks since this particle was last (re)spawned.
    pub age: u32,
    /// Auxiliary energy scalar.
    pub energy: f32,
    /// Sub-attractor instance, fixed for the particle's lifetime.
    pub instance: u32,
}

impl ParticleState {
    /// Create a particle at rest at `position`.
    ///
    /// The previous position equals the current one, so the first drawn
    /// segment has zero length.
    pub fn new(position: Vec3, instance: u32) -> Self {
        Self {
            position,
            previous: position,
            age: 0,
            energy: NEUTRAL_ENERGY,
            instance,
        }
    }

    /// Distance travelled during the last tick.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.position.distance(self.previous)
    }

    /// Move to `position`, remembering the old coordinates.
    #[inline]
    pub(crate) fn advance_to(&mut self, position: Vec3) {
        self.previous = self.position;
        self.position = position;
    }

    /// Teleport to `position` with no trail segment.
    #[inline]
    pub(crate) fn respawn_at(&mut self, position: Vec3) {
        self.position = position;
        self.previous = position;
        self.age = 0;
    }
}
