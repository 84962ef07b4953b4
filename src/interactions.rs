//! Forces that couple a particle to something other than its own map.
//!
//! Two optional effects layer on top of the equations of motion:
//!
//! - [`SwarmCoupling`] pulls a sample of particles toward their neighbours in
//!   buffer order. It is the only effect that reads other particles, so it is
//!   also the one the adaptive controller switches off under load.
//! - [`ResonanceWave`]s push every particle along a fixed direction with a
//!   travelling sine, giving a slow global shimmer.
//!
//! # Example
//!
//! ```ignore
//! let swarm = SwarmCoupling::default();
//! let pull = swarm.force(&particles, 0, particles.len(), particles[0].position);
//! ```

use crate::particle::ParticleState;
use crate::spawn::SpawnContext;
use glam::Vec3;

/// Neighbour attraction between particles that sit close in the buffer.
///
/// Every `stride`-th particle samples indices `i - window .. i + window` with
/// step `sample_step`. Each neighbour closer than `radius` contributes
/// `delta * (radius - d) / radius * strength`; contributions are averaged and
/// scaled by `scale` before being added to the new position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwarmCoupling {
    /// Only particles whose index is a multiple of this feel the swarm.
    pub stride: usize,
    /// Half-width of the sampled index window.
    pub window: usize,
    /// Step between sampled neighbours.
    pub sample_step: usize,
    /// Interaction radius.
    pub radius: f32,
    /// Per-neighbour pull strength.
    pub strength: f32,
    /// Scale applied to the averaged force.
    pub scale: f32,
}

impl Default for SwarmCoupling {
    fn default() -> Self {
        Self {
            stride: 10,
            window: 50,
            sample_step: 5,
            radius: 2.0,
            strength: 0.1,
            scale: 0.02,
        }
    }
}

impl SwarmCoupling {
    /// Whether particle `index` takes part in the swarm.
    #[inline]
    pub fn applies_to(&self, index: usize) -> bool {
        self.stride > 0 && index % self.stride == 0
    }

    /// Averaged neighbour pull on the particle at `index`, located at `at`.
    ///
    /// Only indices below `active` are sampled. The returned force is already
    /// multiplied by [`scale`](Self::scale).
    pub fn force(&self, particles: &[ParticleState], index: usize, active: usize, at: Vec3) -> Vec3 {
        let start = index.saturating_sub(self.window);
        let end = (index + self.window).min(active).min(particles.len());
        let step = self.sample_step.max(1);

        let mut force = Vec3::ZERO;
        let mut count = 0u32;
        for j in (start..end).step_by(step) {
            if j == index {
                continue;
            }
            let delta = particles[j].position - at;
            let dist = delta.length();
            if dist < self.radius && dist > 0.0 {
                let weight = (self.radius - dist) / self.radius;
                force += delta * weight * self.strength;
                count += 1;
            }
        }

        if count > 0 {
            force / count as f32 * self.scale
        } else {
            Vec3::ZERO
        }
    }
}

/// Number of waves in a resonance field.
pub const RESONANCE_WAVES: usize = 6;

/// One travelling wave of a resonance field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResonanceWave {
    /// Peak displacement before the 0.1 coupling factor.
    pub amplitude: f32,
    /// Phase advance per tick.
    pub frequency: f32,
    /// Current phase.
    pub phase: f32,
    /// Propagation and push direction (not normalized).
    pub direction: Vec3,
}

impl ResonanceWave {
    /// Draw a random wave.
    pub fn random(ctx: &mut SpawnContext) -> Self {
        Self {
            amplitude: ctx.random_range(0.1, 0.3),
            frequency: ctx.random_range(0.02, 0.08),
            phase: ctx.random_angle(),
            direction: ctx.random_signed_unit_box(),
        }
    }

    /// Draw a full field of [`RESONANCE_WAVES`] waves.
    pub fn field(ctx: &mut SpawnContext) -> Vec<Self> {
        (0..RESONANCE_WAVES).map(|_| Self::random(ctx)).collect()
    }

    /// Advance the phase by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.frequency;
    }

    /// Displacement this wave applies to a particle at `at`.
    #[inline]
    pub fn offset(&self, at: Vec3) -> Vec3 {
        let effect = self.amplitude * (self.phase + at.dot(self.direction)).sin();
        self.direction * effect * 0.1
    }
}
