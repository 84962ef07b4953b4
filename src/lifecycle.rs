//! Particle aging, energy and stochastic resets.
//!
//! Every particle carries two auxiliary fields:
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `age` | `u32` | Ticks since spawn or last reset |
//! | `energy` | `f32` | Bounded scalar, bumped by speed and slowly decaying |
//!
//! A [`Lifecycle`] decides how those fields start, how energy evolves and when
//! an old particle is thrown back near its instance origin. Resets are
//! independent per particle, so the population never resets in lockstep.
//!
//! # Example
//!
//! ```ignore
//! let lifecycle = Lifecycle {
//!     respawn: Some(Respawn {
//!         min_age: 2_000,
//!         probability: 0.001,
//!         extent: Vec3::splat(2.0),
//!         energy: None,
//!     }),
//!     ..Lifecycle::default()
//! };
//! ```

use crate::particle::{ParticleState, NEUTRAL_ENERGY};
use crate::spawn::SpawnContext;
use glam::Vec3;

/// Speed-driven energy evolution.
///
/// Each tick: `e += (speed - baseline) * gain`, clamp to `[min, max]`,
/// then `e *= decay`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyModel {
    /// Speed at which energy neither rises nor falls (before decay).
    pub baseline_speed: f32,
    /// Energy gained per unit of excess speed.
    pub gain: f32,
    /// Lower clamp.
    pub min: f32,
    /// Upper clamp.
    pub max: f32,
    /// Multiplicative decay applied after clamping.
    pub decay: f32,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            baseline_speed: 0.1,
            gain: 0.01,
            min: 0.2,
            max: 2.0,
            decay: 0.999,
        }
    }
}

impl EnergyModel {
    /// Energy after one tick at `speed`.
    #[inline]
    pub fn update(&self, energy: f32, speed: f32) -> f32 {
        let bumped = energy + (speed - self.baseline_speed) * self.gain;
        bumped.clamp(self.min, self.max) * self.decay
    }
}

/// Stochastic reset of old particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Respawn {
    /// Particles must be strictly older than this to be eligible.
    pub min_age: u32,
    /// Per-tick reset probability of an eligible particle.
    pub probability: f32,
    /// Half-size of the respawn box around the instance origin.
    pub extent: Vec3,
    /// Energy range drawn on respawn. `None` keeps the current energy.
    pub energy: Option<(f32, f32)>,
}

/// Lifecycle rules of a system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifecycle {
    /// Initial ages are drawn from `[0, initial_age_jitter)`.
    pub initial_age_jitter: u32,
    /// Range of initial energies.
    pub initial_energy: (f32, f32),
    /// Energy evolution, if the system has one.
    pub energy: Option<EnergyModel>,
    /// Stochastic reset rule, if the system has one.
    pub respawn: Option<Respawn>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            initial_age_jitter: 0,
            initial_energy: (NEUTRAL_ENERGY, NEUTRAL_ENERGY),
            energy: None,
            respawn: None,
        }
    }
}

impl Lifecycle {
    /// Draw the starting age of a freshly seeded particle.
    pub fn initial_age(&self, ctx: &mut SpawnContext) -> u32 {
        ctx.random_below(self.initial_age_jitter)
    }

    /// Draw the starting energy of a freshly seeded particle.
    pub fn initial_energy(&self, ctx: &mut SpawnContext) -> f32 {
        let (min, max) = self.initial_energy;
        ctx.random_range(min, max)
    }

    /// Energy drawn after an explicit full reset.
    ///
    /// Uses the respawn range when there is one, the initial range otherwise.
    pub fn reset_energy(&self, ctx: &mut SpawnContext) -> f32 {
        match self.respawn.and_then(|r| r.energy) {
            Some((min, max)) => ctx.random_range(min, max),
            None => self.initial_energy(ctx),
        }
    }

    /// Energy after a tick in which the particle moved `speed` units.
    ///
    /// Systems without an energy model, and non-finite speeds, leave the
    /// energy unchanged.
    #[inline]
    pub fn update_energy(&self, energy: f32, speed: f32) -> f32 {
        match self.energy {
            Some(model) if speed.is_finite() => model.update(energy, speed),
            _ => energy,
        }
    }

    /// Give every eligible particle its chance to reset.
    ///
    /// `origins[i]` is the origin of instance `i`. Returns the number of
    /// particles that were reset.
    pub fn respawn_pass(
        &self,
        particles: &mut [ParticleState],
        origins: &[Vec3],
        ctx: &mut SpawnContext,
    ) -> usize {
        let Some(rule) = self.respawn else {
            return 0;
        };

        let mut count = 0;
        for p in particles.iter_mut() {
            if p.age > rule.min_age && ctx.chance(rule.probability) {
                let origin = origins.get(p.instance as usize).copied().unwrap_or(Vec3::ZERO);
                p.respawn_at(ctx.random_in_box(origin, rule.extent));
                if let Some((min, max)) = rule.energy {
                    p.energy = ctx.random_range(min, max);
                }
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_clamps_and_decays() {
        let model = EnergyModel::default();
        let high = model.update(2.0, 100.0);
        assert!((high - 2.0 * 0.999).abs() < 1e-6);

        let low = model.update(0.2, 0.0);
        assert!((low - 0.2 * 0.999).abs() < 1e-6);

        let steady = model.update(1.0, 0.1);
        assert!((steady - 0.999).abs() < 1e-6);
    }

    #[test]
    fn test_update_energy_without_model() {
        let plain = Lifecycle::default();
        assert_eq!(plain.update_energy(1.3, 5.0), 1.3);

        let lozi = Lifecycle {
            energy: Some(EnergyModel::default()),
            ..Lifecycle::default()
        };
        assert_eq!(lozi.update_energy(1.3, f32::NAN), 1.3);
        assert!(lozi.update_energy(1.3, 5.0) > 1.3);
    }

    #[test]
    fn test_young_particles_never_respawn() {
        let lifecycle = Lifecycle {
            respawn: Some(Respawn {
                min_age: 10,
                probability: 1.0,
                extent: Vec3::ONE,
                energy: None,
            }),
            ..Lifecycle::default()
        };
        let mut ctx = SpawnContext::new(Some(1));
        let mut particles = vec![ParticleState::new(Vec3::splat(5.0), 0); 8];
        for p in particles.iter_mut() {
            p.age = 10;
        }
        assert_eq!(lifecycle.respawn_pass(&mut particles, &[Vec3::ZERO], &mut ctx), 0);

        particles[3].age = 11;
        assert_eq!(lifecycle.respawn_pass(&mut particles, &[Vec3::ZERO], &mut ctx), 1);
        assert_eq!(particles[3].age, 0);
        assert!(particles[3].position.abs().max_element() <= 1.0);
        assert_eq!(particles[2].position, Vec3::splat(5.0));
    }

    #[test]
    fn test_respawn_near_instance_origin() {
        let lifecycle = Lifecycle {
            respawn: Some(Respawn {
                min_age: 0,
                probability: 1.0,
                extent: Vec3::new(1.0, 1.0, 2.0),
                energy: Some((0.8, 1.2)),
            }),
            ..Lifecycle::default()
        };
        let origins = [Vec3::ZERO, Vec3::new(10.0, 0.0, -3.0)];
        let mut ctx = SpawnContext::new(Some(9));
        let mut particles = vec![ParticleState::new(Vec3::ZERO, 1); 50];
        for p in particles.iter_mut() {
            p.age = 1;
        }

        assert_eq!(lifecycle.respawn_pass(&mut particles, &origins, &mut ctx), 50);
        for p in &particles {
            let d = (p.position - origins[1]).abs();
            assert!(d.x <= 1.0 && d.y <= 1.0 && d.z <= 2.0);
            assert!((0.8..=1.2).contains(&p.energy));
            assert_eq!(p.position, p.previous);
        }
    }

    #[test]
    fn test_no_rule_no_resets() {
        let mut ctx = SpawnContext::new(Some(2));
        let mut particles = vec![ParticleState::new(Vec3::ZERO, 0); 4];
        for p in particles.iter_mut() {
            p.age = u32::MAX;
        }
        assert_eq!(Lifecycle::default().respawn_pass(&mut particles, &[Vec3::ZERO], &mut ctx), 0);
    }
}
