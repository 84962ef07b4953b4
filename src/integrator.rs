//! One deterministic step over the active particles.
//!
//! For every particle index `i < active` the integrator:
//!
//! 1. bumps the particle's age,
//! 2. advances its position with the system's [`Scheme`] under the current
//!    parameters of its instance,
//! 3. adds resonance and swarm displacements when they are switched on,
//! 4. evolves energy from the raw distance travelled,
//! 5. damps out-of-bounds coordinates with the system's [`Containment`],
//! 6. replaces any non-finite coordinate by its instance origin,
//! 7. stores the old position as `previous`.
//!
//! No randomness is involved: two calls on equal buffers with equal
//! [`Evolution`] state produce bit-identical results. Stochastic resets live
//! in [`Lifecycle::respawn_pass`](crate::lifecycle::Lifecycle::respawn_pass).

use crate::dynamics::{Dynamics, MapContext, Scheme};
use crate::evolution::Evolution;
use crate::interactions::SwarmCoupling;
use crate::lifecycle::Lifecycle;
use crate::particle::ParticleState;
use crate::system::{Containment, SystemDefinition};
use glam::Vec3;

/// Outcome of one [`Integrator::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles advanced this step.
    pub advanced: usize,
    /// Particles with at least one non-finite coordinate that was recovered.
    pub recovered: usize,
}

/// Fixed-step integrator for one system.
#[derive(Clone, Debug)]
pub struct Integrator {
    scheme: Scheme,
    dt: f32,
    containment: Containment,
    lifecycle: Lifecycle,
    swarm: Option<SwarmCoupling>,
    swarm_enabled: bool,
}

impl Integrator {
    /// Integrator for `def` with time step `dt`.
    ///
    /// Swarm coupling is only available to systems that define it (Lozi);
    /// `swarm` says whether it starts switched on.
    pub fn new(def: &SystemDefinition, dt: f32, swarm: bool) -> Self {
        let coupling = match def.dynamics {
            Dynamics::Lozi { .. } => Some(SwarmCoupling::default()),
            _ => None,
        };
        Self {
            scheme: def.dynamics.scheme(),
            dt,
            containment: def.containment,
            lifecycle: def.lifecycle,
            swarm_enabled: swarm && coupling.is_some(),
            swarm: coupling,
        }
    }

    /// Integration scheme in use.
    #[inline]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Time step.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Whether swarm coupling is applied on the next step.
    #[inline]
    pub fn swarm_active(&self) -> bool {
        self.swarm.is_some() && self.swarm_enabled
    }

    /// Switch swarm coupling on or off. No effect on systems without one.
    pub fn set_swarm_enabled(&mut self, enabled: bool) {
        self.swarm_enabled = enabled && self.swarm.is_some();
    }

    /// Advance particles `0..active` by one tick.
    ///
    /// `active` is clamped to the buffer length.
    pub fn step(&self, particles: &mut [ParticleState], active: usize, evolution: &Evolution) -> StepReport {
        let active = active.min(particles.len());
        let swarm = self.swarm.filter(|_| self.swarm_enabled);
        let phase = evolution.phase();
        let mut report = StepReport {
            advanced: active,
            recovered: 0,
        };

        for i in 0..active {
            let p = particles[i];
            let age = p.age.saturating_add(1);
            let instance = evolution.instance(p.instance);
            let old = p.position;

            let mut next = self.advance(&instance.dynamics, old, MapContext { phase, age });
            next += evolution.resonance_offset(old);
            // neighbourhood is measured from where the particle was
            if let Some(swarm) = swarm.filter(|s| s.applies_to(i)) {
                next += swarm.force(particles, i, active, old);
            }

            let energy = self.lifecycle.update_energy(p.energy, next.distance(old));
            let mut contained = self.containment.apply(next, energy);
            if !contained.is_finite() {
                contained = recover(contained, instance.origin);
                report.recovered += 1;
            }

            let p = &mut particles[i];
            p.age = age;
            p.energy = energy;
            p.advance_to(contained);
        }
        report
    }

    /// Raw next state of `s` under `dynamics`, before any extra forces.
    #[inline]
    pub fn advance(&self, dynamics: &Dynamics, s: Vec3, ctx: MapContext) -> Vec3 {
        match self.scheme {
            Scheme::Euler => euler(dynamics, s, self.dt),
            Scheme::Rk4 => rk4(dynamics, s, self.dt),
            Scheme::Map => dynamics.map(s, ctx),
        }
    }
}

/// `s + dt * f(s)`.
#[inline]
pub fn euler(dynamics: &Dynamics, s: Vec3, dt: f32) -> Vec3 {
    s + dynamics.rate(s) * dt
}

/// Classic four-stage Runge-Kutta step.
#[inline]
pub fn rk4(dynamics: &Dynamics, s: Vec3, dt: f32) -> Vec3 {
    let half = dt * 0.5;
    let k1 = dynamics.rate(s);
    let k2 = dynamics.rate(s + k1 * half);
    let k3 = dynamics.rate(s + k2 * half);
    let k4 = dynamics.rate(s + k3 * dt);
    s + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

fn recover(p: Vec3, origin: Vec3) -> Vec3 {
    let pick = |v: f32, o: f32| if v.is_finite() { v } else { o };
    Vec3::new(pick(p.x, origin.x), pick(p.y, origin.y), pick(p.z, origin.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::SpawnContext;
    use crate::system::SystemKind;

    fn setup(kind: SystemKind, count: usize, seed: u64) -> (Integrator, Evolution, Vec<ParticleState>) {
        let def = kind.definition();
        let mut ctx = SpawnContext::new(Some(seed));
        let evolution = Evolution::new(&def, true, false, &mut ctx);
        let integrator = Integrator::new(&def, def.dt, true);
        let particles = (0..count)
            .map(|i| {
                let instance = def.layout.assign(i, count);
                let origin = evolution.instance(instance).origin;
                let mut p = ParticleState::new(ctx.random_in_box(origin, def.seed_extent), instance);
                p.energy = def.lifecycle.initial_energy(&mut ctx);
                p
            })
            .collect();
        (integrator, evolution, particles)
    }

    #[test]
    fn test_euler_matches_formula() {
        let thomas = Dynamics::Thomas { b: 0.208186 };
        let s = Vec3::new(0.5, -1.0, 2.0);
        let expected = Vec3::new(
            0.5 + 0.01 * ((-1.0f32).sin() - 0.208186 * 0.5),
            -1.0 + 0.01 * (2.0f32.sin() + 0.208186),
            2.0 + 0.01 * (0.5f32.sin() - 0.208186 * 2.0),
        );
        assert!((euler(&thomas, s, 0.01) - expected).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_rk4_beats_euler_on_linear_flow() {
        // Rössler with a = b = 0 and z = 0 rotates (x, y) on a circle in the xy plane.
        let rossler = Dynamics::Rossler { a: 0.0, b: 0.0, c: 0.0 };
        let mut e = Vec3::new(1.0, 0.0, 0.0);
        let mut r = e;
        for _ in 0..1_000 {
            e = euler(&rossler, e, 0.01);
            r = rk4(&rossler, r, 0.01);
        }
        let radius = |v: Vec3| Vec3::new(v.x, v.y, 0.0).length();
        assert!((radius(r) - 1.0).abs() < 1e-4);
        assert!((radius(e) - 1.0).abs() > (radius(r) - 1.0).abs());
    }

    #[test]
    fn test_step_is_deterministic() {
        for kind in SystemKind::ALL {
            let (integrator, evolution, particles) = setup(kind, 200, 42);
            let mut a = particles.clone();
            let mut b = particles;
            integrator.step(&mut a, 200, &evolution);
            integrator.step(&mut b, 200, &evolution);
            assert_eq!(bytemuck::cast_slice::<_, u8>(&a[..]), bytemuck::cast_slice::<_, u8>(&b[..]));
        }
    }

    #[test]
    fn test_only_active_particles_move() {
        let (integrator, evolution, mut particles) = setup(SystemKind::Chen, 100, 3);
        let before = particles.clone();
        let report = integrator.step(&mut particles, 40, &evolution);
        assert_eq!(report.advanced, 40);
        assert_eq!(&particles[40..], &before[40..]);
        for (p, old) in particles[..40].iter().zip(&before) {
            assert_eq!(p.previous, old.position);
            assert_eq!(p.age, 1);
        }
    }

    #[test]
    fn test_rossler_rk4_stays_bounded() {
        let (integrator, evolution, mut particles) = setup(SystemKind::Rossler, 500, 7);
        assert_eq!(integrator.scheme(), Scheme::Rk4);
        for _ in 0..1_000 {
            integrator.step(&mut particles, 500, &evolution);
        }
        for p in &particles {
            assert!(p.position.is_finite());
            assert!(p.position.abs().max_element() <= 60.0);
        }
    }

    #[test]
    fn test_lozi_energy_scaled_bound() {
        let (integrator, mut evolution, mut particles) = setup(SystemKind::Lozi, 1_000, 11);
        assert!(integrator.swarm_active());
        for _ in 0..500 {
            evolution.advance();
            integrator.step(&mut particles, 1_000, &evolution);
            for p in &particles {
                assert!(p.position.x.abs() <= 8.0 + p.energy * 2.0);
                assert!(p.position.y.abs() <= 8.0 + p.energy * 2.0);
                assert!((0.2 * 0.999 - 1e-6..=2.0).contains(&p.energy));
            }
        }
    }

    #[test]
    fn test_non_finite_recovered_to_origin() {
        let (integrator, evolution, mut particles) = setup(SystemKind::Chen, 2, 1);
        particles[1].position = Vec3::new(f32::NAN, 1.0, 1.0);
        let report = integrator.step(&mut particles, 2, &evolution);
        assert_eq!(report.recovered, 1);
        assert!(particles[1].position.is_finite());
        assert_eq!(particles[1].position.x, 0.0);
    }

    #[test]
    fn test_swarm_measured_from_old_position() {
        let def = SystemKind::Lozi.definition();
        let mut ctx = SpawnContext::new(Some(5));
        let evolution = Evolution::new(&def, true, false, &mut ctx);
        let coupled = Integrator::new(&def, def.dt, true);
        let free = Integrator::new(&def, def.dt, false);

        // particle 0 samples only index 5 when six are active
        let mut particles = vec![ParticleState::new(Vec3::new(0.0, 40.0, 0.0), 0); 6];
        particles[0] = ParticleState::new(Vec3::ZERO, 0);
        particles[5] = ParticleState::new(Vec3::new(2.5, 0.0, 0.0), 0);
        let before = particles.clone();

        let mut a = particles.clone();
        let mut b = particles;
        coupled.step(&mut a, 6, &evolution);
        free.step(&mut b, 6, &evolution);

        // out of range from the old position, in range from the mapped one
        let swarm = SwarmCoupling::default();
        assert_eq!(swarm.force(&before, 0, 6, Vec3::ZERO), Vec3::ZERO);
        assert_ne!(swarm.force(&before, 0, 6, b[0].position), Vec3::ZERO);
        assert_eq!(a[0].position, b[0].position);
    }

    #[test]
    fn test_swarm_toggle() {
        let (mut lozi, _, _) = setup(SystemKind::Lozi, 1, 1);
        lozi.set_swarm_enabled(false);
        assert!(!lozi.swarm_active());
        lozi.set_swarm_enabled(true);
        assert!(lozi.swarm_active());

        let lozi_off = Integrator::new(&SystemKind::Lozi.definition(), 0.01, false);
        assert!(!lozi_off.swarm_active());
        let mut lozi_on = lozi_off.clone();
        lozi_on.set_swarm_enabled(true);
        assert!(lozi_on.swarm_active());

        let (mut chen, _, _) = setup(SystemKind::Chen, 1, 1);
        chen.set_swarm_enabled(true);
        assert!(!chen.swarm_active());
    }
}
