//! Simulation handle and tick loop.

use crate::config::{CostSource, ResetPolicy, SimulationConfig};
use crate::controller::{AdaptiveController, Adjustment};
use crate::error::ConfigError;
use crate::evolution::Evolution;
use crate::integrator::Integrator;
use crate::particle::ParticleState;
use crate::spawn::SpawnContext;
use crate::system::{SystemDefinition, SystemKind};
use crate::time::TickTimer;

/// Summary of one [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Particles advanced this tick.
    pub advanced: usize,
    /// Particles whose non-finite coordinates were recovered.
    pub recovered: usize,
    /// Particles thrown back to their instance by a stochastic reset.
    pub respawned: usize,
    /// Measured (or fixed) cost of the update in milliseconds.
    pub cost_ms: f64,
    /// Controller decision, `Hold` unless this tick ended a check interval.
    pub adjustment: Adjustment,
}

/// One running attractor: particle buffer, parameter drift and controller.
///
/// Each handle owns all of its state. Switching systems means building a new
/// handle and dropping the old one.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulation::initialize("rossler", 10_000)?;
/// for _ in 0..600 {
///     sim.tick();
///     draw(sim.particles());
/// }
/// ```
#[derive(Debug)]
pub struct Simulation {
    definition: SystemDefinition,
    particles: Vec<ParticleState>,
    integrator: Integrator,
    evolution: Evolution,
    controller: AdaptiveController,
    spawn: SpawnContext,
    timer: TickTimer,
    cost_source: CostSource,
    reset_policy: ResetPolicy,
    swarm: bool,
}

impl Simulation {
    /// Build a simulation of `system` with `total` particles and default settings.
    pub fn initialize(system: &str, total: usize) -> Result<Self, ConfigError> {
        Self::from_config(&SimulationConfig::new(system).with_total_count(total))
    }

    /// Build a simulation from a full configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        let definition = resolved.definition;

        let mut spawn = SpawnContext::new(config.seed);
        let evolution = Evolution::new(&definition, config.fractal_drift, config.resonance, &mut spawn);
        let integrator = Integrator::new(&definition, resolved.dt, config.swarm);
        let controller = AdaptiveController::new(resolved.controller, resolved.total);

        let mut sim = Self {
            definition,
            particles: Vec::with_capacity(resolved.total),
            integrator,
            evolution,
            controller,
            spawn,
            timer: TickTimer::new(),
            cost_source: config.cost_source,
            reset_policy: config.reset_policy,
            swarm: config.swarm,
        };
        sim.seed_particles(false);

        log::info!(
            "Initialized {} with {} particles ({:?}, dt {}, floor {})",
            sim.definition.kind,
            resolved.total,
            sim.integrator.scheme(),
            resolved.dt,
            sim.controller.floor()
        );
        Ok(sim)
    }

    /// Fill the buffer with fresh particles around their instance origins.
    ///
    /// Initial seeding jitters ages; an explicit reset starts everyone at 0.
    fn seed_particles(&mut self, reset: bool) {
        let total = self.controller.total_count();
        let def = &self.definition;
        let spawn = &mut self.spawn;
        let evolution = &self.evolution;

        self.particles.clear();
        self.particles.extend((0..total).map(|i| {
            let instance = def.layout.assign(i, total);
            let origin = evolution.instance(instance).origin;
            let mut p = ParticleState::new(spawn.random_in_box(origin, def.seed_extent), instance);
            if reset {
                p.energy = def.lifecycle.reset_energy(spawn);
            } else {
                p.age = def.lifecycle.initial_age(spawn);
                p.energy = def.lifecycle.initial_energy(spawn);
            }
            p
        }));
    }

    /// Advance every active particle by one time step.
    ///
    /// Parameter drift runs first, then integration and stochastic resets.
    /// With [`CostSource::Integration`] the measured cost is fed to the
    /// controller, which may resize the active range for the next tick.
    pub fn tick(&mut self) -> TickReport {
        self.evolution.advance();
        let active = self.controller.active_count();

        self.timer.begin();
        let step = self.integrator.step(&mut self.particles, active, &self.evolution);
        let respawned = self.definition.lifecycle.respawn_pass(
            &mut self.particles[..active],
            self.evolution.origins(),
            &mut self.spawn,
        );
        let cost_ms = self.timer.finish();

        if step.recovered > 0 {
            log::warn!(
                "{}: recovered {} particles with non-finite coordinates",
                self.definition.kind,
                step.recovered
            );
        }

        let adjustment = match self.cost_source {
            CostSource::Integration => self.observe(cost_ms),
            CostSource::External => Adjustment::Hold,
        };

        TickReport {
            advanced: step.advanced,
            recovered: step.recovered,
            respawned,
            cost_ms,
            adjustment,
        }
    }

    /// Feed a host-measured frame cost to the controller.
    ///
    /// Only takes effect with [`CostSource::External`]; otherwise the cost
    /// is ignored and `None` is returned.
    pub fn record_external_frame_cost(&mut self, cost_ms: f64) -> Option<Adjustment> {
        match self.cost_source {
            CostSource::External => Some(self.observe(cost_ms)),
            CostSource::Integration => {
                log::warn!(
                    "Ignoring external frame cost {:.2}ms: controller follows integration cost",
                    cost_ms
                );
                None
            }
        }
    }

    fn observe(&mut self, cost_ms: f64) -> Adjustment {
        let adjustment = self.controller.record_tick(cost_ms);
        match adjustment {
            Adjustment::Shrink { .. } => self.integrator.set_swarm_enabled(false),
            Adjustment::Grow { .. } => self.integrator.set_swarm_enabled(self.swarm),
            Adjustment::Hold => {}
        }
        adjustment
    }

    /// Re-seed every particle, redraw instances and forget controller history.
    ///
    /// The active count is kept or restored according to the configured
    /// [`ResetPolicy`].
    pub fn reset(&mut self) {
        self.evolution.reseed(&mut self.spawn);
        self.seed_particles(true);

        let restore = self.reset_policy == ResetPolicy::RestoreActiveCount;
        self.controller.reset(restore);
        if restore {
            self.integrator.set_swarm_enabled(self.swarm);
        }
        self.timer.reset();

        log::info!(
            "Reset {}: {} of {} particles active",
            self.definition.kind,
            self.controller.active_count(),
            self.controller.total_count()
        );
    }

    /// Switch swarm coupling on or off while running.
    ///
    /// While off, a controller grow no longer turns it back on. Systems
    /// without swarm coupling ignore this.
    pub fn set_swarm(&mut self, enabled: bool) {
        self.swarm = enabled;
        self.integrator.set_swarm_enabled(enabled);
    }

    /// Switch resonance waves on or off while running.
    ///
    /// Switching on draws a fresh wave field.
    pub fn set_resonance(&mut self, enabled: bool) {
        if enabled && !self.evolution.resonance() {
            self.evolution.redraw_waves(&mut self.spawn);
        }
        self.evolution.set_resonance(enabled);
    }

    /// Switch the extra fractal drift term on or off while running.
    pub fn set_fractal_drift(&mut self, enabled: bool) {
        self.evolution.set_fractal(enabled);
    }

    /// Particles updated by the last tick, in buffer order.
    pub fn particles(&self) -> &[ParticleState] {
        &self.particles[..self.controller.active_count()]
    }

    /// The whole buffer, including inactive particles.
    pub fn all_particles(&self) -> &[ParticleState] {
        &self.particles
    }

    /// Active particles as raw bytes, ready for a GPU upload.
    pub fn particle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.particles())
    }

    /// Number of particles updated per tick.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.controller.active_count()
    }

    /// Buffer capacity.
    #[inline]
    pub fn total_count(&self) -> usize {
        self.controller.total_count()
    }

    /// Which system is running.
    #[inline]
    pub fn system(&self) -> SystemKind {
        self.definition.kind
    }

    /// Catalogue entry of the running system.
    pub fn definition(&self) -> &SystemDefinition {
        &self.definition
    }

    /// The adaptive controller.
    pub fn controller(&self) -> &AdaptiveController {
        &self.controller
    }

    /// Parameter drift state.
    pub fn evolution(&self) -> &Evolution {
        &self.evolution
    }

    /// The integrator.
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Tick cost timer.
    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    /// Report `cost_ms` as the integration cost of every tick instead of
    /// measuring it. Pass `None` to go back to real timing.
    pub fn set_fixed_cost(&mut self, cost_ms: Option<f64>) {
        self.timer.set_fixed_cost(cost_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn seeded(system: &str, total: usize) -> Simulation {
        Simulation::from_config(&SimulationConfig::new(system).with_total_count(total).with_seed(1)).unwrap()
    }

    #[test]
    fn test_initialize_counts() {
        let sim = seeded("thomas", 2_000);
        assert_eq!(sim.total_count(), 2_000);
        assert_eq!(sim.active_count(), 2_000);
        assert_eq!(sim.particles().len(), 2_000);
        assert_eq!(sim.system(), SystemKind::Thomas);
    }

    #[test]
    fn test_tick_advances_and_ages() {
        let mut sim = seeded("chen", 100);
        let report = sim.tick();
        assert_eq!(report.advanced, 100);
        assert_eq!(report.adjustment, Adjustment::Hold);
        assert!(sim.particles().iter().all(|p| p.age == 1));
        assert!(sim.particles().iter().any(|p| p.position != p.previous));
    }

    #[test]
    fn test_overload_shrinks_and_disables_swarm() {
        let mut sim = seeded("lozi", 5_000);
        sim.set_fixed_cost(Some(100.0));
        assert!(sim.integrator().swarm_active());
        for _ in 0..60 {
            sim.tick();
        }
        assert_eq!(sim.active_count(), 4_250);
        assert!(!sim.integrator().swarm_active());

        let parked = sim.all_particles()[4_250..].to_vec();
        sim.tick();
        assert_eq!(&sim.all_particles()[4_250..], &parked[..]);
    }

    #[test]
    fn test_idle_grows_back_and_reenables_swarm() {
        let mut sim = seeded("lozi", 5_000);
        sim.set_fixed_cost(Some(100.0));
        for _ in 0..60 {
            sim.tick();
        }
        sim.set_fixed_cost(Some(0.0));
        for _ in 0..60 {
            sim.tick();
        }
        assert!(sim.active_count() > 4_250);
        assert!(sim.integrator().swarm_active());
    }

    #[test]
    fn test_swarm_switched_off_stays_off_on_grow() {
        let mut sim = seeded("lozi", 5_000);
        sim.set_swarm(false);
        assert!(!sim.integrator().swarm_active());

        sim.set_fixed_cost(Some(100.0));
        for _ in 0..60 {
            sim.tick();
        }
        sim.set_fixed_cost(Some(0.0));
        for _ in 0..60 {
            sim.tick();
        }
        assert!(sim.active_count() > 4_250);
        assert!(!sim.integrator().swarm_active());

        sim.set_swarm(true);
        assert!(sim.integrator().swarm_active());
    }

    #[test]
    fn test_resonance_toggle_redraws_waves() {
        let mut sim = seeded("lozi", 100);
        let at = Vec3::new(0.4, -0.3, 1.2);
        assert_eq!(sim.evolution().resonance_offset(at), Vec3::ZERO);

        sim.set_resonance(true);
        let first = sim.evolution().resonance_offset(at);
        assert!(first.length() > 0.0);

        // enabling again while on keeps the field
        sim.set_resonance(true);
        assert_eq!(sim.evolution().resonance_offset(at), first);

        sim.set_resonance(false);
        assert_eq!(sim.evolution().resonance_offset(at), Vec3::ZERO);
        sim.set_resonance(true);
        assert_ne!(sim.evolution().resonance_offset(at), first);
    }

    #[test]
    fn test_fractal_drift_toggle() {
        let mut a = seeded("lozi", 100);
        let mut b = seeded("lozi", 100);
        b.set_fractal_drift(false);
        assert!(a.evolution().fractal());
        assert!(!b.evolution().fractal());
        for _ in 0..5 {
            a.tick();
            b.tick();
        }
        assert_ne!(a.evolution().instance(0).dynamics, b.evolution().instance(0).dynamics);
    }

    #[test]
    fn test_particle_bytes_cover_active_slice() {
        let sim = seeded("rossler", 10);
        assert_eq!(sim.particle_bytes().len(), 10 * std::mem::size_of::<ParticleState>());
    }

    #[test]
    fn test_external_cost_ignored_by_default() {
        let mut sim = seeded("chen", 10);
        assert_eq!(sim.record_external_frame_cost(5.0), None);
        assert_eq!(sim.controller().history_len(), 0);
    }
}
