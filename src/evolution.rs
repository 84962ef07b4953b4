//! Slow, time-driven change of attractor parameters.
//!
//! Multi-instance systems (Ikeda, Lozi) split their particles across several
//! sub-attractors. Each [`Instance`] has its own origin and phase, and its
//! parameters drift sinusoidally around the system's nominal values as the
//! evolution clock advances. [`Evolution::advance`] runs once per tick, before
//! any particle is integrated, so every particle of a tick sees the same
//! parameters.
//!
//! Single-instance systems get one fixed instance at the origin and a clock
//! that never moves.

use crate::dynamics::Dynamics;
use crate::interactions::ResonanceWave;
use crate::spawn::SpawnContext;
use crate::system::{InstanceLayout, SystemDefinition};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Drift ranges of the Ikeda instances.
const IKEDA_RANGE: [f32; 4] = [0.5, 0.3, 0.6, 4.0];
/// Drift ranges of the Lozi layers.
const LOZI_RANGE: [f32; 2] = [0.8, 0.4];

/// One sub-attractor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    /// Seed and respawn center of this instance's particles.
    pub origin: Vec3,
    /// Phase offset added to the evolution clock.
    pub phase: f32,
    /// Drift frequency multiplier.
    pub frequency: f32,
    /// Drift amplitude multiplier.
    pub amplitude: f32,
    /// Parameters in effect this tick.
    pub dynamics: Dynamics,
}

impl Instance {
    fn fixed(dynamics: Dynamics) -> Self {
        Self {
            origin: Vec3::ZERO,
            phase: 0.0,
            frequency: 0.0,
            amplitude: 0.0,
            dynamics,
        }
    }
}

/// Time-driven state shared by all particles of a simulation.
#[derive(Clone, Debug)]
pub struct Evolution {
    nominal: Dynamics,
    layout: InstanceLayout,
    instances: Vec<Instance>,
    origins: Vec<Vec3>,
    clock: f32,
    clock_step: f32,
    phase: f32,
    phase_step: f32,
    fractal: bool,
    waves: Vec<ResonanceWave>,
    resonance: bool,
}

impl Evolution {
    /// Seed instances and resonance waves for `def`.
    pub fn new(def: &SystemDefinition, fractal: bool, resonance: bool, ctx: &mut SpawnContext) -> Self {
        let (clock_step, phase_step) = match def.dynamics {
            Dynamics::Ikeda { .. } => (0.01, 0.03),
            Dynamics::Lozi { .. } => (0.008, 0.04),
            _ => (0.0, 0.0),
        };
        let mut evolution = Self {
            nominal: def.dynamics,
            layout: def.layout,
            instances: Vec::new(),
            origins: Vec::new(),
            clock: 0.0,
            clock_step,
            phase: 0.0,
            phase_step,
            fractal,
            waves: Vec::new(),
            resonance,
        };
        evolution.reseed(ctx);
        evolution
    }

    /// Draw fresh instances and resonance waves. The clock keeps running.
    pub fn reseed(&mut self, ctx: &mut SpawnContext) {
        let count = self.layout.count();
        self.instances = (0..count).map(|i| self.seed_instance(i, count, ctx)).collect();
        self.origins = self.instances.iter().map(|i| i.origin).collect();
        self.redraw_waves(ctx);
    }

    /// Draw a fresh resonance field.
    pub fn redraw_waves(&mut self, ctx: &mut SpawnContext) {
        self.waves = ResonanceWave::field(ctx);
    }

    fn seed_instance(&self, i: usize, count: usize, ctx: &mut SpawnContext) -> Instance {
        let angle = i as f32 / count as f32 * TAU;
        match (self.layout, self.nominal) {
            (InstanceLayout::Ring { .. }, Dynamics::Ikeda { a, b, k, p }) => {
                let [ra, rb, rk, rp] = IKEDA_RANGE;
                Instance {
                    origin: Vec3::new(angle.cos() * 2.0, angle.sin() * 2.0, ctx.random_range(-2.0, 2.0)),
                    phase: ctx.random_angle(),
                    frequency: 1.0,
                    amplitude: 1.0,
                    dynamics: Dynamics::Ikeda {
                        a: a + ctx.random_range(-ra, ra),
                        b: b + ctx.random_range(-rb, rb),
                        k: k + ctx.random_range(-rk, rk),
                        p: p + ctx.random_range(-rp, rp),
                    },
                }
            }
            (InstanceLayout::Stack { .. }, Dynamics::Lozi { a, b }) => {
                let [ra, rb] = LOZI_RANGE;
                Instance {
                    origin: Vec3::new(
                        angle.cos() * 0.5,
                        angle.sin() * 0.5,
                        (i as f32 - count as f32 / 2.0) * 0.8,
                    ),
                    phase: ctx.random_angle(),
                    frequency: 0.1 + ctx.random_range(0.0, 0.05),
                    amplitude: 0.2 + ctx.random_range(0.0, 0.3),
                    dynamics: Dynamics::Lozi {
                        a: a + ctx.random_range(-ra * 0.3, ra * 0.3),
                        b: b + ctx.random_range(-rb * 0.3, rb * 0.3),
                    },
                }
            }
            _ => Instance::fixed(self.nominal),
        }
    }

    /// Advance the clock one tick and recompute every instance's parameters.
    pub fn advance(&mut self) {
        self.clock += self.clock_step;
        self.phase += self.phase_step;
        for wave in &mut self.waves {
            wave.advance();
        }

        let (clock, nominal, fractal) = (self.clock, self.nominal, self.fractal);
        for instance in &mut self.instances {
            if let Some(dynamics) = drifted(nominal, instance, clock, fractal) {
                instance.dynamics = dynamics;
            }
        }
    }

    /// Instance `index`, or the first one if the index is out of range.
    #[inline]
    pub fn instance(&self, index: u32) -> &Instance {
        self.instances.get(index as usize).unwrap_or(&self.instances[0])
    }

    /// All instances.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Origins of all instances, indexed like [`instances`](Self::instances).
    pub fn origins(&self) -> &[Vec3] {
        &self.origins
    }

    /// Global perturbation phase handed to discrete maps.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Evolution clock.
    #[inline]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Sum of all resonance wave pushes at `at`, or zero when resonance is off.
    pub fn resonance_offset(&self, at: Vec3) -> Vec3 {
        if !self.resonance {
            return Vec3::ZERO;
        }
        self.waves.iter().map(|w| w.offset(at)).sum()
    }

    /// Whether resonance waves are applied.
    #[inline]
    pub fn resonance(&self) -> bool {
        self.resonance
    }

    /// Turn resonance waves on or off.
    pub fn set_resonance(&mut self, enabled: bool) {
        self.resonance = enabled;
    }

    /// Whether the extra fractal drift term is applied.
    #[inline]
    pub fn fractal(&self) -> bool {
        self.fractal
    }

    /// Turn the extra fractal drift term on or off.
    pub fn set_fractal(&mut self, enabled: bool) {
        self.fractal = enabled;
    }
}

/// Parameters of `instance` at evolution time `clock`, for drifting systems.
fn drifted(nominal: Dynamics, instance: &Instance, clock: f32, fractal: bool) -> Option<Dynamics> {
    let t = clock + instance.phase;
    match nominal {
        Dynamics::Ikeda { a, b, k, p } => {
            let [ra, rb, rk, rp] = IKEDA_RANGE;
            Some(Dynamics::Ikeda {
                a: a + (t * 0.3).sin() * ra * 0.5,
                b: b + (t * 0.2).cos() * rb * 0.5,
                k: k + (t * 0.4 + PI).sin() * rk * 0.3,
                p: p + (t * 0.15).cos() * rp * 0.4,
            })
        }
        Dynamics::Lozi { a, b } => {
            let [ra, rb] = LOZI_RANGE;
            let f = instance.frequency;
            let mut na = a + (t * f).sin() * instance.amplitude * ra;
            let mut nb = b + (t * f * 0.7).cos() * instance.amplitude * rb;
            if fractal {
                na += 0.1 * (t * 0.3).sin() * (t * 0.17).cos();
                nb += 0.05 * (t * 0.4).cos() * (t * 0.23).sin();
            }
            Some(Dynamics::Lozi { a: na, b: nb })
        }
        _ => None,
    }
}
