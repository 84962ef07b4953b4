//! Catalogue of attractor systems.
//!
//! A [`SystemDefinition`] bundles everything that is fixed for one attractor:
//! its nominal parameters, time step, seed region, containment bounds, how
//! particles are split into sub-attractor instances, lifecycle rules and the
//! controller preset that suits its cost profile.
//!
//! ```ignore
//! let def = SystemKind::Rossler.definition();
//! assert_eq!(def.dynamics.scheme(), Scheme::Rk4);
//! ```

use crate::controller::ControllerConfig;
use crate::dynamics::Dynamics;
use crate::lifecycle::{EnergyModel, Lifecycle, Respawn};
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Named attractor systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemKind {
    Chen,
    Chua,
    Hopalong,
    Ikeda,
    Lozi,
    Pickover,
    Rossler,
    Thomas,
    Tinkerbell,
    Zaslavskii,
}

impl SystemKind {
    /// Every supported system, in alphabetical order.
    pub const ALL: [SystemKind; 10] = [
        SystemKind::Chen,
        SystemKind::Chua,
        SystemKind::Hopalong,
        SystemKind::Ikeda,
        SystemKind::Lozi,
        SystemKind::Pickover,
        SystemKind::Rossler,
        SystemKind::Thomas,
        SystemKind::Tinkerbell,
        SystemKind::Zaslavskii,
    ];

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            SystemKind::Chen => "chen",
            SystemKind::Chua => "chua",
            SystemKind::Hopalong => "hopalong",
            SystemKind::Ikeda => "ikeda",
            SystemKind::Lozi => "lozi",
            SystemKind::Pickover => "pickover",
            SystemKind::Rossler => "rossler",
            SystemKind::Thomas => "thomas",
            SystemKind::Tinkerbell => "tinkerbell",
            SystemKind::Zaslavskii => "zaslavskii",
        }
    }

    /// Canonical names of all systems.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    /// Build the immutable definition of this system.
    pub fn definition(self) -> SystemDefinition {
        let plain = |dynamics: Dynamics, dt: f32, seed: f32, limit: f32| SystemDefinition {
            kind: self,
            dynamics,
            dt,
            default_count: 10_000,
            seed_extent: Vec3::splat(seed),
            layout: InstanceLayout::Single,
            containment: Containment::uniform(limit, 0.9),
            lifecycle: Lifecycle::default(),
            controller: ControllerConfig::default(),
        };

        match self {
            SystemKind::Chen => plain(Dynamics::Chen { a: 35.0, b: 3.0, c: 12.0 }, 0.002, 10.0, 100.0),
            SystemKind::Chua => SystemDefinition {
                default_count: 5_000,
                ..plain(
                    Dynamics::Chua { alpha: 15.6, beta: 28.0, m0: -1.143, m1: -0.714 },
                    0.01,
                    0.1,
                    10.0,
                )
            },
            SystemKind::Hopalong => plain(Dynamics::Hopalong { a: 0.4, b: 1.0, c: 0.0 }, 0.002, 2.0, 10.0),
            SystemKind::Pickover => plain(
                Dynamics::Pickover { p: 3.0, o: 2.7, q: 1.7, c: 2.0, e: 9.0 },
                0.002,
                10.0,
                100.0,
            ),
            SystemKind::Rossler => plain(Dynamics::Rossler { a: 0.2, b: 0.2, c: 5.7 }, 0.01, 10.0, 60.0),
            SystemKind::Thomas => plain(Dynamics::Thomas { b: 0.208186 }, 0.01, 2.0, 20.0),
            SystemKind::Tinkerbell => plain(
                Dynamics::Tinkerbell { a: 0.9, b: -0.6013, c: 2.0, d: 0.5 },
                0.002,
                2.0,
                10.0,
            ),
            SystemKind::Zaslavskii => plain(
                Dynamics::Zaslavskii { alpha: 2.0, beta: 0.3, gamma: 3.0 },
                0.01,
                5.0,
                50.0,
            ),
            SystemKind::Ikeda => SystemDefinition {
                kind: self,
                dynamics: Dynamics::Ikeda { a: 1.0, b: 0.9, k: 0.4, p: 6.0 },
                dt: 0.015,
                default_count: 12_000,
                seed_extent: Vec3::splat(2.0),
                layout: InstanceLayout::Ring { count: 3 },
                containment: Containment {
                    limit: Vec3::new(15.0, 15.0, 10.0),
                    energy_gain: Vec3::ZERO,
                    damping: Vec3::new(0.9, 0.9, 0.8),
                },
                lifecycle: Lifecycle {
                    initial_age_jitter: 1_000,
                    respawn: Some(Respawn {
                        min_age: 2_000,
                        probability: 0.001,
                        extent: Vec3::splat(2.0),
                        energy: None,
                    }),
                    ..Lifecycle::default()
                },
                controller: ControllerConfig {
                    floor: 2_000,
                    ..ControllerConfig::default()
                },
            },
            SystemKind::Lozi => SystemDefinition {
                kind: self,
                dynamics: Dynamics::Lozi { a: 1.7, b: 0.5 },
                dt: 0.01,
                default_count: 15_000,
                seed_extent: Vec3::new(1.5, 1.5, 3.0),
                layout: InstanceLayout::Stack { count: 4 },
                containment: Containment {
                    limit: Vec3::new(8.0, 8.0, 5.6),
                    energy_gain: Vec3::new(2.0, 2.0, 1.4),
                    damping: Vec3::new(0.85, 0.85, 0.8),
                },
                lifecycle: Lifecycle {
                    initial_age_jitter: 2_000,
                    initial_energy: (0.5, 1.5),
                    energy: Some(EnergyModel::default()),
                    respawn: Some(Respawn {
                        min_age: 3_000,
                        probability: 0.0008,
                        extent: Vec3::new(1.0, 1.0, 2.0),
                        energy: Some((0.8, 1.2)),
                    }),
                },
                controller: ControllerConfig {
                    shrink_threshold: 1.3,
                    grow_threshold: 0.7,
                    shrink_factor: 0.85,
                    grow_factor: 1.15,
                    floor: 3_000,
                    ..ControllerConfig::default()
                },
            },
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SystemKind {
    type Err = crate::ConfigError;

    /// Parse a system name, ignoring case, spaces, a trailing "attractor"
    /// and the umlaut in "Rössler".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .replace('ö', "o")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let key = key.strip_suffix("attractor").unwrap_or(key.as_str());

        SystemKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == key)
            .ok_or_else(|| crate::ConfigError::UnknownSystem(s.to_string()))
    }
}

/// How particles are divided among sub-attractor instances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InstanceLayout {
    /// One instance at the origin.
    Single,
    /// Instances on a circle of radius 2 with a random height each.
    Ring { count: usize },
    /// Instances on a circle of radius 0.5, stacked along z.
    Stack { count: usize },
}

impl InstanceLayout {
    /// Number of instances.
    pub fn count(&self) -> usize {
        match *self {
            InstanceLayout::Single => 1,
            InstanceLayout::Ring { count } | InstanceLayout::Stack { count } => count.max(1),
        }
    }

    /// Instance owning particle `index` out of `total`.
    ///
    /// Particles are assigned in contiguous blocks of `total / count`.
    pub fn assign(&self, index: usize, total: usize) -> u32 {
        let count = self.count();
        let block = total as f64 / count as f64;
        let slot = (index as f64 / block).floor() as usize;
        slot.min(count - 1) as u32
    }
}

/// Soft leash that keeps coordinates bounded.
///
/// A coordinate beyond its limit is multiplied by the axis damping factor
/// until it is back inside, so `|c| <= limit` always holds afterwards. The
/// limit may grow with the particle's energy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Containment {
    /// Per-axis limit at zero energy.
    pub limit: Vec3,
    /// Per-axis limit growth per unit of energy.
    pub energy_gain: Vec3,
    /// Per-axis damping factor, in `(0, 1)`.
    pub damping: Vec3,
}

impl Containment {
    /// Same limit and damping on every axis, independent of energy.
    pub fn uniform(limit: f32, damping: f32) -> Self {
        Self {
            limit: Vec3::splat(limit),
            energy_gain: Vec3::ZERO,
            damping: Vec3::splat(damping),
        }
    }

    /// Effective per-axis limits for a particle with `energy`.
    #[inline]
    pub fn limits(&self, energy: f32) -> Vec3 {
        self.limit + self.energy_gain * energy
    }

    /// Damp every out-of-bounds coordinate of `p` back inside.
    ///
    /// Non-finite coordinates are returned untouched.
    pub fn apply(&self, p: Vec3, energy: f32) -> Vec3 {
        let limits = self.limits(energy);
        Vec3::new(
            damp(p.x, limits.x, self.damping.x),
            damp(p.y, limits.y, self.damping.y),
            damp(p.z, limits.z, self.damping.z),
        )
    }
}

#[inline]
fn damp(mut v: f32, limit: f32, factor: f32) -> f32 {
    if !v.is_finite() {
        return v;
    }
    while v.abs() > limit {
        v *= factor;
    }
    v
}

/// Immutable description of one attractor system.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemDefinition {
    /// Which system this is.
    pub kind: SystemKind,
    /// Nominal parameters. Drifting systems vary around these.
    pub dynamics: Dynamics,
    /// Fixed integration time step.
    pub dt: f32,
    /// Particle count used when the caller does not choose one.
    pub default_count: usize,
    /// Half-size of the seed box around each instance origin.
    pub seed_extent: Vec3,
    /// Division of particles into instances.
    pub layout: InstanceLayout,
    /// Boundary damping.
    pub containment: Containment,
    /// Age, energy and stochastic reset rules.
    pub lifecycle: Lifecycle,
    /// Controller constants suited to this system.
    pub controller: ControllerConfig,
}
