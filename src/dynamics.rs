//! Equations of motion for every supported attractor.
//!
//! Each system is a parameter record plus one pure function. Continuous
//! systems expose a [`rate`](Dynamics::rate) (the right-hand side of an ODE),
//! discrete systems expose a [`map`](Dynamics::map) that produces the next
//! state directly.
//!
//! | System | Kind | Scheme |
//! |--------|------|--------|
//! | Chen | flow | [`Scheme::Euler`] |
//! | Chua | flow | [`Scheme::Rk4`] |
//! | Hopalong | map | [`Scheme::Map`] |
//! | Ikeda | map | [`Scheme::Map`] |
//! | Lozi | map | [`Scheme::Map`] |
//! | Pickover | flow | [`Scheme::Euler`] |
//! | Rössler | flow | [`Scheme::Rk4`] |
//! | Thomas | flow | [`Scheme::Euler`] |
//! | Tinkerbell | map | [`Scheme::Map`] |
//! | Zaslavskii | flow | [`Scheme::Euler`] |

use glam::Vec3;

/// How a system's state is advanced each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// First-order explicit update: `s + dt * f(s)`.
    Euler,
    /// Classic four-stage Runge-Kutta.
    Rk4,
    /// Discrete map: `s' = g(s)`, no `dt` scaling.
    Map,
}

/// Per-particle inputs a discrete map may depend on besides position.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapContext {
    /// Global perturbation phase of the owning system.
    pub phase: f32,
    /// Age of the particle being mapped, in ticks.
    pub age: u32,
}

/// Parameter record of one attractor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dynamics {
    /// Chen system.
    Chen { a: f32, b: f32, c: f32 },
    /// Chua circuit with piecewise-linear diode.
    Chua { alpha: f32, beta: f32, m0: f32, m1: f32 },
    /// Hopalong map with a slow z drift, rescaled every step.
    Hopalong { a: f32, b: f32, c: f32 },
    /// Ikeda map with wave perturbation and coupled z axis.
    Ikeda { a: f32, b: f32, k: f32, p: f32 },
    /// Lozi map with morphological perturbation and coupled z axis.
    Lozi { a: f32, b: f32 },
    /// Pickover flow.
    Pickover { p: f32, o: f32, q: f32, c: f32, e: f32 },
    /// Rössler flow.
    Rossler { a: f32, b: f32, c: f32 },
    /// Thomas cyclically symmetric flow.
    Thomas { b: f32 },
    /// Tinkerbell map with a damped z echo.
    Tinkerbell { a: f32, b: f32, c: f32, d: f32 },
    /// Zaslavskii-style trigonometric flow.
    Zaslavskii { alpha: f32, beta: f32, gamma: f32 },
}

impl Dynamics {
    /// Integration scheme this system requires.
    pub fn scheme(&self) -> Scheme {
        match self {
            Dynamics::Chua { .. } | Dynamics::Rossler { .. } => Scheme::Rk4,
            Dynamics::Hopalong { .. }
            | Dynamics::Ikeda { .. }
            | Dynamics::Lozi { .. }
            | Dynamics::Tinkerbell { .. } => Scheme::Map,
            Dynamics::Chen { .. }
            | Dynamics::Pickover { .. }
            | Dynamics::Thomas { .. }
            | Dynamics::Zaslavskii { .. } => Scheme::Euler,
        }
    }

    /// Instantaneous rate of change at `s` for continuous systems.
    ///
    /// Discrete maps have no rate and return `Vec3::ZERO`.
    pub fn rate(&self, s: Vec3) -> Vec3 {
        let Vec3 { x, y, z } = s;
        match *self {
            Dynamics::Chen { a, b, c } => Vec3::new(
                a * (y - x),
                (c - a) * x - x * z + c * y,
                x * y - b * z,
            ),
            Dynamics::Chua { alpha, beta, m0, m1 } => {
                let h = m1 * x + 0.5 * (m0 - m1) * ((x + 1.0).abs() - (x - 1.0).abs());
                Vec3::new(alpha * (y - x - h), x - y + z, -beta * y)
            }
            Dynamics::Pickover { p, o, q, c, e } => Vec3::new(
                y - p * x + o * y * z,
                q * y - x * z + z,
                c * x * y - e * z,
            ),
            Dynamics::Rossler { a, b, c } => Vec3::new(-y - z, x + a * y, b + z * (x - c)),
            Dynamics::Thomas { b } => Vec3::new(
                y.sin() - b * x,
                z.sin() - b * y,
                x.sin() - b * z,
            ),
            Dynamics::Zaslavskii { alpha, beta, gamma } => Vec3::new(
                y - alpha * x.sin() + beta * (gamma * z).cos(),
                x - gamma * y.sin() + alpha * (beta * z).cos(),
                beta * (alpha * x).sin() - gamma * y.cos(),
            ),
            Dynamics::Hopalong { .. }
            | Dynamics::Ikeda { .. }
            | Dynamics::Lozi { .. }
            | Dynamics::Tinkerbell { .. } => Vec3::ZERO,
        }
    }

    /// Next state of a discrete map.
    ///
    /// Continuous systems are returned unchanged.
    pub fn map(&self, s: Vec3, ctx: MapContext) -> Vec3 {
        let Vec3 { x, y, z } = s;
        let age = ctx.age as f32;
        match *self {
            Dynamics::Hopalong { a, b, c } => {
                let nx = y - sign(x) * (b * x - c).abs().sqrt();
                let ny = a - x;
                let nz = z + (x * 0.1).sin() * 0.1;
                Vec3::new(nx, ny, nz) * 0.1
            }
            Dynamics::Ikeda { a, b, k, p } => {
                // denominator is always >= 1
                let t = k - p / (1.0 + x * x + y * y);
                let (sin_t, cos_t) = t.sin_cos();
                let mut nx = a + b * (x * cos_t - y * sin_t);
                let mut ny = b * (x * sin_t + y * cos_t);

                nx += 0.1 * (ctx.phase + x * 0.1).sin() * (age * 0.01).cos();
                ny += 0.1 * (ctx.phase + y * 0.1).cos() * (age * 0.01).sin();

                let lift = 0.02 * (x + y + ctx.phase).sin() * (age * 0.005).cos()
                    + 0.01 * (nx - x)
                    + 0.01 * (ny - y);
                Vec3::new(nx, ny, z + lift)
            }
            Dynamics::Lozi { a, b } => {
                let nx = 1.0 - a * x.abs() + y;
                let ny = b * x;
                let nz = z + (nx - x) * (ny - y) * 0.15;

                let morph = Vec3::new(
                    0.05 * (ctx.phase + x * 0.5).sin() * (age * 0.001).cos(),
                    0.05 * (ctx.phase + y * 0.5).cos() * (age * 0.001).sin(),
                    0.03 * (ctx.phase + z * 0.3 + age * 0.0005).sin(),
                );
                Vec3::new(nx, ny, nz) + morph
            }
            Dynamics::Tinkerbell { a, b, c, d } => {
                let nx = x * x - y * y + a * x + b * y;
                let ny = 2.0 * x * y + c * x + d * y;
                let nz = z * 0.95 + (nx - x) * 0.1;
                Vec3::new(nx, ny, nz)
            }
            Dynamics::Chen { .. }
            | Dynamics::Chua { .. }
            | Dynamics::Pickover { .. }
            | Dynamics::Rossler { .. }
            | Dynamics::Thomas { .. }
            | Dynamics::Zaslavskii { .. } => s,
        }
    }
}

/// Sign with `sign(0) == 0`, unlike `f32::signum`.
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
