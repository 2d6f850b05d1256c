//! Direct-summation gravity and the stepping schemes that advance it.

use crate::elements::OrbitalElements;
use crate::error::IntegratorError;
use crate::math::DVec3;
use crate::pv::PV;
use crate::state::Body;
use serde::{Deserialize, Serialize};

/// A gravitational integrator that owns a simulation clock.
///
/// `advance_to` mutates the clock in place; implementors are expected to be
/// owned by exactly one driver and never cloned mid-run.
pub trait Integrator {
    fn time(&self) -> f64;

    fn advance_to(&mut self, t: f64) -> Result<(), IntegratorError>;

    fn len(&self) -> usize;

    fn particle(&self, i: usize) -> Option<Body>;

    /// elements of particle `i` about the centre of mass of particles `0..i`
    fn elements(&self, i: usize) -> Option<OrbitalElements>;

    fn period(&self, _i: usize) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// kick-drift-kick, fixed internal step
    Leapfrog,
    /// classic Runge-Kutta, fixed internal step
    Rk4,
    /// adaptive Runge-Kutta-Fehlberg 4(5)
    #[default]
    Rkf45,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Scheme::Leapfrog => "leapfrog",
            Scheme::Rk4 => "rk4",
            Scheme::Rkf45 => "rkf45",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegratorConfig {
    pub scheme: Scheme,
    /// internal step of the fixed-step schemes, and the first trial step of rkf45
    pub dt: f64,
    /// relative error per step accepted by rkf45
    pub tolerance: f64,
    /// rkf45 steps below this are treated as a collapse
    pub min_step: f64,
    /// upper bound on internal steps per advance
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig {
            scheme: Scheme::Rkf45,
            dt: 0.01,
            tolerance: 1E-10,
            min_step: 1E-9,
            max_steps: 10_000_000,
        }
    }
}

impl IntegratorConfig {
    pub fn with_scheme(scheme: Scheme) -> Self {
        IntegratorConfig {
            scheme,
            ..Default::default()
        }
    }
}

pub fn accelerations(g: f64, masses: &[f64], positions: impl Iterator<Item = DVec3>) -> Vec<DVec3> {
    let positions: Vec<DVec3> = positions.collect();
    let mut acc = vec![DVec3::ZERO; positions.len()];
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d = positions[j] - positions[i];
            let r2 = d.length_squared();
            let inv_r3 = 1.0 / (r2 * r2.sqrt());
            acc[i] += d * (g * masses[j] * inv_r3);
            acc[j] -= d * (g * masses[i] * inv_r3);
        }
    }
    acc
}

fn derivative(g: f64, masses: &[f64], y: &[PV]) -> Vec<PV> {
    let acc = accelerations(g, masses, y.iter().map(|s| s.pos));
    y.iter()
        .zip(acc)
        .map(|(s, a)| PV::new(s.vel, a))
        .collect()
}

/// y + h * sum(c_k * k_k)
fn combine(y: &[PV], h: f64, terms: &[(f64, &[PV])]) -> Vec<PV> {
    y.iter()
        .enumerate()
        .map(|(i, yi)| {
            let mut out = *yi;
            for (c, k) in terms {
                if *c != 0.0 {
                    out += k[i] * (h * c);
                }
            }
            out
        })
        .collect()
}

pub fn leapfrog_step(g: f64, masses: &[f64], y: &mut [PV], h: f64) {
    let kick = |y: &mut [PV], h: f64| {
        let acc = accelerations(g, masses, y.iter().map(|s| s.pos));
        y.iter_mut().zip(acc).for_each(|(s, a)| s.vel += a * h);
    };
    kick(y, h / 2.0);
    y.iter_mut().for_each(|s| s.pos += s.vel * h);
    kick(y, h / 2.0);
}

pub fn rk4_step(g: f64, masses: &[f64], y: &mut [PV], h: f64) {
    let k1 = derivative(g, masses, y);
    let k2 = derivative(g, masses, &combine(y, h, &[(0.5, &k1)]));
    let k3 = derivative(g, masses, &combine(y, h, &[(0.5, &k2)]));
    let k4 = derivative(g, masses, &combine(y, h, &[(1.0, &k3)]));
    let next = combine(
        y,
        h,
        &[
            (1.0 / 6.0, &k1),
            (1.0 / 3.0, &k2),
            (1.0 / 3.0, &k3),
            (1.0 / 6.0, &k4),
        ],
    );
    y.copy_from_slice(&next);
}

/// One Fehlberg 4(5) trial step. Returns the fifth order solution and the
/// embedded error estimate, normalised against `tolerance`.
pub fn rkf45_trial(g: f64, masses: &[f64], y: &[PV], h: f64, tolerance: f64) -> (Vec<PV>, f64) {
    let k1 = derivative(g, masses, y);
    let k2 = derivative(g, masses, &combine(y, h, &[(1.0 / 4.0, &k1)]));
    let k3 = derivative(
        g,
        masses,
        &combine(y, h, &[(3.0 / 32.0, &k1), (9.0 / 32.0, &k2)]),
    );
    let k4 = derivative(
        g,
        masses,
        &combine(
            y,
            h,
            &[
                (1932.0 / 2197.0, &k1),
                (-7200.0 / 2197.0, &k2),
                (7296.0 / 2197.0, &k3),
            ],
        ),
    );
    let k5 = derivative(
        g,
        masses,
        &combine(
            y,
            h,
            &[
                (439.0 / 216.0, &k1),
                (-8.0, &k2),
                (3680.0 / 513.0, &k3),
                (-845.0 / 4104.0, &k4),
            ],
        ),
    );
    let k6 = derivative(
        g,
        masses,
        &combine(
            y,
            h,
            &[
                (-8.0 / 27.0, &k1),
                (2.0, &k2),
                (-3544.0 / 2565.0, &k3),
                (1859.0 / 4104.0, &k4),
                (-11.0 / 40.0, &k5),
            ],
        ),
    );

    let next = combine(
        y,
        h,
        &[
            (16.0 / 135.0, &k1),
            (6656.0 / 12825.0, &k3),
            (28561.0 / 56430.0, &k4),
            (-9.0 / 50.0, &k5),
            (2.0 / 55.0, &k6),
        ],
    );

    let zero = vec![PV::zero(); y.len()];
    let err = combine(
        &zero,
        h,
        &[
            (1.0 / 360.0, &k1),
            (-128.0 / 4275.0, &k3),
            (-2197.0 / 75240.0, &k4),
            (1.0 / 50.0, &k5),
            (2.0 / 55.0, &k6),
        ],
    );

    let mut norm: f64 = 0.0;
    for ((e, a), b) in err.iter().zip(y).zip(&next) {
        let scale_pos = tolerance * (1.0 + a.pos.length().max(b.pos.length()));
        let scale_vel = tolerance * (1.0 + a.vel.length().max(b.vel.length()));
        norm = norm
            .max(e.pos.abs().max_element() / scale_pos)
            .max(e.vel.abs().max_element() / scale_vel);
    }

    (next, norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pairwise_forces_balance() {
        let masses = [1.0, 3.0];
        let pos = [DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0)];
        let acc = accelerations(1.0, &masses, pos.into_iter());
        assert_relative_eq!(acc[0].x, 3.0 / 4.0);
        assert_relative_eq!(acc[1].x, -1.0 / 4.0);
        assert_relative_eq!((acc[0] * masses[0] + acc[1] * masses[1]).length(), 0.0);
    }

    #[test]
    fn scheme_names() {
        let s: Scheme = serde_yaml::from_str("rk4").unwrap();
        assert_eq!(s, Scheme::Rk4);
        assert_eq!(Scheme::default().to_string(), "rkf45");
        assert!(serde_yaml::from_str::<Scheme>("ias15").is_err());
    }

    #[test]
    fn rkf45_error_shrinks_with_step() {
        let masses = [1.0, 1.0];
        let y = [
            PV::new((-2.5, 0.0, 0.0), (0.0, -0.3162, 0.0)),
            PV::new((2.5, 0.0, 0.0), (0.0, 0.3162, 0.0)),
        ];
        let (_, coarse) = rkf45_trial(1.0, &masses, &y, 1.0, 1E-10);
        let (_, fine) = rkf45_trial(1.0, &masses, &y, 0.1, 1E-10);
        assert!(fine < coarse);
    }
}
