//! Kepler's equation and the anomaly conversions built on it.

use crate::error::KeplerError;
use crate::math::{angular_sweep, DVec3};

pub const DEFAULT_TOLERANCE: f64 = 1E-12;
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Angular step of the drawn orbit curve, in radians.
pub const DEFAULT_CURVE_RESOLUTION: f64 = 0.01;

pub fn anomaly_e2m(ecc: f64, eccentric_anomaly: f64) -> f64 {
    eccentric_anomaly - ecc * f64::sin(eccentric_anomaly)
}

pub fn anomaly_t2e(ecc: f64, true_anomaly: f64) -> f64 {
    f64::atan2(
        f64::sin(true_anomaly) * (1.0 - ecc.powi(2)).sqrt(),
        f64::cos(true_anomaly) + ecc,
    )
}

pub fn anomaly_t2m(ecc: f64, true_anomaly: f64) -> f64 {
    anomaly_e2m(ecc, anomaly_t2e(ecc, true_anomaly))
}

/// Newton solver for `E - e sin(E) = M` on elliptical orbits.
///
/// The iteration always starts from `E = M`. That guess is reliable for the
/// small to moderate eccentricities of the systems animated here, but it is
/// not guaranteed to converge as `e` approaches 1. No alternative starting
/// point is tried; a failed solve is reported as
/// [`KeplerError::NonConvergence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        KeplerSolver {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeplerSolver {
    pub fn residual(mean_anomaly: f64, ecc: f64, eccentric_anomaly: f64) -> f64 {
        anomaly_e2m(ecc, eccentric_anomaly) - mean_anomaly
    }

    pub fn solve(&self, mean_anomaly: f64, ecc: f64) -> Result<f64, KeplerError> {
        if !mean_anomaly.is_finite() || !ecc.is_finite() {
            return Err(KeplerError::NonFinite {
                mean_anomaly,
                eccentricity: ecc,
            });
        }
        if !(0.0..1.0).contains(&ecc) {
            return Err(KeplerError::InvalidEccentricity(ecc));
        }

        let mut e = mean_anomaly;
        let mut residual = Self::residual(mean_anomaly, ecc, e);

        for _ in 0..self.max_iterations {
            if residual.abs() < self.tolerance {
                return Ok(e);
            }
            e -= residual / (1.0 - ecc * e.cos());
            residual = Self::residual(mean_anomaly, ecc, e);
        }

        if residual.abs() < self.tolerance {
            return Ok(e);
        }

        Err(KeplerError::NonConvergence {
            mean_anomaly,
            eccentricity: ecc,
            residual,
            iterations: self.max_iterations,
        })
    }
}

/// Solves Kepler's equation with the default tolerance.
pub fn solve(mean_anomaly: f64, ecc: f64) -> Result<f64, KeplerError> {
    KeplerSolver::default().solve(mean_anomaly, ecc)
}

/// Distance from the focus at eccentric anomaly `ea`.
pub fn orbital_radius(semi_major_axis: f64, ecc: f64, ea: f64) -> f64 {
    semi_major_axis * (1.0 - ecc * ea.cos())
}

/// Shape curve for the elements panel.
///
/// The instantaneous radius `r = a (1 - e cos E)` comes from solving Kepler's
/// equation at `mean_anomaly`. The curve is then swept over `f` in
/// `[0, 2pi)` at a constant `r`, so every point is drawn at the body's current
/// distance instead of tracing the true ellipse.
///
/// Only the inclination is applied when mapping to 3D: `x = r cos f cos i`,
/// `y = r sin f`, `z = r cos f sin i`. The argument of periapsis and the
/// ascending node are not rotated in. This is a known modelling
/// simplification of this view.
pub fn orbit_curve(
    solver: &KeplerSolver,
    semi_major_axis: f64,
    ecc: f64,
    inclination: f64,
    mean_anomaly: f64,
    resolution: f64,
) -> Result<Vec<DVec3>, KeplerError> {
    if !(resolution > 0.0 && resolution.is_finite()) {
        return Err(KeplerError::InvalidResolution(resolution));
    }

    let ea = solver.solve(mean_anomaly, ecc)?;
    let r = orbital_radius(semi_major_axis, ecc, ea);
    let (sin_i, cos_i) = inclination.sin_cos();

    Ok(angular_sweep(resolution)
        .into_iter()
        .map(|f| {
            let (sin_f, cos_f) = f.sin_cos();
            DVec3::new(r * cos_f * cos_i, r * sin_f, r * cos_f * sin_i)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{PI, TAU};
    use approx::assert_relative_eq;
    use more_asserts::assert_lt;
    use rand::{Rng, SeedableRng};

    #[test]
    fn circular_orbit_is_identity() {
        for m in [0.0, 0.3, 1.0, 2.5, 6.0] {
            assert_eq!(solve(m, 0.0).unwrap(), m);
        }
    }

    #[test]
    fn residual_is_small_over_domain() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1701);
        let solver = KeplerSolver::default();
        for _ in 0..5000 {
            let m = rng.gen_range(0.0..TAU);
            let e = rng.gen_range(0.0..=0.95);
            let ea = solver.solve(m, e).unwrap();
            assert_lt!(KeplerSolver::residual(m, e, ea).abs(), 1E-10);
        }
    }

    #[test]
    fn agrees_with_bisection() {
        for (m, e) in [(0.1, 0.9), (1.0, 0.5), (3.0, 0.2), (5.5, 0.7)] {
            let newton = solve(m, e).unwrap();
            let bisect = rootfinder::root_bisection(
                &|x| KeplerSolver::residual(m, e, x),
                rootfinder::Interval::new(-1.0, 8.0),
                None,
                None,
            )
            .unwrap();
            assert_relative_eq!(newton, bisect, epsilon = 1E-5);
        }
    }

    #[test]
    fn rejects_bad_eccentricity() {
        assert_eq!(solve(1.0, 1.0), Err(KeplerError::InvalidEccentricity(1.0)));
        assert_eq!(
            solve(1.0, -0.1),
            Err(KeplerError::InvalidEccentricity(-0.1))
        );
        assert!(matches!(
            solve(f64::NAN, 0.1),
            Err(KeplerError::NonFinite { .. })
        ));
    }

    #[test]
    fn starved_solver_reports_nonconvergence() {
        let solver = KeplerSolver {
            tolerance: 1E-14,
            max_iterations: 1,
        };
        match solver.solve(0.5, 0.9) {
            Err(KeplerError::NonConvergence {
                iterations,
                residual,
                ..
            }) => {
                assert_eq!(iterations, 1);
                assert!(residual.abs() > 1E-14);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }

    #[test]
    fn anomaly_roundtrip() {
        let ecc = 0.4;
        for ta in [0.2, 1.0, 2.0, 3.0] {
            let ma = anomaly_t2m(ecc, ta);
            let ea = KeplerSolver::default().solve(ma, ecc).unwrap();
            assert_relative_eq!(ea, anomaly_t2e(ecc, ta), epsilon = 1E-9);
        }
    }

    #[test]
    fn curve_has_constant_radius() {
        let solver = KeplerSolver::default();
        let (a, e, inc, m) = (5.0, 0.5, 70.0_f64.to_radians(), 1.2);
        let curve = orbit_curve(&solver, a, e, inc, m, DEFAULT_CURVE_RESOLUTION).unwrap();
        assert_eq!(curve.len(), 629);

        let r = orbital_radius(a, e, solver.solve(m, e).unwrap());
        for p in &curve {
            assert_relative_eq!(p.length(), r, epsilon = 1E-9);
        }

        // the plane is tilted by inclination only, so y = 0 points lie in x-z
        assert_relative_eq!(curve[0].z / curve[0].x, inc.tan(), epsilon = 1E-9);
        assert_relative_eq!(curve[0].y, 0.0);
    }

    #[test]
    fn curve_rejects_bad_resolution() {
        let solver = KeplerSolver::default();
        assert_eq!(
            orbit_curve(&solver, 1.0, 0.1, 0.0, PI, 0.0),
            Err(KeplerError::InvalidResolution(0.0))
        );
    }
}
