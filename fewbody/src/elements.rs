//! Osculating Keplerian elements and their conversion to and from a
//! relative Cartesian state.

use crate::kepler::{anomaly_t2e, anomaly_t2m};
use crate::math::{wrap_0_2pi, DMat3, DVec3, TAU};
use crate::pv::PV;
use serde::{Deserialize, Serialize};

const SMALL: f64 = 1E-12;

/// Angles in radians. `ascending_node` is Omega, `arg_periapsis` is omega.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    pub arg_periapsis: f64,
    pub true_anomaly: f64,
}

impl OrbitalElements {
    pub fn new(semi_major_axis: f64, eccentricity: f64) -> Self {
        OrbitalElements {
            semi_major_axis,
            eccentricity,
            ..Default::default()
        }
    }

    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0 && self.semi_major_axis > 0.0
    }

    pub fn eccentric_anomaly(&self) -> f64 {
        anomaly_t2e(self.eccentricity, self.true_anomaly)
    }

    /// Mean anomaly in [0, 2pi). Only meaningful for bound orbits.
    pub fn mean_anomaly(&self) -> f64 {
        wrap_0_2pi(anomaly_t2m(self.eccentricity, self.true_anomaly))
    }

    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity.powi(2))
    }

    pub fn radius_at(&self, true_anomaly: f64) -> f64 {
        self.semi_latus_rectum() / (1.0 + self.eccentricity * true_anomaly.cos())
    }

    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.semi_major_axis.abs().powi(3)).sqrt()
    }

    pub fn period(&self, mu: f64) -> Option<f64> {
        self.is_bound().then(|| TAU / self.mean_motion(mu))
    }

    /// perifocal frame to the reference frame: Rz(Omega) Rx(i) Rz(omega)
    pub fn orientation(&self) -> DMat3 {
        DMat3::from_rotation_z(self.ascending_node)
            * DMat3::from_rotation_x(self.inclination)
            * DMat3::from_rotation_z(self.arg_periapsis)
    }

    /// Position on the full ellipse at eccentric anomaly `ea`, relative to
    /// the focus, with the complete orientation applied.
    pub fn position_at_eccentric(&self, ea: f64) -> DVec3 {
        let a = self.semi_major_axis;
        let e = self.eccentricity;
        let b = a * (1.0 - e.powi(2)).sqrt();
        let perifocal = DVec3::new(a * (ea.cos() - e), b * ea.sin(), 0.0);
        self.orientation() * perifocal
    }

    /// Relative state of the orbiting body with respect to its primary.
    pub fn to_pv(&self, mu: f64) -> Option<PV> {
        let p = self.semi_latus_rectum();
        if !(p > 0.0) || !(mu > 0.0) {
            return None;
        }
        let f = self.true_anomaly;
        let r = self.radius_at(f);
        let (sin_f, cos_f) = f.sin_cos();
        let pos = DVec3::new(r * cos_f, r * sin_f, 0.0);
        let vel = (mu / p).sqrt() * DVec3::new(-sin_f, self.eccentricity + cos_f, 0.0);
        let rot = self.orientation();
        PV::new(rot * pos, rot * vel).filter_numerr()
    }

    /// Osculating elements of a relative state about a primary with
    /// gravitational parameter `mu`.
    ///
    /// Degenerate angles follow the usual conventions: for equatorial orbits
    /// the node is 0 and periapsis is measured from +x; for circular orbits
    /// periapsis is 0 and the true anomaly is the argument of latitude.
    pub fn from_pv(pv: impl Into<PV>, mu: f64) -> Option<Self> {
        let pv: PV = pv.into();
        pv.filter_numerr()?;

        let r = pv.pos;
        let v = pv.vel;
        let rmag = r.length();
        if rmag < SMALL || !(mu > 0.0) {
            return None;
        }

        let h = r.cross(v);
        let hmag = h.length();
        if hmag < SMALL {
            return None;
        }

        let n = DVec3::Z.cross(h);
        let nmag = n.length();
        let evec = ((v.length_squared() - mu / rmag) * r - r.dot(v) * v) / mu;
        let e = evec.length();

        let energy = v.length_squared() / 2.0 - mu / rmag;
        let semi_major_axis = -mu / (2.0 * energy);

        let inclination = (h.z / hmag).clamp(-1.0, 1.0).acos();
        let equatorial = nmag < SMALL * hmag;
        let circular = e < SMALL;

        let ascending_node = if equatorial {
            0.0
        } else {
            wrap_0_2pi(f64::atan2(n.y, n.x))
        };

        let angle_between = |a: DVec3, b: DVec3| -> f64 {
            (a.dot(b) / (a.length() * b.length()))
                .clamp(-1.0, 1.0)
                .acos()
        };

        let arg_periapsis = if circular {
            0.0
        } else if equatorial {
            let w = f64::atan2(evec.y, evec.x);
            wrap_0_2pi(if h.z < 0.0 { -w } else { w })
        } else {
            let w = angle_between(n, evec);
            if evec.z < 0.0 {
                TAU - w
            } else {
                w
            }
        };

        let true_anomaly = if circular {
            let reference = if equatorial { DVec3::X } else { n };
            let u = angle_between(reference, r);
            let ahead = if equatorial {
                r.y * h.z.signum() < 0.0
            } else {
                r.z < 0.0
            };
            if ahead {
                TAU - u
            } else {
                u
            }
        } else {
            let f = angle_between(evec, r);
            if r.dot(v) < 0.0 {
                TAU - f
            } else {
                f
            }
        };

        Some(OrbitalElements {
            semi_major_axis,
            eccentricity: e,
            inclination,
            ascending_node,
            arg_periapsis,
            true_anomaly: wrap_0_2pi(true_anomaly),
        })
    }
}
