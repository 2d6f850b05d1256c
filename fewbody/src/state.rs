use crate::elements::OrbitalElements;
use crate::math::DVec3;
use crate::pv::PV;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub mass: f64,
    pub pv: PV,
}

impl Body {
    pub fn new(mass: f64, pv: impl Into<PV>) -> Self {
        Body {
            mass,
            pv: pv.into(),
        }
    }
}

/// One body as read out of the integrator at a single instant.
///
/// `elements` and `period` are relative to the centre of mass of every body
/// with a lower index, and are absent for the first body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub mass: f64,
    pub pv: PV,
    pub elements: Option<OrbitalElements>,
    pub period: Option<f64>,
}

/// The configuration of every body at time `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalState {
    t: f64,
    bodies: Vec<BodySnapshot>,
}

impl OrbitalState {
    pub fn new(t: f64, bodies: Vec<BodySnapshot>) -> Self {
        OrbitalState { t, bodies }
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn bodies(&self) -> &[BodySnapshot] {
        &self.bodies
    }

    pub fn body(&self, i: usize) -> Option<&BodySnapshot> {
        self.bodies.get(i)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// mass-weighted mean position of bodies `0..n`
    pub fn center_of_mass_of_first(&self, n: usize) -> DVec3 {
        let bodies = &self.bodies[..n.min(self.bodies.len())];
        let mass: f64 = bodies.iter().map(|b| b.mass).sum();
        if mass <= 0.0 {
            return DVec3::ZERO;
        }
        bodies.iter().map(|b| b.pv.pos * b.mass).sum::<DVec3>() / mass
    }

    pub fn center_of_mass(&self) -> DVec3 {
        self.center_of_mass_of_first(self.bodies.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mass: f64, x: f64) -> BodySnapshot {
        BodySnapshot {
            mass,
            pv: PV::pos((x, 0.0, 0.0)),
            elements: None,
            period: None,
        }
    }

    #[test]
    fn center_of_mass() {
        let state = OrbitalState::new(2.0, vec![snapshot(3.0, -1.0), snapshot(1.0, 3.0)]);
        assert_eq!(state.time(), 2.0);
        assert_eq!(state.total_mass(), 4.0);
        assert_eq!(state.center_of_mass(), DVec3::ZERO);
        assert_eq!(state.center_of_mass_of_first(1), DVec3::new(-1.0, 0.0, 0.0));
    }
}
