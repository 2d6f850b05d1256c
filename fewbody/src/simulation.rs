use crate::elements::OrbitalElements;
use crate::error::IntegratorError;
use crate::integrator::*;
use crate::math::DVec3;
use crate::pv::PV;
use crate::state::Body;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// A handful of point masses under mutual gravity.
///
/// Bodies added by elements are placed relative to the centre of mass of
/// everything added before them, so a sequence of `add_orbit` calls builds
/// a hierarchical system.
#[derive(Debug)]
pub struct Simulation {
    g: f64,
    time: f64,
    masses: Vec<f64>,
    states: Vec<PV>,
    config: IntegratorConfig,
    step_hint: Option<f64>,
    stats: StepStats,
}

impl Simulation {
    pub fn new(g: f64, config: IntegratorConfig) -> Self {
        Simulation {
            g,
            time: 0.0,
            masses: Vec::new(),
            states: Vec::new(),
            config,
            step_hint: None,
            stats: StepStats::default(),
        }
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn set_time(&mut self, t: f64) {
        self.time = t;
    }

    pub fn add(&mut self, mass: f64) -> usize {
        self.add_pv(mass, PV::zero())
    }

    pub fn add_pv(&mut self, mass: f64, pv: impl Into<PV>) -> usize {
        self.masses.push(mass);
        self.states.push(pv.into());
        self.masses.len() - 1
    }

    /// Adds a body on the given orbit about the centre of mass of the bodies
    /// already present. Returns `None` without modifying the simulation if
    /// there is no primary yet or the orbit is not a valid bound ellipse.
    pub fn add_orbit(&mut self, mass: f64, elements: OrbitalElements) -> Option<usize> {
        if !elements.is_bound() {
            return None;
        }
        let (primary_mass, primary) = self.interior(self.len())?;
        let mu = self.g * (primary_mass + mass);
        let rel = elements.to_pv(mu)?;
        Some(self.add_pv(mass, primary + rel))
    }

    /// total mass and centre of mass state of particles `0..n`
    pub fn interior(&self, n: usize) -> Option<(f64, PV)> {
        if n == 0 || n > self.len() {
            return None;
        }
        let mass: f64 = self.masses[..n].iter().sum();
        if !(mass > 0.0) {
            return None;
        }
        let weighted = self.masses[..n]
            .iter()
            .zip(&self.states[..n])
            .fold(PV::zero(), |acc, (m, s)| acc + *s * *m);
        Some((mass, weighted / mass))
    }

    pub fn com(&self) -> PV {
        self.interior(self.len())
            .map(|(_, pv)| pv)
            .unwrap_or_default()
    }

    pub fn move_to_com(&mut self) {
        let com = self.com();
        self.states.iter_mut().for_each(|s| *s -= com);
    }

    pub fn momentum(&self) -> DVec3 {
        self.masses
            .iter()
            .zip(&self.states)
            .map(|(m, s)| s.vel * *m)
            .sum()
    }

    pub fn energy(&self) -> f64 {
        let kinetic: f64 = self
            .masses
            .iter()
            .zip(&self.states)
            .map(|(m, s)| 0.5 * m * s.vel.length_squared())
            .sum();
        let mut potential = 0.0;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let r = self.states[i].pos.distance(self.states[j].pos);
                potential -= self.g * self.masses[i] * self.masses[j] / r;
            }
        }
        kinetic + potential
    }

    fn check_finite(&self) -> Result<(), IntegratorError> {
        if self.states.iter().all(PV::is_finite) {
            Ok(())
        } else {
            Err(IntegratorError::NonFinite { time: self.time })
        }
    }

    fn advance_fixed(&mut self, target: f64) -> Result<(), IntegratorError> {
        let span = target - self.time;
        let steps = (span / self.config.dt).ceil().max(1.0);
        if steps > self.config.max_steps as f64 {
            return Err(IntegratorError::MaxSteps {
                max_steps: self.config.max_steps,
                from: self.time,
                to: target,
            });
        }
        let h = span / steps;
        for _ in 0..steps as usize {
            match self.config.scheme {
                Scheme::Leapfrog => leapfrog_step(self.g, &self.masses, &mut self.states, h),
                _ => rk4_step(self.g, &self.masses, &mut self.states, h),
            }
            self.stats.accepted += 1;
        }
        self.time = target;
        self.check_finite()
    }

    fn advance_adaptive(&mut self, target: f64) -> Result<(), IntegratorError> {
        let from = self.time;
        let mut h = self.step_hint.unwrap_or(self.config.dt);
        let mut steps = 0;

        while self.time < target {
            if steps >= self.config.max_steps {
                return Err(IntegratorError::MaxSteps {
                    max_steps: self.config.max_steps,
                    from,
                    to: target,
                });
            }
            steps += 1;

            let remaining = target - self.time;
            let clipped = h >= remaining;
            let trial = if clipped { remaining } else { h };

            let (next, err) = rkf45_trial(
                self.g,
                &self.masses,
                &self.states,
                trial,
                self.config.tolerance,
            );

            if !err.is_finite() {
                return Err(IntegratorError::NonFinite { time: self.time });
            }

            let factor = if err == 0.0 {
                5.0
            } else {
                (0.9 * err.powf(-0.2)).clamp(0.2, 5.0)
            };

            if err <= 1.0 {
                self.states = next;
                self.time = if clipped { target } else { self.time + trial };
                self.stats.accepted += 1;
                if !clipped {
                    h = trial * factor;
                }
            } else {
                self.stats.rejected += 1;
                h = trial * factor;
                if h < self.config.min_step && target - self.time > self.config.min_step {
                    return Err(IntegratorError::StepSizeCollapse {
                        time: self.time,
                        step: h,
                    });
                }
            }
        }

        self.step_hint = Some(h);
        self.check_finite()
    }
}

impl Integrator for Simulation {
    fn time(&self) -> f64 {
        self.time
    }

    fn advance_to(&mut self, t: f64) -> Result<(), IntegratorError> {
        if t <= self.time {
            return Ok(());
        }
        let before = self.stats;
        match self.config.scheme {
            Scheme::Rkf45 => self.advance_adaptive(t)?,
            Scheme::Leapfrog | Scheme::Rk4 => self.advance_fixed(t)?,
        }
        debug!(
            t,
            accepted = self.stats.accepted - before.accepted,
            rejected = self.stats.rejected - before.rejected,
            "advanced"
        );
        Ok(())
    }

    fn len(&self) -> usize {
        self.masses.len()
    }

    fn particle(&self, i: usize) -> Option<Body> {
        Some(Body::new(*self.masses.get(i)?, self.states[i]))
    }

    fn elements(&self, i: usize) -> Option<OrbitalElements> {
        let (primary_mass, primary) = self.interior(i)?;
        let body = self.particle(i)?;
        OrbitalElements::from_pv(body.pv - primary, self.g * (primary_mass + body.mass))
    }

    fn period(&self, i: usize) -> Option<f64> {
        let (primary_mass, _) = self.interior(i)?;
        let mu = self.g * (primary_mass + *self.masses.get(i)?);
        self.elements(i)?.period(mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TAU;
    use approx::assert_relative_eq;

    fn binary(scheme: Scheme) -> Simulation {
        let mut sim = Simulation::new(1.0, IntegratorConfig::with_scheme(scheme));
        sim.add(1.0);
        sim.add_orbit(1.0, OrbitalElements::new(5.0, 0.0)).unwrap();
        sim.move_to_com();
        sim
    }

    #[test]
    fn orbit_placement_uses_interior_com() {
        let mut sim = Simulation::new(1.0, IntegratorConfig::default());
        sim.add(1.0);
        sim.add_orbit(1.0, OrbitalElements::new(5.0, 0.0)).unwrap();
        sim.add_orbit(1.0, OrbitalElements::new(50.0, 0.5)).unwrap();

        let outer = sim.particle(2).unwrap();
        // inner pair's COM sits at x = 2.5, outer periapsis is 25 beyond it
        assert_relative_eq!(outer.pv.pos.x, 2.5 + 25.0, epsilon = 1E-12);

        let el = sim.elements(2).unwrap();
        assert_relative_eq!(el.semi_major_axis, 50.0, epsilon = 1E-9);
        assert_relative_eq!(el.eccentricity, 0.5, epsilon = 1E-9);
        assert!(sim.elements(0).is_none());
    }

    #[test]
    fn add_orbit_needs_primary() {
        let mut sim = Simulation::new(1.0, IntegratorConfig::default());
        assert!(sim.add_orbit(1.0, OrbitalElements::new(5.0, 0.0)).is_none());
        sim.add(1.0);
        assert!(sim.add_orbit(1.0, OrbitalElements::new(5.0, 1.0)).is_none());
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn com_frame() {
        let sim = binary(Scheme::Rkf45);
        assert_relative_eq!(sim.com().pos.length(), 0.0, epsilon = 1E-15);
        assert_relative_eq!(sim.momentum().length(), 0.0, epsilon = 1E-15);
    }

    #[test]
    fn period_of_equal_mass_binary() {
        let sim = binary(Scheme::Rkf45);
        assert_relative_eq!(
            sim.period(1).unwrap(),
            TAU * (125.0_f64 / 2.0).sqrt(),
            epsilon = 1E-9
        );
    }

    #[test]
    fn period_of_missing_body() {
        let sim = binary(Scheme::Rkf45);
        assert!(sim.period(0).is_none());
        assert!(sim.period(2).is_none());
        assert!(sim.period(7).is_none());
    }

    #[test]
    fn every_scheme_conserves_energy() {
        for scheme in [Scheme::Leapfrog, Scheme::Rk4, Scheme::Rkf45] {
            let mut sim = binary(scheme);
            let e0 = sim.energy();
            sim.advance_to(25.0).unwrap();
            assert_eq!(sim.time(), 25.0);
            assert_relative_eq!(sim.energy(), e0, max_relative = 1E-5);
        }
    }

    #[test]
    fn advancing_to_the_past_is_a_noop() {
        let mut sim = binary(Scheme::Rk4);
        sim.advance_to(1.0).unwrap();
        let before = sim.particle(1).unwrap();
        sim.advance_to(0.5).unwrap();
        assert_eq!(sim.time(), 1.0);
        assert_eq!(sim.particle(1).unwrap(), before);
    }

    #[test]
    fn close_encounter_collapses_step() {
        let config = IntegratorConfig {
            min_step: 1E-3,
            ..IntegratorConfig::default()
        };
        let mut sim = Simulation::new(1.0, config);
        sim.add_pv(1.0, PV::zero());
        sim.add_pv(1.0, PV::new((1E-4, 0.0, 0.0), (0.0, 0.0, 0.0)));
        let err = sim.advance_to(1.0).unwrap_err();
        assert!(matches!(
            err,
            IntegratorError::StepSizeCollapse { .. } | IntegratorError::NonFinite { .. }
        ));
    }

    #[test]
    fn step_budget_is_enforced() {
        let config = IntegratorConfig {
            scheme: Scheme::Rk4,
            dt: 0.01,
            max_steps: 10,
            ..IntegratorConfig::default()
        };
        let mut sim = Simulation::new(1.0, config);
        sim.add(1.0);
        sim.add_orbit(1.0, OrbitalElements::new(5.0, 0.0)).unwrap();
        assert!(matches!(
            sim.advance_to(1.0),
            Err(IntegratorError::MaxSteps { .. })
        ));
    }
}
