use crate::error::SimulationError;
use crate::integrator::Integrator;
use crate::state::{BodySnapshot, OrbitalState};

/// Sole owner of an integrator for the duration of a run.
///
/// Every call to [`IntegrationDriver::advance`] moves the integrator clock
/// forward and reads out a snapshot of every body. Targets must not go
/// backwards; a reversed target is reported and the integrator is left
/// untouched.
#[derive(Debug)]
pub struct IntegrationDriver<I: Integrator> {
    integrator: I,
    last_target: Option<f64>,
}

impl<I: Integrator> IntegrationDriver<I> {
    pub fn new(integrator: I) -> Self {
        IntegrationDriver {
            integrator,
            last_target: None,
        }
    }

    pub fn advance(&mut self, target: f64) -> Result<OrbitalState, SimulationError> {
        if let Some(previous) = self.last_target {
            if target < previous {
                return Err(SimulationError::TimeReversal {
                    previous,
                    requested: target,
                });
            }
        }

        self.integrator.advance_to(target)?;
        self.last_target = Some(target);
        self.snapshot()
    }

    /// reads every body at the integrator's current time without stepping
    pub fn snapshot(&self) -> Result<OrbitalState, SimulationError> {
        let bodies = (0..self.integrator.len())
            .map(|i| {
                let body = self
                    .integrator
                    .particle(i)
                    .ok_or(SimulationError::MissingBody(i))?;
                Ok(BodySnapshot {
                    mass: body.mass,
                    pv: body.pv,
                    elements: self.integrator.elements(i),
                    period: self.integrator.period(i),
                })
            })
            .collect::<Result<Vec<_>, SimulationError>>()?;

        Ok(OrbitalState::new(self.integrator.time(), bodies))
    }

    pub fn last_target(&self) -> Option<f64> {
        self.last_target
    }

    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    pub fn into_inner(self) -> I {
        self.integrator
    }
}
