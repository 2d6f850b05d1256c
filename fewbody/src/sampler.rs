use crate::error::SampleError;
use crate::history::{Channel, FrameHistory, Quantity};
use crate::kepler::{orbit_curve, KeplerSolver, DEFAULT_CURVE_RESOLUTION};
use crate::math::DVec3;
use crate::state::OrbitalState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// x, y, z of every tracked body
    #[default]
    Cartesian,
    /// e, inc, a, M of every tracked body, plus its orbit curve
    Elements,
}

impl SamplingMode {
    pub fn quantities(&self) -> &'static [Quantity] {
        match self {
            SamplingMode::Cartesian => &[Quantity::X, Quantity::Y, Quantity::Z],
            SamplingMode::Elements => &[
                Quantity::Eccentricity,
                Quantity::Inclination,
                Quantity::SemiMajorAxis,
                Quantity::MeanAnomaly,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCurve {
    pub body: usize,
    pub points: Vec<DVec3>,
}

/// Per-frame output that is not kept in the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSample {
    pub curves: Vec<OrbitCurve>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSampler {
    pub mode: SamplingMode,
    pub tracked: Vec<usize>,
    pub solver: KeplerSolver,
    pub curve_resolution: f64,
}

impl FrameSampler {
    pub fn new(mode: SamplingMode, tracked: Vec<usize>) -> Self {
        FrameSampler {
            mode,
            tracked,
            solver: KeplerSolver::default(),
            curve_resolution: DEFAULT_CURVE_RESOLUTION,
        }
    }

    pub fn cartesian(tracked: Vec<usize>) -> Self {
        Self::new(SamplingMode::Cartesian, tracked)
    }

    pub fn elements(tracked: Vec<usize>) -> Self {
        Self::new(SamplingMode::Elements, tracked)
    }

    /// Channel layout of the history this sampler writes into, body-major.
    pub fn channels(&self) -> Vec<Channel> {
        self.tracked
            .iter()
            .flat_map(|b| {
                self.mode
                    .quantities()
                    .iter()
                    .map(move |q| Channel::new(*b, *q))
            })
            .collect()
    }

    pub fn history(&self, frames: usize) -> FrameHistory {
        FrameHistory::new(self.channels(), frames)
    }

    /// Extracts this frame's quantities from `state` and records them at
    /// `frame`. Nothing is written unless every value is finite and every
    /// orbit curve could be computed.
    pub fn sample(
        &self,
        state: &OrbitalState,
        frame: usize,
        history: &mut FrameHistory,
    ) -> Result<FrameSample, SampleError> {
        let mut values = Vec::with_capacity(self.tracked.len() * 4);
        let mut sample = FrameSample::default();

        for &b in &self.tracked {
            let body = state.body(b).ok_or(SampleError::UnknownBody(b))?;
            match self.mode {
                SamplingMode::Cartesian => {
                    let p = body.pv.pos;
                    values.extend([p.x, p.y, p.z]);
                }
                SamplingMode::Elements => {
                    let el = body.elements.ok_or(SampleError::MissingElements(b))?;
                    let ma = el.mean_anomaly();
                    values.extend([el.eccentricity, el.inclination, el.semi_major_axis, ma]);
                    let points = orbit_curve(
                        &self.solver,
                        el.semi_major_axis,
                        el.eccentricity,
                        el.inclination,
                        ma,
                        self.curve_resolution,
                    )?;
                    sample.curves.push(OrbitCurve { body: b, points });
                }
            }
        }

        let quantities = self.mode.quantities();
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(SampleError::NonFinite {
                body: self.tracked[i / quantities.len()],
                quantity: quantities[i % quantities.len()],
            });
        }

        history.record(frame, state.time(), &values)?;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::OrbitalElements;
    use crate::error::{HistoryError, KeplerError};
    use crate::pv::PV;
    use crate::state::BodySnapshot;
    use approx::assert_relative_eq;

    fn state(t: f64, e: f64) -> OrbitalState {
        let primary = BodySnapshot {
            mass: 1.0,
            pv: PV::zero(),
            elements: None,
            period: None,
        };
        let secondary = BodySnapshot {
            mass: 1.0,
            pv: PV::new((4.0, 1.0, -2.0), (0.0, 0.3, 0.0)),
            elements: Some(OrbitalElements {
                inclination: 0.3,
                true_anomaly: 1.0,
                ..OrbitalElements::new(5.0, e)
            }),
            period: None,
        };
        OrbitalState::new(t, vec![primary, secondary])
    }

    #[test]
    fn cartesian_channels_are_body_major() {
        let sampler = FrameSampler::cartesian(vec![0, 1]);
        let ch = sampler.channels();
        assert_eq!(ch.len(), 6);
        assert_eq!(ch[0], Channel::new(0, Quantity::X));
        assert_eq!(ch[5], Channel::new(1, Quantity::Z));
    }

    #[test]
    fn cartesian_sample() {
        let sampler = FrameSampler::cartesian(vec![1]);
        let mut h = sampler.history(2);
        let s = sampler.sample(&state(0.5, 0.1), 0, &mut h).unwrap();
        assert!(s.curves.is_empty());
        assert_eq!(h.value(0, 1, Quantity::X), Some(4.0));
        assert_eq!(h.value(0, 1, Quantity::Z), Some(-2.0));
        assert_eq!(h.times(), &[0.5]);
    }

    #[test]
    fn elements_sample_records_and_draws() {
        let sampler = FrameSampler::elements(vec![1]);
        let mut h = sampler.history(1);
        let s = sampler.sample(&state(0.0, 0.5), 0, &mut h).unwrap();
        assert_eq!(h.value(0, 1, Quantity::Eccentricity), Some(0.5));
        assert_eq!(h.value(0, 1, Quantity::SemiMajorAxis), Some(5.0));
        assert_relative_eq!(h.value(0, 1, Quantity::Inclination).unwrap(), 0.3);
        assert_eq!(s.curves.len(), 1);
        assert_eq!(s.curves[0].body, 1);
        assert_eq!(s.curves[0].points.len(), 629);
    }

    #[test]
    fn reference_body_has_no_elements() {
        let sampler = FrameSampler::elements(vec![0, 1]);
        let mut h = sampler.history(1);
        let err = sampler.sample(&state(0.0, 0.5), 0, &mut h).unwrap_err();
        assert_eq!(err, SampleError::MissingElements(0));
        assert_eq!(h.populated(), 0);
    }

    #[test]
    fn unknown_body() {
        let sampler = FrameSampler::cartesian(vec![4]);
        let mut h = sampler.history(1);
        assert_eq!(
            sampler.sample(&state(0.0, 0.5), 0, &mut h),
            Err(SampleError::UnknownBody(4))
        );
    }

    #[test]
    fn failed_curve_leaves_frame_unwritten() {
        let sampler = FrameSampler::elements(vec![1]);
        let mut h = sampler.history(1);
        let err = sampler.sample(&state(0.0, 1.5), 0, &mut h).unwrap_err();
        assert!(matches!(
            err,
            SampleError::Kepler(KeplerError::InvalidEccentricity(_) | KeplerError::NonFinite { .. })
        ));
        assert_eq!(h.populated(), 0);
    }

    #[test]
    fn non_finite_values_are_reported() {
        let sampler = FrameSampler::cartesian(vec![1]);
        let mut h = sampler.history(1);
        let mut bodies = state(0.0, 0.1).bodies().to_vec();
        bodies[1].pv.pos.y = f64::NAN;
        let bad = OrbitalState::new(0.0, bodies);
        assert_eq!(
            sampler.sample(&bad, 0, &mut h),
            Err(SampleError::NonFinite {
                body: 1,
                quantity: Quantity::Y
            })
        );
    }

    #[test]
    fn frames_must_follow_each_other() {
        let sampler = FrameSampler::cartesian(vec![1]);
        let mut h = sampler.history(3);
        sampler.sample(&state(0.0, 0.1), 0, &mut h).unwrap();
        assert_eq!(
            sampler.sample(&state(1.0, 0.1), 2, &mut h),
            Err(SampleError::History(HistoryError::OutOfOrder {
                expected: 1,
                got: 2
            }))
        );
    }
}
