use crate::error::TimelineError;

/// Strictly increasing sample times, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    times: Vec<f64>,
}

impl Timeline {
    /// `floor((stop - start) / step)` frames at `start + i * step`. The stop
    /// time itself is never included.
    pub fn from_span(start: f64, stop: f64, step: f64) -> Result<Self, TimelineError> {
        if !(step > 0.0) || !step.is_finite() {
            return Err(TimelineError::InvalidStep(step));
        }
        if !start.is_finite() || !stop.is_finite() {
            return Err(TimelineError::NonFinite { start, stop });
        }

        let ratio = (stop - start) / step;
        // spans that divide evenly should not lose a frame to rounding
        let n = (ratio * (1.0 + 4.0 * f64::EPSILON)).floor();
        if !(n >= 1.0) {
            return Err(TimelineError::Empty { start, stop, step });
        }

        // a step below the resolution of `start` repeats times
        let times = (0..n as usize).map(|i| start + i as f64 * step).collect();
        Self::from_times(times)
    }

    pub fn from_times(times: Vec<f64>) -> Result<Self, TimelineError> {
        if times.is_empty() {
            return Err(TimelineError::Empty {
                start: f64::NAN,
                stop: f64::NAN,
                step: f64::NAN,
            });
        }
        if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
            return Err(TimelineError::NonFinite {
                start: *bad,
                stop: *bad,
            });
        }
        for (i, w) in times.windows(2).enumerate() {
            if !(w[1] > w[0]) {
                return Err(TimelineError::NotIncreasing {
                    index: i + 1,
                    previous: w[0],
                    next: w[1],
                });
            }
        }
        Ok(Timeline { times })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.times.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.times.iter().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Keeps at most `n` frames. A timeline is never truncated to nothing.
    pub fn truncate(&mut self, n: usize) {
        self.times.truncate(n.max(1));
    }
}
