//! Per-frame record of sampled quantities.
//!
//! The history is allocated up front for every frame of the timeline and is
//! filled strictly in frame order, one whole frame per write. Readers only
//! ever see the populated prefix.

use crate::error::HistoryError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    X,
    Y,
    Z,
    Eccentricity,
    Inclination,
    SemiMajorAxis,
    MeanAnomaly,
}

impl Quantity {
    pub fn label(&self) -> &'static str {
        match self {
            Quantity::X => "x",
            Quantity::Y => "y",
            Quantity::Z => "z",
            Quantity::Eccentricity => "e",
            Quantity::Inclination => "inc",
            Quantity::SemiMajorAxis => "a",
            Quantity::MeanAnomaly => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    pub body: usize,
    pub quantity: Quantity,
}

impl Channel {
    pub fn new(body: usize, quantity: Quantity) -> Self {
        Channel { body, quantity }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.quantity.label(), self.body)
    }
}

#[derive(Debug, Clone)]
pub struct FrameHistory {
    channels: Vec<Channel>,
    capacity: usize,
    populated: usize,
    times: Vec<f64>,
    data: Vec<Vec<f64>>,
}

impl FrameHistory {
    pub fn new(channels: Vec<Channel>, capacity: usize) -> Self {
        let data = channels.iter().map(|_| vec![0.0; capacity]).collect();
        FrameHistory {
            channels,
            capacity,
            populated: 0,
            times: vec![0.0; capacity],
            data,
        }
    }

    /// Writes every channel of `frame` at once. `frame` must be exactly the
    /// next unwritten index and `values` must follow the channel order.
    pub fn record(&mut self, frame: usize, time: f64, values: &[f64]) -> Result<(), HistoryError> {
        if frame >= self.capacity {
            return Err(HistoryError::Overflow {
                frame,
                capacity: self.capacity,
            });
        }
        if frame != self.populated {
            return Err(HistoryError::OutOfOrder {
                expected: self.populated,
                got: frame,
            });
        }
        if values.len() != self.channels.len() {
            return Err(HistoryError::Width {
                expected: self.channels.len(),
                got: values.len(),
            });
        }

        for (series, v) in self.data.iter_mut().zip(values) {
            series[frame] = *v;
        }
        self.times[frame] = time;
        self.populated += 1;
        Ok(())
    }

    pub fn populated(&self) -> usize {
        self.populated
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.populated == self.capacity
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn times(&self) -> &[f64] {
        &self.times[..self.populated]
    }

    pub fn series(&self, body: usize, quantity: Quantity) -> Option<&[f64]> {
        let idx = self
            .channels
            .iter()
            .position(|c| c.body == body && c.quantity == quantity)?;
        Some(&self.data[idx][..self.populated])
    }

    pub fn value(&self, frame: usize, body: usize, quantity: Quantity) -> Option<f64> {
        self.series(body, quantity)?.get(frame).copied()
    }

    /// populated prefix of every channel, in channel order
    pub fn columns(&self) -> impl Iterator<Item = (Channel, &[f64])> + '_ {
        self.channels
            .iter()
            .zip(&self.data)
            .map(|(c, d)| (*c, &d[..self.populated]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> FrameHistory {
        FrameHistory::new(
            vec![
                Channel::new(1, Quantity::Eccentricity),
                Channel::new(1, Quantity::Inclination),
            ],
            3,
        )
    }

    #[test]
    fn unwritten_frames_are_hidden() {
        let mut h = history();
        assert_eq!(h.series(1, Quantity::Eccentricity).unwrap().len(), 0);
        h.record(0, 0.0, &[0.1, 1.2]).unwrap();
        assert_eq!(h.series(1, Quantity::Eccentricity).unwrap(), &[0.1]);
        assert_eq!(h.series(1, Quantity::Inclination).unwrap(), &[1.2]);
        assert_eq!(h.times(), &[0.0]);
        assert_eq!(h.value(1, 1, Quantity::Eccentricity), None);
        assert!(h.series(2, Quantity::Eccentricity).is_none());
    }

    #[test]
    fn frames_are_written_once_in_order() {
        let mut h = history();
        h.record(0, 0.0, &[0.1, 1.2]).unwrap();
        assert_eq!(
            h.record(0, 0.0, &[0.1, 1.2]),
            Err(HistoryError::OutOfOrder {
                expected: 1,
                got: 0
            })
        );
        assert_eq!(
            h.record(2, 2.0, &[0.1, 1.2]),
            Err(HistoryError::OutOfOrder {
                expected: 1,
                got: 2
            })
        );
        assert_eq!(h.populated(), 1);
    }

    #[test]
    fn rejected_write_changes_nothing() {
        let mut h = history();
        assert_eq!(
            h.record(0, 0.0, &[0.1]),
            Err(HistoryError::Width {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(h.populated(), 0);
        assert!(h.times().is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let mut h = history();
        for i in 0..3 {
            h.record(i, i as f64, &[0.0, 0.0]).unwrap();
        }
        assert!(h.is_full());
        assert_eq!(
            h.record(3, 3.0, &[0.0, 0.0]),
            Err(HistoryError::Overflow {
                frame: 3,
                capacity: 3
            })
        );
    }

    #[test]
    fn channel_labels() {
        assert_eq!(Channel::new(2, Quantity::X).to_string(), "x[2]");
        assert_eq!(Channel::new(1, Quantity::Eccentricity).to_string(), "e[1]");
    }
}
