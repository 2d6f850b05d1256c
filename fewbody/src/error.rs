use crate::history::Quantity;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeplerError {
    #[error(
        "Kepler's equation did not converge for M = {mean_anomaly}, e = {eccentricity} \
         (residual {residual:e} after {iterations} iterations)"
    )]
    NonConvergence {
        mean_anomaly: f64,
        eccentricity: f64,
        residual: f64,
        iterations: usize,
    },

    #[error("eccentricity {0} is outside [0, 1)")]
    InvalidEccentricity(f64),

    #[error("non-finite input to Kepler's equation: M = {mean_anomaly}, e = {eccentricity}")]
    NonFinite { mean_anomaly: f64, eccentricity: f64 },

    #[error("orbit curve resolution must be positive, got {0}")]
    InvalidResolution(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    #[error("step size collapsed to {step:e} at t = {time}")]
    StepSizeCollapse { time: f64, step: f64 },

    #[error("state became non-finite at t = {time}")]
    NonFinite { time: f64 },

    #[error("exceeded {max_steps} steps while advancing from t = {from} to t = {to}")]
    MaxSteps { max_steps: usize, from: f64, to: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("cannot advance backwards from t = {previous} to t = {requested}")]
    TimeReversal { previous: f64, requested: f64 },

    #[error("integrator has no body at index {0}")]
    MissingBody(usize),

    #[error(transparent)]
    Integrator(#[from] IntegratorError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("timeline step must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("timeline bounds must be finite, got [{start}, {stop}]")]
    NonFinite { start: f64, stop: f64 },

    #[error("timeline from {start} to {stop} with step {step} has no frames")]
    Empty { start: f64, stop: f64, step: f64 },

    #[error("timeline is not strictly increasing at index {index} ({previous} -> {next})")]
    NotIncreasing {
        index: usize,
        previous: f64,
        next: f64,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("frame {got} written out of order, next writable frame is {expected}")]
    OutOfOrder { expected: usize, got: usize },

    #[error("frame {frame} is beyond the history capacity of {capacity}")]
    Overflow { frame: usize, capacity: usize },

    #[error("expected {expected} values per frame, got {got}")]
    Width { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("body {0} is not part of the sampled state")]
    UnknownBody(usize),

    #[error("body {0} has no orbital elements (it is the reference body)")]
    MissingElements(usize),

    #[error("sampled {quantity:?} of body {body} is not finite")]
    NonFinite { body: usize, quantity: Quantity },

    #[error(transparent)]
    Kepler(#[from] KeplerError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("unable to write animation: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to encode frame: {0}")]
    Encode(String),

    #[error("sink is already closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Stage of the frame loop in which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Integrate,
    Sample,
    Render,
    Finish,
    Cancelled,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Integrate => "integration",
            Stage::Sample => "sampling",
            Stage::Render => "rendering",
            Stage::Finish => "finalization",
            Stage::Cancelled => "cancellation",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum RunFailure {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("run was cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
#[error("run aborted during {stage} of frame {frame} ({frames_completed} frames completed): {source}")]
pub struct RunError {
    pub frame: usize,
    pub stage: Stage,
    pub frames_completed: usize,
    #[source]
    pub source: RunFailure,
}
