pub use crate::animation::{AnimationDriver, Frame, RenderSink, RunSummary};
pub use crate::config::{
    load_config_from_file, RunConfig, StopTime, VisualizationMode, PreparedRun,
};
pub use crate::driver::IntegrationDriver;
pub use crate::elements::OrbitalElements;
pub use crate::error::{
    ConfigError, KeplerError, RunError, SampleError, SimulationError, SinkError, Stage,
};
pub use crate::file_export::write_history_csv;
pub use crate::history::{Channel, FrameHistory, Quantity};
pub use crate::integrator::{Integrator, IntegratorConfig, Scheme};
pub use crate::kepler::{orbit_curve, KeplerSolver};
pub use crate::math::{DVec2, DVec3, PI, TAU};
pub use crate::presets::Preset;
pub use crate::pv::PV;
pub use crate::sampler::{FrameSample, FrameSampler, OrbitCurve, SamplingMode};
pub use crate::simulation::Simulation;
pub use crate::state::{Body, BodySnapshot, OrbitalState};
pub use crate::timeline::Timeline;
