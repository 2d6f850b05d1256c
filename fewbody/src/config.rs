//! Run configuration, loaded from YAML or built from a preset.

use crate::driver::IntegrationDriver;
use crate::elements::OrbitalElements;
use crate::error::ConfigError;
use crate::integrator::{Integrator, IntegratorConfig};
use crate::math::DVec3;
use crate::pv::PV;
use crate::sampler::{FrameSampler, SamplingMode};
use crate::simulation::Simulation;
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MIN_BODIES: usize = 2;
pub const MAX_BODIES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(&self, x: f64) -> f64 {
        match self {
            AngleUnit::Degrees => x.to_radians(),
            AngleUnit::Radians => x,
        }
    }
}

/// One body. The first body is the reference and may only be given a
/// Cartesian state; every later body is placed either on an orbit about the
/// centre of mass of its predecessors (when `a` is set) or at `pos`/`vel`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyConfig {
    pub mass: f64,
    pub a: Option<f64>,
    pub e: f64,
    pub inc: f64,
    pub omega: f64,
    #[serde(rename = "node")]
    pub ascending_node: f64,
    /// true anomaly
    pub f: f64,
    pub pos: Option<[f64; 3]>,
    pub vel: Option<[f64; 3]>,
}

impl BodyConfig {
    pub fn fixed(mass: f64) -> Self {
        BodyConfig {
            mass,
            ..Default::default()
        }
    }

    pub fn orbiting(mass: f64, a: f64, e: f64) -> Self {
        BodyConfig {
            mass,
            a: Some(a),
            e,
            ..Default::default()
        }
    }

    pub fn has_elements(&self) -> bool {
        self.a.is_some()
    }

    pub fn has_cartesian(&self) -> bool {
        self.pos.is_some() || self.vel.is_some()
    }

    pub fn elements(&self, unit: AngleUnit) -> Option<OrbitalElements> {
        Some(OrbitalElements {
            semi_major_axis: self.a?,
            eccentricity: self.e,
            inclination: unit.to_radians(self.inc),
            ascending_node: unit.to_radians(self.ascending_node),
            arg_periapsis: unit.to_radians(self.omega),
            true_anomaly: unit.to_radians(self.f),
        })
    }

    pub fn pv(&self) -> PV {
        let pos = self.pos.map(DVec3::from_array).unwrap_or(DVec3::ZERO);
        let vel = self.vel.map(DVec3::from_array).unwrap_or(DVec3::ZERO);
        PV::new(pos, vel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopTime {
    At(f64),
    /// a multiple of the Keplerian period of `body` at t = 0
    Periods { periods: f64, body: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeConfig {
    #[serde(default)]
    pub start: f64,
    pub stop: StopTime,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    /// 3D trails of every tracked body
    #[default]
    Trail,
    /// orbit curves next to eccentricity and inclination plots
    Elements,
    /// auto-scaled full orbits, drawn by the sink
    Overview,
}

impl VisualizationMode {
    pub fn sampling(&self) -> SamplingMode {
        match self {
            VisualizationMode::Elements => SamplingMode::Elements,
            VisualizationMode::Trail | VisualizationMode::Overview => SamplingMode::Cartesian,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizationConfig {
    pub mode: VisualizationMode,
    /// defaults to every body, or every body with elements
    pub tracked: Option<Vec<usize>>,
    /// half-width of the plotted cube
    pub grid: f64,
    /// overview only: xy, xz and yz projections side by side
    pub panels: bool,
    /// elements only: time axis is divided by this
    pub time_scale: f64,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            mode: VisualizationMode::Trail,
            tracked: None,
            grid: 20.0,
            panels: false,
            time_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: PathBuf::from("orbits.gif"),
            fps: 30,
            width: 800,
            height: 800,
        }
    }
}

fn default_g() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_g")]
    pub gravitational_constant: f64,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub angle_unit: AngleUnit,
    pub bodies: Vec<BodyConfig>,
    #[serde(default = "yes")]
    pub move_to_com: bool,
    pub time: TimeConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Everything the frame loop needs, built from a validated configuration.
#[derive(Debug)]
pub struct PreparedRun {
    pub driver: IntegrationDriver<Simulation>,
    pub timeline: Timeline,
    pub sampler: FrameSampler,
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn positive(name: &str, x: f64) -> Result<(), ConfigError> {
    if x > 0.0 && x.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive and finite, got {x}")))
    }
}

pub fn load_config_from_file(filename: &Path) -> Result<RunConfig, ConfigError> {
    let s = std::fs::read_to_string(filename)?;
    RunConfig::from_yaml(&s)
}

pub fn write_config_to_file(path: &Path, config: &RunConfig) -> Result<(), ConfigError> {
    Ok(std::fs::write(path, config.to_yaml()?)?)
}

impl RunConfig {
    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Tracked bodies, falling back to the default for the mode.
    pub fn tracked(&self) -> Vec<usize> {
        match &self.visualization.tracked {
            Some(t) => t.clone(),
            None => match self.visualization.mode.sampling() {
                SamplingMode::Elements => (1..self.bodies.len()).collect(),
                SamplingMode::Cartesian => (0..self.bodies.len()).collect(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.bodies.len();
        if !(MIN_BODIES..=MAX_BODIES).contains(&n) {
            return Err(invalid(format!(
                "between {MIN_BODIES} and {MAX_BODIES} bodies are supported, got {n}"
            )));
        }

        positive("gravitational_constant", self.gravitational_constant)?;
        positive("integrator.dt", self.integrator.dt)?;
        positive("integrator.tolerance", self.integrator.tolerance)?;
        positive("integrator.min_step", self.integrator.min_step)?;
        if self.integrator.max_steps == 0 {
            return Err(invalid("integrator.max_steps must be at least 1"));
        }

        for (i, b) in self.bodies.iter().enumerate() {
            positive(&format!("mass of body {i}"), b.mass)?;
            if b.has_elements() && b.has_cartesian() {
                return Err(invalid(format!(
                    "body {i} has both orbital elements and a Cartesian state"
                )));
            }
            if i == 0 && b.has_elements() {
                return Err(invalid("the first body is the reference and cannot have elements"));
            }
            if let Some(a) = b.a {
                positive(&format!("semi-major axis of body {i}"), a)?;
                if !(0.0..1.0).contains(&b.e) {
                    return Err(invalid(format!(
                        "eccentricity of body {i} must be in [0, 1), got {}",
                        b.e
                    )));
                }
            }
            let angles = [b.inc, b.omega, b.ascending_node, b.f];
            let coords = b.pos.into_iter().chain(b.vel).flatten();
            if !angles.into_iter().chain(coords).all(f64::is_finite) {
                return Err(invalid(format!("body {i} has a non-finite field")));
            }
        }

        positive("time.step", self.time.step)?;
        if !self.time.start.is_finite() {
            return Err(invalid("time.start must be finite"));
        }
        match self.time.stop {
            StopTime::At(stop) => {
                if !(stop > self.time.start) {
                    return Err(invalid(format!(
                        "time.stop ({stop}) must be after time.start ({})",
                        self.time.start
                    )));
                }
            }
            StopTime::Periods { periods, body } => {
                positive("time.stop.periods", periods)?;
                if !self.bodies.get(body).is_some_and(|b| b.has_elements()) {
                    return Err(invalid(format!(
                        "time.stop refers to body {body}, which has no orbit"
                    )));
                }
            }
        }

        if self.output.fps == 0 {
            return Err(invalid("output.fps must be at least 1"));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(invalid("output size must be non-zero"));
        }
        positive("visualization.grid", self.visualization.grid)?;
        positive("visualization.time_scale", self.visualization.time_scale)?;

        let tracked = self.tracked();
        if tracked.is_empty() {
            return Err(invalid("no bodies are tracked"));
        }
        for b in tracked {
            if b >= n {
                return Err(invalid(format!("tracked body {b} does not exist")));
            }
            if b == 0 && self.visualization.mode == VisualizationMode::Elements {
                return Err(invalid(
                    "body 0 is the reference and has no elements to plot",
                ));
            }
        }

        Ok(())
    }

    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let mut sim = Simulation::new(self.gravitational_constant, self.integrator);
        for (i, b) in self.bodies.iter().enumerate() {
            match b.elements(self.angle_unit) {
                Some(el) => {
                    sim.add_orbit(b.mass, el)
                        .ok_or_else(|| invalid(format!("body {i} cannot be placed on its orbit")))?;
                }
                None => {
                    sim.add_pv(b.mass, b.pv());
                }
            }
        }
        if self.move_to_com {
            sim.move_to_com();
        }
        sim.set_time(self.time.start);
        Ok(sim)
    }

    /// Frame times. A stop given in periods is resolved against `sim` as
    /// configured, before any integration.
    pub fn timeline(&self, sim: &Simulation) -> Result<Timeline, ConfigError> {
        let stop = match self.time.stop {
            StopTime::At(t) => t,
            StopTime::Periods { periods, body } => {
                let p = sim
                    .period(body)
                    .ok_or_else(|| invalid(format!("body {body} has no period")))?;
                self.time.start + periods * p
            }
        };
        Ok(Timeline::from_span(self.time.start, stop, self.time.step)?)
    }

    /// Elements mode needs a bound orbit for every tracked body, including
    /// bodies that were placed by position and velocity.
    fn check_tracked_orbits(&self, sim: &Simulation) -> Result<(), ConfigError> {
        if self.visualization.mode.sampling() != SamplingMode::Elements {
            return Ok(());
        }
        for b in self.tracked() {
            match sim.elements(b) {
                Some(el) if el.is_bound() => (),
                Some(el) => {
                    return Err(invalid(format!(
                        "tracked body {b} is not on a bound orbit (e = {}, a = {})",
                        el.eccentricity, el.semi_major_axis
                    )))
                }
                None => return Err(invalid(format!("tracked body {b} has no orbit"))),
            }
        }
        Ok(())
    }

    pub fn sampler(&self) -> FrameSampler {
        FrameSampler::new(self.visualization.mode.sampling(), self.tracked())
    }

    pub fn prepare(&self) -> Result<PreparedRun, ConfigError> {
        self.validate()?;
        let sim = self.build_simulation()?;
        self.check_tracked_orbits(&sim)?;
        let timeline = self.timeline(&sim)?;
        debug!(
            bodies = sim.len(),
            frames = timeline.len(),
            scheme = %self.integrator.scheme,
            "prepared run"
        );
        Ok(PreparedRun {
            driver: IntegrationDriver::new(sim),
            timeline,
            sampler: self.sampler(),
        })
    }
}
