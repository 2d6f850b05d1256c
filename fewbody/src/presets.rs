//! Built-in scenarios.

use crate::config::*;
use crate::error::ConfigError;
use crate::integrator::IntegratorConfig;
use crate::math::TAU;
use std::path::PathBuf;

/// G in AU^3 / (Msun yr^2)
pub const G_AU_YR_MSUN: f64 = TAU * TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Binary,
    TripleBarycentric,
    TriplePanel,
    KozaiLidov,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Binary,
        Preset::TripleBarycentric,
        Preset::TriplePanel,
        Preset::KozaiLidov,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Binary => "binary",
            Preset::TripleBarycentric => "triple-barycentric",
            Preset::TriplePanel => "triple-panel",
            Preset::KozaiLidov => "kozai-lidov",
        }
    }

    pub fn config(&self) -> RunConfig {
        match self {
            Preset::Binary => binary(),
            Preset::TripleBarycentric => triple_barycentric(),
            Preset::TriplePanel => triple_panel(),
            Preset::KozaiLidov => kozai_lidov(),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

fn output(path: &str, width: u32, height: u32) -> OutputConfig {
    OutputConfig {
        path: PathBuf::from(path),
        fps: 30,
        width,
        height,
    }
}

fn inclined(mass: f64, a: f64, e: f64, inc: f64) -> BodyConfig {
    BodyConfig {
        inc,
        ..BodyConfig::orbiting(mass, a, e)
    }
}

/// equal mass binary, e = 0.7, drawn as an orbit overview
pub fn binary() -> RunConfig {
    RunConfig {
        gravitational_constant: 1.0,
        integrator: IntegratorConfig::default(),
        angle_unit: AngleUnit::Radians,
        bodies: vec![BodyConfig::fixed(1.0), BodyConfig::orbiting(1.0, 5.0, 0.7)],
        move_to_com: true,
        time: TimeConfig {
            start: 0.0,
            stop: StopTime::Periods {
                periods: 10.0,
                body: 1,
            },
            step: 1.0,
        },
        visualization: VisualizationConfig {
            mode: VisualizationMode::Overview,
            ..Default::default()
        },
        output: output("binary.gif", 800, 800),
    }
}

/// circular inner binary with a wide, slightly inclined third star
pub fn triple_barycentric() -> RunConfig {
    RunConfig {
        gravitational_constant: 1.0,
        integrator: IntegratorConfig::default(),
        angle_unit: AngleUnit::Radians,
        bodies: vec![
            BodyConfig::fixed(1.0),
            BodyConfig::orbiting(1.0, 5.0, 0.0),
            inclined(1.0, 50.0, 0.5, 0.2),
        ],
        move_to_com: true,
        time: TimeConfig {
            start: 0.0,
            stop: StopTime::Periods {
                periods: 3.0,
                body: 2,
            },
            step: 4.0,
        },
        visualization: VisualizationConfig {
            mode: VisualizationMode::Trail,
            grid: 20.0,
            ..Default::default()
        },
        output: output("triple_barycentric.gif", 1000, 1000),
    }
}

pub fn triple_panel() -> RunConfig {
    RunConfig {
        gravitational_constant: 1.0,
        integrator: IntegratorConfig::default(),
        angle_unit: AngleUnit::Radians,
        bodies: vec![
            BodyConfig::fixed(1.0),
            BodyConfig::orbiting(1.0, 5.0, 0.0),
            inclined(1.0, 25.0, 0.5, 0.2),
        ],
        move_to_com: true,
        time: TimeConfig {
            start: 0.0,
            stop: StopTime::Periods {
                periods: 2.2,
                body: 2,
            },
            step: 2.0,
        },
        visualization: VisualizationConfig {
            mode: VisualizationMode::Overview,
            panels: true,
            ..Default::default()
        },
        output: output("triple_panel.gif", 1500, 500),
    }
}

/// Stellar triple in AU, years and solar masses. The outer companion starts
/// at 70 degrees so the inner orbit's eccentricity and inclination trade off
/// over roughly a million years.
pub fn kozai_lidov() -> RunConfig {
    RunConfig {
        gravitational_constant: G_AU_YR_MSUN,
        integrator: IntegratorConfig::default(),
        angle_unit: AngleUnit::Degrees,
        bodies: vec![
            BodyConfig::fixed(1.4),
            BodyConfig {
                omega: 120.0,
                ..BodyConfig::orbiting(0.3, 5.0, 0.5)
            },
            inclined(0.01, 50.0, 0.0, 70.0),
        ],
        move_to_com: true,
        time: TimeConfig {
            start: 0.0,
            stop: StopTime::At(1E6),
            step: 5E3,
        },
        visualization: VisualizationConfig {
            mode: VisualizationMode::Elements,
            tracked: Some(vec![1, 2]),
            grid: 15.0,
            panels: false,
            time_scale: 1E6,
        },
        output: output("kozai_lidov.gif", 1800, 600),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_valid() {
        for p in Preset::ALL {
            p.config().validate().unwrap();
            assert_eq!(p.name().parse::<Preset>().unwrap(), p);
        }
        assert!(matches!(
            "quadruple".parse::<Preset>(),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn preset_frame_counts() {
        let kozai = kozai_lidov().prepare().unwrap();
        assert_eq!(kozai.timeline.len(), 200);

        // 10 periods of 2 pi sqrt(125 / 2) at a step of 1
        let binary = binary().prepare().unwrap();
        assert_eq!(binary.timeline.len(), 496);
    }
}
