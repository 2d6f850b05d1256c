pub mod animation;
pub mod config;
pub mod driver;
pub mod elements;
pub mod error;
pub mod file_export;
pub mod history;
pub mod integrator;
pub mod kepler;
pub mod math;
pub mod prelude;
pub mod presets;
pub mod pv;
pub mod sampler;
pub mod simulation;
pub mod state;
pub mod timeline;
