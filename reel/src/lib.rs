pub mod aabb;
pub mod camera;
pub mod canvas;
pub mod gif_sink;
pub mod render;
