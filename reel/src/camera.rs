//! Orthographic views of 3D scenes.

use glam::f64::{DVec2, DVec3};

/// Fixed orthographic camera. Angles in radians; azimuth is measured in the
/// x-y plane from +x, elevation up from that plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub elevation: f64,
    pub azimuth: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            elevation: 30.0_f64.to_radians(),
            azimuth: -60.0_f64.to_radians(),
        }
    }
}

impl Camera {
    /// screen coordinates, +y up
    pub fn project(&self, p: DVec3) -> DVec2 {
        let (se, ce) = self.elevation.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        DVec2::new(
            -sa * p.x + ca * p.y,
            -se * ca * p.x - se * sa * p.y + ce * p.z,
        )
    }
}

/// An axis-aligned box that is squashed to a unit cube before projection,
/// so the plotted extent of each axis is independent of the others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    pub min: DVec3,
    pub max: DVec3,
}

impl Box3 {
    pub fn new(min: impl Into<DVec3>, max: impl Into<DVec3>) -> Self {
        Box3 {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn cube(half_width: f64) -> Self {
        Box3::new(DVec3::splat(-half_width), DVec3::splat(half_width))
    }

    /// maps the box onto [-1, 1]^3
    pub fn normalize(&self, p: DVec3) -> DVec3 {
        (p - self.min) / (self.max - self.min) * 2.0 - DVec3::ONE
    }

    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Planar projections used by the panel overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::XY, Plane::XZ, Plane::YZ];

    pub fn project(&self, p: DVec3) -> DVec2 {
        match self {
            Plane::XY => DVec2::new(p.x, p.y),
            Plane::XZ => DVec2::new(p.x, p.z),
            Plane::YZ => DVec2::new(p.y, p.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertical_axis_points_up() {
        let cam = Camera::default();
        let up = cam.project(DVec3::Z);
        assert_relative_eq!(up.x, 0.0);
        assert_relative_eq!(up.y, 30.0_f64.to_radians().cos());
    }

    #[test]
    fn eye_axis_collapses_to_a_point() {
        let cam = Camera::default();
        let (se, ce) = cam.elevation.sin_cos();
        let (sa, ca) = cam.azimuth.sin_cos();
        let towards_viewer = DVec3::new(ce * ca, ce * sa, se);
        let p = cam.project(towards_viewer * 7.0);
        assert_relative_eq!(p.length(), 0.0, epsilon = 1E-12);
    }

    #[test]
    fn lopsided_limits_normalize_to_unit_cube() {
        let g = 20.0;
        let b = Box3::new((-1.5 * g, -1.5 * g, -g), (g, g, g));
        assert_eq!(b.normalize(b.min), DVec3::splat(-1.0));
        assert_eq!(b.normalize(b.max), DVec3::splat(1.0));
        assert_relative_eq!(b.normalize(DVec3::ZERO).x, 0.2);
        assert_relative_eq!(b.normalize(DVec3::ZERO).z, 0.0);
    }

    #[test]
    fn planes() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(Plane::XY.project(p), DVec2::new(1.0, 2.0));
        assert_eq!(Plane::XZ.project(p), DVec2::new(1.0, 3.0));
        assert_eq!(Plane::YZ.project(p), DVec2::new(2.0, 3.0));
    }
}
