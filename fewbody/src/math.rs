pub use glam::f64::DMat3;
pub use glam::f64::DVec2;
pub use glam::f64::DVec3;

pub const PI: f64 = std::f64::consts::PI;
pub const TAU: f64 = std::f64::consts::TAU;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `n` evenly spaced values from `a` to `b`, ending on `b` exactly
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![a];
    }
    (0..n)
        .map(|i| {
            if i + 1 == n {
                b
            } else {
                lerp(a, b, i as f64 / (n - 1) as f64)
            }
        })
        .collect()
}

/// samples [0, 2pi) at a fixed angular step, excluding the endpoint
pub fn angular_sweep(step: f64) -> Vec<f64> {
    let n = (TAU / step).ceil() as usize;
    (0..n).map(|k| k as f64 * step).collect()
}

/// wraps an angle into [0, 2pi)
pub fn wrap_0_2pi(x: f64) -> f64 {
    let w = x.rem_euclid(TAU);
    if w >= TAU {
        0.0
    } else {
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    #[test]
    fn linspace_is_cool() {
        let t = linspace(-0.3, 0.6, 4);

        assert!(t.len() == 4);
        assert_eq!(t[0], -0.3);
        assert_float_absolute_eq!(t[1], 0.0);
        assert_float_absolute_eq!(t[2], 0.3);
        assert_eq!(t[3], 0.6);
    }

    #[test]
    fn sweep_matches_arange() {
        // same length as numpy's arange(0, 2pi, 0.01)
        let f = angular_sweep(0.01);
        assert_eq!(f.len(), 629);
        assert_eq!(f[0], 0.0);
        assert!(*f.last().unwrap() < TAU);
    }

    #[test]
    fn wrapping() {
        assert_float_absolute_eq!(wrap_0_2pi(-0.5), TAU - 0.5);
        assert_float_absolute_eq!(wrap_0_2pi(TAU + 0.25), 0.25);
        assert_eq!(wrap_0_2pi(-1e-18), 0.0);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert_eq!(linspace(1.0, 2.0, 0), vec![1.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert_eq!(linspace(1.0, 2.0, 2), vec![1.0, 2.0]);
        // the last grid line of a 0.7-high panel lands on its top edge
        assert_eq!(*linspace(0.0, 0.7, 8).last().unwrap(), 0.7);
    }
}
