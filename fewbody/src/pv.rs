use glam::f64::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PV {
    pub pos: DVec3,
    pub vel: DVec3,
}

impl PV {
    pub fn zero() -> Self {
        PV {
            pos: DVec3::ZERO,
            vel: DVec3::ZERO,
        }
    }

    pub fn new(pos: impl Into<DVec3>, vel: impl Into<DVec3>) -> Self {
        PV {
            pos: pos.into(),
            vel: vel.into(),
        }
    }

    pub fn pos(pos: impl Into<DVec3>) -> Self {
        PV::new(pos, DVec3::ZERO)
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    pub fn filter_numerr(&self) -> Option<Self> {
        self.is_finite().then_some(*self)
    }
}

impl std::ops::Add for PV {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        PV::new(self.pos + other.pos, self.vel + other.vel)
    }
}

impl std::ops::AddAssign for PV {
    fn add_assign(&mut self, other: Self) {
        self.pos += other.pos;
        self.vel += other.vel;
    }
}

impl std::ops::Sub for PV {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        PV::new(self.pos - other.pos, self.vel - other.vel)
    }
}

impl std::ops::SubAssign for PV {
    fn sub_assign(&mut self, other: Self) {
        self.pos -= other.pos;
        self.vel -= other.vel;
    }
}

impl std::ops::Mul<f64> for PV {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        PV::new(self.pos * rhs, self.vel * rhs)
    }
}

impl std::ops::Div<f64> for PV {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        PV::new(self.pos / rhs, self.vel / rhs)
    }
}

impl From<(DVec3, DVec3)> for PV {
    fn from(x: (DVec3, DVec3)) -> PV {
        PV::new(x.0, x.1)
    }
}
