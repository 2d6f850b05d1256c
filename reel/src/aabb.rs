use glam::f64::DVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB(pub DVec2, pub DVec2);

impl AABB {
    pub fn from_center(c: DVec2, span: DVec2) -> Self {
        let low = c - span / 2.0;
        let hi = c + span / 2.0;
        Self(low, hi)
    }

    pub fn from_list(plist: &[DVec2]) -> Option<Self> {
        let p0 = plist.first()?;
        let mut ret = AABB(*p0, *p0);
        for p in plist {
            ret.include(*p)
        }
        Some(ret)
    }

    pub fn padded(&self, padding: f64) -> Self {
        let d = DVec2::splat(padding);
        AABB(self.0 - d, self.1 + d)
    }

    /// grows the box about its center so that `span.x / span.y == aspect`
    pub fn with_aspect(&self, aspect: f64) -> Self {
        let s = self.span().max(DVec2::splat(1E-9));
        let span = if s.x / s.y < aspect {
            DVec2::new(s.y * aspect, s.y)
        } else {
            DVec2::new(s.x, s.x / aspect)
        };
        Self::from_center(self.center(), span)
    }

    pub fn include(&mut self, p: DVec2) {
        self.0 = self.0.min(p);
        self.1 = self.1.max(p);
    }

    pub fn center(&self) -> DVec2 {
        (self.0 + self.1) / 2.0
    }

    pub fn span(&self) -> DVec2 {
        self.1 - self.0
    }

    pub fn to_normalized(&self, p: DVec2) -> DVec2 {
        let u = p - self.0;
        let s = self.span();
        u / s
    }

    pub fn from_normalized(&self, u: DVec2) -> DVec2 {
        u * self.span() + self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounds_of_points() {
        let pts = [
            DVec2::new(1.0, -2.0),
            DVec2::new(-3.0, 4.0),
            DVec2::new(0.5, 0.5),
        ];
        let b = AABB::from_list(&pts).unwrap();
        assert_eq!(b, AABB(DVec2::new(-3.0, -2.0), DVec2::new(1.0, 4.0)));
        assert_eq!(b.center(), DVec2::new(-1.0, 1.0));
        assert_eq!(b.padded(0.5).span(), DVec2::new(5.0, 7.0));
        assert!(AABB::from_list(&[]).is_none());
    }

    #[test]
    fn aspect_only_grows() {
        let b = AABB::from_center(DVec2::ZERO, DVec2::new(2.0, 1.0));
        let square = b.with_aspect(1.0);
        assert_relative_eq!(square.span().x, 2.0);
        assert_relative_eq!(square.span().y, 2.0);
        let wide = b.with_aspect(4.0);
        assert_relative_eq!(wide.span().x, 4.0);
        assert_relative_eq!(wide.span().y, 1.0);
        assert_eq!(wide.center(), DVec2::ZERO);
    }

    #[test]
    fn mapping_between_boxes() {
        let world = AABB(DVec2::new(-10.0, -10.0), DVec2::new(10.0, 10.0));
        let px = AABB(DVec2::new(0.0, 0.0), DVec2::new(200.0, 100.0));
        let u = world.to_normalized(DVec2::new(5.0, 0.0));
        assert_eq!(u, DVec2::new(0.75, 0.5));
        let p = px.from_normalized(u);
        assert_relative_eq!(p.x, 150.0);
        assert_relative_eq!(p.y, 50.0);
    }
}
