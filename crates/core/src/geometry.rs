use glam::Vec2;

/// Screen-space axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner (screen y grows downward).
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl ScreenRect {
    /// Build from explicit corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Build from a center point and full size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Rectangle width.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Covered area.
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test; rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y)
    }

    /// Area shared with `other`.
    pub fn overlap_area(&self, other: &ScreenRect) -> f32 {
        let w = (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0);
        let h = (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0.0);
        w * h
    }

    /// Grow the rectangle by `margin` pixels on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> ScreenRect {
        ScreenRect::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn from_center_size_is_symmetric() {
        let r = ScreenRect::from_center_size(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0));
        assert_eq!(r.min, Vec2::new(8.0, 17.0));
        assert_eq!(r.max, Vec2::new(12.0, 23.0));
        assert_eq!(r.center(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn intersection_excludes_touching_edges() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 20.0, 10.0);
        let c = rect(9.0, 9.0, 12.0, 12.0);

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn overlap_area_matches_intersection() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.overlap_area(&b), 25.0);
        assert_eq!(b.overlap_area(&a), 25.0);

        let disjoint = rect(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.overlap_area(&disjoint), 0.0);
    }

    #[test]
    fn expand_grows_every_side() {
        let r = rect(5.0, 5.0, 10.0, 10.0).expand(2.0);
        assert_eq!(r.min, Vec2::new(3.0, 3.0));
        assert_eq!(r.max, Vec2::new(12.0, 12.0));
    }
}
