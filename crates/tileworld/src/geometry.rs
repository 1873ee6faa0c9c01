/// Screen-space position in pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box anchored at its top-left corner.
///
/// Overlap is strict: boxes that only share an edge do not overlap, and a
/// box with zero height still overlaps anything its edge line passes
/// through the interior of (used for the top-edge contact check).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin(origin: Vec2, width: f32, height: f32) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn with_height(&self, height: f32) -> Self {
        Self::new(self.x, self.y, self.width, height)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);

        assert!(!a.overlaps(&below));
        assert!(!a.overlaps(&right));
    }

    #[test]
    fn interior_intersection_overlaps_both_ways() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.5, 9.5, 4.0, 4.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn zero_height_box_overlaps_only_strict_interior() {
        let tile = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inside = Rect::new(2.0, 5.0, 4.0, 0.0);
        let on_bottom_edge = Rect::new(2.0, 10.0, 4.0, 0.0);
        let on_top_edge = Rect::new(2.0, 0.0, 4.0, 0.0);

        assert!(inside.overlaps(&tile));
        assert!(!on_bottom_edge.overlaps(&tile));
        assert!(!on_top_edge.overlaps(&tile));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 35.0, 35.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(34.9, 34.9)));
        assert!(!rect.contains_point(Vec2::new(35.0, 1.0)));
    }
}
