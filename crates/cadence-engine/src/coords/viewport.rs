use super::Vec2;

/// Drawable area in logical pixels, origin top-left.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Non-empty and finite.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.size() * 0.5
    }

    pub fn contains(self, p: Vec2) -> bool {
        (0.0..self.width).contains(&p.x) && (0.0..self.height).contains(&p.y)
    }

    /// Maps `p` to `[0, 1]` on both axes, clamping points outside the area.
    ///
    /// Returns the center for an invalid viewport.
    pub fn normalize(self, p: Vec2) -> Vec2 {
        if !self.is_valid() {
            return Vec2::new(0.5, 0.5);
        }
        Vec2::new(
            (p.x / self.width).clamp(0.0, 1.0),
            (p.y / self.height).clamp(0.0, 1.0),
        )
    }
}
