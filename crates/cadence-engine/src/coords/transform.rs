use super::Vec2;

/// Axis-aligned 2D transform: per-axis scale followed by an offset.
///
/// Maps `p` to `p * scale + offset`. `translate` and `scale` compose in local
/// coordinates, so a translate followed by a scale scales around the
/// translated origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        scale: Vec2::new(1.0, 1.0),
        offset: Vec2::zero(),
    };

    pub fn translate(self, x: f32, y: f32) -> Self {
        Self {
            scale: self.scale,
            offset: self.offset + Vec2::new(x * self.scale.x, y * self.scale.y),
        }
    }

    pub fn scale(self, x: f32, y: f32) -> Self {
        Self {
            scale: Vec2::new(self.scale.x * x, self.scale.y * y),
            offset: self.offset,
        }
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.scale.x, p.y * self.scale.y) + self.offset
    }

    /// Maps a rectangle, returning `(origin, size)` with a non-negative size
    /// (negative scales mirror the rectangle).
    pub fn map_rect(self, origin: Vec2, size: Vec2) -> (Vec2, Vec2) {
        let a = self.apply(origin);
        let b = self.apply(origin + size);
        (
            Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            Vec2::new((b.x - a.x).abs(), (b.y - a.y).abs()),
        )
    }
}
