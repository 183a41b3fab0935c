use super::{Vec2, Viewport};

/// Drawable surface geometry.
///
/// `size` is the pixel size of the drawable. `offset` is the surface's
/// position in desktop coordinates (logical pixels), recomputed on every
/// geometry change.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceGeometry {
    /// Drawable size in physical pixels.
    pub size: (u32, u32),

    pub scale_factor: f64,

    /// Viewport offset of the surface origin, logical pixels.
    pub offset: Vec2,

    /// Whether the pixel size follows the container. When false, `size` is
    /// fixed at construction and only `offset`/`scale_factor` change.
    pub auto_resize: bool,
}

impl SurfaceGeometry {
    pub fn new(size: (u32, u32), scale_factor: f64, auto_resize: bool) -> Self {
        Self {
            size,
            scale_factor,
            offset: Vec2::zero(),
            auto_resize,
        }
    }

    /// Logical size of the drawable.
    pub fn viewport(&self) -> Viewport {
        let scale = self.scale_factor.max(f64::EPSILON);
        Viewport::new(
            (f64::from(self.size.0) / scale) as f32,
            (f64::from(self.size.1) / scale) as f32,
        )
    }

    pub fn is_drawable(&self) -> bool {
        self.size.0 > 0 && self.size.1 > 0
    }

    /// Applies a container resize.
    ///
    /// Returns `true` when the drawable size changed and the surface must be
    /// reconfigured.
    pub fn on_resized(&mut self, container: (u32, u32)) -> bool {
        if !self.auto_resize || container == self.size {
            return false;
        }
        self.size = container;
        true
    }

    /// Records a new viewport offset for the surface origin.
    pub fn on_moved(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn on_scale_factor_changed(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resize_follows_container() {
        let mut g = SurfaceGeometry::new((800, 600), 1.0, true);
        assert!(g.on_resized((1024, 768)));
        assert_eq!(g.size, (1024, 768));
        assert!(!g.on_resized((1024, 768)));
    }

    #[test]
    fn fixed_size_ignores_resize() {
        let mut g = SurfaceGeometry::new((320, 240), 1.0, false);
        assert!(!g.on_resized((1024, 768)));
        assert_eq!(g.size, (320, 240));
    }

    #[test]
    fn offset_updates_even_when_fixed() {
        let mut g = SurfaceGeometry::new((320, 240), 1.0, false);
        g.on_moved(Vec2::new(40.0, 25.0));
        assert_eq!(g.offset, Vec2::new(40.0, 25.0));
        assert_eq!(g.size, (320, 240));
    }

    #[test]
    fn viewport_is_logical() {
        let g = SurfaceGeometry::new((1600, 1200), 2.0, true);
        assert_eq!(g.viewport(), Viewport::new(800.0, 600.0));
    }

    #[test]
    fn zero_size_is_not_drawable() {
        let mut g = SurfaceGeometry::new((800, 600), 1.0, true);
        g.on_resized((0, 600));
        assert!(!g.is_drawable());
    }
}
