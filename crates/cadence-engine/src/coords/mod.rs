//! Coordinate and geometry types shared by the scheduler, input and surfaces.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down

mod geometry;
mod transform;
mod vec2;
mod viewport;

pub use geometry::SurfaceGeometry;
pub use transform::Transform2D;
pub use vec2::Vec2;
pub use viewport::Viewport;
