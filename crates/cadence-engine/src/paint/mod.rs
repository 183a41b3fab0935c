//! Paint model.
//!
//! Colors are linear, premultiplied alpha. Conversion to surface bytes
//! (sRGB encoding, channel order) happens at the drawing context.

pub mod color;

pub use color::Color;
