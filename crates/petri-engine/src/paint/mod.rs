//! Color model shared between the studio and renderers.

pub mod color;

pub use color::Color;
