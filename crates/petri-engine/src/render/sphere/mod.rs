//! Sphere renderer: uploads a packed `SphereBuffer` and draws it with one
//! triangle pass and one wireframe pass.
//!
//! Color is chosen per vertex in the shader from the packed type tag, so a
//! single draw covers surfaces, dots and bacteria markers.

mod renderer;
mod types;

pub use renderer::SphereRenderer;
pub use types::{ColorMap, SphereColors, SphereTransforms};
