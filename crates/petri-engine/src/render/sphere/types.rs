use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::paint::Color;

/// Transforms read by the renderer each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereTransforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
}

impl Default for SphereTransforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        }
    }
}

/// Partial color update; `None` keeps the current color.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorMap {
    pub sphere: Option<Color>,
    pub dot: Option<Color>,
    pub bacteria: Option<Color>,
}

/// Resolved per-tag colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereColors {
    pub sphere: Color,
    pub dot: Color,
    pub bacteria: Color,
}

impl Default for SphereColors {
    fn default() -> Self {
        Self {
            sphere: Color::field_grey(),
            dot: Color::dot_yellow(),
            bacteria: Color::explosion(),
        }
    }
}

impl SphereColors {
    pub fn apply(&mut self, map: ColorMap) {
        if let Some(c) = map.sphere {
            self.sphere = c;
        }
        if let Some(c) = map.dot {
            self.dot = c;
        }
        if let Some(c) = map.bacteria {
            self.bacteria = c;
        }
    }
}

/// Uniform block layout (240 bytes):
///
///  offset   0  projection      mat4x4<f32>
///  offset  64  view            mat4x4<f32>
///  offset 128  model           mat4x4<f32>
///  offset 192  sphere_color    vec4<f32>
///  offset 208  dot_color       vec4<f32>
///  offset 224  bacteria_color  vec4<f32>
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct SphereUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub sphere_color: [f32; 4],
    pub dot_color: [f32; 4],
    pub bacteria_color: [f32; 4],
}

impl SphereUniforms {
    pub(super) fn new(t: &SphereTransforms, colors: &SphereColors) -> Self {
        Self {
            projection: t.projection.to_cols_array_2d(),
            view: t.view.to_cols_array_2d(),
            model: t.model.to_cols_array_2d(),
            sphere_color: colors.sphere.to_array(),
            dot_color: colors.dot.to_array(),
            bacteria_color: colors.bacteria.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_240_bytes() {
        assert_eq!(std::mem::size_of::<SphereUniforms>(), 240);
    }

    #[test]
    fn color_map_only_overrides_given_entries() {
        let mut colors = SphereColors::default();
        colors.apply(ColorMap {
            dot: Some(Color::poison()),
            ..Default::default()
        });
        assert_eq!(colors.dot, Color::poison());
        assert_eq!(colors.sphere, Color::field_grey());
        assert_eq!(colors.bacteria, Color::explosion());
    }
}
