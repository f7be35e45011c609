//! Orbit camera driven by pointer drags and the mouse wheel.

use glam::{Mat4, Vec3};

use crate::input::{InputFrame, InputState, MouseButton};
use crate::render::sphere::SphereTransforms;

/// Orbit camera looking at the origin.
///
/// Angles are in degrees. The view is `translate(0, 0, -distance) * rot_x(pitch) * rot_y(yaw)`,
/// so dragging spins the scene in place in front of the viewer.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Vertical field of view.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,

    /// Distance from the eye to the orbit target.
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pub yaw_deg: f32,
    pub pitch_deg: f32,

    /// Degrees of rotation per viewport height dragged.
    pub drag_degrees_per_viewport: f32,

    /// Model transform applied to every sphere.
    pub model: Mat4,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            fov_y_deg: 80.0,
            near: 1.0,
            far: 100.0,
            distance: 6.0,
            min_distance: 1.5,
            max_distance: 50.0,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            drag_degrees_per_viewport: 100.0,
            model: Mat4::IDENTITY,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates by a pointer drag of `(dx, dy)` logical pixels.
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let factor = self.drag_degrees_per_viewport / viewport_height.max(1.0);
        self.yaw_deg = (self.yaw_deg + factor * dx) % 360.0;
        self.pitch_deg = (self.pitch_deg + factor * dy) % 360.0;
    }

    /// Zooms by wheel `lines`; positive values move the eye closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * 1.1_f32.powf(-lines)).clamp(self.min_distance, self.max_distance);
    }

    /// Applies this frame's drag (left button held) and wheel input.
    pub fn apply_input(&mut self, input: &InputState, frame: &InputFrame, viewport_height: f32) {
        if input.button_down(MouseButton::Left) {
            let (dx, dy) = frame.pointer_delta;
            if dx != 0.0 || dy != 0.0 {
                self.drag(dx, dy, viewport_height);
            }
        }
        if frame.wheel_lines != 0.0 {
            self.zoom(frame.wheel_lines);
        }
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect.max(1e-3), self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.pitch_deg.to_radians())
            * Mat4::from_rotation_y(self.yaw_deg.to_radians())
    }

    pub fn transforms(&self, aspect: f32) -> SphereTransforms {
        SphereTransforms {
            projection: self.projection(aspect),
            view: self.view(),
            model: self.model,
        }
    }
}
