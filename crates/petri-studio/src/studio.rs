use anyhow::Result;
use petri_engine::camera::OrbitCamera;
use petri_engine::core::{App, AppControl, FrameCtx};
use petri_engine::glam::Vec3;
use petri_engine::input::{Key, MouseButton};
use petri_engine::mesh::{MeshError, SphereBuffer, SphereKind, SphereLayout};
use petri_engine::paint::Color;
use petri_engine::render::sphere::{ColorMap, SphereRenderer};
use petri_engine::window::CursorIcon;

use crate::colony::{Colony, ColonySettings};
use crate::stats::TechnicalStats;

/// Scene parameters that stay fixed for the lifetime of the studio.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub layout: SphereLayout,
    pub field_origin: Vec3,
    pub field_radius: f32,
    /// Grid shell radius relative to the field.
    pub grid_scale: f32,
    /// Every `(lat, long)` multiple of this spacing is drawn as a dot.
    pub dot_spacing: (u32, u32),
    pub background: Color,
    pub stats_interval_s: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            layout: SphereLayout::default(),
            field_origin: Vec3::ZERO,
            field_radius: 1.0,
            grid_scale: 1.02,
            dot_spacing: (4, 4),
            background: Color::rgb(0.02, 0.02, 0.04),
            stats_interval_s: 2.0,
        }
    }
}

/// Application context: owns everything the frame loop touches.
pub struct Studio {
    scene: SceneSettings,
    buffer: SphereBuffer,
    renderer: Option<SphereRenderer>,
    camera: OrbitCamera,
    colony: Colony,
    stats: TechnicalStats,
    show_grid: bool,
    capacity_warned: bool,
}

impl Studio {
    pub fn new(scene: SceneSettings, colony: ColonySettings) -> Result<Self> {
        let mut buffer = SphereBuffer::new(scene.layout)?;
        let (phi, theta) = scene.dot_spacing;
        buffer.set_dot_position(phi, theta);

        // Field and grid shell take two slots.
        let room = scene.layout.max_spheres.saturating_sub(2);
        if colony.count > room {
            log::warn!("colony of {} does not fit, only {room} bacteria will be drawn", colony.count);
        }

        let colony = Colony::new(colony);
        log::info!(
            "scene: {}x{} tessellation, {} sphere slots, {} bacteria",
            scene.layout.lat_steps,
            scene.layout.long_steps,
            scene.layout.max_spheres,
            colony.members().len()
        );

        Ok(Self {
            stats: TechnicalStats::new(scene.stats_interval_s),
            scene,
            buffer,
            renderer: None,
            camera: OrbitCamera::new(),
            colony,
            show_grid: true,
            capacity_warned: false,
        })
    }

    fn handle_keys(&mut self, ctx: &FrameCtx<'_, '_>) -> AppControl {
        let frame = ctx.input_frame;

        if frame.key_pressed(Key::Escape) {
            log::info!("escape pressed, closing");
            return AppControl::Exit;
        }
        if frame.key_pressed(Key::Space) {
            self.colony.toggle_running();
            log::info!("colony {}", if self.colony.is_running() { "resumed" } else { "paused" });
        }
        if frame.key_pressed(Key::R) {
            self.colony.reset();
            if let Some(r) = self.renderer.as_mut() {
                r.set_color(ColorMap { bacteria: Some(Color::explosion()), ..Default::default() });
            }
            log::info!("colony reset");
        }
        if frame.key_pressed(Key::P) && !self.colony.is_poisoned() {
            self.colony.poison();
            if let Some(r) = self.renderer.as_mut() {
                r.set_color(ColorMap { bacteria: Some(Color::poison()), ..Default::default() });
            }
            log::info!("colony poisoned");
        }
        if frame.key_pressed(Key::G) {
            self.show_grid = !self.show_grid;
        }
        AppControl::Continue
    }

    /// Rebuilds the packed buffer from the current colony.
    fn rebuild(&mut self) -> Result<(), MeshError> {
        let SceneSettings { field_origin, field_radius, grid_scale, layout, .. } = self.scene;

        self.buffer.clear();
        match self.colony.largest() {
            Some(m) => {
                let at = m.grid_pos(layout);
                self.buffer.set_bacteria_position(at.lat, at.long);
            }
            None => {
                let mut rules = self.buffer.rules();
                rules.marker = None;
                self.buffer.set_rules(rules);
            }
        }

        self.buffer.add_sphere(field_origin, field_radius, SphereKind::Field)?;
        if self.show_grid {
            self.buffer.add_sphere(field_origin, field_radius * grid_scale, SphereKind::Grid)?;
        }

        for m in self.colony.visible() {
            let center = m.center(field_origin, field_radius);
            match self.buffer.add_sphere(center, m.radius, SphereKind::Bacteria) {
                Ok(_) => {}
                Err(MeshError::CapacityExceeded { max }) => {
                    if !self.capacity_warned {
                        log::warn!("sphere buffer full ({max}); remaining bacteria skipped");
                        self.capacity_warned = true;
                    }
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_keys(ctx) == AppControl::Exit {
            return AppControl::Exit;
        }

        let (_, logical_height) = ctx.window.logical_size();
        self.camera.apply_input(ctx.input, ctx.input_frame, logical_height);
        ctx.window.set_cursor(if ctx.input.button_down(MouseButton::Left) {
            CursorIcon::Grabbing
        } else {
            CursorIcon::Default
        });

        self.colony.update(ctx.time.dt);
        if let Some(report) = self.stats.record(ctx.time.dt, self.colony.census()) {
            report.log();
        }

        if let Err(e) = self.rebuild() {
            log::error!("failed to rebuild sphere buffer: {e}");
            return AppControl::Exit;
        }

        let transforms = self.camera.transforms(ctx.gpu.viewport().aspect());
        let (buffer, renderer, layout) = (&self.buffer, &mut self.renderer, self.scene.layout);

        ctx.render(self.scene.background, |rctx, target| {
            if renderer.is_none() {
                *renderer = Some(SphereRenderer::new(rctx, layout)?);
            }
            match renderer.as_mut() {
                Some(r) => r.render(rctx, target, buffer, &transforms),
                None => Ok(()),
            }
        })
    }
}
