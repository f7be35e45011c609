use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{
    InputEvent, InputFrame, InputState, Key, KeyState, Modifiers, MouseButton, MouseButtonState,
    MouseWheelDelta, PointerButtonEvent, PointerMoveEvent,
};
use crate::time::FrameClock;

/// Window and frame-loop settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Upper bound for a single frame's `dt`.
    pub max_frame_dt: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "petri".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            max_frame_dt: Duration::from_millis(100),
        }
    }
}

/// Opens one window and redraws it continuously until the app asks to stop.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut shell = Shell { config, gpu_init, app, surface: None, failed: None };

        event_loop
            .run_app(&mut shell)
            .context("winit event loop terminated with error")?;

        match shell.failed {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// The window, its GPU surface and the per-window frame state.
#[self_referencing]
struct WindowSurface {
    input: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowSurface {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop.create_window(attrs).context("failed to create window")?;

        WindowSurfaceTryBuilder {
            input: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::with_clamps(Duration::from_micros(100), config.max_frame_dt),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn request_redraw(&self) {
        self.borrow_window().request_redraw();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        log::debug!("resize to {}x{}", size.width, size.height);
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.request_redraw();
    }

    /// Feeds `event` into the input state if it carries input.
    fn record_input(&mut self, event: &WindowEvent) {
        self.with_mut(|s| {
            let scale = s.window.scale_factor();
            if let Some(ev) = translate_input_event(scale, s.input, event) {
                s.input.apply_event(s.input_frame, ev);
            }
        });
    }

    /// Ticks the clock, runs one app frame and drops this frame's input deltas.
    fn frame<A: App>(&mut self, app: &mut A) -> AppControl {
        self.with_mut(|s| {
            let time = s.clock.tick();
            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx { window: s.window },
                    gpu: s.gpu,
                    input: &*s.input,
                    input_frame: &*s.input_frame,
                    time,
                };
                app.on_frame(&mut ctx)
            };
            s.input_frame.clear();
            control
        })
    }
}

struct Shell<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    /// `None` until the first `resumed`, and again after the app exits.
    surface: Option<WindowSurface>,
    /// Startup error handed back from `Runtime::run`.
    failed: Option<anyhow::Error>,
}

impl<A: App> Shell<A> {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.take().is_some() {
            log::info!("window closed");
        }
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for Shell<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.failed.is_some() {
            return;
        }

        match WindowSurface::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(surface) => {
                log::info!("opened window \"{}\"", self.config.title);
                surface.request_redraw();
                self.surface = Some(surface);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.failed = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // The colony animates every frame.
        if let Some(surface) = &self.surface {
            surface.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let control = match event {
            WindowEvent::CloseRequested => AppControl::Exit,
            WindowEvent::Resized(size) => {
                surface.resize(size);
                AppControl::Continue
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = surface.borrow_window().inner_size();
                surface.resize(size);
                AppControl::Continue
            }
            WindowEvent::RedrawRequested => surface.frame(&mut self.app),
            other => {
                surface.record_input(&other);
                self.app.on_window_event(&other)
            }
        };

        if control == AppControl::Exit {
            self.shutdown(event_loop);
        }
    }
}

fn translate_input_event(scale: f64, state: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    let modifiers = state.modifiers;
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => InputEvent::ModifiersChanged(map_modifiers(m.state())),
        WindowEvent::Focused(f) => InputEvent::Focused(*f),
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(scale, *position);
            InputEvent::PointerMoved(PointerMoveEvent { x, y })
        }
        WindowEvent::MouseInput { state: st, button, .. } => {
            let (x, y) = state.pointer_pos.unwrap_or((0.0, 0.0));
            InputEvent::PointerButton(PointerButtonEvent {
                button: map_mouse_button(*button),
                state: match st {
                    ElementState::Pressed => MouseButtonState::Pressed,
                    ElementState::Released => MouseButtonState::Released,
                },
                x,
                y,
                modifiers,
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            InputEvent::MouseWheel { delta: map_wheel(scale, *delta), modifiers }
        }
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: map_key(event.physical_key),
            state: match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            },
            modifiers,
            repeat: event.repeat,
        },
        _ => return None,
    };
    Some(ev)
}

fn to_logical(scale: f64, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

/// Pixel deltas are converted to logical pixels; line deltas pass through.
fn map_wheel(scale: f64, delta: MouseScrollDelta) -> MouseWheelDelta {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x, y },
        MouseScrollDelta::PixelDelta(p) => {
            let (x, y) = to_logical(scale, p);
            MouseWheelDelta::Pixel { x, y }
        }
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Only the studio's controls get their own `Key`.
fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(KeyCode::Space) => Key::Space,
        PhysicalKey::Code(KeyCode::KeyG) => Key::G,
        PhysicalKey::Code(KeyCode::KeyP) => Key::P,
        PhysicalKey::Code(KeyCode::KeyR) => Key::R,
        _ => Key::Unknown,
    }
}
