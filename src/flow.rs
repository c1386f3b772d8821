//! Application event loop.
//!
//! Wires the collaborators together: winit events feed [`InputState`], a fixed-period
//! timer drives [`SceneState::tick`], and redraw requests go through the [`FrameGate`]
//! before the [`Renderer`] touches the GPU.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, then the GPU context, the texture and the renderer
//! 2. `about_to_wait` runs at most one tick per elapsed period and requests a redraw
//! 3. `RedrawRequested` recreates targets, skips or draws depending on the gate
//! 4. restarting the countdown and `exiting` both save the settings

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window},
};

use crate::{
    context::Context,
    input::{InputAction, InputState, scroll_pixels},
    render::{FrameAction, FrameGate, Renderer},
    resources::texture::{SCENE_TEXTURE, load_mip_chain},
    scene::{SceneState, TICKS_PER_SECOND},
    settings::{Settings, now_millis},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub const WINDOW_TITLE: &str = "Orbit Clock";
const EXPIRED_SUFFIX: &str = " (expired)";

/// Time between two simulation ticks.
pub const TICK_PERIOD: Duration = Duration::from_micros(1_000_000 / TICKS_PER_SECOND as u64);

/// How many ticks are due after `elapsed` time. Late wake-ups never catch up.
pub fn ticks_due(elapsed: Duration) -> u32 {
    u32::from(elapsed >= TICK_PERIOD)
}

/// Everything that exists once the GPU is ready.
#[derive(Debug)]
pub struct AppState {
    ctx: Context,
    renderer: Renderer,
    scene: SceneState,
    input: InputState,
    gate: FrameGate,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: Settings) -> anyhow::Result<Self> {
        let (ctx, mips) =
            futures::try_join!(Context::new(window), load_mip_chain(SCENE_TEXTURE))?;
        let [width, height] = ctx.size();
        let renderer =
            Renderer::new(&ctx.device, &ctx.queue, ctx.config.format, ctx.size(), &mips).await?;
        Ok(Self {
            ctx,
            renderer,
            scene: SceneState::new(settings, width, height),
            input: InputState::new(),
            gate: FrameGate::default(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.scene.resize(width, height);
            self.gate.mark_resized();
        }
    }

    fn tick(&mut self) {
        let report = self.scene.tick(now_millis());
        if report.expired {
            self.ctx
                .window
                .set_title(&format!("{WINDOW_TITLE}{EXPIRED_SUFFIX}"));
        }
        self.gate.mark_dirty();
        self.ctx.window.request_redraw();
    }

    fn restart_countdown(&mut self) {
        self.scene.restart_countdown(now_millis());
        log::info!("countdown restarted, target {}", self.scene.settings.timeout);
        if let Err(e) = self.scene.settings.save() {
            log::warn!("settings were not saved: {e:#}");
        }
        self.ctx.window.set_title(WINDOW_TITLE);
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::None => {}
            InputAction::CaptureCursor => self.capture_cursor(),
            InputAction::ReleaseCursor => self.release_cursor(),
            InputAction::RestartCountdown => self.restart_countdown(),
        }
    }

    fn capture_cursor(&mut self) {
        let window = &self.ctx.window;
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.input.set_captured(true);
            }
            Err(e) => log::warn!("cannot capture the cursor: {e}"),
        }
    }

    fn release_cursor(&mut self) {
        let window = &self.ctx.window;
        if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("cannot release the cursor: {e}");
        }
        window.set_cursor_visible(true);
        self.input.set_captured(false);
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.ctx.is_surface_configured() {
            return Ok(());
        }

        match self.gate.evaluate() {
            FrameAction::Skip => Ok(()),
            FrameAction::RecreateTargets => {
                self.renderer.resize(self.ctx.size());
                self.ctx.window.request_redraw();
                Ok(())
            }
            FrameAction::Draw => {
                let output = self.ctx.surface.get_current_texture()?;
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.renderer
                    .write_uniforms(&self.scene.camera_uniform(), &self.scene.scene_uniform());
                self.renderer.render(&view, self.scene.digits().instances());
                self.ctx.window.pre_present_notify();
                output.present();
                Ok(())
            }
        }
    }
}

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    state: Option<AppState>,
    // consumed by the first `resumed`
    settings: Option<Settings>,
    failure: Option<anyhow::Error>,
    last_tick: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, settings: Settings) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            settings: Some(settings),
            failure: None,
            last_tick: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("startup failed: {error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }
}

fn create_window(event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
    #[allow(unused_mut)]
    let mut window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);

    #[cfg(target_arch = "wasm32")]
    {
        use anyhow::Context as _;
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        const CANVAS_ID: &str = "canvas";

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CANVAS_ID))
            .with_context(|| format!("no element with id {CANVAS_ID}"))?;
        window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
    }

    Ok(Arc::new(event_loop.create_window(window_attributes)?))
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(settings) = self.settings.take() else {
            return;
        };
        let window = match create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        let init_future = AppState::new(window, settings);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(mut state) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                    self.state = Some(state);
                    self.last_tick = Instant::now();
                }
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => AppEvent::Initialized(Box::new(state)),
                    Err(e) => AppEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before startup finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            AppEvent::Initialized(state) => {
                let mut state = *state;
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.last_tick = Instant::now();
            }
            AppEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some((dx, dy)) = state.input.pointer_delta(delta) {
                state.scene.rotate_camera(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::Focused(false) => {
                state.input.release_all();
                state.scene.intents = state.input.intents;
                state.release_cursor();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let action = state.input.handle_key(code, key_state);
                state.scene.intents = state.input.intents;
                state.apply(action);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let action = state.input.handle_mouse_button(button, button_state);
                state.apply(action);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.scene.zoom_camera(scroll_pixels(delta));
            }
            WindowEvent::RedrawRequested => match state.redraw() {
                Ok(()) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                    log::warn!("surface {e}, reconfiguring");
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };
        if ticks_due(self.last_tick.elapsed()) > 0 {
            self.last_tick = Instant::now();
            state.tick();
        }
        let until_next = TICK_PERIOD.saturating_sub(self.last_tick.elapsed());
        event_loop.set_control_flow(ControlFlow::wait_duration(until_next));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            if let Err(e) = state.scene.settings.save() {
                log::warn!("settings were not saved: {e:#}");
            }
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow::anyhow!("cannot install the console logger: {e}"))?;
    }

    let settings = Settings::load(now_millis());
    log::info!(
        "countdown target {}, move speed {}, sensitivity {}",
        settings.timeout,
        settings.move_speed,
        settings.mouse_sensitivity
    );

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, settings)?;

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_period_is_a_hundred_and_twentieth_of_a_second() {
        assert_eq!(TICK_PERIOD, Duration::from_micros(8333));
    }

    #[test]
    fn late_wake_ups_run_a_single_tick() {
        assert_eq!(ticks_due(Duration::ZERO), 0);
        assert_eq!(ticks_due(TICK_PERIOD - Duration::from_micros(1)), 0);
        assert_eq!(ticks_due(TICK_PERIOD), 1);
        assert_eq!(ticks_due(TICK_PERIOD * 10), 1);
    }
}
