//! # Application State Management
//!
//! This module drives the viewer from the winit event loop:
//! - Window and graphics initialization
//! - Input handling
//! - The per-frame input, update and render cycle
//! - Shutdown on Escape, window close or a startup failure

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{GraphicsBuilder, GraphicsEvent, MaybeGraphics};
use input_manager::InputManager;
use log::{info, warn};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::EngineConfig,
    engine_state::{camera_state::frame_clock::FrameClock, rendering::BlockRenderer, EngineState},
    error::StartupError,
};

/// The application state container handed to the event loop.
pub struct ApplicationState {
    graphics: MaybeGraphics,
    state: Option<InitializedApplicationState>,
    config: EngineConfig,
    /// Moved into the camera once the engine starts
    clock: Option<FrameClock>,
    startup_error: Option<StartupError>,
}

/// The running viewer.
struct InitializedApplicationState {
    engine_state: EngineState,
    window: Arc<Window>,
    input_manager: InputManager,
}

impl ApplicationState {
    /// Creates the handler; graphics are built when the event loop resumes.
    pub fn new(proxy: EventLoopProxy<GraphicsEvent>, config: EngineConfig, clock: FrameClock) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(proxy, config.clone())),
            state: None,
            config,
            clock: Some(clock),
            startup_error: None,
        }
    }

    /// The startup error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<(), StartupError> {
        match self.startup_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Moves the finished graphics into a new engine state.
    fn initialize_application_state(&mut self) -> Result<(), StartupError> {
        let MaybeGraphics::Graphics(gfx) = std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return Ok(());
        };

        let renderer = BlockRenderer::new(
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
            &gfx.shader_source,
            &gfx.atlas,
        )?;
        let clock = self.clock.take().unwrap_or_else(FrameClock::start);
        let engine_state = EngineState::new(renderer, &self.config, clock);

        grab_cursor(&gfx.window);
        gfx.window.request_redraw();

        self.state = Some(InitializedApplicationState {
            engine_state,
            window: gfx.window,
            input_manager: InputManager::new(),
        });
        info!("Viewer running");
        Ok(())
    }
}

/// Keeps the cursor inside the window and hides it. Failure only costs mouse look.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(err) = grabbed {
        warn!("Could not grab the cursor: {err}");
    }
    window.set_cursor_visible(false);
}

fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationHandler<GraphicsEvent> for ApplicationState {
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if is_exit_request(&event) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    input_manager.release_all();
                }
            }
            WindowEvent::RedrawRequested => {
                engine_state.set_input_commands(input_manager.get_and_reset_processed_input());
                engine_state.update();
                engine_state.render();
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the outcome of graphics initialization.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: GraphicsEvent) {
        let started = graphics.and_then(|graphics| {
            self.graphics = MaybeGraphics::Graphics(graphics);
            self.initialize_application_state()
        });
        if let Err(err) = started {
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
