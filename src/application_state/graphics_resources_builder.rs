//! # Graphics Resources Builder
//!
//! Creates the window, the wgpu device and the assets the renderer needs, once the
//! event loop has resumed. The result is delivered back to the event loop as a user
//! event so the handler can swap its builder for the finished [`Graphics`].
//!
//! The main components are:
//! - `Graphics`: the window plus everything the renderer is built from
//! - `GraphicsBuilder`: one-shot helper that builds and sends `Graphics`
//! - `MaybeGraphics`: the stages of graphics initialization

use std::sync::Arc;

use log::{error, info};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::EngineConfig,
    engine_state::rendering::texture,
    error::StartupError,
};

/// Outcome of graphics initialization, sent through the event loop.
pub type GraphicsEvent = Result<Graphics, StartupError>;

/// Everything needed to build the renderer for one window.
pub struct Graphics {
    pub window: Arc<Window>,
    /// Already configured with `surface_config`
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    pub shader_source: String,
    pub atlas: image::RgbaImage,
}

/// Creates the window and GPU context and loads the shader and atlas.
pub fn create_graphics(event_loop: &ActiveEventLoop, config: &EngineConfig) -> GraphicsEvent {
    let window_attrs = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))?;
    info!("Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: None,
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::Off,
    }))?;

    let size = window.inner_size();

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or(StartupError::UnsupportedSurface)?;
    let (Some(&present_mode), Some(&alpha_mode)) = (
        surface_caps.present_modes.first(),
        surface_caps.alpha_modes.first(),
    ) else {
        return Err(StartupError::UnsupportedSurface);
    };
    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    let shader_path = &config.assets.shader_path;
    let shader_source =
        std::fs::read_to_string(shader_path).map_err(|source| StartupError::ShaderRead {
            path: shader_path.clone(),
            source,
        })?;
    let atlas = texture::load_atlas(&config.assets.atlas_path)?;

    info!(
        "Graphics ready: {}x{} surface, format {surface_format:?}",
        surface_config.width, surface_config.height
    );

    Ok(Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
        shader_source,
        atlas,
    })
}

/// Builds [`Graphics`] once and sends the outcome to the event loop.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsEvent>>,
    config: EngineConfig,
}

/// Represents the stages of graphics initialization.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume
    Builder(GraphicsBuilder),
    /// Initialization finished
    Graphics(Graphics),
    /// The graphics were handed to the engine state
    Moved,
}

impl GraphicsBuilder {
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>, config: EngineConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            config,
        }
    }

    /// Builds the graphics on the first call; later calls do nothing.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            return;
        };

        let gfx = create_graphics(event_loop, &self.config);
        if event_loop_proxy.send_event(gfx).is_err() {
            error!("Event loop closed before graphics were delivered");
        }
    }
}
