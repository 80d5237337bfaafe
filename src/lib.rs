#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Viewer
//!
//! Renders a handful of textured unit blocks stored in a single 16x16x16 chunk and
//! flies a first-person camera through them, built with Rust and WGPU.
//!
//! ## Key Modules
//!
//! * `core` - vector and matrix math
//! * `engine_state` - camera, projection, block meshes, the chunk and the renderer
//! * `config` - `config.json` loading and validation
//! * `error` - startup failures
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_viewer::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! W/A/S/D move, the mouse looks around and Escape quits.

use application_state::{graphics_resources_builder::GraphicsEvent, ApplicationState};
use engine_state::camera_state::frame_clock::FrameClock;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

use config::{EngineConfig, CONFIG_FILE};
use error::StartupError;

/// Starts the viewer and blocks until the window is closed.
///
/// Logging goes to stdout at `info` unless `RUST_LOG` says otherwise. Any failure
/// before the first frame is returned.
pub fn run() -> Result<(), StartupError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let clock = FrameClock::start();
    let config = EngineConfig::load(CONFIG_FILE)?;

    let event_loop = EventLoop::<GraphicsEvent>::with_user_event().build()?;
    let mut state = ApplicationState::new(event_loop.create_proxy(), config, clock);

    event_loop.run_app(&mut state)?;
    state.into_result()
}
