//! # Engine State Module
//!
//! Owns everything the viewer simulates and draws between frames.
//!
//! ## Key Components
//!
//! * `EngineState` - the per-window context: camera, current actions, the chunk
//!   and the renderer
//! * `camera_state` - camera pose, projection and frame timing
//! * `rendering` - the wgpu pipeline and per-block GPU buffers
//! * `voxels` - blocks, their meshes and the chunk that stores them
//!
//! Every frame runs `set_input_commands`, `update` and `render` in that order.

use cgmath::Point3;
use winit::keyboard::KeyCode;

use camera_state::{frame_clock::FrameClock, CameraState};
use rendering::BlockRenderer;
use voxels::{
    block::Block,
    chunk::{Chunk, LocalIndex, CHUNK_DIMENSION},
};

use crate::{
    application_state::input_state::ProcessedInputState,
    config::{EngineConfig, SceneConfig},
};

pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// The main state container for the viewer.
pub struct EngineState {
    /// Camera pose, projection settings and frame clock
    pub camera_state: CameraState,
    /// Actions derived from the latest input
    pub player_actions: PlayerAction,
    /// The blocks on display
    pub chunk: Chunk,
    renderer: BlockRenderer,
}

impl EngineState {
    /// Builds the scene from `config` and uploads it through `renderer`.
    pub fn new(renderer: BlockRenderer, config: &EngineConfig, clock: FrameClock) -> Self {
        let mut chunk = build_scene_chunk(&config.scene);
        renderer.upload_chunk(&mut chunk);
        log::info!("Scene ready with {} blocks", chunk.len());

        Self {
            camera_state: CameraState::new(&config.camera, clock),
            player_actions: PlayerAction::default(),
            chunk,
            renderer,
        }
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(size);
    }

    /// Translates this frame's input into player actions.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input);
    }

    /// Advances the camera and uploads its matrix.
    pub fn update(&mut self) {
        self.camera_state.update(&self.player_actions);

        let (width, height) = self.renderer.size();
        if width == 0 || height == 0 {
            return;
        }
        self.camera_state.refresh_uniform(width, height);
        self.renderer.write_camera(&self.camera_state.uniform);
    }

    /// Draws the chunk.
    pub fn render(&mut self) {
        self.renderer.render(&self.chunk);
    }
}

/// Fills a chunk with the blocks listed in `scene`.
///
/// A block lands in slot `corner - chunk_origin`. Corners that fall outside the
/// chunk are skipped with a warning; a repeated corner replaces the earlier block.
pub fn build_scene_chunk(scene: &SceneConfig) -> Chunk {
    let origin = Point3::from(scene.chunk_origin);
    let mut chunk = Chunk::new(origin);

    for &corner in &scene.blocks {
        let corner = Point3::from(corner);
        let Some(local) = local_index(origin, corner) else {
            log::warn!("Block at {corner:?} is outside the chunk at {origin:?}, skipping");
            continue;
        };
        match chunk.insert(local, Block::new(corner)) {
            Ok(Some(_)) => log::debug!("Block at {corner:?} replaced an existing block"),
            Ok(None) => {}
            Err(err) => log::warn!("Skipping block at {corner:?}: {err}"),
        }
    }

    chunk
}

fn local_index(origin: Point3<i32>, corner: Point3<i32>) -> Option<LocalIndex> {
    let component = |world: i32, origin: i32| {
        usize::try_from(world.checked_sub(origin)?)
            .ok()
            .filter(|local| *local < CHUNK_DIMENSION)
    };
    Some(Point3::new(
        component(corner.x, origin.x)?,
        component(corner.y, origin.y)?,
        component(corner.z, origin.z)?,
    ))
}

/// Movement and look input for one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlayerAction {
    /// W held
    pub move_forward: bool,
    /// S held
    pub move_backward: bool,
    /// A held
    pub move_left: bool,
    /// D held
    pub move_right: bool,
    /// Cursor delta as (yaw, pitch); pitch is positive when the mouse moves up
    pub rotate_view: (f32, f32),
}

impl PlayerAction {
    fn from_input(input: &ProcessedInputState) -> Self {
        let (delta_x, delta_y) = input.mouse_delta;
        Self {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            // Device motion grows downwards.
            rotate_view: (delta_x as f32, -delta_y as f32),
        }
    }
}
