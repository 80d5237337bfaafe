//! # Camera State Management
//!
//! Everything the viewer knows about its camera lives in [`CameraState`]: the pose
//! and its cached movement vectors, the frame clock, the projection settings and
//! the packed uniform that is uploaded to the GPU.
//!
//! ## Core Components
//! - `camera`: pose integration and view-projection composition
//! - `projection`: projection matrices and frustum planes
//! - `frame_clock`: per-frame `delta_t`

use cgmath::{Matrix4, Vector3};

use crate::config::CameraConfig;

use super::PlayerAction;

pub mod camera;
pub mod frame_clock;
pub mod projection;

use camera::{CameraController, CameraPose, CameraUniform};
use frame_clock::FrameClock;
use projection::ProjectionKind;

/// Camera context owned by the engine state.
#[derive(Debug)]
pub struct CameraState {
    /// Pose and movement integration
    pub controller: CameraController,
    /// GPU-ready copy of the latest view-projection matrix
    pub uniform: CameraUniform,
    clock: FrameClock,
    fov: f32,
    render_radius: f32,
    projection_kind: ProjectionKind,
}

impl CameraState {
    /// Creates the camera from configuration, timing frames with `clock`.
    pub fn new(config: &CameraConfig, clock: FrameClock) -> Self {
        let pose = CameraPose {
            position: Vector3::from(config.position),
            rx: config.rx,
            ry: config.ry,
        };

        Self {
            controller: CameraController::new(pose, config.walk_speed, config.mouse_speed),
            uniform: CameraUniform::default(),
            clock,
            fov: config.fov,
            render_radius: config.render_radius,
            projection_kind: config.projection,
        }
    }

    /// Samples the frame clock and advances the pose. Returns the `delta_t` used.
    pub fn update(&mut self, actions: &PlayerAction) -> f32 {
        let delta_t = self.clock.tick();
        self.controller.update_pose(actions, delta_t);
        log::trace!("camera pose {:?} after {delta_t}s", self.controller.pose);
        delta_t
    }

    /// View-projection matrix for a `width` x `height` viewport.
    pub fn view_projection(&self, width: u32, height: u32) -> Matrix4<f32> {
        let pose = &self.controller.pose;
        camera::compose(
            width,
            height,
            pose.position,
            pose.rx,
            pose.ry,
            self.fov,
            self.projection_kind,
            self.render_radius,
        )
    }

    /// Recomputes the packed uniform for the current pose.
    pub fn refresh_uniform(&mut self, width: u32, height: u32) {
        let view_projection = self.view_projection(width, height);
        self.uniform.update_view_proj(&view_projection);
    }

    /// Far plane distance and orthographic half-extent.
    pub fn render_radius(&self) -> f32 {
        self.render_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix_ops;
    use approx::assert_relative_eq;

    #[test]
    fn starts_from_configured_pose() {
        let config = CameraConfig::default();
        let state = CameraState::new(&config, FrameClock::start());

        assert_eq!(state.controller.pose.position, Vector3::new(-1.0, 1.5, 2.0));
        assert_eq!(state.controller.pose.rx, 0.5);
        assert_eq!(state.controller.pose.ry, -0.8);
        assert_eq!(state.render_radius(), 40.0);
    }

    #[test]
    fn view_projection_follows_the_pose() {
        let config = CameraConfig::default();
        let state = CameraState::new(&config, FrameClock::start());

        let expected = camera::compose(
            1024,
            768,
            Vector3::new(-1.0, 1.5, 2.0),
            0.5,
            -0.8,
            config.fov,
            ProjectionKind::Perspective,
            40.0,
        );
        let actual = matrix_ops::to_floats(&state.view_projection(1024, 768));
        let expected = matrix_ops::to_floats(&expected);
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn update_without_input_keeps_position() {
        let config = CameraConfig::default();
        let mut state = CameraState::new(&config, FrameClock::start());

        let delta_t = state.update(&PlayerAction::default());

        assert!(delta_t >= 0.0);
        assert_eq!(state.controller.pose.position, Vector3::new(-1.0, 1.5, 2.0));
    }
}
