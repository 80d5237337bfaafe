//! # Camera Implementation
//!
//! Turns a camera pose into the matrix uploaded to the block shader, and integrates
//! the pose from player input every frame.
//!
//! ## Key Components
//! - `compose`: pose plus projection to a single view-projection matrix
//! - `compose_2d` / `compose_item`: fixed screen-space and item-preview matrices
//! - `CameraController`: position, yaw and pitch, with the cached movement vectors
//! - `CameraUniform`: packed matrix for the GPU
//!
//! Yaw `rx` turns about the world vertical axis and pitch `ry` about the camera's
//! right axis. Neither angle is wrapped or clamped.

use std::f32::consts::{FRAC_PI_4, PI};

use cgmath::{Matrix4, Vector3};

use super::projection::{self, ProjectionKind, Z_NEAR};
use crate::{
    core::{matrix_ops, vector_math},
    engine_state::PlayerAction,
};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// Every matrix built in this module uses OpenGL clip depth in [-1, 1]; WGPU expects
/// [0, 1]. This is applied once when the matrix is packed into [`CameraUniform`].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Default movement speed in world units per second.
pub const DEFAULT_WALK_SPEED: f32 = 1.0;
/// Default look speed in radians per unit of mouse motion per second.
pub const DEFAULT_MOUSE_SPEED: f32 = 0.1;

/// Item preview pixels per unit of scale.
const ITEM_PIXELS_PER_SCALE: f32 = 64.0;

/// Builds the combined view-projection matrix for a camera pose.
///
/// The view is `pitch * yaw * translate(-position)`: yaw by `rx` about +y, then
/// pitch by `-ry` about the right axis. The projection is a perspective with
/// `near = Z_NEAR` and `far = radius`, or an orthographic box of half-height
/// `radius`. The model transform is the identity.
///
/// `height` must be non-zero; callers skip frames with an empty surface.
#[allow(clippy::too_many_arguments)]
pub fn compose(
    width: u32,
    height: u32,
    position: Vector3<f32>,
    rx: f32,
    ry: f32,
    fov: f32,
    projection_kind: ProjectionKind,
    radius: f32,
) -> Matrix4<f32> {
    let aspect = width as f32 / height as f32;

    let translation = matrix_ops::translate(-position.x, -position.y, -position.z);
    let yaw = matrix_ops::rotate(0.0, 1.0, 0.0, rx);
    let pitch = matrix_ops::rotate(1.0, 0.0, 0.0, -ry);
    let view = matrix_ops::multiply(&pitch, &matrix_ops::multiply(&yaw, &translation));

    let projection = match projection_kind {
        ProjectionKind::Perspective => projection::perspective(fov, aspect, Z_NEAR, radius),
        ProjectionKind::Orthographic => projection::ortho(
            -radius * aspect,
            radius * aspect,
            -radius,
            radius,
            -radius,
            radius,
        ),
    };

    matrix_ops::multiply(&projection, &view)
}

/// Screen-space projection: pixel `(0, 0)` is the bottom-left corner.
pub fn compose_2d(width: u32, height: u32) -> Matrix4<f32> {
    projection::ortho(0.0, width as f32, 0.0, height as f32, -1.0, 1.0)
}

/// Isometric preview of a single block in the bottom-left corner of the screen.
///
/// A unit block spans `64 * scale` pixels. The block is turned an eighth of a turn
/// about the vertical axis and tipped a tenth of a half turn toward the viewer.
pub fn compose_item(width: u32, height: u32, scale: u32) -> Matrix4<f32> {
    let (width, height) = (width as f32, height as f32);
    let aspect = width / height;
    let size = ITEM_PIXELS_PER_SCALE * scale as f32;
    let half_box = height / size / 2.0;
    let x_offset = 1.0 - size / width * 2.0;
    let y_offset = 1.0 - size / height * 2.0;

    let mut matrix = matrix_ops::rotate(0.0, 1.0, 0.0, FRAC_PI_4);
    matrix = matrix_ops::multiply(&matrix_ops::rotate(1.0, 0.0, 0.0, PI / 10.0), &matrix);
    matrix = matrix_ops::multiply(
        &projection::ortho(
            -half_box * aspect,
            half_box * aspect,
            -half_box,
            half_box,
            -1.0,
            1.0,
        ),
        &matrix,
    );
    matrix_ops::multiply(&matrix_ops::translate(-x_offset, -y_offset, 0.0), &matrix)
}

/// Position and orientation of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space
    pub position: Vector3<f32>,
    /// Yaw in radians
    pub rx: f32,
    /// Pitch in radians
    pub ry: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rx: 0.0,
            ry: 0.0,
        }
    }
}

/// Integrates the camera pose from player input.
///
/// Movement uses the forward and right vectors cached by the previous update, so a
/// turn takes effect on movement one frame later.
#[derive(Debug)]
pub struct CameraController {
    /// Current pose
    pub pose: CameraPose,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    walk_speed: f32,
    mouse_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraPose::default(), DEFAULT_WALK_SPEED, DEFAULT_MOUSE_SPEED)
    }
}

impl CameraController {
    /// Creates a controller facing -z with +x to the right, whatever the pose angles.
    /// The cached vectors follow the pose from the first update on.
    pub fn new(pose: CameraPose, walk_speed: f32, mouse_speed: f32) -> Self {
        Self {
            pose,
            forward: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            walk_speed,
            mouse_speed,
        }
    }

    /// Unit vector the camera moves along for forward/backward.
    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    /// Unit vector the camera moves along for left/right.
    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Advances the pose by `delta_t` seconds of `actions`.
    pub fn update_pose(&mut self, actions: &PlayerAction, delta_t: f32) {
        let step = self.walk_speed * delta_t;
        let pose = &mut self.pose;

        if actions.move_forward {
            pose.position = vector_math::add(pose.position, vector_math::scale(step, self.forward));
        }
        if actions.move_backward {
            pose.position = vector_math::sub(pose.position, vector_math::scale(step, self.forward));
        }
        if actions.move_left {
            pose.position = vector_math::sub(pose.position, vector_math::scale(step, self.right));
        }
        if actions.move_right {
            pose.position = vector_math::add(pose.position, vector_math::scale(step, self.right));
        }

        let (delta_x, delta_y) = actions.rotate_view;
        pose.rx += self.mouse_speed * delta_t * delta_x;
        pose.ry += self.mouse_speed * delta_t * delta_y;

        let (rx_sin, rx_cos) = pose.rx.sin_cos();
        let mut forward = Vector3::new(rx_sin, pose.ry.sin(), -rx_cos);
        let mut right = Vector3::new(rx_cos, 0.0, rx_sin);

        match vector_math::normalize(&mut forward) {
            Ok(()) => self.forward = forward,
            Err(err) => log::debug!("keeping previous forward vector: {err}"),
        }
        match vector_math::normalize(&mut right) {
            Ok(()) => self.right = right,
            Err(err) => log::debug!("keeping previous right vector: {err}"),
        }
    }
}

/// GPU-friendly representation of the camera matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have to convert the Matrix4 into a 4x4 f32 array
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: matrix_ops::identity().into(),
        }
    }
}

impl CameraUniform {
    /// Stores `view_projection` with WGPU depth conventions.
    pub fn update_view_proj(&mut self, view_projection: &Matrix4<f32>) {
        self.view_proj = matrix_ops::multiply(&OPENGL_TO_WGPU_MATRIX, view_projection).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;
    use std::f32::consts::FRAC_PI_2;

    fn assert_matrix_eq(actual: &Matrix4<f32>, expected: &Matrix4<f32>) {
        let actual = matrix_ops::to_floats(actual);
        let expected = matrix_ops::to_floats(expected);
        for i in 0..16 {
            assert_relative_eq!(actual[i], expected[i], epsilon = 1e-5);
        }
    }

    fn project(matrix: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
        let clip = matrix_ops::multiply_vector(matrix, Vector4::new(point.x, point.y, point.z, 1.0));
        Vector3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    fn forward_only() -> PlayerAction {
        PlayerAction {
            move_forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn compose_at_origin_is_the_bare_perspective() {
        let composed = compose(
            800,
            600,
            Vector3::new(0.0, 0.0, 0.0),
            0.0,
            0.0,
            FRAC_PI_4,
            ProjectionKind::Perspective,
            40.0,
        );
        let expected = projection::perspective(FRAC_PI_4, 800.0 / 600.0, Z_NEAR, 40.0);
        assert_matrix_eq(&composed, &expected);
    }

    #[test]
    fn compose_orthographic_uses_radius_box() {
        let composed = compose(
            200,
            100,
            Vector3::new(0.0, 0.0, 0.0),
            0.0,
            0.0,
            FRAC_PI_4,
            ProjectionKind::Orthographic,
            10.0,
        );
        let expected = projection::ortho(-20.0, 20.0, -10.0, 10.0, -10.0, 10.0);
        assert_matrix_eq(&composed, &expected);
    }

    #[test]
    fn compose_translates_by_negative_position() {
        let position = Vector3::new(3.0, -2.0, 7.0);
        let composed = compose(
            640,
            480,
            position,
            0.0,
            0.0,
            FRAC_PI_4,
            ProjectionKind::Perspective,
            40.0,
        );
        let centered = project(&composed, position + Vector3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(centered.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(centered.y, 0.0, epsilon = 1e-5);
    }

    fn project_forward(rx: f32, ry: f32) -> Vector3<f32> {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let mut controller = CameraController::new(CameraPose { position, rx, ry }, 1.0, 0.1);
        controller.update_pose(&PlayerAction::default(), 0.0);

        let composed = compose(
            1024,
            768,
            position,
            rx,
            ry,
            FRAC_PI_4,
            ProjectionKind::Perspective,
            40.0,
        );
        project(&composed, position + controller.forward() * 5.0)
    }

    #[test]
    fn yawed_forward_lands_on_screen_center() {
        for rx in [0.7, -2.5, 3.1] {
            let ahead = project_forward(rx, 0.0);

            assert_relative_eq!(ahead.x, 0.0, epsilon = 1e-4);
            assert_relative_eq!(ahead.y, 0.0, epsilon = 1e-4);
            assert!(ahead.z > -1.0 && ahead.z < 1.0, "yaw {rx} depth {}", ahead.z);
        }
    }

    #[test]
    fn pitched_forward_trails_the_view_toward_the_horizon() {
        for ry in [0.4_f32, -1.1] {
            let ahead = project_forward(0.0, ry);

            // forward rises at atan(sin ry), which is shallower than the view pitch.
            let elevation = ry.sin().atan();
            let expected_y = (elevation - ry).tan() / (FRAC_PI_4 / 2.0).tan();

            assert_relative_eq!(ahead.x, 0.0, epsilon = 1e-4);
            assert_relative_eq!(ahead.y, expected_y, epsilon = 1e-4);
            assert!(ahead.y.signum() == -ry.signum(), "pitch {ry} gave y {}", ahead.y);
            assert!(ahead.y.abs() < 1.0, "pitch {ry} left the screen");
            assert!(ahead.z > -1.0 && ahead.z < 1.0, "pitch {ry} depth {}", ahead.z);
        }
    }

    #[test]
    fn right_vector_maps_to_screen_right() {
        let rx = 1.2;
        let position = Vector3::new(0.0, 0.0, 0.0);
        let mut controller = CameraController::new(CameraPose { position, rx, ry: 0.0 }, 1.0, 0.1);
        controller.update_pose(&PlayerAction::default(), 0.0);

        let composed = compose(
            800,
            800,
            position,
            rx,
            0.0,
            FRAC_PI_2,
            ProjectionKind::Perspective,
            40.0,
        );
        let point = controller.forward() * 5.0 + controller.right();
        let projected = project(&composed, point);

        assert!(projected.x > 0.0);
        assert_relative_eq!(projected.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn compose_2d_maps_pixels_to_clip_space() {
        let m = compose_2d(800, 600);
        let bottom_left = project(&m, Vector3::new(0.0, 0.0, 0.0));
        let top_right = project(&m, Vector3::new(800.0, 600.0, 0.0));

        assert_relative_eq!(bottom_left.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(bottom_left.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn compose_item_centers_a_block_in_the_bottom_left_cell() {
        let (width, height, scale) = (800, 600, 1);
        let m = compose_item(width, height, scale);
        let center = project(&m, Vector3::new(0.0, 0.0, 0.0));

        // The origin lands one item size in from the bottom-left corner.
        let size = ITEM_PIXELS_PER_SCALE * scale as f32;
        assert_relative_eq!(center.x, -1.0 + size / width as f32 * 2.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, -1.0 + size / height as f32 * 2.0, epsilon = 1e-5);
    }

    #[test]
    fn update_pose_moves_along_forward() {
        let mut controller = CameraController::default();

        controller.update_pose(&forward_only(), 0.5);

        assert_eq!(controller.pose.position, Vector3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn update_pose_strafes_and_backs_up() {
        let mut controller = CameraController::new(CameraPose::default(), 2.0, 0.1);
        let actions = PlayerAction {
            move_backward: true,
            move_right: true,
            ..Default::default()
        };

        controller.update_pose(&actions, 0.25);

        assert_eq!(controller.pose.position, Vector3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut controller = CameraController::default();
        let actions = PlayerAction {
            move_forward: true,
            move_backward: true,
            move_left: true,
            move_right: true,
            ..Default::default()
        };

        controller.update_pose(&actions, 1.0);

        assert_eq!(controller.pose.position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn movement_uses_previous_frame_vectors() {
        let mut controller = CameraController::default();
        let actions = PlayerAction {
            move_forward: true,
            rotate_view: (FRAC_PI_2 * 10.0, 0.0),
            ..Default::default()
        };

        controller.update_pose(&actions, 1.0);

        // Moved along the initial -z even though the camera turned this frame.
        assert_relative_eq!(controller.pose.position.z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(controller.forward().x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(controller.forward().z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(controller.right().z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn yaw_and_pitch_accumulate_without_bounds() {
        let mut controller = CameraController::default();
        let actions = PlayerAction {
            rotate_view: (1000.0, -500.0),
            ..Default::default()
        };

        for _ in 0..10 {
            controller.update_pose(&actions, 1.0);
        }

        assert_relative_eq!(controller.pose.rx, 1000.0, epsilon = 1e-3);
        assert_relative_eq!(controller.pose.ry, -500.0, epsilon = 1e-3);
        assert_relative_eq!(vector_math::magnitude(controller.forward()), 1.0, epsilon = 1e-5);
        assert_relative_eq!(vector_math::magnitude(controller.right()), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn uniform_remaps_depth_to_wgpu_range() {
        let mut uniform = CameraUniform::default();
        let m = projection::perspective(FRAC_PI_2, 1.0, Z_NEAR, 40.0);
        uniform.update_view_proj(&m);

        let packed = Matrix4::from(uniform.view_proj);
        let near = project(&packed, Vector3::new(0.0, 0.0, -Z_NEAR));
        let far = project(&packed, Vector3::new(0.0, 0.0, -40.0));

        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
    }
}
