//! # Projection
//!
//! Projection matrices in OpenGL clip conventions (z in [-1, 1]) and extraction of
//! the six frustum planes from a combined view-projection matrix.
//!
//! The wgpu depth-range fixup is not applied here; see
//! [`OPENGL_TO_WGPU_MATRIX`](super::camera::OPENGL_TO_WGPU_MATRIX).

use cgmath::{Matrix, Matrix4, Point3, Rad, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::core::vector_math;

/// Near clipping distance used by every perspective projection.
pub const Z_NEAR: f32 = 0.125;

/// Which projection [`compose`](super::camera::compose) builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    /// Symmetric perspective from a vertical field of view
    #[default]
    Perspective,
    /// Axis-aligned box of half-extent `radius`
    Orthographic,
}

/// Symmetric perspective projection. `fov_y` is the vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    cgmath::perspective(Rad(fov_y), aspect, near, far)
}

/// Orthographic projection of the given box.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    cgmath::ortho(left, right, bottom, top, near, far)
}

/// Off-axis perspective projection through the near-plane rectangle.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    cgmath::frustum(left, right, bottom, top, near, far)
}

/// A plane `a*x + b*y + c*z + d = 0` with an outward-facing normal `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal x
    pub a: f32,
    /// Normal y
    pub b: f32,
    /// Normal z
    pub c: f32,
    /// Offset
    pub d: f32,
}

impl Plane {
    /// A plane that has every point on its inner side.
    pub const UNBOUNDED: Plane = Plane {
        a: 0.0,
        b: 0.0,
        c: 0.0,
        d: -1.0,
    };

    /// Distance of `point` from the plane, positive on the outside.
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.a * point.x + self.b * point.y + self.c * point.z + self.d
    }

    /// `true` when `point` lies strictly outside.
    pub fn is_outside(&self, point: Point3<f32>) -> bool {
        self.signed_distance(point) > 0.0
    }

    /// `[a, b, c, d]`
    pub fn components(&self) -> [f32; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Normalizes an inward-facing plane and flips it outward.
    fn outward_from_inward(inward: Vector4<f32>) -> Plane {
        let mut normal = Vector3::new(inward.x, inward.y, inward.z);
        let length = vector_math::magnitude(normal);
        match vector_math::normalize(&mut normal) {
            Ok(()) => Plane {
                a: -normal.x,
                b: -normal.y,
                c: -normal.z,
                d: -inward.w / length,
            },
            // Degenerate matrix row.
            Err(_) => Plane::UNBOUNDED,
        }
    }
}

/// Frustum planes of `view_projection`, ordered left, right, bottom, top, near, far.
///
/// All six come from the clip-space rows: `row3 +/- row0`, `row3 +/- row1` and
/// `row3 +/- row2`, so they match what the matrix clips for both perspective and
/// orthographic projections. `radius` is the render radius the matrix was composed
/// with; its far plane already sits there.
pub fn frustum_planes(_radius: f32, view_projection: &Matrix4<f32>) -> [Plane; 6] {
    let row0 = view_projection.row(0);
    let row1 = view_projection.row(1);
    let row2 = view_projection.row(2);
    let row3 = view_projection.row(3);

    [
        row3 + row0,
        row3 - row0,
        row3 + row1,
        row3 - row1,
        row3 + row2,
        row3 - row2,
    ]
    .map(Plane::outward_from_inward)
}
