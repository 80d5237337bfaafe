//! # Matrix Operations
//!
//! 4x4 transform construction and composition for the camera pipeline.
//!
//! Matrices are `cgmath::Matrix4<f32>`: column-major storage, vertices treated as
//! column vectors (`M * v`). Composition therefore reads right to left, so
//! `multiply(p, v)` applies `v` first and `p` second.

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3, Vector4};

use super::vector_math;

/// Errors from batch transforms over raw float streams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// The stream ends before the last requested vertex.
    #[error("vertex stream of {len} floats is too short, {required} are needed")]
    StreamTooShort {
        /// Floats needed to cover every requested vertex
        required: usize,
        /// Floats actually present
        len: usize,
    },
}

/// The identity transform.
pub fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

/// Translation by `(dx, dy, dz)`.
pub fn translate(dx: f32, dy: f32, dz: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(dx, dy, dz))
}

/// Right-handed rotation of `angle` radians about the axis `(x, y, z)`.
///
/// The axis is normalized first. A zero-length axis has no direction to rotate
/// about and yields the identity.
pub fn rotate(x: f32, y: f32, z: f32, angle: f32) -> Matrix4<f32> {
    let mut axis = Vector3::new(x, y, z);
    match vector_math::normalize(&mut axis) {
        Ok(()) => Matrix4::from_axis_angle(axis, Rad(angle)),
        Err(err) => {
            log::debug!("rotation about a degenerate axis: {err}");
            identity()
        }
    }
}

/// `matrix * vector`.
pub fn multiply_vector(matrix: &Matrix4<f32>, vector: Vector4<f32>) -> Vector4<f32> {
    *matrix * vector
}

/// `a * b`: the result applies `b` first, then `a`.
pub fn multiply(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
    *a * *b
}

/// Transforms `count` positions of an interleaved float stream in place.
///
/// Vertex `i` starts at `offset + stride * i`; its first three floats are read as a
/// point (w = 1), transformed, and written back. Anything after the xyz triple is
/// left alone. The whole range is checked before any float is touched.
pub fn apply(
    stream: &mut [f32],
    matrix: &Matrix4<f32>,
    count: usize,
    offset: usize,
    stride: usize,
) -> Result<(), MatrixError> {
    if count == 0 {
        return Ok(());
    }
    // An overflowing range cannot fit in any slice.
    let required = stride
        .checked_mul(count - 1)
        .and_then(|span| span.checked_add(offset))
        .and_then(|start| start.checked_add(3))
        .unwrap_or(usize::MAX);
    if required > stream.len() {
        return Err(MatrixError::StreamTooShort {
            required,
            len: stream.len(),
        });
    }

    for i in 0..count {
        let start = offset + stride * i;
        let point = Vector4::new(stream[start], stream[start + 1], stream[start + 2], 1.0);
        let transformed = *matrix * point;
        stream[start] = transformed.x;
        stream[start + 1] = transformed.y;
        stream[start + 2] = transformed.z;
    }
    Ok(())
}

/// The 16 floats of `matrix` in column-major order, as uploaded to shaders.
pub fn to_floats(matrix: &Matrix4<f32>) -> [f32; 16] {
    *AsRef::<[f32; 16]>::as_ref(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec4_eq(actual: Vector4<f32>, expected: Vector4<f32>) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-6);
        assert_relative_eq!(actual.w, expected.w, epsilon = 1e-6);
    }

    #[test]
    fn identity_leaves_vectors_unchanged() {
        for v in [
            Vector4::new(1.0, 2.0, 3.0, 1.0),
            Vector4::new(-7.5, 0.0, 1e3, 0.0),
            Vector4::new(0.25, -0.5, 0.125, 2.0),
        ] {
            assert_eq!(multiply_vector(&identity(), v), v);
        }
    }

    #[test]
    fn identity_floats_are_column_major_diagonal() {
        let floats = to_floats(&identity());
        for (i, value) in floats.iter().enumerate() {
            let expected = if i % 5 == 0 { 1.0 } else { 0.0 };
            assert_eq!(*value, expected, "element {i}");
        }
    }

    #[test]
    fn translation_lives_in_the_last_column() {
        let floats = to_floats(&translate(1.0, -2.0, 3.5));
        assert_eq!(&floats[12..15], &[1.0, -2.0, 3.5]);

        let moved = multiply_vector(&translate(1.0, -2.0, 3.5), Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert_vec4_eq(moved, Vector4::new(2.0, -1.0, 4.5, 1.0));

        // Directions (w = 0) ignore translation.
        let direction = multiply_vector(&translate(1.0, -2.0, 3.5), Vector4::new(0.0, 0.0, 1.0, 0.0));
        assert_vec4_eq(direction, Vector4::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn rotation_is_right_handed_and_normalizes_its_axis() {
        let quarter_turn = rotate(0.0, 0.0, 5.0, FRAC_PI_2);
        let rotated = multiply_vector(&quarter_turn, Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert_vec4_eq(rotated, Vector4::new(0.0, 1.0, 0.0, 1.0));

        let about_y = rotate(0.0, 1.0, 0.0, FRAC_PI_2);
        let rotated = multiply_vector(&about_y, Vector4::new(0.0, 0.0, 1.0, 1.0));
        assert_vec4_eq(rotated, Vector4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rotation_about_zero_axis_is_identity() {
        assert_eq!(rotate(0.0, 0.0, 0.0, 1.0), identity());
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let turn = rotate(0.0, 0.0, 1.0, FRAC_PI_2);
        let shift = translate(1.0, 0.0, 0.0);
        let point = Vector4::new(1.0, 0.0, 0.0, 1.0);

        let turn_then_shift = multiply(&shift, &turn);
        assert_vec4_eq(
            multiply_vector(&turn_then_shift, point),
            Vector4::new(1.0, 1.0, 0.0, 1.0),
        );

        let shift_then_turn = multiply(&turn, &shift);
        assert_vec4_eq(
            multiply_vector(&shift_then_turn, point),
            Vector4::new(0.0, 2.0, 0.0, 1.0),
        );
    }

    #[test]
    fn apply_transforms_positions_and_skips_other_attributes() {
        // xyz + uv per vertex, two vertices after a one-float header.
        let mut stream = vec![9.0, 1.0, 2.0, 3.0, 0.5, 0.5, -1.0, 0.0, 4.0, 0.25, 0.75];

        apply(&mut stream, &translate(10.0, 20.0, 30.0), 2, 1, 5).unwrap();

        assert_eq!(
            stream,
            vec![9.0, 11.0, 22.0, 33.0, 0.5, 0.5, 9.0, 20.0, 34.0, 0.25, 0.75]
        );
    }

    #[test]
    fn apply_rejects_short_streams_without_touching_them() {
        let mut stream = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let original = stream.clone();

        let err = apply(&mut stream, &translate(1.0, 1.0, 1.0), 2, 0, 3).unwrap_err();

        assert_eq!(err, MatrixError::StreamTooShort { required: 6, len: 5 });
        assert_eq!(stream, original);
    }

    #[test]
    fn apply_with_zero_count_is_a_no_op() {
        let mut stream: Vec<f32> = Vec::new();
        assert!(apply(&mut stream, &translate(1.0, 1.0, 1.0), 0, 4, 3).is_ok());
    }

    #[test]
    fn apply_rejects_ranges_that_overflow_usize() {
        let mut stream = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let original = stream.clone();

        let huge_stride = apply(&mut stream, &translate(1.0, 1.0, 1.0), 2, 0, usize::MAX);
        assert_eq!(
            huge_stride,
            Err(MatrixError::StreamTooShort {
                required: usize::MAX,
                len: 6
            })
        );

        let huge_offset = apply(&mut stream, &translate(1.0, 1.0, 1.0), 1, usize::MAX - 1, 3);
        assert!(huge_offset.is_err());
        assert_eq!(stream, original);
    }
}
