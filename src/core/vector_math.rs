//! # Vector Math
//!
//! Three-component vector helpers on top of `cgmath::Vector3<f32>`.
//!
//! The camera recomputes its forward and right vectors every frame and renormalizes
//! them here. Normalization refuses vectors that are too short to carry a direction
//! instead of producing NaNs.

use cgmath::{InnerSpace, Vector3};

/// Magnitude below which a vector is treated as having no direction.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Returned when a vector is too short to be normalized.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("cannot normalize a vector of magnitude {magnitude}")]
pub struct DegenerateVector {
    /// Magnitude of the rejected vector
    pub magnitude: f32,
}

/// Rescales `vector` to unit length in place.
///
/// If the magnitude is below [`NORMALIZE_EPSILON`] the vector is left untouched and
/// `DegenerateVector` is returned.
pub fn normalize(vector: &mut Vector3<f32>) -> Result<(), DegenerateVector> {
    let magnitude = vector.magnitude();
    if magnitude < NORMALIZE_EPSILON {
        return Err(DegenerateVector { magnitude });
    }
    *vector /= magnitude;
    Ok(())
}

/// Euclidean length of `vector`.
pub fn magnitude(vector: Vector3<f32>) -> f32 {
    vector.magnitude()
}

/// Elementwise sum.
pub fn add(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    a + b
}

/// Elementwise difference `a - b`.
pub fn sub(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    a - b
}

/// Scalar times vector.
pub fn scale(scalar: f32, vector: Vector3<f32>) -> Vector3<f32> {
    vector * scalar
}
