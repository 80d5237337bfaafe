//! # Core Module
//!
//! Math shared by the camera pipeline and the voxel mesher.
//!
//! ## Key Components
//! - `vector_math`: normalization and elementwise helpers for `Vector3<f32>`
//! - `matrix_ops`: 4x4 construction, composition and batch transforms
//!
//! ## Usage
//! ```rust
//! use cgmath::Vector4;
//! use voxel_viewer::core::matrix_ops;
//!
//! let shift = matrix_ops::translate(1.0, 2.0, 3.0);
//! let moved = matrix_ops::multiply_vector(&shift, Vector4::new(0.0, 0.0, 0.0, 1.0));
//! assert_eq!(moved, Vector4::new(1.0, 2.0, 3.0, 1.0));
//! ```

pub mod matrix_ops;
pub mod vector_math;

pub use matrix_ops::MatrixError;
pub use vector_math::DegenerateVector;
