//! # Voxels
//!
//! * **Block**: one unit cube and its generated mesh
//! * **Chunk**: a fixed 16x16x16 grid of block slots
//!
//! Blocks are placed once at startup and never change afterwards.

pub mod block;
pub mod chunk;
