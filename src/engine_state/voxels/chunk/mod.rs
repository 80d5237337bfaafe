//! # Chunk Module
//!
//! A chunk is a dense 16x16x16 grid of block slots anchored at a world-space origin.
//! Each slot is empty or owns exactly one [`Block`].
//!
//! ## Storage
//!
//! - `slots`: one `Option<Block>` per cell, indexed `dx * 256 + dy * 16 + dz`
//! - `occupied`: a bit vector (1 bit per cell) mirroring which slots are filled
//!
//! The bit vector keeps occupancy queries and iteration cheap: iteration walks the
//! set bits instead of all 4096 slots.
//!
//! Which world position a slot stands for is up to the caller; the scene setup uses
//! `world = origin + local`.

use bitvec::prelude::*;
use cgmath::Point3;

use super::block::Block;

pub mod chunk_iteration;

use chunk_iteration::{ChunkBlockIterMut, ChunkBlockIterator};

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: usize = 16;
/// The number of slots in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of slots in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Position of a slot within its chunk, each component in `0..CHUNK_DIMENSION`.
pub type LocalIndex = Point3<usize>;

/// Errors from addressing chunk slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// A component of the index is `CHUNK_DIMENSION` or more.
    #[error("local index {0:?} is outside the chunk")]
    OutOfBounds(LocalIndex),
}

/// A 16x16x16 collection of block slots.
#[derive(Debug)]
pub struct Chunk {
    origin: Point3<i32>,
    slots: Vec<Option<Block>>,
    occupied: BitVec,
}

impl Chunk {
    /// Creates a chunk with every slot empty.
    pub fn new(origin: Point3<i32>) -> Self {
        Self {
            origin,
            slots: std::iter::repeat_with(|| None).take(CHUNK_SIZE).collect(),
            occupied: bitvec![0; CHUNK_SIZE],
        }
    }

    /// World-space corner the chunk is anchored at.
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// Stores `block` at `local`.
    ///
    /// Returns the block previously in the slot, if any. The caller decides what to
    /// do with it; dropping it releases its GPU buffers.
    pub fn insert(&mut self, local: LocalIndex, block: Block) -> Result<Option<Block>, ChunkError> {
        let index = Self::slot_index(local)?;
        self.occupied.set(index, true);
        Ok(self.slots[index].replace(block))
    }

    /// The block at `local`, or `None` for an empty or out-of-range slot.
    pub fn get(&self, local: LocalIndex) -> Option<&Block> {
        let index = Self::slot_index(local).ok()?;
        self.slots[index].as_ref()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied.count_ones()
    }

    /// `true` when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied.not_any()
    }

    /// Occupied slots with `dx` outermost and `dz` innermost.
    pub fn iter(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Mutable access to occupied slots, in the same order as [`Chunk::iter`].
    pub fn iter_mut(&mut self) -> ChunkBlockIterMut<'_> {
        ChunkBlockIterMut::new(self)
    }

    fn slot_index(local: LocalIndex) -> Result<usize, ChunkError> {
        if local.x >= CHUNK_DIMENSION || local.y >= CHUNK_DIMENSION || local.z >= CHUNK_DIMENSION {
            return Err(ChunkError::OutOfBounds(local));
        }
        Ok(local.x * CHUNK_PLANE_SIZE + local.y * CHUNK_DIMENSION + local.z)
    }

    fn local_index(slot: usize) -> LocalIndex {
        Point3::new(
            slot / CHUNK_PLANE_SIZE,
            slot / CHUNK_DIMENSION % CHUNK_DIMENSION,
            slot % CHUNK_DIMENSION,
        )
    }
}
