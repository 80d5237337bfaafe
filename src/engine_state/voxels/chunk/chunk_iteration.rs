//! # Chunk Iteration Module
//!
//! Iterators over the occupied slots of a chunk.
//!
//! Both iterators visit slots in storage order: `dx` outermost, then `dy`, then
//! `dz`. [`ChunkBlockIterator`] walks the set bits of the occupancy mask, so empty
//! slots cost nothing. Iteration is restartable by calling `Chunk::iter` again.

use bitvec::{order::Lsb0, slice::IterOnes};

use crate::engine_state::voxels::block::Block;

use super::{Chunk, LocalIndex};

/// Occupied slots of a chunk with their local indices.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Remaining set bits in the occupancy mask
    occupied_slots: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkBlockIterator<'a> {
    pub(super) fn new(chunk_ref: &'a Chunk) -> Self {
        Self {
            chunk_ref,
            occupied_slots: chunk_ref.occupied.iter_ones(),
        }
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (LocalIndex, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.occupied_slots.by_ref() {
            if let Some(block) = self.chunk_ref.slots[slot].as_ref() {
                return Some((Chunk::local_index(slot), block));
            }
        }
        None
    }
}

/// Mutable counterpart of [`ChunkBlockIterator`].
pub struct ChunkBlockIterMut<'a> {
    slots: std::iter::Enumerate<std::slice::IterMut<'a, Option<Block>>>,
}

impl<'a> ChunkBlockIterMut<'a> {
    pub(super) fn new(chunk: &'a mut Chunk) -> Self {
        Self {
            slots: chunk.slots.iter_mut().enumerate(),
        }
    }
}

impl<'a> Iterator for ChunkBlockIterMut<'a> {
    type Item = (LocalIndex, &'a mut Block);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|(slot, block)| block.as_mut().map(|block| (Chunk::local_index(slot), block)))
    }
}
