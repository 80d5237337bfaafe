//! # Block Module
//!
//! A block is one unit cube identified by its integer reference corner. Its mesh is
//! generated once at construction and never changes; the GPU copy is attached by
//! the upload step and released when the block is dropped.

use cgmath::Point3;

use crate::engine_state::rendering::block_buffers::BlockBuffers;

pub mod block_mesh;

use block_mesh::VERTICES_PER_BLOCK;

/// A single voxel with its CPU-side mesh and optional GPU buffers.
#[derive(Debug)]
pub struct Block {
    corner: Point3<i32>,
    vertices: [[f32; 3]; VERTICES_PER_BLOCK],
    texcoords: [[f32; 2]; VERTICES_PER_BLOCK],
    buffers: Option<BlockBuffers>,
}

impl Block {
    /// Builds the mesh for the block whose reference corner is `corner`.
    pub fn new(corner: Point3<i32>) -> Self {
        Self {
            corner,
            vertices: block_mesh::build_vertices(corner),
            texcoords: block_mesh::build_texcoords(),
            buffers: None,
        }
    }

    /// World-space reference corner.
    pub fn corner(&self) -> Point3<i32> {
        self.corner
    }

    /// Triangle-list positions.
    pub fn vertices(&self) -> &[[f32; 3]; VERTICES_PER_BLOCK] {
        &self.vertices
    }

    /// Texture coordinates, one per vertex.
    pub fn texcoords(&self) -> &[[f32; 2]; VERTICES_PER_BLOCK] {
        &self.texcoords
    }

    /// GPU buffers, once uploaded.
    pub fn buffers(&self) -> Option<&BlockBuffers> {
        self.buffers.as_ref()
    }

    /// Takes ownership of the block's GPU buffers, dropping any previous ones.
    pub fn attach_buffers(&mut self, buffers: BlockBuffers) {
        self.buffers = Some(buffers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_holds_its_mesh_and_no_buffers() {
        let corner = Point3::new(4, -1, 9);
        let block = Block::new(corner);

        assert_eq!(block.corner(), corner);
        assert_eq!(block.vertices(), &block_mesh::build_vertices(corner));
        assert_eq!(block.texcoords(), &block_mesh::build_texcoords());
        assert!(block.buffers().is_none());
    }
}
