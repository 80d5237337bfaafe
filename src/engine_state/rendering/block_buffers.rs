//! GPU copies of a block's mesh.

use wgpu::util::DeviceExt;

use crate::engine_state::voxels::block::Block;

/// Vertex buffers owned by one block; released when the block is dropped.
#[derive(Debug)]
pub struct BlockBuffers {
    /// 36 positions, 12 bytes each
    pub position: wgpu::Buffer,
    /// 36 texcoords, 8 bytes each
    pub texcoord: wgpu::Buffer,
}

impl BlockBuffers {
    /// Uploads the mesh of `block`.
    pub fn for_block(device: &wgpu::Device, block: &Block) -> Self {
        let corner = block.corner();
        let label = format!("block ({}, {}, {})", corner.x, corner.y, corner.z);

        let position = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} positions")),
            contents: bytemuck::cast_slice(block.vertices().as_slice()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoord = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} texcoords")),
            contents: bytemuck::cast_slice(block.texcoords().as_slice()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self { position, texcoord }
    }
}
