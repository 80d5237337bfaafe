//! Vertex buffer layouts for block meshes.
//!
//! Positions and texture coordinates live in separate, tightly packed buffers, one
//! vertex buffer slot each. Shader locations come from the shader itself (see
//! `shader_reflection`), so the layouts are built per location.

/// Per-vertex position: x, y, z.
pub type Position = [f32; 3];
/// Per-vertex atlas coordinate: u, v.
pub type TexCoord = [f32; 2];

/// Attribute list for a position buffer read at `location`.
pub fn position_attributes(location: u32) -> [wgpu::VertexAttribute; 1] {
    [wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format: wgpu::VertexFormat::Float32x3,
    }]
}

/// Attribute list for a texcoord buffer read at `location`.
pub fn texcoord_attributes(location: u32) -> [wgpu::VertexAttribute; 1] {
    [wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format: wgpu::VertexFormat::Float32x2,
    }]
}

/// Layout of a buffer of [`Position`]s.
pub fn position_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Position>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Layout of a buffer of [`TexCoord`]s.
pub fn texcoord_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TexCoord>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}
