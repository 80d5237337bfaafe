//! # Block Mesh
//!
//! Unrolled geometry for one unit cube: 6 faces, 2 triangles each, 36 vertices.
//!
//! The cube hangs below and extends forward from its reference corner `a`: it spans
//! `x in [a.x, a.x + 1]`, `y in [a.y - 1, a.y]` and `z in [a.z, a.z + 1]`.
//!
//! ```text
//!        a ------ b        top    (y = a.y)
//!       /|       /|
//!      c ------ d |
//!      | e -----|-f        bottom (y = a.y - 1)
//!      |/       |/
//!      g ------ h
//! ```
//!
//! Every face is written as `(p, q, r), (s, r, q)`: both triangles share the `q`-`r`
//! diagonal and wind counter-clockwise seen from outside the cube.

use cgmath::Point3;

/// Vertices in one block mesh.
pub const VERTICES_PER_BLOCK: usize = 36;

const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const E: usize = 4;
const F: usize = 5;
const G: usize = 6;
const H: usize = 7;

/// Offset of each corner from the reference corner.
const CORNER_OFFSETS: [[i32; 3]; 8] = [
    [0, 0, 0],  // a
    [1, 0, 0],  // b
    [0, 0, 1],  // c
    [1, 0, 1],  // d
    [0, -1, 0], // e
    [1, -1, 0], // f
    [0, -1, 1], // g
    [1, -1, 1], // h
];

/// Atlas tile used by every face: column 0, row 14 of a 16x16 grid, rows counted
/// from the top of the image.
const FACE_UVS: [[f32; 2]; 4] = [
    [0.0, 0.875],     // top left
    [0.0625, 0.875],  // top right
    [0.0, 0.9375],    // bottom left
    [0.0625, 0.9375], // bottom right
];

const TOP_LEFT: usize = 0;
const TOP_RIGHT: usize = 1;
const BOTTOM_LEFT: usize = 2;
const BOTTOM_RIGHT: usize = 3;

/// `(corner, uv)` for `p, q, r, s` of each face, emitted as `(p, q, r), (s, r, q)`.
const FACES: [[(usize, usize); 4]; 6] = [
    // z = a.z
    [(B, TOP_LEFT), (F, BOTTOM_LEFT), (A, TOP_RIGHT), (E, BOTTOM_RIGHT)],
    // x = a.x
    [(A, TOP_LEFT), (E, BOTTOM_LEFT), (C, TOP_RIGHT), (G, BOTTOM_RIGHT)],
    // z = a.z + 1
    [(C, TOP_LEFT), (G, BOTTOM_LEFT), (D, TOP_RIGHT), (H, BOTTOM_RIGHT)],
    // x = a.x + 1
    [(D, TOP_LEFT), (H, BOTTOM_LEFT), (B, TOP_RIGHT), (F, BOTTOM_RIGHT)],
    // top
    [(A, TOP_LEFT), (C, BOTTOM_LEFT), (B, TOP_RIGHT), (D, BOTTOM_RIGHT)],
    // bottom
    [(E, TOP_LEFT), (F, TOP_RIGHT), (G, BOTTOM_LEFT), (H, BOTTOM_RIGHT)],
];

/// Positions within a face quad, in emission order.
const QUAD_PATTERN: [usize; 6] = [0, 1, 2, 3, 2, 1];

/// The eight corners of the block with reference corner `a`, in `a..h` order.
pub fn corners(a: Point3<i32>) -> [[f32; 3]; 8] {
    CORNER_OFFSETS.map(|[dx, dy, dz]| {
        [
            (a.x + dx) as f32,
            (a.y + dy) as f32,
            (a.z + dz) as f32,
        ]
    })
}

/// Triangle-list positions for the block with reference corner `a`.
pub fn build_vertices(a: Point3<i32>) -> [[f32; 3]; VERTICES_PER_BLOCK] {
    let corners = corners(a);
    let mut vertices = [[0.0; 3]; VERTICES_PER_BLOCK];
    for (face_index, face) in FACES.iter().enumerate() {
        for (slot, quad_index) in QUAD_PATTERN.iter().enumerate() {
            vertices[face_index * 6 + slot] = corners[face[*quad_index].0];
        }
    }
    vertices
}

/// Texture coordinates matching [`build_vertices`], identical for every block.
///
/// Within a face each corner always maps to the same tile corner, so the tile is
/// drawn upright on the four sides.
pub fn build_texcoords() -> [[f32; 2]; VERTICES_PER_BLOCK] {
    let mut texcoords = [[0.0; 2]; VERTICES_PER_BLOCK];
    for (face_index, face) in FACES.iter().enumerate() {
        for (slot, quad_index) in QUAD_PATTERN.iter().enumerate() {
            texcoords[face_index * 6 + slot] = FACE_UVS[face[*quad_index].1];
        }
    }
    texcoords
}
