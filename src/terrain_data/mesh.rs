use crate::{
    fill::Direction,
    util::equals_epsilon,
};
use bevy::math::{DVec2, DVec3};
use bytemuck::{Pod, Zeroable};
use std::mem;

/// A single vertex of a [`TerrainMesh`], laid out for direct upload to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct TerrainVertex {
    /// The position relative to the [`TerrainEncoding::center`].
    pub position: [f32; 3],
    /// The height above the surface of the terrain shape.
    pub height: f32,
    /// The texture coordinates inside the tile.
    pub uv: [f32; 2],
    /// The oct-encoded vertex normal.
    pub normal: [f32; 2],
}

/// Describes how the vertices of a [`TerrainMesh`] are encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainEncoding {
    /// Vertex positions are stored relative to this point to keep them precise in `f32`.
    pub center: DVec3,
}

impl TerrainEncoding {
    pub fn new(center: DVec3) -> Self {
        Self { center }
    }

    /// The number of floats per vertex.
    pub const fn stride() -> usize {
        mem::size_of::<TerrainVertex>() / mem::size_of::<f32>()
    }

    pub fn encode(&self, position: DVec3, height: f64, uv: DVec2, normal: [f32; 2]) -> TerrainVertex {
        TerrainVertex {
            position: (position - self.center).as_vec3().to_array(),
            height: height as f32,
            uv: uv.as_vec2().to_array(),
            normal,
        }
    }

    pub fn decode_position(&self, vertices: &[TerrainVertex], index: usize) -> DVec3 {
        self.center + DVec3::from_array(vertices[index].position.map(f64::from))
    }

    pub fn decode_height(&self, vertices: &[TerrainVertex], index: usize) -> f64 {
        vertices[index].height as f64
    }

    pub fn decode_texture_coordinates(&self, vertices: &[TerrainVertex], index: usize) -> DVec2 {
        DVec2::from_array(vertices[index].uv.map(f64::from))
    }

    pub fn decode_normal(&self, vertices: &[TerrainVertex], index: usize) -> [f32; 2] {
        vertices[index].normal
    }
}

/// The vertex indices along the four edges of a [`TerrainMesh`], corners included.
///
/// The orders match the direction a neighbouring tile walks along the shared edge,
/// when it traverses its own boundary counter-clockwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeIndices {
    pub west_south_to_north: Vec<u32>,
    pub south_east_to_west: Vec<u32>,
    pub east_north_to_south: Vec<u32>,
    pub north_west_to_east: Vec<u32>,
}

/// The renderable triangle mesh of a tile.
///
/// Both meshes created from loaded terrain data and synthesized fill meshes
/// share this representation, so the renderer can not tell them apart.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub encoding: TerrainEncoding,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    pub minimum_height: f64,
    pub maximum_height: f64,
    pub edges: EdgeIndices,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn position(&self, index: usize) -> DVec3 {
        self.encoding.decode_position(&self.vertices, index)
    }

    pub fn height(&self, index: usize) -> f64 {
        self.encoding.decode_height(&self.vertices, index)
    }

    pub fn uv(&self, index: usize) -> DVec2 {
        self.encoding
            .decode_texture_coordinates(&self.vertices, index)
    }

    /// The vertex indices along one side of the mesh.
    pub fn edge_indices(&self, side: Direction) -> &[u32] {
        match side {
            Direction::West => &self.edges.west_south_to_north,
            Direction::South => &self.edges.south_east_to_west,
            Direction::East => &self.edges.east_north_to_south,
            Direction::North => &self.edges.north_west_to_east,
            _ => &[],
        }
    }

    /// Finds the vertex located at the texture coordinates.
    pub fn find_vertex(&self, uv: DVec2) -> Option<usize> {
        (0..self.vertex_count()).find(|&index| {
            let vertex_uv = self.uv(index);
            equals_epsilon(vertex_uv.x, uv.x) && equals_epsilon(vertex_uv.y, uv.y)
        })
    }

    /// The height of the vertex located at the texture coordinates.
    pub fn height_at(&self, uv: DVec2) -> Option<f64> {
        self.find_vertex(uv).map(|index| self.height(index))
    }
}
