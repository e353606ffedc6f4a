//! The terrain tiles and their meshes.
//!
//! The [`TileTree`] holds every tile the terrain currently knows about and records
//! which of them the tile selection draws in the current frame.
//! Tiles with loaded terrain data own a [`TerrainMesh`], for example created from a
//! [`HeightmapTerrainData`]; all other rendered tiles receive a fill mesh.

mod heightmap;
mod mesh;
#[cfg(test)]
mod profile;
mod tile_tree;

pub use crate::terrain_data::{
    heightmap::HeightmapTerrainData,
    mesh::{EdgeIndices, TerrainEncoding, TerrainMesh, TerrainVertex},
    tile_tree::{BoundingRegion, SelectionResult, Tile, TileId, TileTree},
};
