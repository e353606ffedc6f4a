//! Places tiles and their vertices on the surface of the terrain.

mod coordinate;
mod terrain_shape;
mod tiling_scheme;

pub use crate::math::{
    coordinate::{Quadrant, TileCoordinate},
    terrain_shape::TerrainShape,
    tiling_scheme::{Rectangle, TilingScheme},
};
