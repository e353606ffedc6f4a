use crate::math::{TerrainShape, TileCoordinate};
use bevy::math::{DVec2, DVec3, IVec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A geographic rectangle in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Subdivides the surface of the [`TerrainShape`] into a quadtree of tiles
/// in a geographic (equirectangular) projection.
///
/// Texture coordinates inside a tile run from west to east (`u`)
/// and from south to north (`v`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TilingScheme {
    pub root_tiles_x: u32,
    pub root_tiles_y: u32,
    pub shape: TerrainShape,
}

impl Default for TilingScheme {
    fn default() -> Self {
        Self::geographic(TerrainShape::WGS84)
    }
}

impl TilingScheme {
    pub fn geographic(shape: TerrainShape) -> Self {
        Self {
            root_tiles_x: 2,
            root_tiles_y: 1,
            shape,
        }
    }

    pub fn tile_count_x(&self, lod: u32) -> u32 {
        self.root_tiles_x * TileCoordinate::count(lod)
    }

    pub fn tile_count_y(&self, lod: u32) -> u32 {
        self.root_tiles_y * TileCoordinate::count(lod)
    }

    /// Whether the tile lies inside the scheme.
    ///
    /// Lods whose tile counts exceed a `u32` are never valid.
    pub fn is_valid(&self, coordinate: TileCoordinate) -> bool {
        let count = |root_tiles: u32| {
            1u32.checked_shl(coordinate.lod)
                .and_then(|count| count.checked_mul(root_tiles))
        };

        count(self.root_tiles_x).is_some_and(|count| coordinate.x < count)
            && count(self.root_tiles_y).is_some_and(|count| coordinate.y < count)
    }

    /// The coordinate of the tile at the same lod that is `offset` tiles away.
    ///
    /// The x axis wraps around the anti-meridian, the y axis ends at the poles.
    pub fn neighbour_coordinate(
        &self,
        coordinate: TileCoordinate,
        offset: IVec2,
    ) -> Option<TileCoordinate> {
        let count_x = self.tile_count_x(coordinate.lod) as i64;
        let count_y = self.tile_count_y(coordinate.lod) as i64;

        let y = coordinate.y as i64 + offset.y as i64;
        if !(0..count_y).contains(&y) {
            return None;
        }
        let x = (coordinate.x as i64 + offset.x as i64).rem_euclid(count_x);

        Some(TileCoordinate::new(coordinate.lod, x as u32, y as u32))
    }

    /// Maps texture coordinates inside a tile to the normalized position on the whole surface.
    ///
    /// The result runs from west to east along x and from north to south along y.
    /// It is an exact dyadic fraction, so the same surface point computes identically
    /// from every tile that touches it.
    pub fn global_uv(&self, coordinate: TileCoordinate, uv: DVec2) -> DVec2 {
        DVec2::new(
            (coordinate.x as f64 + uv.x) / self.tile_count_x(coordinate.lod) as f64,
            (coordinate.y as f64 + 1.0 - uv.y) / self.tile_count_y(coordinate.lod) as f64,
        )
    }

    /// Inverse of [`Self::global_uv`].
    pub fn local_uv(&self, coordinate: TileCoordinate, global_uv: DVec2) -> DVec2 {
        DVec2::new(
            global_uv.x * self.tile_count_x(coordinate.lod) as f64 - coordinate.x as f64,
            coordinate.y as f64 + 1.0 - global_uv.y * self.tile_count_y(coordinate.lod) as f64,
        )
    }

    pub fn rectangle(&self, coordinate: TileCoordinate) -> Rectangle {
        let north_west = self.cartographic(coordinate, DVec2::new(0.0, 1.0));
        let south_east = self.cartographic(coordinate, DVec2::new(1.0, 0.0));

        Rectangle {
            west: north_west.x,
            south: south_east.y,
            east: south_east.x,
            north: north_west.y,
        }
    }

    /// The longitude and latitude in radians.
    pub fn cartographic(&self, coordinate: TileCoordinate, uv: DVec2) -> DVec2 {
        let global_uv = self.global_uv(coordinate, uv);

        DVec2::new(-PI + global_uv.x * TAU, PI / 2.0 - global_uv.y * PI)
    }

    pub fn position(&self, coordinate: TileCoordinate, uv: DVec2, height: f64) -> DVec3 {
        let cartographic = self.cartographic(coordinate, uv);

        self.shape
            .position_from_cartographic(cartographic.x, cartographic.y, height)
    }
}
