use crate::{
    math::{TileCoordinate, TilingScheme},
    terrain_data::{EdgeIndices, TerrainEncoding, TerrainMesh},
};
use anyhow::{ensure, Result};
use bevy::math::DVec2;
use itertools::{iproduct, Itertools, MinMaxResult};

/// A regular grid of heights covering the rectangle of a single tile.
///
/// The rows are stored from north to south and each row from west to east.
#[derive(Clone, Debug)]
pub struct HeightmapTerrainData {
    width: u32,
    height: u32,
    buffer: Vec<f32>,
}

impl HeightmapTerrainData {
    pub fn new(width: u32, height: u32, buffer: Vec<f32>) -> Result<Self> {
        ensure!(
            width >= 2 && height >= 2,
            "A heightmap needs at least 2x2 samples, got {width}x{height}."
        );
        ensure!(
            buffer.len() == width as usize * height as usize,
            "The heightmap buffer holds {} samples, but {width}x{height} were expected.",
            buffer.len()
        );

        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample(&self, column: u32, row: u32) -> f32 {
        self.buffer[row as usize * self.width as usize + column as usize]
    }

    fn index(&self, column: u32, row: u32) -> u32 {
        row * self.width + column
    }

    fn uv(&self, column: u32, row: u32) -> DVec2 {
        DVec2::new(
            column as f64 / (self.width - 1) as f64,
            1.0 - row as f64 / (self.height - 1) as f64,
        )
    }

    /// Triangulates the heightmap into the mesh of the tile at the `coordinate`.
    pub fn create_mesh(&self, tiling: &TilingScheme, coordinate: TileCoordinate) -> TerrainMesh {
        let (minimum_height, maximum_height) = match self.buffer.iter().copied().minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(height) => (height as f64, height as f64),
            MinMaxResult::MinMax(minimum, maximum) => (minimum as f64, maximum as f64),
        };

        let center_height = (minimum_height + maximum_height) / 2.0;
        let encoding =
            TerrainEncoding::new(tiling.position(coordinate, DVec2::splat(0.5), center_height));

        let vertices = iproduct!(0..self.height, 0..self.width)
            .map(|(row, column)| {
                let uv = self.uv(column, row);
                let height = self.sample(column, row) as f64;
                let position = tiling.position(coordinate, uv, height);

                encoding.encode(position, height, uv, [0.0; 2])
            })
            .collect();

        let indices = iproduct!(0..self.height - 1, 0..self.width - 1)
            .flat_map(|(row, column)| {
                let north_west = self.index(column, row);
                let north_east = self.index(column + 1, row);
                let south_west = self.index(column, row + 1);
                let south_east = self.index(column + 1, row + 1);

                [
                    south_west, south_east, north_east, south_west, north_east, north_west,
                ]
            })
            .collect();

        let last_column = self.width - 1;
        let last_row = self.height - 1;

        let edges = EdgeIndices {
            west_south_to_north: (0..self.height)
                .rev()
                .map(|row| self.index(0, row))
                .collect(),
            south_east_to_west: (0..self.width)
                .rev()
                .map(|column| self.index(column, last_row))
                .collect(),
            east_north_to_south: (0..self.height)
                .map(|row| self.index(last_column, row))
                .collect(),
            north_west_to_east: (0..self.width)
                .map(|column| self.index(column, 0))
                .collect(),
        };

        TerrainMesh {
            encoding,
            vertices,
            indices,
            minimum_height,
            maximum_height,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::Direction;

    fn heightmap() -> HeightmapTerrainData {
        HeightmapTerrainData::new(3, 3, (1..=9).map(|height| height as f32).collect()).unwrap()
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert!(HeightmapTerrainData::new(1, 3, vec![0.0; 3]).is_err());
        assert!(HeightmapTerrainData::new(3, 3, vec![0.0; 8]).is_err());
        // 65536 * 65536 wraps to zero in 32 bits
        assert!(HeightmapTerrainData::new(65536, 65536, Vec::new()).is_err());
    }

    #[test]
    fn mesh_layout() {
        let tiling = TilingScheme::default();
        let coordinate = TileCoordinate::new(4, 10, 5);
        let mesh = heightmap().create_mesh(&tiling, coordinate);

        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.minimum_height, 1.0);
        assert_eq!(mesh.maximum_height, 9.0);

        assert_eq!(mesh.height_at(DVec2::new(0.0, 1.0)), Some(1.0));
        assert_eq!(mesh.height_at(DVec2::new(1.0, 1.0)), Some(3.0));
        assert_eq!(mesh.height_at(DVec2::new(0.5, 0.5)), Some(5.0));
        assert_eq!(mesh.height_at(DVec2::new(0.0, 0.0)), Some(7.0));
        assert_eq!(mesh.height_at(DVec2::new(1.0, 0.0)), Some(9.0));

        let expected = tiling.position(coordinate, DVec2::new(1.0, 0.0), 9.0);
        let index = mesh.find_vertex(DVec2::new(1.0, 0.0)).unwrap();
        assert!(mesh.position(index).distance(expected) < 1.0);
    }

    #[test]
    fn edge_lists_include_corners() {
        let mesh = heightmap().create_mesh(&TilingScheme::default(), TileCoordinate::new(4, 10, 5));

        let heights = |side| {
            mesh.edge_indices(side)
                .iter()
                .map(|&index| mesh.height(index as usize))
                .collect::<Vec<_>>()
        };

        assert_eq!(heights(Direction::West), [7.0, 4.0, 1.0]);
        assert_eq!(heights(Direction::South), [9.0, 8.0, 7.0]);
        assert_eq!(heights(Direction::East), [3.0, 6.0, 9.0]);
        assert_eq!(heights(Direction::North), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn edge_profile_runs_along_the_edge() {
        let mesh = heightmap().create_mesh(&TilingScheme::default(), TileCoordinate::new(4, 10, 5));
        let profile = mesh.edge_profile(Direction::East);

        assert_eq!(
            profile.samples(),
            &[
                DVec2::new(0.0, 9.0),
                DVec2::new(0.5, 6.0),
                DVec2::new(1.0, 3.0)
            ]
        );
        assert_eq!(profile.height_at(0.25), Some(7.5));
        assert_eq!(mesh.edge_profile(Direction::North).height_at(0.75), Some(2.5));
    }
}
