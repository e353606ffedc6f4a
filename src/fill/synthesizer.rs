//! Triangulates the boundary samples of a fill tile into a [`TerrainMesh`].
//!
//! The mesh consists of the four corners, the vertices copied from the neighbouring
//! edges and a single center vertex, connected as a triangle fan around the center.

use crate::{
    fill::{
        extractor::{extract_corner_height, extract_edge_samples, EdgeSample},
        Direction, FillSources,
    },
    math::{TileCoordinate, TilingScheme},
    terrain_data::{BoundingRegion, EdgeIndices, TerrainEncoding, TerrainMesh},
};
use bevy::math::DVec2;
use itertools::{Itertools, MinMaxResult};
use std::iter;

/// Resolves the heights of all four corners, filling in missing ones from the others.
///
/// Corners without any height source take the height of the adjacent corners, then
/// of the opposite one and at last the middle of the bounding region of the tile.
pub fn corner_heights(
    tiling: &TilingScheme,
    coordinate: TileCoordinate,
    sources: &FillSources,
    bounding_region: Option<BoundingRegion>,
) -> [f64; 4] {
    let mut heights = Direction::CORNERS
        .map(|corner| extract_corner_height(tiling, coordinate, corner, sources));

    for corner in Direction::CORNERS {
        if heights[corner.corner_index()].is_some() {
            continue;
        }

        let (first, second, opposite) = corner.related_corners();
        let first = heights[first.corner_index()];
        let second = heights[second.corner_index()];
        let opposite = heights[opposite.corner_index()];

        let height = match (first, second) {
            (Some(first), Some(second)) => (first + second) / 2.0,
            (Some(height), None) | (None, Some(height)) => height,
            (None, None) => opposite.unwrap_or_else(|| {
                bounding_region.map_or(0.0, |region| region.middle_height())
            }),
        };

        heights[corner.corner_index()] = Some(height);
    }

    heights.map(|height| height.unwrap_or_default())
}

/// Builds the fill mesh of the tile at the `coordinate` from its neighbouring meshes.
pub fn synthesize(
    tiling: &TilingScheme,
    coordinate: TileCoordinate,
    sources: &FillSources,
    bounding_region: Option<BoundingRegion>,
) -> TerrainMesh {
    let corners = corner_heights(tiling, coordinate, sources, bounding_region);

    // walk the boundary counter-clockwise, each corner followed by the edge leaving it
    let mut boundary = Vec::new();
    let mut corner_indices = [0; 4];

    for (corner, side) in [
        (Direction::Northwest, Direction::West),
        (Direction::Southwest, Direction::South),
        (Direction::Southeast, Direction::East),
        (Direction::Northeast, Direction::North),
    ] {
        let uv = corner.corner_uv();
        let height = corners[corner.corner_index()];

        corner_indices[corner.corner_index()] = boundary.len() as u32;
        boundary.push(EdgeSample {
            uv,
            height,
            position: tiling.position(coordinate, uv, height),
            normal: [0.0; 2],
        });
        boundary.extend(extract_edge_samples(
            tiling,
            coordinate,
            side,
            sources.edge(side),
        ));
    }

    let (minimum_height, maximum_height) =
        match boundary.iter().map(|sample| sample.height).minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(height) => (height, height),
            MinMaxResult::MinMax(minimum, maximum) => (minimum, maximum),
        };

    let center_uv = DVec2::splat(0.5);
    let center_height = (minimum_height + maximum_height) / 2.0;
    let encoding = TerrainEncoding::new(tiling.position(coordinate, center_uv, center_height));

    let vertices = boundary
        .iter()
        .map(|sample| encoding.encode(sample.position, sample.height, sample.uv, sample.normal))
        .chain(iter::once(encoding.encode(
            encoding.center,
            center_height,
            center_uv,
            [0.0; 2],
        )))
        .collect();

    let center = boundary.len() as u32;
    let indices = (0..center)
        .flat_map(|index| [center, index, (index + 1) % center])
        .collect();

    let [north_west, south_west, south_east, north_east] = corner_indices;

    let edges = EdgeIndices {
        west_south_to_north: (north_west..=south_west).rev().collect(),
        south_east_to_west: (south_west..=south_east).rev().collect(),
        east_north_to_south: (south_east..=north_east).rev().collect(),
        north_west_to_east: iter::once(north_west)
            .chain((north_east..center).rev())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fill::NeighbourMesh,
        terrain_data::{HeightmapTerrainData, TileId},
    };
    use std::sync::Arc;

    const CENTER: TileCoordinate = TileCoordinate::new(4, 10, 5);

    fn neighbour(coordinate: TileCoordinate, heights: [f32; 9]) -> NeighbourMesh {
        let mesh = HeightmapTerrainData::new(3, 3, heights.to_vec())
            .unwrap()
            .create_mesh(&TilingScheme::default(), coordinate);

        NeighbourMesh::new(TileId::from(1), coordinate, Arc::new(mesh))
    }

    #[test]
    fn flat_without_sources() {
        let tiling = TilingScheme::default();
        let sources = FillSources::default();

        let mesh = synthesize(&tiling, CENTER, &sources, None);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 4);
        assert!((0..5).all(|index| mesh.height(index) == 0.0));

        let region = BoundingRegion::new(1.0, 3.0);
        let mesh = synthesize(&tiling, CENTER, &sources, Some(region));
        assert!((0..5).all(|index| mesh.height(index) == 2.0));
        assert_eq!(mesh.height_at(DVec2::splat(0.5)), Some(2.0));
    }

    #[test]
    fn missing_corners_copy_known_ones() {
        let tiling = TilingScheme::default();
        let mut sources = FillSources::default();
        sources.set_corner(
            Direction::Northeast,
            Some(neighbour(TileCoordinate::new(4, 11, 4), [9.0; 9])),
        );

        assert_eq!(corner_heights(&tiling, CENTER, &sources, None), [9.0; 4]);

        sources.set_corner(
            Direction::Southwest,
            Some(neighbour(TileCoordinate::new(4, 9, 6), [1.0; 9])),
        );

        // northwest and southeast average the two known corners
        assert_eq!(
            corner_heights(&tiling, CENTER, &sources, None),
            [5.0, 1.0, 5.0, 9.0]
        );
    }

    #[test]
    fn edge_lists_walk_the_boundary() {
        let tiling = TilingScheme::default();
        let mut sources = FillSources::default();
        sources.push_edge(
            Direction::North,
            neighbour(
                TileCoordinate::new(4, 10, 4),
                [3.0, 4.0, 5.0, 10.0, 11.0, 12.0, 17.0, 18.0, 19.0],
            ),
        );

        let mesh = synthesize(&tiling, CENTER, &sources, None);
        assert_eq!(mesh.vertex_count(), 6);

        let heights = |side| {
            mesh.edge_indices(side)
                .iter()
                .map(|&index| mesh.height(index as usize))
                .collect::<Vec<_>>()
        };

        assert_eq!(heights(Direction::North), [17.0, 18.0, 19.0]);
        assert_eq!(heights(Direction::West), [17.0, 17.0]);
        assert_eq!(heights(Direction::South), [18.0, 17.0]);
        assert_eq!(heights(Direction::East), [19.0, 18.0]);

        // the center sits between the lowest and highest boundary vertex
        assert_eq!(mesh.height_at(DVec2::splat(0.5)), Some(18.0));
    }
}
