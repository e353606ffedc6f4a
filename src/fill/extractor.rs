//! Samples the heights a fill mesh shares with its neighbours.

use crate::{
    fill::{Direction, FillSources, NeighbourMesh},
    math::{TileCoordinate, TilingScheme},
    util::{equals_epsilon, inverse_mix, mix, EPSILON5},
};
use bevy::math::{DVec2, DVec3};

/// A vertex on the boundary of a fill mesh, copied from a neighbouring mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSample {
    /// The texture coordinates inside the fill tile.
    pub uv: DVec2,
    pub height: f64,
    pub position: DVec3,
    pub normal: [f32; 2],
}

/// Maps texture coordinates of a neighbouring tile into the texture space of another tile.
///
/// The neighbour is shifted by a full turn if it lies on the other side of the
/// anti-meridian. This includes a tile spanning the whole globe, which is its own
/// neighbour to the east and west.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextureTransform<'a> {
    tiling: &'a TilingScheme,
    source: TileCoordinate,
    destination: TileCoordinate,
    wrap: f64,
}

impl<'a> TextureTransform<'a> {
    pub(crate) fn new(
        tiling: &'a TilingScheme,
        source: TileCoordinate,
        destination: TileCoordinate,
        direction: Direction,
    ) -> Self {
        let source_west = tiling.global_uv(source, DVec2::new(0.0, 1.0)).x;
        let destination_west = tiling.global_uv(destination, DVec2::new(0.0, 1.0)).x;

        let wrap = match direction.offset().x {
            x if x < 0 && source_west >= destination_west => -1.0,
            x if x > 0 && source_west <= destination_west => 1.0,
            _ => 0.0,
        };

        Self {
            tiling,
            source,
            destination,
            wrap,
        }
    }

    pub(crate) fn apply(&self, uv: DVec2) -> DVec2 {
        let global_uv = self.tiling.global_uv(self.source, uv) + DVec2::new(self.wrap, 0.0);
        self.tiling.local_uv(self.destination, global_uv)
    }
}

/// Collects the vertices the neighbouring meshes share with the `side` of the destination tile.
///
/// The sources have to be ordered counter-clockwise around the destination.
/// Vertices outside of the edge, duplicates and the two corners are skipped,
/// since corners are resolved separately by [`extract_corner_height`].
pub fn extract_edge_samples(
    tiling: &TilingScheme,
    destination: TileCoordinate,
    side: Direction,
    sources: &[NeighbourMesh],
) -> Vec<EdgeSample> {
    let mut samples: Vec<EdgeSample> = Vec::new();

    for source in sources {
        let transform = TextureTransform::new(tiling, source.coordinate, destination, side);
        let mesh = &source.mesh;

        for &index in mesh.edge_indices(side.opposite()) {
            let index = index as usize;
            let uv = transform.apply(mesh.uv(index));
            let along = side.along(uv);

            if !(0.0..=1.0).contains(&along) {
                continue;
            }
            if samples
                .last()
                .is_some_and(|last| equals_epsilon(side.along(last.uv), along))
            {
                continue;
            }
            if along < EPSILON5 || along > 1.0 - EPSILON5 {
                continue;
            }

            samples.push(EdgeSample {
                uv: side.onto_edge(uv),
                height: mesh.height(index),
                position: mesh.position(index),
                normal: mesh.encoding.decode_normal(&mesh.vertices, index),
            });
        }
    }

    samples
}

/// Determines the height at a corner of the destination tile, from the neighbours
/// in that corner and along the two adjacent edges.
///
/// Returns `None`, if none of them provide a height.
pub fn extract_corner_height(
    tiling: &TilingScheme,
    destination: TileCoordinate,
    corner: Direction,
    sources: &FillSources,
) -> Option<f64> {
    let (previous, next) = corner.adjacent_edges();

    let previous_sources = sources.edge(previous);
    let next_sources = sources.edge(next);

    previous_sources
        .last()
        .and_then(|source| corner_from_edge(tiling, destination, corner, previous, source, false))
        .or_else(|| {
            next_sources.first().and_then(|source| {
                corner_from_edge(tiling, destination, corner, next, source, true)
            })
        })
        .or_else(|| {
            sources
                .corner(corner)
                .and_then(|source| corner_from_tile(source, previous))
        })
        .or_else(|| closest_height(previous_sources, previous, next_sources, next))
}

/// Finds the corner on the edge of the neighbour, either as a vertex or between two of them.
fn corner_from_edge(
    tiling: &TilingScheme,
    destination: TileCoordinate,
    corner: Direction,
    side: Direction,
    source: &NeighbourMesh,
    is_next: bool,
) -> Option<f64> {
    let mesh = &source.mesh;
    let indices = mesh.edge_indices(side.opposite());
    let transform = TextureTransform::new(tiling, source.coordinate, destination, side);

    let along = |index: u32| side.along(transform.apply(mesh.uv(index as usize)));
    let target = side.along(corner.corner_uv());

    let endpoint = if is_next {
        indices.first()
    } else {
        indices.last()
    };
    let &endpoint = endpoint?;

    if equals_epsilon(along(endpoint), target) {
        return Some(mesh.height(endpoint as usize));
    }

    // orient the key so that it increases along the indices
    let sign = if side.is_increasing() { 1.0 } else { -1.0 };
    let position = indices.partition_point(|&index| sign * along(index) < sign * target - EPSILON5);

    if let Some(&index) = indices.get(position) {
        if equals_epsilon(along(index), target) {
            return Some(mesh.height(index as usize));
        }
    }
    if position == 0 || position >= indices.len() {
        return None;
    }

    let (start, end) = (indices[position - 1], indices[position]);
    let t = inverse_mix(along(start), along(end), target);

    Some(mix(
        mesh.height(start as usize),
        mesh.height(end as usize),
        t,
    ))
}

/// The height of the corner of a diagonal neighbour touching the destination tile.
fn corner_from_tile(source: &NeighbourMesh, previous: Direction) -> Option<f64> {
    let mesh = &source.mesh;

    mesh.edge_indices(previous.opposite())
        .first()
        .map(|&index| mesh.height(index as usize))
}

/// Averages the edge vertices closest to the corner, that the adjacent edges provide.
fn closest_height(
    previous_sources: &[NeighbourMesh],
    previous: Direction,
    next_sources: &[NeighbourMesh],
    next: Direction,
) -> Option<f64> {
    let previous_height = previous_sources.iter().rev().find_map(|source| {
        let mesh = &source.mesh;
        mesh.edge_indices(previous.opposite())
            .last()
            .map(|&index| mesh.height(index as usize))
    });
    let next_height = next_sources.iter().find_map(|source| {
        let mesh = &source.mesh;
        mesh.edge_indices(next.opposite())
            .first()
            .map(|&index| mesh.height(index as usize))
    });

    match (previous_height, next_height) {
        (Some(previous), Some(next)) => Some((previous + next) / 2.0),
        (previous, next) => previous.or(next),
    }
}
