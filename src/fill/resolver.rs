//! Finds the rendered tiles bordering a tile.
//!
//! A neighbour may be rendered at the same lod as the tile, at a coarser lod (one of
//! the ancestors of the same-lod neighbour) or at finer lods (several descendants
//! along the shared edge).

use crate::{
    fill::{Direction, FillSources, NeighbourMesh},
    math::TileCoordinate,
    terrain_data::{SelectionResult, Tile, TileId, TileTree},
};
use bevy::log::trace;

/// The tiles rendered this frame that border the tile in the `direction`.
///
/// Tiles along an edge are ordered counter-clockwise around the tile.
/// Corner directions yield at most one tile.
pub fn rendered_neighbours(tree: &TileTree, tile: TileId, direction: Direction) -> Vec<TileId> {
    let Some(coordinate) = tree.coordinate(tile) else {
        return Vec::new();
    };
    let Some(start) = tree
        .tiling_scheme()
        .neighbour_coordinate(coordinate, direction.offset())
    else {
        return Vec::new();
    };

    let mut tiles = Vec::new();

    if let Some(id) = tree.find(start) {
        collect_facing(tree, id, direction, &mut tiles);
    }
    if tiles.is_empty() {
        tiles.extend(rendered_ancestor(tree, start, direction));
    }

    tiles
}

/// Collects the rendered descendants of the tile that touch the edge or corner facing back
/// along the `direction`. A rendered tile is only used, if none of its descendants are.
fn collect_facing(tree: &TileTree, id: TileId, direction: Direction, tiles: &mut Vec<TileId>) {
    let result = match tree.selection(id) {
        Some(result @ (SelectionResult::Rendered | SelectionResult::Refined)) => result,
        _ => return,
    };

    let count = tiles.len();

    if let Some(children) = tree.tile(id).and_then(Tile::children) {
        for &quadrant in direction.facing_quadrants() {
            collect_facing(tree, children[quadrant as usize], direction, tiles);
        }
    }

    if result == SelectionResult::Rendered && tiles.len() == count {
        tiles.push(id);
    }
}

/// Walks up from the coordinate to the first tile visited this frame and returns it,
/// if it is rendered.
///
/// Corner directions only walk up while the tile is the child touching the corner,
/// since otherwise the parent no longer shares the corner.
fn rendered_ancestor(
    tree: &TileTree,
    start: TileCoordinate,
    direction: Direction,
) -> Option<TileId> {
    let mut candidate = start;

    loop {
        if let Some(id) = tree.find(candidate) {
            match tree.selection(id) {
                Some(SelectionResult::Rendered) => return Some(id),
                Some(SelectionResult::Refined) => return None,
                _ => {}
            }
        }

        if direction.is_corner() && candidate.quadrant() != direction.facing_quadrants()[0] {
            return None;
        }

        candidate = candidate.parent()?;
    }
}

/// Resolves the neighbouring meshes of the tile in all eight directions.
///
/// `snapshot` decides which rendered neighbours may be used, by returning their mesh.
/// Neighbours without a usable mesh are left out.
pub fn resolve_sources(
    tree: &TileTree,
    tile: TileId,
    mut snapshot: impl FnMut(TileId) -> Option<NeighbourMesh>,
) -> FillSources {
    let mut sources = FillSources::default();

    for direction in Direction::ALL {
        let neighbours = rendered_neighbours(tree, tile, direction);
        let meshes: Vec<_> = neighbours.iter().filter_map(|&id| snapshot(id)).collect();

        trace!(
            "Resolved {} of {} neighbours {direction:?} of tile {tile}.",
            meshes.len(),
            neighbours.len()
        );

        sources.set(direction, meshes);
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quadrant, TilingScheme};

    fn tree() -> (TileTree, TileId) {
        let mut tree = TileTree::new(TilingScheme::default());
        let center = tree.get_or_create(TileCoordinate::new(4, 10, 5)).unwrap();
        (tree, center)
    }

    #[test]
    fn same_lod_neighbour() {
        let (mut tree, center) = tree();
        let west = tree.find_tile_to(center, Direction::West).unwrap();
        tree.mark_rendered(center);
        tree.mark_rendered(west);

        assert_eq!(rendered_neighbours(&tree, center, Direction::West), [west]);
        assert_eq!(rendered_neighbours(&tree, west, Direction::East), [center]);
        assert!(rendered_neighbours(&tree, center, Direction::South).is_empty());
    }

    #[test]
    fn coarser_neighbour() {
        let (mut tree, center) = tree();
        let child = tree.child(center, Quadrant::NorthEast).unwrap();
        let east = tree.find_tile_to(center, Direction::East).unwrap();
        tree.mark_rendered(child);
        tree.mark_rendered(east);

        assert_eq!(rendered_neighbours(&tree, child, Direction::East), [east]);
        // the southeast corner of the child lies inside the west edge of the neighbour
        assert!(rendered_neighbours(&tree, child, Direction::Southeast).is_empty());
    }

    #[test]
    fn coarser_corner_neighbour() {
        let (mut tree, center) = tree();
        let child = tree.child(center, Quadrant::SouthWest).unwrap();
        let southwest = tree.get_or_create(TileCoordinate::new(4, 9, 6)).unwrap();
        tree.mark_rendered(child);
        tree.mark_rendered(southwest);

        assert_eq!(
            rendered_neighbours(&tree, child, Direction::Southwest),
            [southwest]
        );
        assert!(rendered_neighbours(&tree, child, Direction::East).is_empty());
    }

    #[test]
    fn finer_neighbours_in_counter_clockwise_order() {
        let (mut tree, center) = tree();
        let west = tree.find_tile_to(center, Direction::West).unwrap();
        let children = tree.children(west).unwrap();
        tree.mark_rendered(center);
        for child in children {
            tree.mark_rendered(child);
        }

        assert_eq!(
            rendered_neighbours(&tree, center, Direction::West),
            [
                children[Quadrant::NorthEast as usize],
                children[Quadrant::SouthEast as usize]
            ]
        );
        assert_eq!(
            rendered_neighbours(&tree, children[Quadrant::NorthEast as usize], Direction::East),
            [center]
        );
    }

    #[test]
    fn skips_kicked_tiles() {
        let (mut tree, center) = tree();
        let south = tree.find_tile_to(center, Direction::South).unwrap();
        let parent = tree.tile(south).unwrap().parent().unwrap();
        tree.mark_rendered(center);
        tree.mark_rendered(south);
        tree.kick(south);

        assert!(rendered_neighbours(&tree, center, Direction::South).is_empty());

        tree.set_selection(parent, SelectionResult::Rendered);
        assert_eq!(rendered_neighbours(&tree, center, Direction::South), [parent]);
    }

    #[test]
    fn skips_culled_tiles() {
        let (mut tree, center) = tree();
        let north = tree.find_tile_to(center, Direction::North).unwrap();
        let east = tree.find_tile_to(center, Direction::East).unwrap();
        tree.mark_rendered(center);
        tree.set_selection(north, SelectionResult::CulledButNeeded);
        tree.set_selection(east, SelectionResult::Culled);

        assert!(rendered_neighbours(&tree, center, Direction::North).is_empty());
        assert!(rendered_neighbours(&tree, center, Direction::East).is_empty());
        assert_eq!(tree.rendered_tiles(), &[center]);
    }
}
