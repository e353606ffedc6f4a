//! Keeps the fill meshes of the rendered tiles in sync with their neighbours.

use crate::{
    fill::{resolver, Direction, DirectionMask, FillMesh},
    terrain_data::{TileId, TileTree},
};
use bevy::{log::debug, utils::HashSet};
use std::collections::VecDeque;

/// What a single call of [`update_fill_tiles`] changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillUpdateReport {
    /// Tiles that received a new fill mesh.
    pub created: Vec<TileId>,
    /// Tiles whose neighbours changed, together with the directions that changed.
    pub invalidated: Vec<(TileId, DirectionMask)>,
    /// Tiles whose fill mesh was (re)built.
    pub synthesized: Vec<TileId>,
    /// Tiles whose fill mesh was dropped.
    pub destroyed: Vec<TileId>,
}

impl FillUpdateReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.invalidated.is_empty()
            && self.synthesized.is_empty()
            && self.destroyed.is_empty()
    }
}

/// Creates, refreshes and destroys the fill meshes of the rendered tiles.
///
/// Has to be called once per frame after the tile selection, with the tiles selected
/// for rendering. Calling it again in the same frame changes nothing.
///
/// Fill meshes are only created for tiles connected to a tile with loaded terrain data,
/// either directly or through other fill tiles.
/// Existing fill meshes that lost this connection are rebuilt from whatever sources remain.
/// See [`fill_orphan_tiles`] for the remaining tiles.
pub fn update_fill_tiles(tree: &mut TileTree, rendered_tiles: &[TileId]) -> FillUpdateReport {
    let mut report = FillUpdateReport::default();

    if rendered_tiles.is_empty() {
        return report;
    }

    destroy_obsolete_fills(tree, &mut report);

    let mut ready = HashSet::default();

    for id in traversal_order(tree, rendered_tiles) {
        refresh_fill(tree, id, &ready, &mut report);
        ready.insert(id);
    }

    // Fill tiles that lost their connection to loaded data, e.g. because a neighbour was
    // evicted or is no longer rendered, still have to drop their old sources.
    let detached: Vec<_> = rendered_tiles
        .iter()
        .copied()
        .filter(|id| !ready.contains(id))
        .filter(|&id| {
            tree.tile(id)
                .is_some_and(|tile| !tile.has_mesh() && tile.fill().is_some())
        })
        .collect();

    for id in detached {
        refresh_fill(tree, id, &ready, &mut report);
    }

    report
}

/// Provides flat fill meshes for rendered tiles without data, that are not connected
/// to any loaded tile and thus were skipped by [`update_fill_tiles`].
pub fn fill_orphan_tiles(tree: &mut TileTree) -> Vec<TileId> {
    let orphans: Vec<_> = tree
        .rendered_tiles()
        .iter()
        .copied()
        .filter(|&id| {
            tree.tile(id)
                .is_some_and(|tile| !tile.has_mesh() && tile.fill().is_none())
        })
        .collect();

    for &id in &orphans {
        let Some(coordinate) = tree.coordinate(id) else {
            continue;
        };

        tree.set_fill(id, FillMesh::new(id, coordinate));
        tree.update_fill(id);
        debug!("Created a flat fill mesh for the isolated tile {coordinate}.");
    }

    orphans
}

/// Drops the fill meshes of tiles that loaded their own mesh or are no longer rendered.
fn destroy_obsolete_fills(tree: &mut TileTree, report: &mut FillUpdateReport) {
    let obsolete: Vec<_> = tree
        .tiles()
        .filter(|(_, tile)| tile.fill().is_some())
        .filter(|&(id, tile)| tile.has_mesh() || !tree.is_rendered(id))
        .map(|(id, _)| id)
        .collect();

    for id in obsolete {
        if let Some(tile) = tree.tile_mut(id) {
            tile.fill = None;
            debug!("Destroyed the fill mesh of tile {}.", tile.coordinate());
        }
        report.destroyed.push(id);
    }
}

/// Orders the rendered tiles without data breadth-first, starting at the loaded ones.
fn traversal_order(tree: &TileTree, rendered_tiles: &[TileId]) -> Vec<TileId> {
    let has_mesh = |id: TileId| tree.tile(id).is_some_and(|tile| tile.has_mesh());

    let mut queue: VecDeque<TileId> = rendered_tiles
        .iter()
        .copied()
        .filter(|&id| has_mesh(id) && tree.is_rendered(id))
        .collect();
    let mut visited: HashSet<TileId> = queue.iter().copied().collect();
    let mut order = Vec::new();

    while let Some(id) = queue.pop_front() {
        for direction in Direction::ALL {
            for neighbour in resolver::rendered_neighbours(tree, id, direction) {
                if has_mesh(neighbour) || !visited.insert(neighbour) {
                    continue;
                }

                order.push(neighbour);
                queue.push_back(neighbour);
            }
        }
    }

    order
}

/// Resolves the current neighbours of the fill tile and rebuilds its mesh if they changed.
///
/// Other fill tiles are only used as neighbours, if they are `ready`,
/// i.e. were refreshed earlier in this pass.
fn refresh_fill(
    tree: &mut TileTree,
    id: TileId,
    ready: &HashSet<TileId>,
    report: &mut FillUpdateReport,
) {
    let sources = resolver::resolve_sources(tree, id, |neighbour| {
        let tile = tree.tile(neighbour)?;
        (tile.has_mesh() || ready.contains(&neighbour))
            .then(|| tree.mesh_snapshot(neighbour))
            .flatten()
    });

    let Some(tile) = tree.tile_mut(id) else {
        return;
    };
    let coordinate = tile.coordinate();

    match tile.fill.as_mut() {
        Some(fill) => {
            let changed = fill.replace_sources(sources);

            if !changed.is_empty() {
                debug!("The neighbours {changed:?} of fill tile {coordinate} changed.");
                report.invalidated.push((id, changed));
            }
        }
        None => {
            let mut fill = FillMesh::new(id, coordinate);
            fill.replace_sources(sources);
            tile.fill = Some(fill);

            debug!("Created a fill mesh for tile {coordinate}.");
            report.created.push(id);
        }
    }

    if tree.update_fill(id) {
        report.synthesized.push(id);
    }
}
