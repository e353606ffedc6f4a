use crate::{
    fill::{self, Direction, FillMesh, FillState, FillUpdateReport, NeighbourMesh},
    math::{Quadrant, TileCoordinate, TilingScheme},
    terrain_data::TerrainMesh,
};
use bevy::{prelude::*, utils::HashMap};
use derive_more::derive::{Display, From};
use slab::Slab;
use std::sync::Arc;

/// Identifies a tile inside of a [`TileTree`].
///
/// Identifiers are reused after a tile has been evicted, so they are
/// always stored together with the [`TileCoordinate`] of the tile.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Display, From)]
#[display("#{_0}")]
pub struct TileId(usize);

/// The outcome of the tile selection for a single tile in a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionResult {
    /// The tile is outside of the view.
    Culled,
    /// The tile is outside of the view, but kept for a later frame.
    CulledButNeeded,
    /// The tile is drawn this frame.
    Rendered,
    /// Some descendants of the tile are drawn instead of it.
    Refined,
    /// The tile was selected for rendering, but an ancestor is drawn instead.
    RenderedAndKicked,
    /// The tile was refined, but an ancestor is drawn instead.
    RefinedAndKicked,
}

impl SelectionResult {
    pub fn was_kicked(self) -> bool {
        matches!(
            self,
            SelectionResult::RenderedAndKicked | SelectionResult::RefinedAndKicked
        )
    }

    /// The result before the tile was kicked.
    pub fn original_result(self) -> Self {
        match self {
            SelectionResult::RenderedAndKicked => SelectionResult::Rendered,
            SelectionResult::RefinedAndKicked => SelectionResult::Refined,
            result => result,
        }
    }

    pub fn kick(self) -> Self {
        match self {
            SelectionResult::Rendered => SelectionResult::RenderedAndKicked,
            SelectionResult::Refined => SelectionResult::RefinedAndKicked,
            result => result,
        }
    }
}

/// The range of heights covered by the terrain data of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingRegion {
    pub minimum_height: f64,
    pub maximum_height: f64,
}

impl BoundingRegion {
    pub fn new(minimum_height: f64, maximum_height: f64) -> Self {
        Self {
            minimum_height,
            maximum_height,
        }
    }

    pub fn middle_height(&self) -> f64 {
        (self.minimum_height + self.maximum_height) / 2.0
    }
}

/// A single node of the [`TileTree`].
#[derive(Debug)]
pub struct Tile {
    coordinate: TileCoordinate,
    parent: Option<TileId>,
    children: Option<[TileId; 4]>,
    /// The last frame the tile was visited by the selection, together with the outcome.
    selection: Option<(u64, SelectionResult)>,
    /// The mesh created from the loaded terrain data.
    mesh: Option<Arc<TerrainMesh>>,
    bounding_region: Option<BoundingRegion>,
    pub(crate) fill: Option<FillMesh>,
}

impl Tile {
    fn new(coordinate: TileCoordinate, parent: Option<TileId>) -> Self {
        Self {
            coordinate,
            parent,
            children: None,
            selection: None,
            mesh: None,
            bounding_region: None,
            fill: None,
        }
    }

    pub fn coordinate(&self) -> TileCoordinate {
        self.coordinate
    }

    pub fn parent(&self) -> Option<TileId> {
        self.parent
    }

    /// The children indexed by [`Quadrant`], if they have been created.
    pub fn children(&self) -> Option<[TileId; 4]> {
        self.children
    }

    pub fn mesh(&self) -> Option<&Arc<TerrainMesh>> {
        self.mesh.as_ref()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn bounding_region(&self) -> Option<BoundingRegion> {
        self.bounding_region
    }

    pub fn fill(&self) -> Option<&FillMesh> {
        self.fill.as_ref()
    }
}

/// The quadtree of terrain tiles, together with the result of the tile selection
/// of the current frame.
///
/// Tiles are stored in an arena and created lazily, whenever a tile or one of its
/// descendants is requested. Children are always created as a group of four.
///
/// Each frame the selection starts with [`TileTree::begin_frame`] and marks the tiles it
/// draws with [`TileTree::mark_rendered`]. Afterwards [`TileTree::update_fill_tiles`]
/// provides fill meshes for the rendered tiles that have no terrain data yet.
#[derive(Component, Debug)]
pub struct TileTree {
    tiling: TilingScheme,
    tiles: Slab<Tile>,
    lookup: HashMap<TileCoordinate, TileId>,
    root_tiles: Vec<TileId>,
    frame_number: u64,
    rendered_tiles: Vec<TileId>,
}

impl TileTree {
    pub fn new(tiling: TilingScheme) -> Self {
        let mut tree = Self {
            tiling,
            tiles: Slab::new(),
            lookup: HashMap::default(),
            root_tiles: Vec::new(),
            frame_number: 0,
            rendered_tiles: Vec::new(),
        };

        for y in 0..tiling.root_tiles_y {
            for x in 0..tiling.root_tiles_x {
                let id = tree.insert(Tile::new(TileCoordinate::new(0, x, y), None));
                tree.root_tiles.push(id);
            }
        }

        tree
    }

    fn insert(&mut self, tile: Tile) -> TileId {
        let coordinate = tile.coordinate;
        let id = TileId(self.tiles.insert(tile));
        self.lookup.insert(coordinate, id);
        id
    }

    pub fn tiling_scheme(&self) -> &TilingScheme {
        &self.tiling
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// The root tiles, ordered from west to east and north to south.
    pub fn root_tiles(&self) -> &[TileId] {
        &self.root_tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.0)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().map(|(key, tile)| (TileId(key), tile))
    }

    pub fn coordinate(&self, id: TileId) -> Option<TileCoordinate> {
        self.tile(id).map(Tile::coordinate)
    }

    /// Looks up an existing tile.
    pub fn find(&self, coordinate: TileCoordinate) -> Option<TileId> {
        self.lookup.get(&coordinate).copied()
    }

    /// Looks up the tile, creating it and its ancestors if necessary.
    pub fn get_or_create(&mut self, coordinate: TileCoordinate) -> Option<TileId> {
        if !self.tiling.is_valid(coordinate) {
            return None;
        }
        if let Some(id) = self.find(coordinate) {
            return Some(id);
        }

        let parent = self.get_or_create(coordinate.parent()?)?;
        let children = self.children(parent)?;

        Some(children[coordinate.quadrant() as usize])
    }

    /// The children of the tile indexed by [`Quadrant`], creating them if necessary.
    pub fn children(&mut self, id: TileId) -> Option<[TileId; 4]> {
        let tile = self.tile(id)?;
        if let Some(children) = tile.children {
            return Some(children);
        }

        let coordinate = tile.coordinate;
        if !self.tiling.is_valid(coordinate.child(Quadrant::NorthWest)) {
            return None;
        }

        let children =
            Quadrant::ALL.map(|quadrant| self.insert(Tile::new(coordinate.child(quadrant), Some(id))));
        self.tiles[id.0].children = Some(children);

        Some(children)
    }

    pub fn child(&mut self, id: TileId, quadrant: Quadrant) -> Option<TileId> {
        self.children(id).map(|children| children[quadrant as usize])
    }

    /// The tile at the same lod in the `direction`, creating it if necessary.
    pub fn find_tile_to(&mut self, id: TileId, direction: Direction) -> Option<TileId> {
        let coordinate = self.coordinate(id)?;
        let neighbour = self
            .tiling
            .neighbour_coordinate(coordinate, direction.offset())?;

        self.get_or_create(neighbour)
    }

    /// Removes all descendants of the tile.
    pub fn evict_children(&mut self, id: TileId) {
        let Some(children) = self.tile_mut(id).and_then(|tile| tile.children.take()) else {
            return;
        };

        for child in children {
            self.evict_children(child);

            let tile = self.tiles.remove(child.0);
            self.lookup.remove(&tile.coordinate);
            self.rendered_tiles.retain(|&rendered| rendered != child);
            debug!("Evicted tile {}.", tile.coordinate);
        }
    }

    /// Advances to the next frame, discarding the previous selection.
    pub fn begin_frame(&mut self) {
        self.frame_number += 1;
        self.rendered_tiles.clear();
    }

    /// The result of the selection for the tile in the current frame.
    pub fn selection(&self, id: TileId) -> Option<SelectionResult> {
        self.tile(id)?
            .selection
            .filter(|&(frame, _)| frame == self.frame_number)
            .map(|(_, result)| result)
    }

    pub fn set_selection(&mut self, id: TileId, result: SelectionResult) {
        let frame = self.frame_number;

        let Some(tile) = self.tile_mut(id) else {
            return;
        };
        tile.selection = Some((frame, result));

        if result == SelectionResult::Rendered {
            if !self.rendered_tiles.contains(&id) {
                self.rendered_tiles.push(id);
            }
        } else {
            self.rendered_tiles.retain(|&rendered| rendered != id);
        }
    }

    /// Selects the tile for rendering, while all ancestors not yet visited this frame are refined.
    pub fn mark_rendered(&mut self, id: TileId) {
        self.set_selection(id, SelectionResult::Rendered);

        let mut parent = self.tile(id).and_then(Tile::parent);

        while let Some(id) = parent {
            if self.selection(id).is_none() {
                self.set_selection(id, SelectionResult::Refined);
            }
            parent = self.tile(id).and_then(Tile::parent);
        }
    }

    /// Replaces a rendered tile by one of its ancestors.
    pub fn kick(&mut self, id: TileId) {
        if let Some(result) = self.selection(id) {
            self.set_selection(id, result.kick());
        }
    }

    pub fn is_rendered(&self, id: TileId) -> bool {
        self.selection(id) == Some(SelectionResult::Rendered)
    }

    /// The tiles selected for rendering in the current frame.
    pub fn rendered_tiles(&self) -> &[TileId] {
        &self.rendered_tiles
    }

    pub fn set_mesh(&mut self, id: TileId, mesh: TerrainMesh) {
        if let Some(tile) = self.tile_mut(id) {
            tile.bounding_region = Some(BoundingRegion::new(
                mesh.minimum_height,
                mesh.maximum_height,
            ));
            tile.mesh = Some(Arc::new(mesh));
        }
    }

    pub fn remove_mesh(&mut self, id: TileId) -> Option<Arc<TerrainMesh>> {
        self.tile_mut(id)?.mesh.take()
    }

    pub fn set_bounding_region(&mut self, id: TileId, bounding_region: Option<BoundingRegion>) {
        if let Some(tile) = self.tile_mut(id) {
            tile.bounding_region = bounding_region;
        }
    }

    /// A snapshot of the loaded mesh of the tile, or else its synthesized fill mesh.
    pub fn mesh_snapshot(&self, id: TileId) -> Option<NeighbourMesh> {
        let tile = self.tile(id)?;
        let mesh = match &tile.mesh {
            Some(mesh) => mesh.clone(),
            None => tile.fill.as_ref()?.mesh()?.clone(),
        };

        Some(NeighbourMesh::new(id, tile.coordinate, mesh))
    }

    pub fn fill(&self, id: TileId) -> Option<&FillMesh> {
        self.tile(id)?.fill.as_ref()
    }

    pub fn fill_state(&self, id: TileId) -> FillState {
        self.fill(id).map_or(FillState::NoFill, FillMesh::state)
    }

    pub fn set_fill(&mut self, id: TileId, fill: FillMesh) {
        if let Some(tile) = self.tile_mut(id) {
            tile.fill = Some(fill);
        }
    }

    /// Synthesizes the fill mesh of the tile, if it is out of date.
    pub fn update_fill(&mut self, id: TileId) -> bool {
        let tiling = self.tiling;
        let frame = self.frame_number;

        let Some(tile) = self.tile_mut(id) else {
            return false;
        };
        let bounding_region = tile.bounding_region;

        tile.fill
            .as_mut()
            .is_some_and(|fill| fill.update(&tiling, bounding_region, frame))
    }

    /// Creates, refreshes and destroys the fill meshes of the tiles rendered this frame.
    pub fn update_fill_tiles(&mut self) -> FillUpdateReport {
        let rendered_tiles = self.rendered_tiles.clone();
        fill::update_fill_tiles(self, &rendered_tiles)
    }
}
