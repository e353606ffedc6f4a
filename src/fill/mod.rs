//! Fill meshes stand in for tiles that are selected for rendering before their terrain
//! data has loaded.
//!
//! # Explanation
//! Instead of leaving a hole in the terrain, every such tile gets a coarse placeholder
//! mesh, whose boundary is stitched from the edges of its rendered neighbours.
//! This way the placeholder lines up with the surrounding geometry without cracks.
//!
//! The pipeline consists of four parts:
//! - the [`resolver`] finds the rendered neighbours in each of the eight [`Direction`]s,
//! - the [`extractor`] samples the heights along the shared edges and corners,
//! - the [`synthesizer`] triangulates those samples into a [`TerrainMesh`],
//! - the [`tracker`] keeps the fill meshes in sync, as neighbouring tiles load or disappear.
//!
//! Fill meshes may depend on other fill meshes, so missing data propagates outward
//! from loaded tiles. Each frame [`update_fill_tiles`] walks the rendered tiles
//! breadth-first starting at the loaded ones, so that every fill mesh only depends on
//! fill meshes rebuilt before it in the same pass.

use crate::{
    math::{TileCoordinate, TilingScheme},
    terrain_data::{BoundingRegion, TerrainMesh, TileId},
};
use bevy::log::debug;
use std::sync::Arc;

mod direction;
pub mod extractor;
pub mod resolver;
pub mod synthesizer;
pub mod tracker;


pub use crate::fill::{
    direction::{Direction, DirectionMask},
    tracker::{fill_orphan_tiles, update_fill_tiles, FillUpdateReport},
};

/// The lifecycle state of the fill mesh of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillState {
    /// The tile has no fill mesh, because it has loaded its own mesh or is not rendered.
    #[default]
    NoFill,
    /// The fill mesh has to be synthesized from its current sources.
    Pending,
    /// The fill mesh matches its sources.
    Current,
    /// The sources changed since the fill mesh was synthesized.
    Stale,
}

/// An immutable snapshot of the mesh of a neighbouring tile.
///
/// A fill mesh keeps these around, to detect whether its neighbours changed.
#[derive(Clone, Debug)]
pub struct NeighbourMesh {
    pub tile: TileId,
    pub coordinate: TileCoordinate,
    pub mesh: Arc<TerrainMesh>,
}

impl NeighbourMesh {
    pub fn new(tile: TileId, coordinate: TileCoordinate, mesh: Arc<TerrainMesh>) -> Self {
        Self {
            tile,
            coordinate,
            mesh,
        }
    }

    /// Whether both snapshots refer to the same tile and the very same mesh.
    pub fn is_same(&self, other: &Self) -> bool {
        self.tile == other.tile
            && self.coordinate == other.coordinate
            && Arc::ptr_eq(&self.mesh, &other.mesh)
    }
}

/// The neighbouring meshes a fill mesh is built from, for each of the eight directions.
///
/// Edge directions may hold several meshes, ordered counter-clockwise around the tile.
/// Corner directions hold at most one.
#[derive(Clone, Debug, Default)]
pub struct FillSources {
    sources: [Vec<NeighbourMesh>; 8],
}

impl FillSources {
    pub fn get(&self, direction: Direction) -> &[NeighbourMesh] {
        &self.sources[direction as usize]
    }

    pub fn edge(&self, side: Direction) -> &[NeighbourMesh] {
        debug_assert!(side.is_edge());
        self.get(side)
    }

    pub fn corner(&self, corner: Direction) -> Option<&NeighbourMesh> {
        debug_assert!(corner.is_corner());
        self.get(corner).first()
    }

    pub fn set(&mut self, direction: Direction, sources: Vec<NeighbourMesh>) {
        debug_assert!(direction.is_edge() || sources.len() <= 1);
        self.sources[direction as usize] = sources;
    }

    pub fn push_edge(&mut self, side: Direction, source: NeighbourMesh) {
        debug_assert!(side.is_edge());
        self.sources[side as usize].push(source);
    }

    pub fn set_corner(&mut self, corner: Direction, source: Option<NeighbourMesh>) {
        self.set(corner, source.into_iter().collect());
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(Vec::is_empty)
    }

    /// The directions whose sources differ between the two sets.
    pub fn difference(&self, other: &Self) -> DirectionMask {
        Direction::ALL
            .into_iter()
            .filter(|&direction| {
                let (a, b) = (self.get(direction), other.get(direction));
                a.len() != b.len() || a.iter().zip(b).any(|(a, b)| !a.is_same(b))
            })
            .fold(DirectionMask::empty(), |mask, direction| {
                mask | direction.mask()
            })
    }
}

/// The placeholder mesh of a tile without loaded terrain data.
#[derive(Clone, Debug)]
pub struct FillMesh {
    tile: TileId,
    coordinate: TileCoordinate,
    state: FillState,
    sources: FillSources,
    mesh: Option<Arc<TerrainMesh>>,
    last_updated_frame: Option<u64>,
    synthesis_count: u32,
}

impl FillMesh {
    pub fn new(tile: TileId, coordinate: TileCoordinate) -> Self {
        Self {
            tile,
            coordinate,
            state: FillState::Pending,
            sources: FillSources::default(),
            mesh: None,
            last_updated_frame: None,
            synthesis_count: 0,
        }
    }

    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn coordinate(&self) -> TileCoordinate {
        self.coordinate
    }

    pub fn state(&self) -> FillState {
        self.state
    }

    pub fn sources(&self) -> &FillSources {
        &self.sources
    }

    /// The synthesized mesh, available once the fill has been updated.
    pub fn mesh(&self) -> Option<&Arc<TerrainMesh>> {
        self.mesh.as_ref()
    }

    pub fn last_updated_frame(&self) -> Option<u64> {
        self.last_updated_frame
    }

    /// How often the mesh has been synthesized.
    pub fn synthesis_count(&self) -> u32 {
        self.synthesis_count
    }

    pub fn edge_tiles(&self, side: Direction) -> Vec<TileId> {
        self.sources
            .edge(side)
            .iter()
            .map(|source| source.tile)
            .collect()
    }

    pub fn edge_meshes(&self, side: Direction) -> Vec<Arc<TerrainMesh>> {
        self.sources
            .edge(side)
            .iter()
            .map(|source| source.mesh.clone())
            .collect()
    }

    pub fn corner_tile(&self, corner: Direction) -> Option<TileId> {
        self.sources.corner(corner).map(|source| source.tile)
    }

    pub fn push_edge_source(&mut self, side: Direction, source: NeighbourMesh) {
        self.sources.push_edge(side, source);
        self.invalidate();
    }

    pub fn set_corner_source(&mut self, corner: Direction, source: Option<NeighbourMesh>) {
        self.sources.set_corner(corner, source);
        self.invalidate();
    }

    /// Replaces the sources and returns the directions that changed.
    ///
    /// Any change invalidates the mesh.
    pub fn replace_sources(&mut self, sources: FillSources) -> DirectionMask {
        let changed = self.sources.difference(&sources);

        if !changed.is_empty() {
            self.sources = sources;
            self.invalidate();
        }

        changed
    }

    pub fn needs_update(&self) -> bool {
        matches!(self.state, FillState::Pending | FillState::Stale)
    }

    fn invalidate(&mut self) {
        if self.state == FillState::Current {
            debug!("Fill mesh of tile {} became stale.", self.coordinate);
            self.state = FillState::Stale;
        }
    }

    /// Synthesizes the mesh from the current sources, unless it is already up to date.
    ///
    /// Returns whether a new mesh was created.
    pub fn update(
        &mut self,
        tiling: &TilingScheme,
        bounding_region: Option<BoundingRegion>,
        frame: u64,
    ) -> bool {
        debug_assert!(self.state != FillState::NoFill);

        if !self.needs_update() {
            return false;
        }
        if self.state == FillState::Stale {
            self.state = FillState::Pending;
        }

        let mesh = synthesizer::synthesize(tiling, self.coordinate, &self.sources, bounding_region);

        self.mesh = Some(Arc::new(mesh));
        self.state = FillState::Current;
        self.last_updated_frame = Some(frame);
        self.synthesis_count += 1;

        true
    }
}
