//! This crate provides placeholder meshes for terrain tiles, that are selected for rendering
//! before their own terrain data has been loaded.
//!
//! # Background
//! A streaming terrain renderer refines its tile quadtree based on the position of the viewer,
//! long before the data of the newly selected tiles arrives.
//! Simply leaving those tiles out tears holes into the surface, while rendering their parents
//! instead stalls the refinement.
//!
//! Instead, every such tile receives a coarse fill mesh, whose boundary copies the vertices of
//! its rendered neighbours.
//! These neighbours may be loaded tiles or fill tiles themselves, at the same, a coarser or
//! a finer level of detail.
//! As soon as neighbouring data changes, the affected fill meshes are rebuilt, so that the
//! surface stays watertight.
//! See the [`fill`] module for more information.
//!
//! The [`TileTree`](terrain_data::TileTree) models the tile quadtree including the results
//! of the tile selection, while the [`TerrainFillPlugin`](plugin::TerrainFillPlugin) keeps
//! the fill meshes of all tile trees up to date each frame.

pub mod config;
pub mod debug;
pub mod fill;
pub mod math;
pub mod plugin;
pub mod terrain_data;
mod util;

pub mod prelude {
    //! `use bevy_terrain_fill::prelude::*;` to import common components and plugins.

    pub use crate::{
        config::FillConfig,
        debug::{DebugFill, TerrainFillDebugPlugin},
        fill::{fill_orphan_tiles, update_fill_tiles, Direction, FillState, FillUpdateReport},
        math::{TerrainShape, TileCoordinate, TilingScheme},
        plugin::{FillStatistics, TerrainFillPlugin},
        terrain_data::{HeightmapTerrainData, SelectionResult, TerrainMesh, TileId, TileTree},
    };
}
