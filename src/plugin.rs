use crate::{
    config::FillConfig,
    debug::DebugFill,
    fill::{fill_orphan_tiles, FillUpdateReport},
    terrain_data::TileTree,
};
use bevy::prelude::*;

/// The plugin that keeps the fill meshes of every [`TileTree`] up to date.
///
/// The tile selection has to mark the rendered tiles before the [`Last`] schedule,
/// in which the fill meshes are updated.
#[derive(Default)]
pub struct TerrainFillPlugin {
    pub config: FillConfig,
}

impl Plugin for TerrainFillPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<FillStatistics>()
            .add_systems(
                Last,
                (
                    update_terrain_fill,
                    log_fill_statistics.after(update_terrain_fill),
                ),
            );
    }
}

/// Counts the changes to the fill meshes of the last frame.
#[derive(Clone, Debug, Default, Resource)]
pub struct FillStatistics {
    pub created: usize,
    pub invalidated: usize,
    pub synthesized: usize,
    pub destroyed: usize,
    pub orphans: usize,
    /// The number of fill meshes synthesized since startup.
    pub total_synthesized: usize,
}

impl FillStatistics {
    pub fn record(&mut self, report: &FillUpdateReport) {
        self.created += report.created.len();
        self.invalidated += report.invalidated.len();
        self.synthesized += report.synthesized.len();
        self.destroyed += report.destroyed.len();
        self.total_synthesized += report.synthesized.len();
    }

    fn reset_frame(&mut self) {
        *self = Self {
            total_synthesized: self.total_synthesized,
            ..default()
        };
    }

    fn is_empty(&self) -> bool {
        self.created + self.invalidated + self.synthesized + self.destroyed + self.orphans == 0
    }
}

pub fn update_terrain_fill(
    config: Res<FillConfig>,
    debug: Option<Res<DebugFill>>,
    mut statistics: ResMut<FillStatistics>,
    mut tile_trees: Query<&mut TileTree>,
) {
    if !config.enabled || debug.is_some_and(|debug| debug.freeze) {
        return;
    }

    statistics.reset_frame();

    for mut tree in &mut tile_trees {
        let report = tree.update_fill_tiles();
        statistics.record(&report);

        if config.fill_orphans {
            statistics.orphans += fill_orphan_tiles(&mut tree).len();
        }
    }
}

pub fn log_fill_statistics(
    config: Res<FillConfig>,
    debug: Option<Res<DebugFill>>,
    statistics: Res<FillStatistics>,
) {
    let enabled = config.log_statistics || debug.is_some_and(|debug| debug.log_statistics);

    if !enabled || statistics.is_empty() {
        return;
    }

    info!(
        "Fill meshes: {} created, {} invalidated, {} synthesized, {} destroyed, {} orphans.",
        statistics.created,
        statistics.invalidated,
        statistics.synthesized,
        statistics.destroyed,
        statistics.orphans
    );
}
