//! Contains a debug resource and systems controlling it to inspect the fill meshes at runtime.

use bevy::prelude::*;

/// Adds the fill debug config and its keyboard controls.
pub struct TerrainFillDebugPlugin;

impl Plugin for TerrainFillDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugFill>()
            .add_systems(Update, toggle_debug);
    }
}

#[derive(Clone, Debug, Default, Resource)]
pub struct DebugFill {
    /// Stops updating the fill meshes, so that the current state can be inspected.
    pub freeze: bool,
    /// Logs the changes to the fill meshes every frame.
    pub log_statistics: bool,
}

pub fn toggle_debug(input: Res<ButtonInput<KeyCode>>, mut debug: ResMut<DebugFill>) {
    if input.just_pressed(KeyCode::KeyF) {
        debug.freeze = !debug.freeze;
        println!(
            "{} the fill meshes.",
            if debug.freeze { "Froze" } else { "Unfroze" }
        )
    }
    if input.just_pressed(KeyCode::KeyI) {
        debug.log_statistics = !debug.log_statistics;
        println!(
            "Toggled the fill statistics {}.",
            if debug.log_statistics { "on" } else { "off" }
        )
    }
}
