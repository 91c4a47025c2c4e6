//! Game composition root.
//!
//! - `configure_full`: DefaultPlugins (window/render) + gameplay.
//! - `configure_headless`: gameplay only, for integration tests.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::plugins;

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

pub fn configure_full(app: &mut App) {
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Shmup".into(),
            resolution: WindowResolution::new(960, 1280),
            ..default()
        }),
        ..default()
    }));
    app.add_systems(Startup, spawn_camera);

    configure_game(app);
}

/// Do NOT add DefaultPlugins here; the caller brings `MinimalPlugins` + `StatesPlugin`.
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}
