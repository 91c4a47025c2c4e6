//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the ECS runtime and time.
//! - `configure_headless` installs states + gameplay plugins.
//! - time advances by exactly one fixed step per `update`, so every frame runs the
//!   fixed schedules once and tests are deterministic.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy_shmup::common::rng::GameRng;
use bevy_shmup::plugins::physics::FIXED_HZ;

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin: Avian's collider constructors expect a SceneSpawner.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / FIXED_HZ)));
    app.insert_resource(GameRng::seeded(42));

    bevy_shmup::game::configure_headless(&mut app);
    // `App::run` would call these; tests drive `update` directly.
    app.finish();
    app.cleanup();
    app
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
