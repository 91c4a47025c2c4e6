//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::launch::LaunchPlugin;

pub mod core;
pub mod formations;
pub mod guns;
pub mod launch;
pub mod minions;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod spawner;
pub mod world;

/// Register gameplay plugins. All of them work in headless apps.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    app.add_plugins(LaunchPlugin);
    world::plugin(app);
    player::plugin(app);
    guns::plugin(app);
    minions::plugin(app);
    formations::plugin(app);
    powerups::plugin(app);
    spawner::plugin(app);
}
