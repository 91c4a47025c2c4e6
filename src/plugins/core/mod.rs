//! Core plugin: shared resources and global settings.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;

/// Resources inserted beforehand (tests, tools) win over the defaults.
pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();
    app.init_resource::<GameRng>();
    app.insert_resource(ClearColor(Color::srgb(0.03, 0.03, 0.06)));
}
