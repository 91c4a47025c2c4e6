//! Physics plugin: Avian with no gravity, scaled to the playfield.
//!
//! Gameplay only reads `CollisionStart` / `CollisionEnd`; every body that matters is a
//! sensor or kinematic, so nothing is pushed around by contacts. Hit and boundary
//! resolution is ordered against Avian's collision events, so both live in
//! `FixedPostUpdate` at the same rate.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// Rate of the fixed schedules (physics, hit resolution, re-entry timers).
pub const FIXED_HZ: f64 = 64.0;

pub fn plugin(app: &mut App) {
    let ppm = app.world().resource::<Tunables>().pixels_per_meter;
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_HZ));
    app.add_plugins(PhysicsPlugins::new(FixedPostUpdate).with_length_unit(ppm));
    app.insert_resource(Gravity(Vec2::ZERO));
}
