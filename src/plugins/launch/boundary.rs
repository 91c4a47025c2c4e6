//! Boundary exit: anything launched that leaves the playfield sensor is parked at once.
//!
//! This runs in the same fixed step as hit resolution, so the instance has empty
//! collision filters before the next physics step looks for contacts.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::Boundary;
use super::launcher::{deactivate, LaunchableQuery};
use super::messages::ActivationChanged;

/// The entity that left the boundary, if exactly one side is the boundary.
pub fn exiting_entity(ev: &CollisionEnd, q_boundary: &Query<(), With<Boundary>>) -> Option<Entity> {
    let b1 = q_boundary.contains(ev.collider1);
    let b2 = q_boundary.contains(ev.collider2);
    match (b1, b2) {
        (true, false) => Some(ev.body2.unwrap_or(ev.collider2)),
        (false, true) => Some(ev.body1.unwrap_or(ev.collider1)),
        _ => None,
    }
}

pub fn recycle_on_boundary_exit(
    mut ended: MessageReader<CollisionEnd>,
    q_boundary: Query<(), With<Boundary>>,
    mut q: LaunchableQuery,
    mut changed: MessageWriter<ActivationChanged>,
) {
    for ev in ended.read() {
        let Some(entity) = exiting_entity(ev, &q_boundary) else {
            continue;
        };
        // Fading instances already collide with nothing; their fade returns them.
        let Ok((state, ..)) = q.get(entity) else {
            continue;
        };
        if !state.is_active() {
            continue;
        }

        if deactivate(&mut q, entity) {
            changed.write(ActivationChanged { entity, active: false });
        }
    }
}
