//! Return commit: the two ways back into a pool that are not boundary exits.
//!
//! - an explicit `ReturnToPool` from gameplay (collected power-up, dead spawned minion)
//! - a finished impact fade

use bevy::prelude::*;

use super::components::{ImpactFade, LaunchState, Launchable};
use super::launcher::{deactivate, LaunchableQuery};
use super::messages::{ActivationChanged, ReturnToPool};

pub fn return_requested(
    mut reader: MessageReader<ReturnToPool>,
    mut q: LaunchableQuery,
    mut changed: MessageWriter<ActivationChanged>,
) {
    for &ReturnToPool { entity } in reader.read() {
        if deactivate(&mut q, entity) {
            changed.write(ActivationChanged { entity, active: false });
        } else {
            debug!("return of {entity:?} ignored: not a busy pool member");
        }
    }
}

pub fn finish_impact_fades(
    time: Res<Time>,
    mut q_fade: Query<(Entity, &mut ImpactFade), With<Launchable>>,
    mut q: LaunchableQuery,
    mut changed: MessageWriter<ActivationChanged>,
) {
    for (entity, mut fade) in &mut q_fade {
        let Ok((state, ..)) = q.get(entity) else {
            continue;
        };
        if *state != LaunchState::Fading {
            continue;
        }
        if !fade.tick(time.delta()).is_finished() {
            continue;
        }

        if deactivate(&mut q, entity) {
            changed.write(ActivationChanged { entity, active: false });
        }
    }
}
