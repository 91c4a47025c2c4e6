//! Launch consumer: the single writer that pulls instances out of pools.
//!
//! An exhausted pool drops the request. That is a capacity decision, not a failure,
//! so it is only visible at debug level.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::launcher::{launch, launch_single, LaunchableQuery};
use super::messages::{ActivationChanged, LaunchMember, LaunchRequest};
use super::pool::Pool;

pub fn allocate_from_pools(
    mut reader: MessageReader<LaunchRequest>,
    q_pools: Query<&Pool>,
    mut q: LaunchableQuery,
    mut changed: MessageWriter<ActivationChanged>,
) {
    for req in reader.read() {
        let Ok(pool) = q_pools.get(req.pool) else {
            warn!("launch request names {:?}, which has no Pool", req.pool);
            continue;
        };

        if let Some(entity) = launch(pool, &mut q, req.origin, req.direction, req.speed) {
            changed.write(ActivationChanged { entity, active: true });
        } else {
            debug!("pool {:?} exhausted ({} members busy); launch dropped", req.pool, pool.capacity());
        }
    }
}

pub fn allocate_members(
    mut reader: MessageReader<LaunchMember>,
    mut q: LaunchableQuery,
    mut changed: MessageWriter<ActivationChanged>,
) {
    for req in reader.read() {
        if launch_single(&mut q, req.entity, req.origin, req.direction, req.speed) {
            changed.write(ActivationChanged {
                entity: req.entity,
                active: true,
            });
        } else {
            debug!("member {:?} is busy or not pooled; launch dropped", req.entity);
        }
    }
}
