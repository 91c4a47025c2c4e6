//! Launcher: first-fit activation out of a pool, plus the shared on/off contract.
//!
//! Every write that flips a pooled instance goes through `activate_at`, `withdraw`
//! or `deactivate` so the "active iff present" invariant has exactly one owner:
//! - active   => visible, moving, colliding (active layers)
//! - fading   => hidden, still, collides with nothing, not yet free
//! - inactive => hidden, still, collides with nothing, free

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{LaunchLayers, LaunchState, Launchable};
use super::messages::LaunchRequest;
use super::pool::Pool;

/// Everything the launcher touches on a pooled instance.
pub type LaunchableQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut LaunchState,
        &'static mut Transform,
        &'static mut LinearVelocity,
        &'static mut Visibility,
        &'static mut CollisionLayers,
        &'static LaunchLayers,
    ),
    With<Launchable>,
>;

/// Per-owner launch defaults and the pool they draw from.
#[derive(Component, Debug, Clone)]
pub struct Launcher {
    pool: Option<Entity>,
    /// Offset from the owner's position.
    pub local_origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

impl Launcher {
    pub fn new(local_origin: Vec2, direction: Vec2, speed: f32) -> Self {
        Self {
            pool: None,
            local_origin,
            direction,
            speed,
        }
    }

    pub fn with_pool(mut self, pool: Entity) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Point the launcher at a different pool. The old pool is left untouched.
    pub fn assign_pool(&mut self, pool: Entity) {
        self.pool = Some(pool);
    }

    #[inline]
    pub fn pool(&self) -> Option<Entity> {
        self.pool
    }

    /// Request from the default pool with the default origin, direction and speed.
    pub fn request(&self, anchor: Vec2) -> Option<LaunchRequest> {
        self.pool
            .map(|pool| self.request_from(pool, anchor + self.local_origin, self.direction, self.speed))
    }

    pub fn request_from(&self, pool: Entity, origin: Vec2, direction: Vec2, speed: f32) -> LaunchRequest {
        LaunchRequest {
            pool,
            origin,
            direction,
            speed,
        }
    }
}

/// First free member in list order.
pub fn first_free(pool: &Pool, q: &LaunchableQuery) -> Option<Entity> {
    pool.members().iter().copied().find(|&e| match q.get(e) {
        Ok((state, ..)) => state.is_free(),
        Err(_) => {
            warn!("pool member {e:?} is missing its launchable components");
            false
        }
    })
}

/// Launch the first free member of `pool`.
///
/// Returns `None` and touches nothing when every member is busy.
pub fn launch(
    pool: &Pool,
    q: &mut LaunchableQuery,
    origin: Vec2,
    direction: Vec2,
    speed: f32,
) -> Option<Entity> {
    let entity = first_free(pool, q)?;
    activate_at(q, entity, origin, direction, speed).then_some(entity)
}

/// Launch one specific member. Refuses anything that is not free.
pub fn launch_single(
    q: &mut LaunchableQuery,
    entity: Entity,
    origin: Vec2,
    direction: Vec2,
    speed: f32,
) -> bool {
    activate_at(q, entity, origin, direction, speed)
}

fn activate_at(
    q: &mut LaunchableQuery,
    entity: Entity,
    origin: Vec2,
    direction: Vec2,
    speed: f32,
) -> bool {
    let Ok((mut state, mut tf, mut vel, mut vis, mut layers, profile)) = q.get_mut(entity) else {
        return false;
    };
    if !state.is_free() {
        return false;
    }

    *state = LaunchState::Active;
    tf.translation = origin.extend(tf.translation.z);
    vel.0 = direction.normalize_or_zero() * speed;
    *vis = Visibility::Visible;
    *layers = profile.active();
    true
}

/// Take an active instance out of play without freeing it (impact window).
pub fn withdraw(q: &mut LaunchableQuery, entity: Entity) -> bool {
    let Ok((mut state, _, mut vel, mut vis, mut layers, profile)) = q.get_mut(entity) else {
        return false;
    };
    if !state.is_active() {
        return false;
    }

    *state = LaunchState::Fading;
    vel.0 = Vec2::ZERO;
    *vis = Visibility::Hidden;
    *layers = profile.inactive();
    true
}

/// `activate(false)`: park the instance and make it free again.
///
/// Returns `false` for instances that were already free.
pub fn deactivate(q: &mut LaunchableQuery, entity: Entity) -> bool {
    let Ok((mut state, _, mut vel, mut vis, mut layers, profile)) = q.get_mut(entity) else {
        return false;
    };
    if state.is_free() {
        return false;
    }

    *state = LaunchState::Inactive;
    vel.0 = Vec2::ZERO;
    *vis = Visibility::Hidden;
    *layers = profile.inactive();
    true
}
