//! Pool allocator: pre-spawn inactive copies of a prefab.
//!
//! A pool lives on its own entity so owners can hold several pools and swap the one
//! their launcher uses. Members are created once, parked, and only ever toggled after
//! that; they go away with the `InGame` state.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use thiserror::Error;

use crate::common::state::GameState;
use crate::plugins::minions::{Minion, MinionKind};
use crate::plugins::powerups::{PowerUp, PowerUpKind};

use super::components::{Chargeable, Health, ImpactFade, LaunchLayers, LaunchState, Launchable, Projectile};

/// Fixed, ordered set of pooled instances. Never grows after creation.
#[derive(Component, Debug, Default, Clone)]
pub struct Pool {
    members: Vec<Entity>,
}

impl Pool {
    /// Wrap instances that already carry the launchable bundle.
    pub fn from_members(members: Vec<Entity>) -> Self {
        Self { members }
    }

    #[inline]
    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("pool of `{prefab}` requested with zero instances")]
    ZeroCount { prefab: &'static str },
    #[error("prefab `{prefab}` has an invalid collider radius ({radius})")]
    InvalidRadius { prefab: &'static str, radius: f32 },
    #[error("prefab `{prefab}` would collide with nothing while active")]
    NoFilters { prefab: &'static str },
    #[error("no prefabs to pool")]
    NoPrefabs,
}

/// Owner-specific data stamped onto every instance of a prefab.
#[derive(Debug, Clone, Copy)]
pub enum Payload {
    Projectile(Projectile),
    PowerUp(PowerUpKind),
    Minion { max_health: i32, ramming_strength: i32 },
}

/// Recipe for pooled instances.
#[derive(Debug, Clone, Copy)]
pub struct Prefab {
    pub name: &'static str,
    pub radius: f32,
    pub layers: LaunchLayers,
    /// Seconds an impact keeps the instance out of the pool.
    pub fade_secs: f32,
    pub payload: Payload,
}

impl Prefab {
    pub fn validate(&self) -> Result<(), PoolError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(PoolError::InvalidRadius {
                prefab: self.name,
                radius: self.radius,
            });
        }
        if self.layers.filters == LayerMask::NONE {
            return Err(PoolError::NoFilters { prefab: self.name });
        }
        Ok(())
    }
}

/// Spawn `count` parked instances of `prefab` owned by `pool_entity`.
///
/// Configuration problems are logged and yield an empty pool; callers launching from
/// it simply get nothing.
pub fn instantiate(commands: &mut Commands, pool_entity: Entity, prefab: &Prefab, count: usize) -> Pool {
    if let Err(e) = check(prefab, count) {
        warn!("{e}; using an empty pool");
        return Pool::default();
    }

    let members = (0..count)
        .map(|_| spawn_instance(commands, pool_entity, prefab))
        .collect();

    Pool { members }
}

/// Spawn a pool entity holding `count` instances of `prefab`.
pub fn spawn_pool(commands: &mut Commands, prefab: &Prefab, count: usize) -> Entity {
    let pool_entity = commands
        .spawn((
            Name::new(format!("Pool({})", prefab.name)),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    let pool = instantiate(commands, pool_entity, prefab, count);
    commands.entity(pool_entity).insert(pool);
    pool_entity
}

fn check(prefab: &Prefab, count: usize) -> Result<(), PoolError> {
    if count == 0 {
        return Err(PoolError::ZeroCount { prefab: prefab.name });
    }
    prefab.validate()
}

fn spawn_instance(commands: &mut Commands, pool_entity: Entity, prefab: &Prefab) -> Entity {
    let mut instance = commands.spawn((
        Name::new(format!("{}(Pooled)", prefab.name)),
        Launchable { pool: pool_entity },
        LaunchState::Inactive,
        ImpactFade::new(prefab.fade_secs),
        prefab.layers,
        prefab.layers.inactive(),
        Transform::from_xyz(0.0, 0.0, 2.0),
        Visibility::Hidden,
        RigidBody::Dynamic,
        Collider::circle(prefab.radius),
        Sensor,
        LinearVelocity(Vec2::ZERO),
        // Kept on permanently; parked instances have empty filters and never collide.
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));

    match prefab.payload {
        Payload::Projectile(projectile) => {
            instance.insert(projectile);
        }
        Payload::PowerUp(kind) => {
            instance.insert((PowerUp::new(kind), Chargeable, Health::full(1)));
        }
        Payload::Minion {
            max_health,
            ramming_strength,
        } => {
            instance.insert((
                Minion::new(MinionKind::Spawned, ramming_strength, 0.0),
                Chargeable,
                Health::full(max_health),
            ));
        }
    }

    instance.id()
}
