//! Buffered requests and notifications around the pool.
//!
//! Producers (guns, spawners) only write intent; the allocator is the single writer
//! that pulls instances out of a pool. Gameplay hands instances back with
//! `ReturnToPool`, and everything that flips an instance on or off is announced with
//! `ActivationChanged` so effect code can follow without knowing why.

use bevy::prelude::*;

use crate::plugins::powerups::PowerUpKind;

#[derive(Message, Clone, Copy, Debug)]
pub struct LaunchRequest {
    pub pool: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

/// Launch one named member instead of the first free one. Formations use this so
/// every member lands in its own slot.
#[derive(Message, Clone, Copy, Debug)]
pub struct LaunchMember {
    pub entity: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnToPool {
    pub entity: Entity,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationChanged {
    pub entity: Entity,
    pub active: bool,
}

/// A charging projectile struck a `Chargeable` entity.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charged {
    pub target: Entity,
    pub amount: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    Impact,
    WarnFire,
    Fire,
    PrepareReEntry { secs: f32 },
    /// A power-up stopped at the player line and disappears after `secs`.
    PrepareExpire { secs: f32 },
    ReEnter,
    Die,
    ShieldStruck,
    PoweredUp { kind: PowerUpKind, secs: f32 },
}

/// Effect trigger for the audiovisual layer.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct FxCue {
    pub entity: Entity,
    pub cue: Cue,
}

impl FxCue {
    pub fn new(entity: Entity, cue: Cue) -> Self {
        Self { entity, cue }
    }
}
