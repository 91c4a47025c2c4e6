use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

/// Marks an entity as a pool member. Every pool member carries the full launchable
/// bundle (state, transform, velocity, visibility, layers, fade timer).
#[derive(Component, Debug, Clone, Copy)]
pub struct Launchable {
    /// Pool entity this instance was created for.
    pub pool: Entity,
}

/// Lifecycle of a pooled instance.
///
/// `Fading` is the window between an impact and the actual return: the instance is no
/// longer present (no collision, no motion, hidden) but its impact effect is still
/// playing, so it is neither active nor free.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchState {
    #[default]
    Inactive,
    Active,
    Fading,
}

impl LaunchState {
    /// Visible and colliding.
    #[inline]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Available to a launcher.
    #[inline]
    pub fn is_free(self) -> bool {
        self == Self::Inactive
    }
}

/// Collision layers the instance uses while active.
///
/// The inactive variant keeps the membership and clears the filters, so a parked
/// instance collides with nothing without any structural change.
#[derive(Component, Debug, Clone, Copy)]
pub struct LaunchLayers {
    pub membership: Layer,
    pub filters: LayerMask,
}

impl LaunchLayers {
    pub fn new(membership: Layer, filters: impl Into<LayerMask>) -> Self {
        Self {
            membership,
            filters: filters.into(),
        }
    }

    #[inline]
    pub fn active(&self) -> CollisionLayers {
        CollisionLayers::new(self.membership, self.filters)
    }

    #[inline]
    pub fn inactive(&self) -> CollisionLayers {
        CollisionLayers::new(self.membership, LayerMask::NONE)
    }
}

/// Delay between an impact and the return to the pool. Only ticked while `Fading`.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct ImpactFade(pub Timer);

impl ImpactFade {
    pub fn new(secs: f32) -> Self {
        Self(Timer::from_seconds(secs.max(0.0), TimerMode::Once))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Hurts anything with `Health`.
    Damaging,
    /// Charges anything `Chargeable`.
    Charging,
}

/// Payload carried by pooled bullets.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub strength: i32,
}

/// Damageable capability.
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
    /// Hits are absorbed without damage while set.
    pub invulnerable: bool,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self {
            hp: max,
            max,
            invulnerable: false,
        }
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }

    #[inline]
    pub fn restore(&mut self) {
        self.hp = self.max;
    }
}

/// Chargeable capability: charging projectiles only stop on entities with this marker.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Chargeable;

/// The playfield boundary sensor. Leaving it recycles launchables.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Boundary;
