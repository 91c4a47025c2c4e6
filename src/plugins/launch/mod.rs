//! Launch plugin: pooled launchables shared by guns, spawners and formations.
//!
//! # Data flow
//! ```text
//!   Update (variable dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producers  [LaunchSystems::Request]                                   │
//!│      - player guns, minion guns, spawners, formations                      │
//!│      - writes: LaunchRequest { pool, origin, direction, speed }            │
//!│                LaunchMember { entity, origin, direction, speed }           │
//!│                                                                            │
//!│  (B) Consumer: allocate_from_pools  [LaunchSystems::Allocate]              │
//!│      - first-fit scan of Pool.members for LaunchState::Inactive            │
//!│      - allocate_members: the named member, if it is free                   │
//!│      - mutates: LaunchState, Transform, LinearVelocity, Visibility,        │
//!│                 CollisionLayers                                            │
//!│      - writes: ActivationChanged { active: true }                          │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate (fixed dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (C) Physics emits CollisionStart / CollisionEnd (Avian)                   │
//!│                                                                            │
//!│  (D) [LaunchSystems::Resolve]                                              │
//!│      - process_projectile_hits: Active -> Fading, Health / Charged         │
//!│      - recycle_on_boundary_exit: Active -> Inactive                        │
//!│                                                                            │
//!│  (E) gameplay reacts (minion death, power-up pickup) -> ReturnToPool       │
//!│                                                                            │
//!│  (F) [LaunchSystems::Return]                                               │
//!│      - return_requested: busy -> Inactive                                  │
//!│      - finish_impact_fades: Fading -> Inactive once the fade runs out      │
//!│      - writes: ActivationChanged { active: false }                         │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pools never grow and members are never despawned while `InGame` is active.
//! When every member is busy a request is dropped; there is no queueing and no
//! reclaiming of members that never come back.

pub mod allocator;
pub mod boundary;
pub mod collision;
pub mod commit;
pub mod components;
pub mod launcher;
pub mod messages;
pub mod pool;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchSystems {
    /// Producers write `LaunchRequest`s.
    Request,
    /// The allocator applies them.
    Allocate,
    /// Hits and boundary exits.
    Resolve,
    /// Explicit returns and finished fades go back to the pool.
    Return,
}

pub struct LaunchPlugin;

impl Plugin for LaunchPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<messages::LaunchRequest>()
            .add_message::<messages::LaunchMember>()
            .add_message::<messages::ReturnToPool>()
            .add_message::<messages::ActivationChanged>()
            .add_message::<messages::Charged>()
            .add_message::<messages::FxCue>();

        app.configure_sets(
            Update,
            (LaunchSystems::Request, LaunchSystems::Allocate)
                .chain()
                .run_if(in_state(GameState::InGame)),
        );
        app.configure_sets(FixedPostUpdate, LaunchSystems::Resolve.after(CollisionEventSystems));
        app.configure_sets(FixedPostUpdate, LaunchSystems::Return.after(LaunchSystems::Resolve));

        app.add_systems(
            Update,
            (allocator::allocate_from_pools, allocator::allocate_members)
                .chain()
                .in_set(LaunchSystems::Allocate),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                collision::process_projectile_hits,
                boundary::recycle_on_boundary_exit,
            )
                .chain()
                .in_set(LaunchSystems::Resolve),
        )
        .add_systems(
            FixedPostUpdate,
            (commit::return_requested, commit::finish_impact_fades)
                .chain()
                .in_set(LaunchSystems::Return),
        );
    }
}
