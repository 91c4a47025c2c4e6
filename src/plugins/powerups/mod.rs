//! Power-ups: pooled pickups that are collected by charging them and destroyed by
//! shooting them.
//!
//! One that drifts into the player's region stops at the player line, warns with
//! `Cue::PrepareExpire` and goes back to its pool once the warning runs out. Any
//! activation change cancels a pending expiry.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::launch::components::{Health, LaunchState};
use crate::plugins::launch::messages::{ActivationChanged, Charged, Cue, FxCue, ReturnToPool};
use crate::plugins::launch::LaunchSystems;
use crate::plugins::player::apply_power_ups;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Multiplies bullet strength.
    Power,
    /// Shortens the cooldown of both guns.
    FireRate,
    /// Hits are absorbed.
    Shield,
    /// Wipes every minion in play. Not timed.
    Bomb,
}

#[derive(Component, Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    expiry: Option<Timer>,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind) -> Self {
        Self { kind, expiry: None }
    }

    pub fn start_expiry(&mut self, secs: f32) {
        self.expiry = Some(Timer::from_seconds(secs.max(0.0), TimerMode::Once));
    }

    pub fn cancel_expiry(&mut self) {
        self.expiry = None;
    }

    #[inline]
    pub fn is_expiring(&self) -> bool {
        self.expiry.is_some()
    }

    /// `true` once, when the pending expiry runs out.
    fn tick_expiry(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.expiry.as_mut() else {
            return false;
        };
        if !timer.tick(delta).is_finished() {
            return false;
        }
        self.expiry = None;
        true
    }
}

/// Sensor over the player's region. Power-ups stop when they enter it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerLine;

/// A power-up was charged up and should take effect on the player.
#[derive(Message, Debug, Clone, Copy)]
pub struct PowerUpCollected {
    pub kind: PowerUpKind,
}

pub fn plugin(app: &mut App) {
    app.add_message::<PowerUpCollected>().add_systems(
        FixedPostUpdate,
        (
            reset_expiry_on_activation,
            collect_charged,
            destroy_shot,
            reach_player_line,
            expire_power_ups,
        )
            .chain()
            .after(LaunchSystems::Resolve)
            .before(apply_power_ups)
            .before(LaunchSystems::Return),
    );
}

/// Launches and returns both start a power-up over without a pending expiry.
pub fn reset_expiry_on_activation(
    mut changes: MessageReader<ActivationChanged>,
    mut q: Query<&mut PowerUp>,
) {
    for change in changes.read() {
        if let Ok(mut power_up) = q.get_mut(change.entity) {
            power_up.cancel_expiry();
        }
    }
}

/// Charging a power-up collects it, once, and sends it back to its pool.
///
/// Health is refilled here too, so a shot landing in the same step does not also
/// destroy it.
pub fn collect_charged(
    mut charged: MessageReader<Charged>,
    mut q: Query<(&mut PowerUp, &mut Health, &LaunchState)>,
    mut collected: MessageWriter<PowerUpCollected>,
    mut returns: MessageWriter<ReturnToPool>,
) {
    let mut taken = Vec::new();
    for ev in charged.read() {
        let Ok((mut power_up, mut health, state)) = q.get_mut(ev.target) else {
            continue;
        };
        if !state.is_active() || taken.contains(&ev.target) {
            continue;
        }
        taken.push(ev.target);

        power_up.cancel_expiry();
        health.restore();
        debug!("collected {:?} power-up {:?}", power_up.kind, ev.target);
        collected.write(PowerUpCollected { kind: power_up.kind });
        returns.write(ReturnToPool { entity: ev.target });
    }
}

/// Damaging a power-up destroys it. Health is refilled for its next launch.
pub fn destroy_shot(
    mut q: Query<(Entity, &mut PowerUp, &mut Health, &LaunchState)>,
    mut returns: MessageWriter<ReturnToPool>,
    mut fx: MessageWriter<FxCue>,
) {
    for (e, mut power_up, mut health, state) in &mut q {
        if !state.is_active() || !health.is_depleted() {
            continue;
        }
        power_up.cancel_expiry();
        health.restore();
        fx.write(FxCue::new(e, Cue::Die));
        returns.write(ReturnToPool { entity: e });
    }
}

pub fn reach_player_line(
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    q_line: Query<(), With<PlayerLine>>,
    mut q: Query<(&mut PowerUp, &LaunchState, &mut LinearVelocity)>,
    mut fx: MessageWriter<FxCue>,
) {
    for ev in started.read() {
        let e = match (q_line.contains(ev.collider1), q_line.contains(ev.collider2)) {
            (true, false) => ev.body2.unwrap_or(ev.collider2),
            (false, true) => ev.body1.unwrap_or(ev.collider1),
            _ => continue,
        };
        let Ok((mut power_up, state, mut vel)) = q.get_mut(e) else {
            continue;
        };
        if !state.is_active() || power_up.is_expiring() {
            continue;
        }

        vel.0 = Vec2::ZERO;
        power_up.start_expiry(tunables.power_up_expiry_secs);
        fx.write(FxCue::new(
            e,
            Cue::PrepareExpire {
                secs: tunables.power_up_expiry_secs,
            },
        ));
    }
}

pub fn expire_power_ups(
    time: Res<Time>,
    mut q: Query<(Entity, &mut PowerUp, &LaunchState)>,
    mut returns: MessageWriter<ReturnToPool>,
    mut fx: MessageWriter<FxCue>,
) {
    for (e, mut power_up, state) in &mut q {
        if !state.is_active() {
            power_up.cancel_expiry();
            continue;
        }
        if power_up.tick_expiry(time.delta()) {
            debug!("{:?} power-up {e:?} expired at the player line", power_up.kind);
            fx.write(FxCue::new(e, Cue::Die));
            returns.write(ReturnToPool { entity: e });
        }
    }
}

#[cfg(test)]
mod tests;
