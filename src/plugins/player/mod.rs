//! Player plugin.
//!
//! Pipeline:
//! - Update: sample keyboard into `PlayerInput` + `GunTriggers`
//! - FixedUpdate: clamp the input against the steering limits, set velocity
//! - FixedPostUpdate: apply collected power-ups (before minions die, so a bomb lands in
//!   the same step), run the revert timer, detect death (after ramming)
//!
//! Headless apps have no `ButtonInput`; tests write `PlayerInput` / `GunTriggers`
//! directly.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::guns::{GunTriggers, PlayerGuns};
use crate::plugins::launch::components::{Health, LaunchLayers, Projectile};
use crate::plugins::launch::messages::{Cue, FxCue};
use crate::plugins::launch::pool::Pool;
use crate::plugins::launch::LaunchSystems;
use crate::plugins::minions::{kill_minions, ram_player, WipeMinions};
use crate::plugins::powerups::{PowerUpCollected, PowerUpKind};

#[derive(Component, Debug, Clone)]
pub struct Player {
    alive: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self { alive: true }
    }
}

impl Player {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Requested movement, each axis in `[-1, 1]`.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerInput {
    pub move_axis: Vec2,
}

/// Pending revert of timed power-ups. A new pickup replaces it.
#[derive(Component, Debug, Clone, Default)]
pub struct PowerDown(Option<Timer>);

impl PowerDown {
    pub fn reset(&mut self, secs: f32) {
        self.0 = Some(Timer::from_seconds(secs.max(0.0), TimerMode::Once));
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(FixedUpdate, apply_movement.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedPostUpdate,
            (
                apply_power_ups.before(kill_minions),
                revert_power_ups,
                detect_death.after(ram_player),
            )
                .chain()
                .after(LaunchSystems::Resolve)
                .before(LaunchSystems::Return),
        );
}

fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut input: ResMut<PlayerInput>,
    mut triggers: ResMut<GunTriggers>,
) {
    let Some(keys) = keys else {
        return;
    };

    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }
    input.move_axis = axis;

    triggers.red = keys.pressed(KeyCode::KeyJ);
    triggers.green = keys.pressed(KeyCode::KeyK);
}

/// Zero any axis that would push the player past its limits.
pub fn clamp_axis(axis: Vec2, position: Vec2, limits: Rect) -> Vec2 {
    let mut axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    if (axis.x < 0.0 && position.x <= limits.min.x) || (axis.x > 0.0 && position.x >= limits.max.x) {
        axis.x = 0.0;
    }
    if (axis.y < 0.0 && position.y <= limits.min.y) || (axis.y > 0.0 && position.y >= limits.max.y) {
        axis.y = 0.0;
    }
    axis
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&Player, &Transform, &mut LinearVelocity)>,
) {
    let Ok((player, tf, mut vel)) = q_player.single_mut() else {
        return;
    };
    if !player.is_alive() {
        vel.0 = Vec2::ZERO;
        return;
    }

    let axis = clamp_axis(input.move_axis, tf.translation.truncate(), tunables.player_limits);
    vel.0 = axis * tunables.player_speed;
}

/// Timed kinds (re)start the revert timer; a bomb leaves it alone.
pub fn apply_power_ups(
    tunables: Res<Tunables>,
    mut collected: MessageReader<PowerUpCollected>,
    mut q_player: Query<(Entity, &Player, &mut PlayerGuns, &mut Health, &mut PowerDown)>,
    pools: Query<&Pool>,
    mut projectiles: Query<&mut Projectile>,
    mut wipe: MessageWriter<WipeMinions>,
    mut fx: MessageWriter<FxCue>,
) {
    for ev in collected.read() {
        let Ok((e, player, mut guns, mut health, mut power_down)) = q_player.single_mut() else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }

        let secs = match ev.kind {
            PowerUpKind::Power => {
                guns.assign_power(true, &pools, &mut projectiles);
                tunables.power_up_secs
            }
            PowerUpKind::FireRate => {
                guns.assign_fire_rate(true);
                tunables.power_up_secs
            }
            PowerUpKind::Shield => {
                health.invulnerable = true;
                tunables.power_up_secs
            }
            PowerUpKind::Bomb => {
                // Not timed: a pending revert keeps running rather than being dropped.
                wipe.write(WipeMinions);
                0.0
            }
        };
        if ev.kind != PowerUpKind::Bomb {
            power_down.reset(secs);
        }

        info!("player powered up: {:?}", ev.kind);
        fx.write(FxCue::new(e, Cue::PoweredUp { kind: ev.kind, secs }));
    }
}

/// Everything timed goes back to normal together.
pub fn revert_power_ups(
    time: Res<Time>,
    mut q_player: Query<(&mut PlayerGuns, &mut Health, &mut PowerDown)>,
    pools: Query<&Pool>,
    mut projectiles: Query<&mut Projectile>,
) {
    let Ok((mut guns, mut health, mut power_down)) = q_player.single_mut() else {
        return;
    };
    let Some(timer) = power_down.0.as_mut() else {
        return;
    };
    if !timer.tick(time.delta()).is_finished() {
        return;
    }

    power_down.0 = None;
    guns.assign_power(false, &pools, &mut projectiles);
    guns.assign_fire_rate(false);
    health.invulnerable = false;
    debug!("player power-ups expired");
}

/// Out of health: stop colliding, stop moving, game over.
pub fn detect_death(
    mut q_player: Query<(
        Entity,
        &mut Player,
        &Health,
        &mut CollisionLayers,
        &LaunchLayers,
        &mut LinearVelocity,
    )>,
    mut next: ResMut<NextState<GameState>>,
    mut fx: MessageWriter<FxCue>,
) {
    let Ok((e, mut player, health, mut layers, profile, mut vel)) = q_player.single_mut() else {
        return;
    };
    if !player.alive || !health.is_depleted() {
        return;
    }

    player.alive = false;
    *layers = profile.inactive();
    vel.0 = Vec2::ZERO;
    fx.write(FxCue::new(e, Cue::Die));
    next.set(GameState::GameOver);
    info!("player died");
}
