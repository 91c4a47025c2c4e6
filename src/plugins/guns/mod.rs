//! Guns: per-owner launch settings that turn triggers and timers into `LaunchRequest`s.
//!
//! - `PlayerGun`: held trigger + cooldown, strength and fire-rate multipliers.
//! - `MinionGun`: a warn-then-fire routine that only runs while its minion is up.
//!
//! Neither touches a pool directly; the launch allocator does that.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::routine::{FireInterval, RoutineStep, WarnThenFire};
use crate::plugins::launch::components::{Projectile, ProjectileKind};
use crate::plugins::launch::launcher::Launcher;
use crate::plugins::launch::messages::{Cue, FxCue, LaunchRequest};
use crate::plugins::launch::pool::Pool;
use crate::plugins::launch::LaunchSystems;
use crate::plugins::minions::Minion;
use crate::plugins::player::Player;

/// Which triggers are held this frame. Written by whatever reads the input devices.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GunTriggers {
    pub red: bool,
    pub green: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerGun {
    pub kind: ProjectileKind,
    /// Pool this gun fires from. Each gun owns one.
    pub pool: Entity,
    pub bullet_speed: f32,
    pub base_interval: f32,
    pub fire_rate_multiplier: f32,
    pub base_strength: i32,
    pub strength_multiplier: i32,
    interval: f32,
    ready_at: f32,
}

impl PlayerGun {
    pub fn new(kind: ProjectileKind, pool: Entity, bullet_speed: f32, base_interval: f32, base_strength: i32) -> Self {
        Self {
            kind,
            pool,
            bullet_speed,
            base_interval,
            fire_rate_multiplier: 1.0,
            base_strength,
            strength_multiplier: 1,
            interval: base_interval,
            ready_at: 0.0,
        }
    }

    pub fn with_multipliers(mut self, fire_rate: f32, strength: i32) -> Self {
        self.fire_rate_multiplier = fire_rate;
        self.strength_multiplier = strength;
        self
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    #[inline]
    pub fn is_ready(&self, now: f32) -> bool {
        self.ready_at < now
    }

    /// Current per-bullet strength for the given power state.
    pub fn strength(&self, powered: bool) -> i32 {
        if powered {
            self.base_strength * self.strength_multiplier
        } else {
            self.base_strength
        }
    }

    /// Stamp the strength onto every bullet in this gun's pool, in flight or parked.
    pub fn assign_power(&self, powered: bool, pools: &Query<&Pool>, projectiles: &mut Query<&mut Projectile>) {
        let Ok(pool) = pools.get(self.pool) else {
            warn!("player gun pool {:?} is missing", self.pool);
            return;
        };
        let strength = self.strength(powered);
        for &e in pool.members() {
            if let Ok(mut p) = projectiles.get_mut(e) {
                p.strength = strength;
            }
        }
    }

    pub fn assign_fire_rate(&mut self, powered: bool) {
        let multiplier = if powered { self.fire_rate_multiplier } else { 1.0 };
        self.interval = self.base_interval * multiplier;
    }

    /// Build the request and start the cooldown.
    pub fn fire(&mut self, launcher: &Launcher, anchor: Vec2, now: f32) -> LaunchRequest {
        self.ready_at = now + self.interval;
        launcher.request_from(self.pool, anchor + launcher.local_origin, launcher.direction, self.bullet_speed)
    }
}

/// The player's two guns. Both share the player's `Launcher`.
#[derive(Component, Debug, Clone)]
pub struct PlayerGuns {
    pub red: PlayerGun,
    pub green: PlayerGun,
}

impl PlayerGuns {
    pub fn assign_power(&self, powered: bool, pools: &Query<&Pool>, projectiles: &mut Query<&mut Projectile>) {
        self.red.assign_power(powered, pools, projectiles);
        self.green.assign_power(powered, pools, projectiles);
    }

    pub fn assign_fire_rate(&mut self, powered: bool) {
        self.red.assign_fire_rate(powered);
        self.green.assign_fire_rate(powered);
    }
}

#[derive(Component, Debug, Clone)]
pub struct MinionGun {
    pub routine: WarnThenFire,
}

impl MinionGun {
    pub fn new(interval: FireInterval, warning_secs: f32) -> Self {
        Self {
            routine: WarnThenFire::new(interval, warning_secs),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<GunTriggers>().add_systems(
        Update,
        (fire_player_guns, fire_minion_guns).in_set(LaunchSystems::Request),
    );
}

/// Holding both triggers fires nothing.
pub fn fire_player_guns(
    time: Res<Time>,
    triggers: Res<GunTriggers>,
    mut q_player: Query<(Entity, &Player, &Transform, &Launcher, &mut PlayerGuns)>,
    mut requests: MessageWriter<LaunchRequest>,
    mut fx: MessageWriter<FxCue>,
) {
    let Ok((e, player, tf, launcher, mut guns)) = q_player.single_mut() else {
        return;
    };
    if !player.is_alive() {
        return;
    }

    let now = time.elapsed_secs();
    let anchor = tf.translation.truncate();

    let gun = if triggers.red && !triggers.green && guns.red.is_ready(now) {
        &mut guns.red
    } else if triggers.green && !triggers.red && guns.green.is_ready(now) {
        &mut guns.green
    } else {
        return;
    };

    requests.write(gun.fire(launcher, anchor, now));
    fx.write(FxCue::new(e, Cue::Fire));
}

/// Minion guns run their routine only while the minion is up; taking a minion down
/// cancels the pending shot and bringing it back starts a fresh wait.
pub fn fire_minion_guns(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut q: Query<(Entity, &Minion, &Transform, &Launcher, &mut MinionGun)>,
    mut requests: MessageWriter<LaunchRequest>,
    mut fx: MessageWriter<FxCue>,
) {
    for (e, minion, tf, launcher, mut gun) in &mut q {
        if !minion.is_active() {
            gun.routine.stop();
            continue;
        }
        if !gun.routine.is_running() {
            gun.routine.restart(&mut rng);
        }

        match gun.routine.tick(time.delta(), &mut rng) {
            RoutineStep::Idle => {}
            RoutineStep::Warn => {
                fx.write(FxCue::new(e, Cue::WarnFire));
            }
            RoutineStep::Fire => {
                let Some(req) = launcher.request(tf.translation.truncate()) else {
                    warn!("minion {e:?} has a gun but its launcher has no pool");
                    continue;
                };
                requests.write(req);
                fx.write(FxCue::new(e, Cue::Fire));
            }
        }
    }
}
