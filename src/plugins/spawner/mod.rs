//! Spawner: a launcher fed by several pools, firing on a warn-then-fire routine from a
//! random point on a line.
//!
//! Each shot picks one pool uniformly at random. The origin is picked when the warning
//! starts so the warning cue and the launch agree on where the instance appears. A
//! spawner that is also a `Minion` only runs while that minion is up.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::routine::{FireInterval, RoutineStep, WarnThenFire};
use crate::plugins::launch::launcher::Launcher;
use crate::plugins::launch::messages::{Cue, FxCue, LaunchRequest};
use crate::plugins::launch::pool::{spawn_pool, PoolError, Prefab};
use crate::plugins::launch::LaunchSystems;
use crate::plugins::minions::Minion;

#[derive(Component, Debug, Clone)]
pub struct Spawner {
    pools: Vec<Entity>,
    /// Ends of the spawn line, relative to the spawner.
    pub origin_a: Vec2,
    pub origin_b: Vec2,
    /// Skip the first random wait and go straight to the warning.
    pub launch_at_first: bool,
    routine: WarnThenFire,
    started: bool,
    pending_origin: Option<Vec2>,
}

impl Spawner {
    pub fn new(pools: Vec<Entity>, origin_a: Vec2, origin_b: Vec2, interval: FireInterval, warning_secs: f32) -> Self {
        Self {
            pools,
            origin_a,
            origin_b,
            launch_at_first: false,
            routine: WarnThenFire::new(interval, warning_secs),
            started: false,
            pending_origin: None,
        }
    }

    pub fn launching_at_first(mut self) -> Self {
        self.launch_at_first = true;
        self
    }

    #[inline]
    pub fn pools(&self) -> &[Entity] {
        &self.pools
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.routine.is_running()
    }

    /// Point on the spawn line, `t` in `[0, 1]`.
    pub fn origin_at(&self, t: f32) -> Vec2 {
        self.origin_a.lerp(self.origin_b, t.clamp(0.0, 1.0))
    }

    fn start(&mut self, rng: &mut GameRng) {
        self.started = true;
        if self.launch_at_first {
            self.pending_origin = Some(self.origin_at(rng.unit()));
            self.routine.restart_warned();
        } else {
            self.pending_origin = None;
            self.routine.restart(rng);
        }
    }

    fn stop(&mut self) {
        self.started = false;
        self.pending_origin = None;
        self.routine.stop();
    }
}

/// Spawn one pool per prefab, `instances_per_prefab` instances each.
pub fn spawn_pools(commands: &mut Commands, prefabs: &[Prefab], instances_per_prefab: usize) -> Vec<Entity> {
    if prefabs.is_empty() {
        warn!("{}", PoolError::NoPrefabs);
        return Vec::new();
    }
    prefabs
        .iter()
        .map(|prefab| spawn_pool(commands, prefab, instances_per_prefab))
        .collect()
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, run_spawners.in_set(LaunchSystems::Request));
}

pub fn run_spawners(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut q: Query<(Entity, &mut Spawner, &Launcher, &Transform, Option<&Minion>)>,
    mut requests: MessageWriter<LaunchRequest>,
    mut fx: MessageWriter<FxCue>,
) {
    for (e, mut spawner, launcher, tf, minion) in &mut q {
        if minion.is_some_and(|m| !m.is_active()) {
            if spawner.started {
                spawner.stop();
            }
            continue;
        }
        if !spawner.started {
            spawner.start(&mut rng);
        }

        match spawner.routine.tick(time.delta(), &mut rng) {
            RoutineStep::Idle => {}
            RoutineStep::Warn => {
                let origin = spawner.origin_at(rng.unit());
                spawner.pending_origin = Some(origin);
                fx.write(FxCue::new(e, Cue::WarnFire));
            }
            RoutineStep::Fire => {
                let origin = match spawner.pending_origin.take() {
                    Some(origin) => origin,
                    None => spawner.origin_at(rng.unit()),
                };
                let Some(pool) = rng.index(spawner.pools.len()).map(|i| spawner.pools[i]) else {
                    debug!("spawner {e:?} has no pools");
                    continue;
                };
                let anchor = tf.translation.truncate() + origin;
                requests.write(launcher.request_from(pool, anchor, launcher.direction, launcher.speed));
                fx.write(FxCue::new(e, Cue::Fire));
            }
        }
    }
}
