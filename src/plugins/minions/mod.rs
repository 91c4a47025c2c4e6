//! Minions: damageable enemies with a death trigger, boundary handling and re-entry.
//!
//! Pooled (`Spawned`) minions live and die through the launch contract: death writes
//! `ReturnToPool` and activation restores their health. Level-placed minions toggle
//! themselves here and come back after a respawn wait:
//!
//! ```text
//!   killed / left the playfield
//!        -> down, Respawning(respawn_secs)
//!        -> Cue::PrepareReEntry, Warning(return_warning_secs)
//!        -> health restored, up again, Cue::ReEnter
//! ```

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::launch::boundary::exiting_entity;
use crate::plugins::launch::components::{Boundary, Health, LaunchLayers, Launchable};
use crate::plugins::launch::messages::{ActivationChanged, Cue, FxCue, ReturnToPool};
use crate::plugins::launch::LaunchSystems;
use crate::plugins::player::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinionKind {
    /// Placed in the level; re-enters after dying or leaving the playfield.
    Standalone,
    /// Comes out of a spawner pool; dying sends it back to the pool.
    Spawned,
    /// Fixed emplacement; re-enters like a standalone minion.
    Installation,
}

#[derive(Component, Debug, Clone)]
pub struct Minion {
    pub kind: MinionKind,
    /// Damage dealt to the player on contact.
    pub ramming_strength: i32,
    /// Warning shown between `PrepareReEntry` and the actual re-entry.
    pub return_warning_secs: f32,
    active: bool,
}

impl Minion {
    /// Pooled minions start parked; everything else starts in play.
    pub fn new(kind: MinionKind, ramming_strength: i32, return_warning_secs: f32) -> Self {
        Self {
            kind,
            ramming_strength,
            return_warning_secs: return_warning_secs.max(0.0),
            active: kind != MinionKind::Spawned,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn re_enters(&self) -> bool {
        self.kind != MinionKind::Spawned
    }
}

#[derive(Debug, Clone, Default)]
enum ReEntryPhase {
    #[default]
    Idle,
    Respawning(Timer),
    Warning(Timer),
}

/// Re-entry schedule of a level-placed minion. Scheduling again replaces the pending one.
#[derive(Component, Debug, Clone, Default)]
pub struct ReEntry {
    phase: ReEntryPhase,
}

impl ReEntry {
    pub fn schedule(&mut self, respawn_secs: f32) {
        self.phase = ReEntryPhase::Respawning(Timer::from_seconds(respawn_secs.max(0.0), TimerMode::Once));
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        !matches!(self.phase, ReEntryPhase::Idle)
    }

    /// Advance the pending re-entry. At most one phase change per tick.
    pub fn tick(&mut self, delta: Duration, warning_secs: f32) -> ReEntryStep {
        let finished = match &mut self.phase {
            ReEntryPhase::Idle => return ReEntryStep::Idle,
            ReEntryPhase::Respawning(timer) | ReEntryPhase::Warning(timer) => timer.tick(delta).is_finished(),
        };
        if !finished {
            return ReEntryStep::Idle;
        }

        if matches!(self.phase, ReEntryPhase::Respawning(_)) {
            self.phase = ReEntryPhase::Warning(Timer::from_seconds(warning_secs.max(0.0), TimerMode::Once));
            ReEntryStep::Prepare
        } else {
            self.phase = ReEntryPhase::Idle;
            ReEntryStep::Enter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReEntryStep {
    Idle,
    /// Respawn wait is over; the warning starts.
    Prepare,
    /// Back in play.
    Enter,
}

/// Bomb: every minion in play dies at once.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct WipeMinions;

pub fn plugin(app: &mut App) {
    app.add_message::<WipeMinions>();

    app.add_systems(
        Update,
        mirror_pool_activation
            .after(LaunchSystems::Allocate)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (kill_minions, minion_boundary_exit, ram_player)
            .chain()
            .after(LaunchSystems::Resolve)
            .before(LaunchSystems::Return),
    );

    app.add_systems(FixedUpdate, tick_re_entry.run_if(in_state(GameState::InGame)));
}

/// Keep `Minion::active` in step with the pool and refill health on every launch.
pub fn mirror_pool_activation(
    mut changes: MessageReader<ActivationChanged>,
    mut q: Query<(&mut Minion, &mut Health), With<Launchable>>,
) {
    for change in changes.read() {
        let Ok((mut minion, mut health)) = q.get_mut(change.entity) else {
            continue;
        };
        minion.active = change.active;
        if change.active {
            health.restore();
        }
    }
}

/// The parts of a minion that flip when it goes down or comes back.
type MinionBody = (
    &'static mut Minion,
    &'static mut CollisionLayers,
    &'static LaunchLayers,
    &'static mut Visibility,
);

/// Take a level-placed minion out of play.
fn stand_down(minion: &mut Minion, layers: &mut CollisionLayers, profile: &LaunchLayers, vis: &mut Visibility) {
    minion.active = false;
    *layers = profile.inactive();
    *vis = Visibility::Hidden;
}

/// Health ran out, or a bomb went off.
pub fn kill_minions(
    tunables: Res<Tunables>,
    mut wipes: MessageReader<WipeMinions>,
    mut q: Query<(
        Entity,
        MinionBody,
        &Health,
        Option<&mut ReEntry>,
        Has<Launchable>,
    )>,
    mut returns: MessageWriter<ReturnToPool>,
    mut changes: MessageWriter<ActivationChanged>,
    mut fx: MessageWriter<FxCue>,
) {
    let wipe = wipes.read().count() > 0;

    for (e, (mut minion, mut layers, profile, mut vis), health, re_entry, pooled) in &mut q {
        if !minion.is_active() || !(wipe || health.is_depleted()) {
            continue;
        }

        fx.write(FxCue::new(e, Cue::Die));

        if pooled {
            // The pool parks it; marking it down here keeps a second fixed step from
            // killing it again before the pool gets to it.
            minion.active = false;
            returns.write(ReturnToPool { entity: e });
            continue;
        }

        stand_down(&mut minion, &mut layers, profile, &mut vis);
        changes.write(ActivationChanged { entity: e, active: false });

        if minion.re_enters() {
            match re_entry {
                Some(mut r) => r.schedule(tunables.respawn_secs),
                None => warn!("minion {e:?} should re-enter but has no ReEntry"),
            }
        }
    }
}

/// Level-placed minions that drift out of the playfield go down and come back later.
/// Pooled ones are recycled by the launch boundary system.
pub fn minion_boundary_exit(
    tunables: Res<Tunables>,
    mut ends: MessageReader<CollisionEnd>,
    q_boundary: Query<(), With<Boundary>>,
    mut q: Query<(MinionBody, Option<&mut ReEntry>), Without<Launchable>>,
    mut changes: MessageWriter<ActivationChanged>,
) {
    for ev in ends.read() {
        let Some(e) = exiting_entity(ev, &q_boundary) else {
            continue;
        };
        let Ok(((mut minion, mut layers, profile, mut vis), re_entry)) = q.get_mut(e) else {
            continue;
        };
        if !minion.is_active() {
            continue;
        }

        stand_down(&mut minion, &mut layers, profile, &mut vis);
        changes.write(ActivationChanged { entity: e, active: false });
        if let Some(mut r) = re_entry {
            r.schedule(tunables.respawn_secs);
        }
    }
}

/// Contact with an active minion hurts the player unless shielded.
pub fn ram_player(
    mut starts: MessageReader<CollisionStart>,
    q_minions: Query<&Minion>,
    mut q_player: Query<&mut Health, (With<Player>, Without<Minion>)>,
    mut fx: MessageWriter<FxCue>,
) {
    for ev in starts.read() {
        let a = ev.body1.unwrap_or(ev.collider1);
        let b = ev.body2.unwrap_or(ev.collider2);

        let (minion, player) = match (q_minions.get(a), q_minions.get(b)) {
            (Ok(m), Err(_)) => (m, b),
            (Err(_), Ok(m)) => (m, a),
            _ => continue,
        };
        if !minion.is_active() {
            continue;
        }
        let Ok(mut health) = q_player.get_mut(player) else {
            continue;
        };

        if health.invulnerable {
            fx.write(FxCue::new(player, Cue::ShieldStruck));
        } else {
            health.hp -= minion.ramming_strength;
        }
    }
}

pub fn tick_re_entry(
    time: Res<Time>,
    mut q: Query<(Entity, MinionBody, &mut Health, &mut ReEntry)>,
    mut changes: MessageWriter<ActivationChanged>,
    mut fx: MessageWriter<FxCue>,
) {
    for (e, (mut minion, mut layers, profile, mut vis), mut health, mut re_entry) in &mut q {
        let warning_secs = minion.return_warning_secs;
        match re_entry.tick(time.delta(), warning_secs) {
            ReEntryStep::Idle => {}
            ReEntryStep::Prepare => {
                fx.write(FxCue::new(e, Cue::PrepareReEntry { secs: warning_secs }));
            }
            ReEntryStep::Enter => {
                health.restore();
                minion.active = true;
                *layers = profile.active();
                *vis = Visibility::Visible;
                changes.write(ActivationChanged { entity: e, active: true });
                fx.write(FxCue::new(e, Cue::ReEnter));
            }
        }
    }
}

#[cfg(test)]
mod tests;
