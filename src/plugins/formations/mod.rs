//! Formations: a pool of members held in shape around an anchor.
//!
//! A formation owns one pool and launches every member into its own slot when it
//! starts. Members that go back to the pool (killed, or left the playfield) are
//! launched into their slot again after `Tunables::respawn_secs`. While in play they
//! follow the shape:
//! - `Holding`: snap back to the slot every `check_secs`
//! - `Sliding`: glide through a list of points and back, holding at each one
//! - `Circling`: glide along the vertices of a regular polygon around the origin
//!
//! A member that something else has taken over is left alone until it leaves the
//! playfield.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use thiserror::Error;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::launch::boundary::exiting_entity;
use crate::plugins::launch::components::{Boundary, LaunchState};
use crate::plugins::launch::messages::{Cue, FxCue, LaunchMember};
use crate::plugins::launch::pool::{instantiate, Pool, Prefab};
use crate::plugins::launch::LaunchSystems;

const MIN_LEG_SECS: f32 = 1.0;
const MIN_CHECK_SECS: f32 = 0.1;
const MAX_CIRCLE_ACCURACY: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum FormationError {
    #[error("a sliding formation needs at least two points, got {0}")]
    TooFewPoints(usize),
}

/// A stop on a slide path, relative to the formation origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationPoint {
    pub offset: Vec2,
    /// Extra wait once the members have arrived.
    pub hold_secs: f32,
}

impl FormationPoint {
    pub const fn new(offset: Vec2, hold_secs: f32) -> Self {
        Self { offset, hold_secs }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleDirection {
    Clockwise,
    CounterClockwise,
}

/// What members in play should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Jump to the target and stop.
    Snap,
    /// Head for the target, arriving after `secs`.
    Glide { secs: f32 },
    /// Stop where they are.
    Halt,
}

#[derive(Debug, Clone)]
pub struct Slide {
    points: Vec<FormationPoint>,
    leg_secs: f32,
    current: usize,
    forward: bool,
    timer: Timer,
    gliding: bool,
}

impl Slide {
    fn tick(&mut self, delta: Duration) -> Option<Move> {
        if self.points.len() < 2 {
            return None;
        }

        if self.timer.tick(delta).is_finished() {
            self.advance();
            let hold = self.points[self.current].hold_secs.max(0.0);
            self.timer = Timer::from_seconds(self.leg_secs + hold, TimerMode::Once);
            self.gliding = true;
            return Some(Move::Glide { secs: self.leg_secs });
        }
        if self.gliding && self.timer.elapsed_secs() >= self.leg_secs {
            self.gliding = false;
            return Some(Move::Halt);
        }
        None
    }

    /// Walk the points forwards, then back, bouncing off both ends.
    fn advance(&mut self) {
        let last = self.points.len() - 1;
        if self.forward {
            if self.current < last {
                self.current += 1;
            } else {
                self.current = last - 1;
                self.forward = false;
            }
        } else if self.current > 0 {
            self.current -= 1;
        } else {
            self.current = 1;
            self.forward = true;
        }
    }

    fn offset(&self) -> Vec2 {
        self.points.get(self.current).map_or(Vec2::ZERO, |p| p.offset)
    }
}

#[derive(Debug, Clone)]
pub struct Circle {
    radius: f32,
    direction: CircleDirection,
    period_secs: f32,
    accuracy: usize,
    vertices: usize,
    leading: usize,
    timer: Option<Timer>,
}

impl Circle {
    fn step_secs(&self) -> f32 {
        (self.period_secs / self.vertices.max(1) as f32).max(f32::EPSILON)
    }

    fn tick(&mut self, delta: Duration) -> Option<Move> {
        if self.vertices == 0 {
            return None;
        }

        let step = self.step_secs();
        if let Some(timer) = self.timer.as_mut() {
            if !timer.tick(delta).just_finished() {
                return None;
            }
        } else {
            // First move happens right after the members are placed.
            self.timer = Some(Timer::from_seconds(step, TimerMode::Repeating));
        }
        self.leading = (self.leading + 1) % self.vertices;
        Some(Move::Glide { secs: step })
    }

    /// Members start `accuracy` vertices apart and all move one vertex per step.
    fn offset(&self, index: usize) -> Vec2 {
        if self.vertices == 0 {
            return Vec2::ZERO;
        }
        let vertex = (self.leading + index * self.accuracy) % self.vertices;
        let sign = match self.direction {
            CircleDirection::Clockwise => -1.0,
            CircleDirection::CounterClockwise => 1.0,
        };
        let angle = FRAC_PI_2 + sign * TAU * vertex as f32 / self.vertices as f32;
        Vec2::from_angle(angle) * self.radius
    }
}

#[derive(Debug, Clone)]
pub enum FormationShape {
    Holding { check: Timer },
    Sliding(Slide),
    Circling(Circle),
}

impl FormationShape {
    pub fn holding(check_secs: f32) -> Self {
        Self::Holding {
            check: Timer::from_seconds(check_secs.max(MIN_CHECK_SECS), TimerMode::Repeating),
        }
    }

    /// Members start at the first point and hold there before the first leg.
    pub fn sliding(points: Vec<FormationPoint>, leg_secs: f32) -> Self {
        let first_hold = points.first().map_or(0.0, |p| p.hold_secs.max(0.0));
        Self::Sliding(Slide {
            points,
            leg_secs: leg_secs.max(MIN_LEG_SECS),
            current: 0,
            forward: true,
            timer: Timer::from_seconds(first_hold, TimerMode::Once),
            gliding: false,
        })
    }

    /// The polygon has `members * accuracy` vertices; a full lap takes `period_secs`.
    pub fn circling(radius: f32, direction: CircleDirection, period_secs: f32, accuracy: usize) -> Self {
        Self::Circling(Circle {
            radius,
            direction,
            period_secs: period_secs.max(0.0),
            accuracy: accuracy.clamp(1, MAX_CIRCLE_ACCURACY),
            vertices: 0,
            leading: 0,
            timer: None,
        })
    }

    fn fit(&mut self, members: usize) {
        if let Self::Circling(circle) = self {
            circle.vertices = members * circle.accuracy;
        }
    }

    pub fn validate(&self) -> Result<(), FormationError> {
        match self {
            Self::Sliding(slide) if slide.points.len() < 2 => Err(FormationError::TooFewPoints(slide.points.len())),
            _ => Ok(()),
        }
    }

    pub fn tick(&mut self, delta: Duration) -> Option<Move> {
        match self {
            Self::Holding { check } => check.tick(delta).just_finished().then_some(Move::Snap),
            Self::Sliding(slide) => slide.tick(delta),
            Self::Circling(circle) => circle.tick(delta),
        }
    }

    /// Where member `index` with home `slot` belongs right now, relative to the origin.
    pub fn offset(&self, index: usize, slot: Vec2) -> Vec2 {
        match self {
            Self::Holding { .. } => slot,
            Self::Sliding(slide) => slot + slide.offset(),
            Self::Circling(circle) => circle.offset(index),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Formation {
    /// Offset of the shape from the formation's transform.
    pub origin: Vec2,
    pool: Entity,
    shape: FormationShape,
    started: bool,
}

impl Formation {
    #[inline]
    pub fn pool(&self) -> Entity {
        self.pool
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[derive(Component, Debug, Clone)]
pub struct FormationMember {
    pub formation: Entity,
    pub index: usize,
    /// Home position relative to the formation origin.
    pub slot: Vec2,
    overridden: bool,
    down: Option<Timer>,
}

impl FormationMember {
    pub fn new(formation: Entity, index: usize, slot: Vec2) -> Self {
        Self {
            formation,
            index,
            slot,
            overridden: false,
            down: None,
        }
    }

    /// Something else moves this member now; the formation stops touching it.
    pub fn take_over(&mut self) {
        self.overridden = true;
    }

    pub fn release(&mut self) {
        self.overridden = false;
    }

    #[inline]
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }
}

/// Spawn a formation at `anchor` with one pooled instance of `prefab` per slot.
pub fn spawn_formation(
    commands: &mut Commands,
    name: &'static str,
    prefab: &Prefab,
    slots: &[Vec2],
    anchor: Vec2,
    mut shape: FormationShape,
) -> Entity {
    let formation_e = commands.spawn_empty().id();
    let pool_e = commands
        .spawn((
            Name::new(format!("Pool({})", prefab.name)),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    let pool = instantiate(commands, pool_e, prefab, slots.len());
    for (index, (&member, &slot)) in pool.members().iter().zip(slots).enumerate() {
        commands
            .entity(member)
            .insert(FormationMember::new(formation_e, index, slot));
    }

    shape.fit(pool.capacity());
    if let Err(e) = shape.validate() {
        warn!("formation `{name}`: {e}; members will hold their slots");
    }

    commands.entity(pool_e).insert(pool);
    commands.entity(formation_e).insert((
        Name::new(name),
        Formation {
            origin: Vec2::ZERO,
            pool: pool_e,
            shape,
            started: false,
        },
        Transform::from_translation(anchor.extend(0.0)),
        DespawnOnExit(GameState::InGame),
    ));
    formation_e
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, launch_formations.in_set(LaunchSystems::Request))
        .add_systems(FixedUpdate, move_formations.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedPostUpdate,
            release_on_boundary_exit
                .after(LaunchSystems::Resolve)
                .before(LaunchSystems::Return),
        );
}

/// Fill every slot on the first run, then bring back members that sat in the pool
/// for `respawn_secs`.
pub fn launch_formations(
    time: Res<Time>,
    tunables: Res<Tunables>,
    pools: Query<&Pool>,
    mut q_formations: Query<(&mut Formation, &Transform)>,
    mut q_members: Query<(&mut FormationMember, &LaunchState)>,
    mut launches: MessageWriter<LaunchMember>,
    mut fx: MessageWriter<FxCue>,
) {
    for (mut formation, tf) in &mut q_formations {
        let Ok(pool) = pools.get(formation.pool) else {
            continue;
        };
        let filling = !formation.started;
        if filling {
            formation.started = true;
        }
        let base = tf.translation.truncate() + formation.origin;

        for &e in pool.members() {
            let Ok((mut member, state)) = q_members.get_mut(e) else {
                continue;
            };

            let due = if filling {
                true
            } else if !state.is_free() {
                member.down = None;
                false
            } else {
                member
                    .down
                    .get_or_insert_with(|| Timer::from_seconds(tunables.respawn_secs.max(0.0), TimerMode::Once))
                    .tick(time.delta())
                    .is_finished()
            };
            if !due {
                continue;
            }

            member.down = None;
            launches.write(LaunchMember {
                entity: e,
                origin: base + formation.shape.offset(member.index, member.slot),
                direction: Vec2::ZERO,
                speed: 0.0,
            });
            if !filling {
                fx.write(FxCue::new(e, Cue::ReEnter));
            }
        }
    }
}

pub fn move_formations(
    time: Res<Time>,
    pools: Query<&Pool>,
    mut q_formations: Query<(&mut Formation, &Transform), Without<FormationMember>>,
    mut q_members: Query<(&FormationMember, &LaunchState, &mut Transform, &mut LinearVelocity)>,
) {
    for (mut formation, tf) in &mut q_formations {
        if !formation.started {
            continue;
        }
        let Some(step) = formation.shape.tick(time.delta()) else {
            continue;
        };
        let Ok(pool) = pools.get(formation.pool) else {
            continue;
        };
        let base = tf.translation.truncate() + formation.origin;

        for &e in pool.members() {
            let Ok((member, state, mut member_tf, mut vel)) = q_members.get_mut(e) else {
                continue;
            };
            if !state.is_active() || member.overridden {
                continue;
            }

            let target = base + formation.shape.offset(member.index, member.slot);
            match step {
                Move::Snap => {
                    member_tf.translation = target.extend(member_tf.translation.z);
                    vel.0 = Vec2::ZERO;
                }
                Move::Glide { secs } => {
                    vel.0 = (target - member_tf.translation.truncate()) / secs;
                }
                Move::Halt => vel.0 = Vec2::ZERO,
            }
        }
    }
}

/// Leaving the playfield hands a member back to its formation.
pub fn release_on_boundary_exit(
    mut ended: MessageReader<CollisionEnd>,
    q_boundary: Query<(), With<Boundary>>,
    mut q_members: Query<&mut FormationMember>,
) {
    for ev in ended.read() {
        let Some(e) = exiting_entity(ev, &q_boundary) else {
            continue;
        };
        if let Ok(mut member) = q_members.get_mut(e) {
            member.release();
        }
    }
}
