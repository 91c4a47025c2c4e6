use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;
use crate::plugins::launch::components::{Health, LaunchState};
use crate::plugins::launch::messages::{ActivationChanged, Charged, Cue, FxCue, ReturnToPool};

fn world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<Charged>>();
    world.init_resource::<Messages<PowerUpCollected>>();
    world.init_resource::<Messages<ReturnToPool>>();
    world.init_resource::<Messages<FxCue>>();
    world.init_resource::<Messages<ActivationChanged>>();
    world.init_resource::<Messages<CollisionStart>>();
    world.insert_resource(Time::<()>::default());
    world.insert_resource(Tunables {
        power_up_expiry_secs: 1.5,
        ..default()
    });
    world
}

fn spawn_power_up(world: &mut World, kind: PowerUpKind, state: LaunchState) -> Entity {
    world
        .spawn((
            PowerUp::new(kind),
            state,
            Health::full(1),
            LinearVelocity(Vec2::new(0.0, -90.0)),
        ))
        .id()
}

fn advance(world: &mut World, secs: f32) {
    world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(secs));
}

fn reach_line(world: &mut World, power_up: Entity) {
    let line = world.spawn(PlayerLine).id();
    world.write_message(CollisionStart {
        collider1: line,
        collider2: power_up,
        body1: Some(line),
        body2: Some(power_up),
    });
    run_system_once(world, reach_player_line);
}

fn drain<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}

#[test]
fn charging_a_power_up_collects_it_once() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Shield, LaunchState::Active);
    world.write_message(Charged { target: p, amount: 1 });
    world.write_message(Charged { target: p, amount: 1 });

    run_system_once(&mut world, collect_charged);

    let collected = drain::<PowerUpCollected>(&mut world);
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].kind, PowerUpKind::Shield);
    assert_eq!(drain::<ReturnToPool>(&mut world), vec![ReturnToPool { entity: p }]);
}

#[test]
fn charge_on_a_parked_power_up_is_ignored() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Bomb, LaunchState::Fading);
    world.write_message(Charged { target: p, amount: 1 });

    run_system_once(&mut world, collect_charged);

    assert!(drain::<PowerUpCollected>(&mut world).is_empty());
    assert!(drain::<ReturnToPool>(&mut world).is_empty());
}

#[test]
fn shooting_a_power_up_destroys_it_and_refills_it_for_reuse() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Power, LaunchState::Active);
    world.get_mut::<Health>(p).unwrap().hp = 0;

    run_system_once(&mut world, destroy_shot);

    assert_eq!(drain::<ReturnToPool>(&mut world), vec![ReturnToPool { entity: p }]);
    assert_eq!(drain::<FxCue>(&mut world), vec![FxCue::new(p, Cue::Die)]);
    assert_eq!(world.get::<Health>(p).unwrap().hp, 1);
    assert!(drain::<PowerUpCollected>(&mut world).is_empty());
}

#[test]
fn charged_and_shot_in_the_same_step_is_only_collected() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Bomb, LaunchState::Active);
    world.get_mut::<Health>(p).unwrap().hp = 0;
    world.write_message(Charged { target: p, amount: 1 });

    run_system_once(&mut world, collect_charged);
    run_system_once(&mut world, destroy_shot);

    assert_eq!(drain::<PowerUpCollected>(&mut world).len(), 1);
    assert_eq!(drain::<ReturnToPool>(&mut world), vec![ReturnToPool { entity: p }]);
    assert!(drain::<FxCue>(&mut world).is_empty());
}

#[test]
fn power_up_at_the_player_line_stops_warns_and_returns_after_the_wait() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::FireRate, LaunchState::Active);

    reach_line(&mut world, p);

    assert_eq!(world.get::<LinearVelocity>(p).unwrap().0, Vec2::ZERO);
    assert!(world.get::<PowerUp>(p).unwrap().is_expiring());
    assert_eq!(
        drain::<FxCue>(&mut world),
        vec![FxCue::new(p, Cue::PrepareExpire { secs: 1.5 })]
    );

    advance(&mut world, 1.0);
    run_system_once(&mut world, expire_power_ups);
    assert!(drain::<ReturnToPool>(&mut world).is_empty());

    advance(&mut world, 0.5);
    run_system_once(&mut world, expire_power_ups);
    assert_eq!(drain::<ReturnToPool>(&mut world), vec![ReturnToPool { entity: p }]);
    assert_eq!(drain::<FxCue>(&mut world), vec![FxCue::new(p, Cue::Die)]);
    assert!(!world.get::<PowerUp>(p).unwrap().is_expiring());
}

#[test]
fn deactivation_cancels_a_pending_expiry() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Shield, LaunchState::Active);
    reach_line(&mut world, p);
    drain::<FxCue>(&mut world);

    world.write_message(ActivationChanged { entity: p, active: false });
    run_system_once(&mut world, reset_expiry_on_activation);
    assert!(!world.get::<PowerUp>(p).unwrap().is_expiring());

    // Even relaunched straight away, the old wait never fires.
    advance(&mut world, 2.0);
    run_system_once(&mut world, expire_power_ups);
    assert!(drain::<ReturnToPool>(&mut world).is_empty());
    assert!(drain::<FxCue>(&mut world).is_empty());
}

#[test]
fn parked_power_up_ignores_the_player_line() {
    let mut world = world();
    let p = spawn_power_up(&mut world, PowerUpKind::Power, LaunchState::Inactive);

    reach_line(&mut world, p);

    assert!(!world.get::<PowerUp>(p).unwrap().is_expiring());
    assert!(drain::<FxCue>(&mut world).is_empty());
}
