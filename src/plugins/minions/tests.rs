use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::*;
use crate::common::layers::Layer;
use crate::common::test_utils::run_system_once;
use crate::plugins::launch::allocator::allocate_from_pools;
use crate::plugins::launch::commit::return_requested;
use crate::plugins::launch::components::{Boundary, Health, LaunchLayers, LaunchState, Launchable};
use crate::plugins::launch::messages::{ActivationChanged, Cue, FxCue, LaunchRequest, ReturnToPool};
use crate::plugins::launch::pool::{spawn_pool, Payload, Pool, Prefab};
use crate::plugins::player::Player;

fn world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<WipeMinions>>();
    world.init_resource::<Messages<ReturnToPool>>();
    world.init_resource::<Messages<ActivationChanged>>();
    world.init_resource::<Messages<FxCue>>();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<CollisionEnd>>();
    world.insert_resource(Time::<()>::default());
    world.insert_resource(Tunables {
        respawn_secs: 2.0,
        ..default()
    });
    world
}

fn profile() -> LaunchLayers {
    LaunchLayers::new(Layer::Enemy, [Layer::Boundary, Layer::Player, Layer::PlayerBullet])
}

fn spawn_standalone(world: &mut World, hp: i32) -> Entity {
    world
        .spawn((
            Minion::new(MinionKind::Standalone, 2, 1.0),
            Health::full(hp),
            ReEntry::default(),
            profile(),
            profile().active(),
            Visibility::Visible,
        ))
        .id()
}

fn advance(world: &mut World, secs: f32) {
    world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(secs));
}

fn drain<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}

fn is_up(world: &World, e: Entity) -> bool {
    world.get::<Minion>(e).unwrap().is_active()
}

fn collides_with_nothing(world: &World, e: Entity) -> bool {
    world.get::<CollisionLayers>(e).unwrap().filters == LayerMask::NONE
}

fn damage(world: &mut World, e: Entity, amount: i32) {
    world.get_mut::<Health>(e).unwrap().hp -= amount;
}

#[test]
fn depleted_standalone_minion_goes_down_and_schedules_re_entry() {
    let mut world = world();
    let m = spawn_standalone(&mut world, 2);
    damage(&mut world, m, 2);

    run_system_once(&mut world, kill_minions);

    assert!(!is_up(&world, m));
    assert!(collides_with_nothing(&world, m));
    assert_eq!(*world.get::<Visibility>(m).unwrap(), Visibility::Hidden);
    assert!(world.get::<ReEntry>(m).unwrap().is_pending());
    assert_eq!(drain::<FxCue>(&mut world), vec![FxCue::new(m, Cue::Die)]);
    assert_eq!(
        drain::<ActivationChanged>(&mut world),
        vec![ActivationChanged { entity: m, active: false }]
    );
    assert!(drain::<ReturnToPool>(&mut world).is_empty());
}

#[test]
fn healthy_minion_survives() {
    let mut world = world();
    let m = spawn_standalone(&mut world, 3);
    damage(&mut world, m, 2);

    run_system_once(&mut world, kill_minions);

    assert!(is_up(&world, m));
    assert!(drain::<FxCue>(&mut world).is_empty());
}

#[test]
fn depleted_pooled_minion_returns_to_its_pool() {
    let mut world = world();
    let pool_e = world.spawn_empty().id();
    let m = world
        .spawn((
            Minion::new(MinionKind::Spawned, 1, 0.0),
            Health::full(1),
            Launchable { pool: pool_e },
            LaunchState::Active,
            profile(),
            profile().active(),
            Visibility::Visible,
        ))
        .id();
    world.write_message(ActivationChanged { entity: m, active: true });
    run_system_once(&mut world, mirror_pool_activation);
    assert!(is_up(&world, m));

    damage(&mut world, m, 1);
    run_system_once(&mut world, kill_minions);

    assert_eq!(drain::<ReturnToPool>(&mut world), vec![ReturnToPool { entity: m }]);
    assert_eq!(drain::<FxCue>(&mut world), vec![FxCue::new(m, Cue::Die)]);
    // Marked down at once so a second step does not kill it again.
    run_system_once(&mut world, kill_minions);
    assert!(drain::<ReturnToPool>(&mut world).is_empty());
}

#[test]
fn pooled_minion_gets_full_health_on_each_launch() {
    let mut world = world();
    let pool_e = world.spawn_empty().id();
    let m = world
        .spawn((
            Minion::new(MinionKind::Spawned, 1, 0.0),
            Health { hp: 0, max: 4, invulnerable: false },
            Launchable { pool: pool_e },
        ))
        .id();
    assert!(!is_up(&world, m));

    world.write_message(ActivationChanged { entity: m, active: true });
    run_system_once(&mut world, mirror_pool_activation);

    assert!(is_up(&world, m));
    assert_eq!(world.get::<Health>(m).unwrap().hp, 4);
}

#[test]
fn pooled_minion_prefab_cycles_through_its_pool() {
    let mut world = world();
    world.init_resource::<Messages<LaunchRequest>>();
    let prefab = Prefab {
        name: "Drone",
        radius: 12.0,
        layers: profile(),
        fade_secs: 0.0,
        payload: Payload::Minion {
            max_health: 3,
            ramming_strength: 2,
        },
    };
    let pool_e = run_system_once(&mut world, move |mut commands: Commands| {
        spawn_pool(&mut commands, &prefab, 1)
    });
    let m = world.get::<Pool>(pool_e).unwrap().members()[0];

    // Parked with the prefab's stats.
    assert!(!is_up(&world, m));
    assert_eq!(world.get::<Minion>(m).unwrap().ramming_strength, 2);
    assert_eq!(world.get::<Health>(m).unwrap().max, 3);

    let launch = |world: &mut World| {
        world.write_message(LaunchRequest {
            pool: pool_e,
            origin: Vec2::new(0.0, 300.0),
            direction: Vec2::NEG_Y,
            speed: 60.0,
        });
        run_system_once(world, allocate_from_pools);
        run_system_once(world, mirror_pool_activation);
        drain::<LaunchRequest>(world);
        drain::<ActivationChanged>(world);
    };

    launch(&mut world);
    assert!(is_up(&world, m));
    assert!(world.get::<LaunchState>(m).unwrap().is_active());

    damage(&mut world, m, 3);
    run_system_once(&mut world, kill_minions);
    run_system_once(&mut world, return_requested);

    assert!(!is_up(&world, m));
    assert!(world.get::<LaunchState>(m).unwrap().is_free());
    assert!(collides_with_nothing(&world, m));
    assert_eq!(
        drain::<ActivationChanged>(&mut world),
        vec![ActivationChanged { entity: m, active: false }]
    );
    drain::<ReturnToPool>(&mut world);

    launch(&mut world);
    assert!(is_up(&world, m));
    assert_eq!(world.get::<Health>(m).unwrap().hp, 3);
}

#[test]
fn wipe_kills_every_minion_in_play() {
    let mut world = world();
    let a = spawn_standalone(&mut world, 5);
    let b = spawn_standalone(&mut world, 5);
    world.write_message(WipeMinions);

    run_system_once(&mut world, kill_minions);

    assert!(!is_up(&world, a));
    assert!(!is_up(&world, b));
    assert_eq!(drain::<FxCue>(&mut world).len(), 2);
}

#[test]
fn re_entry_warns_then_brings_the_minion_back_with_full_health() {
    let mut world = world();
    let m = spawn_standalone(&mut world, 2);
    damage(&mut world, m, 5);
    run_system_once(&mut world, kill_minions);
    drain::<FxCue>(&mut world);
    drain::<ActivationChanged>(&mut world);

    // Respawn wait (2 s).
    advance(&mut world, 1.0);
    run_system_once(&mut world, tick_re_entry);
    assert!(drain::<FxCue>(&mut world).is_empty());
    advance(&mut world, 1.0);
    run_system_once(&mut world, tick_re_entry);
    assert_eq!(
        drain::<FxCue>(&mut world),
        vec![FxCue::new(m, Cue::PrepareReEntry { secs: 1.0 })]
    );
    assert!(!is_up(&world, m));

    // Return warning (1 s).
    advance(&mut world, 1.0);
    run_system_once(&mut world, tick_re_entry);

    assert!(is_up(&world, m));
    assert_eq!(world.get::<Health>(m).unwrap().hp, 2);
    assert!(!collides_with_nothing(&world, m));
    assert_eq!(*world.get::<Visibility>(m).unwrap(), Visibility::Visible);
    assert_eq!(drain::<FxCue>(&mut world), vec![FxCue::new(m, Cue::ReEnter)]);
    assert_eq!(
        drain::<ActivationChanged>(&mut world),
        vec![ActivationChanged { entity: m, active: true }]
    );
    assert!(!world.get::<ReEntry>(m).unwrap().is_pending());
}

#[test]
fn rescheduling_replaces_the_pending_re_entry() {
    let mut re_entry = ReEntry::default();
    re_entry.schedule(1.0);
    assert_eq!(re_entry.tick(Duration::from_secs_f32(0.75), 0.5), ReEntryStep::Idle);

    re_entry.schedule(1.0);
    // The first schedule would have finished here.
    assert_eq!(re_entry.tick(Duration::from_secs_f32(0.5), 0.5), ReEntryStep::Idle);
    assert_eq!(re_entry.tick(Duration::from_secs_f32(0.5), 0.5), ReEntryStep::Prepare);
    assert_eq!(re_entry.tick(Duration::from_secs_f32(0.5), 0.5), ReEntryStep::Enter);
    assert!(!re_entry.is_pending());
}

#[test]
fn leaving_the_playfield_takes_a_level_minion_down() {
    let mut world = world();
    let boundary = world.spawn(Boundary).id();
    let m = spawn_standalone(&mut world, 2);

    world.write_message(CollisionEnd {
        collider1: boundary,
        collider2: m,
        body1: None,
        body2: Some(m),
    });
    run_system_once(&mut world, minion_boundary_exit);

    assert!(!is_up(&world, m));
    assert!(collides_with_nothing(&world, m));
    assert!(world.get::<ReEntry>(m).unwrap().is_pending());
    // Health is untouched; it is refilled on re-entry anyway.
    assert_eq!(world.get::<Health>(m).unwrap().hp, 2);
}

#[test]
fn ramming_hurts_the_player_unless_shielded() {
    let mut world = world();
    let m = spawn_standalone(&mut world, 2);
    let player = world.spawn((Player::default(), Health::full(5))).id();

    world.write_message(CollisionStart {
        collider1: player,
        collider2: m,
        body1: Some(player),
        body2: Some(m),
    });
    run_system_once(&mut world, ram_player);
    assert_eq!(world.get::<Health>(player).unwrap().hp, 3);

    world.get_mut::<Health>(player).unwrap().invulnerable = true;
    world.resource_mut::<Messages<CollisionStart>>().update();
    world.resource_mut::<Messages<CollisionStart>>().update();
    world.write_message(CollisionStart {
        collider1: m,
        collider2: player,
        body1: Some(m),
        body2: Some(player),
    });
    run_system_once(&mut world, ram_player);

    assert_eq!(world.get::<Health>(player).unwrap().hp, 3);
    assert_eq!(
        drain::<FxCue>(&mut world),
        vec![FxCue::new(player, Cue::ShieldStruck)]
    );
}
