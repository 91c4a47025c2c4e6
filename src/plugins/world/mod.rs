//! World plugin: builds the level on entering `InGame`.
//!
//! - playfield boundary sensor
//! - player with a red (damaging) and a green (charging) gun, one pool each
//! - a row of standalone gun minions, one bullet pool each
//! - three formations of pooled escorts: holding, sliding and circling
//! - the power-up spawner, one pool per power-up kind
//! - the player line that stops power-ups drifting into the player's region
//!
//! Everything here is scoped to `InGame`.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::routine::FireInterval;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::formations::{spawn_formation, CircleDirection, FormationPoint, FormationShape};
use crate::plugins::guns::{MinionGun, PlayerGun, PlayerGuns};
use crate::plugins::launch::components::{Boundary, Chargeable, Health, LaunchLayers, Projectile, ProjectileKind};
use crate::plugins::launch::launcher::Launcher;
use crate::plugins::launch::pool::{spawn_pool, Payload, Prefab};
use crate::plugins::minions::{Minion, MinionKind, ReEntry};
use crate::plugins::player::{Player, PowerDown};
use crate::plugins::powerups::{PlayerLine, PowerUpKind};
use crate::plugins::spawner::{spawn_pools, Spawner};

const MINION_ROW: [f32; 5] = [-320.0, -160.0, 0.0, 160.0, 320.0];
const MINION_ROW_Y: f32 = 420.0;
const MINION_HEALTH: i32 = 3;
const MINION_RAMMING: i32 = 1;
const MINION_FIRE: FireInterval = FireInterval::new(2, 5);
const MINION_WARNING_SECS: f32 = 0.6;
const MINION_RETURN_WARNING_SECS: f32 = 1.5;

const ESCORT_HEALTH: i32 = 2;
const ESCORT_RAMMING: i32 = 1;
const ESCORT_WEDGE: [Vec2; 4] = [
    Vec2::new(-60.0, 30.0),
    Vec2::new(-20.0, 0.0),
    Vec2::new(20.0, 0.0),
    Vec2::new(60.0, 30.0),
];
const ESCORT_LINE: [Vec2; 3] = [Vec2::new(-50.0, 0.0), Vec2::ZERO, Vec2::new(50.0, 0.0)];
const ESCORT_RING: [Vec2; 4] = [Vec2::ZERO; 4];

const POWER_UPS_PER_KIND: usize = 2;
const POWER_UP_FIRE: FireInterval = FireInterval::half_open(6, 12);
const POWER_UP_WARNING_SECS: f32 = 1.0;
const POWER_UP_SPEED: f32 = 90.0;

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (
            spawn_boundary,
            spawn_player_line,
            spawn_player,
            spawn_minions,
            spawn_formations,
            spawn_power_up_spawner,
        ),
    );
}

fn player_bullet(name: &'static str, kind: ProjectileKind, fade_secs: f32) -> Prefab {
    Prefab {
        name,
        radius: 4.0,
        layers: LaunchLayers::new(Layer::PlayerBullet, [Layer::Boundary, Layer::Enemy, Layer::PowerUp]),
        fade_secs,
        payload: Payload::Projectile(Projectile { kind, strength: 1 }),
    }
}

fn enemy_bullet(fade_secs: f32) -> Prefab {
    Prefab {
        name: "EnemyBullet",
        radius: 5.0,
        layers: LaunchLayers::new(Layer::EnemyBullet, [Layer::Boundary, Layer::Player]),
        fade_secs,
        payload: Payload::Projectile(Projectile {
            kind: ProjectileKind::Damaging,
            strength: 1,
        }),
    }
}

fn power_up(name: &'static str, kind: PowerUpKind) -> Prefab {
    Prefab {
        name,
        radius: 12.0,
        layers: LaunchLayers::new(Layer::PowerUp, [Layer::Boundary, Layer::PlayerLine, Layer::PlayerBullet]),
        fade_secs: 0.0,
        payload: Payload::PowerUp(kind),
    }
}

fn escort(name: &'static str) -> Prefab {
    Prefab {
        name,
        radius: 16.0,
        layers: LaunchLayers::new(Layer::Enemy, [Layer::Boundary, Layer::Player, Layer::PlayerBullet]),
        fade_secs: 0.0,
        payload: Payload::Minion {
            max_health: ESCORT_HEALTH,
            ramming_strength: ESCORT_RAMMING,
        },
    }
}

fn spawn_boundary(mut commands: Commands, tunables: Res<Tunables>) {
    let size = tunables.playfield_half_extents * 2.0;
    commands.spawn((
        Name::new("Boundary"),
        Boundary,
        Transform::default(),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        Sensor,
        CollisionLayers::new(
            Layer::Boundary,
            [Layer::Enemy, Layer::PlayerBullet, Layer::EnemyBullet, Layer::PowerUp],
        ),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

/// Covers the player's region across the full playfield width.
fn spawn_player_line(mut commands: Commands, tunables: Res<Tunables>) {
    let half = tunables.playfield_half_extents;
    let top = tunables.player_limits.max.y;
    let height = (top + half.y).max(1.0);

    commands.spawn((
        Name::new("PlayerLine"),
        PlayerLine,
        Transform::from_xyz(0.0, top - height * 0.5, 0.0),
        RigidBody::Static,
        Collider::rectangle(half.x * 2.0, height),
        Sensor,
        CollisionLayers::new(Layer::PlayerLine, [Layer::PowerUp]),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

fn spawn_player(mut commands: Commands, tunables: Res<Tunables>) {
    let red_pool = spawn_pool(
        &mut commands,
        &player_bullet("RedBullet", ProjectileKind::Damaging, tunables.impact_fade_secs),
        tunables.bullets_per_gun,
    );
    let green_pool = spawn_pool(
        &mut commands,
        &player_bullet("GreenBullet", ProjectileKind::Charging, tunables.impact_fade_secs),
        tunables.bullets_per_gun,
    );

    let guns = PlayerGuns {
        red: PlayerGun::new(ProjectileKind::Damaging, red_pool, tunables.player_bullet_speed, 0.12, 1)
            .with_multipliers(0.5, 2),
        green: PlayerGun::new(ProjectileKind::Charging, green_pool, tunables.player_bullet_speed, 0.25, 1)
            .with_multipliers(0.5, 1),
    };
    let profile = LaunchLayers::new(Layer::Player, [Layer::Enemy, Layer::EnemyBullet]);

    commands.spawn((
        Name::new("Player"),
        Player::default(),
        Health::full(tunables.player_max_health),
        PowerDown::default(),
        guns,
        Launcher::new(Vec2::new(0.0, 20.0), Vec2::Y, tunables.player_bullet_speed),
        Transform::from_xyz(0.0, tunables.player_limits.min.y + 60.0, 1.0),
        Visibility::Visible,
        (
            RigidBody::Kinematic,
            Collider::circle(13.0),
            profile,
            profile.active(),
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
        ),
        DespawnOnExit(GameState::InGame),
    ));
}

fn spawn_minions(mut commands: Commands, tunables: Res<Tunables>) {
    let profile = LaunchLayers::new(Layer::Enemy, [Layer::Boundary, Layer::Player, Layer::PlayerBullet]);

    for (i, x) in MINION_ROW.into_iter().enumerate() {
        let pool = spawn_pool(
            &mut commands,
            &enemy_bullet(tunables.impact_fade_secs),
            tunables.bullets_per_minion_gun,
        );

        commands.spawn((
            Name::new(format!("Minion{i}")),
            Minion::new(MinionKind::Standalone, MINION_RAMMING, MINION_RETURN_WARNING_SECS),
            Health::full(MINION_HEALTH),
            ReEntry::default(),
            Chargeable,
            MinionGun::new(MINION_FIRE, MINION_WARNING_SECS),
            Launcher::new(Vec2::new(0.0, -18.0), Vec2::NEG_Y, tunables.enemy_bullet_speed).with_pool(pool),
            Transform::from_xyz(x, MINION_ROW_Y, 1.0),
            Visibility::Visible,
            (
                RigidBody::Dynamic,
                Collider::circle(16.0),
                Sensor,
                profile,
                profile.active(),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_formations(mut commands: Commands) {
    spawn_formation(
        &mut commands,
        "WedgeFormation",
        &escort("WedgeEscort"),
        &ESCORT_WEDGE,
        Vec2::new(0.0, 280.0),
        FormationShape::holding(1.5),
    );
    spawn_formation(
        &mut commands,
        "SlideFormation",
        &escort("SlideEscort"),
        &ESCORT_LINE,
        Vec2::new(0.0, 160.0),
        FormationShape::sliding(
            vec![
                FormationPoint::new(Vec2::new(-260.0, 0.0), 0.5),
                FormationPoint::new(Vec2::new(260.0, 0.0), 0.5),
            ],
            3.0,
        ),
    );
    spawn_formation(
        &mut commands,
        "RingFormation",
        &escort("RingEscort"),
        &ESCORT_RING,
        Vec2::new(-260.0, 300.0),
        FormationShape::circling(70.0, CircleDirection::Clockwise, 6.0, 4),
    );
}

fn spawn_power_up_spawner(mut commands: Commands, tunables: Res<Tunables>) {
    let prefabs = [
        power_up("PowerUp(Power)", PowerUpKind::Power),
        power_up("PowerUp(FireRate)", PowerUpKind::FireRate),
        power_up("PowerUp(Shield)", PowerUpKind::Shield),
        power_up("PowerUp(Bomb)", PowerUpKind::Bomb),
    ];
    let pools = spawn_pools(&mut commands, &prefabs, POWER_UPS_PER_KIND);

    let half = tunables.playfield_half_extents;
    let edge = half.x - 40.0;

    commands.spawn((
        Name::new("PowerUpSpawner"),
        Spawner::new(
            pools,
            Vec2::new(-edge, 0.0),
            Vec2::new(edge, 0.0),
            POWER_UP_FIRE,
            POWER_UP_WARNING_SECS,
        ),
        Launcher::new(Vec2::ZERO, Vec2::NEG_Y, POWER_UP_SPEED),
        Transform::from_xyz(0.0, half.y - 30.0, 0.0),
        DespawnOnExit(GameState::InGame),
    ));
}
