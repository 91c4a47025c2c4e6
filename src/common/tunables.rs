//! Tunable gameplay constants.
//!
//! Inserted by the core plugin. Insert your own `Tunables` before the plugins are
//! registered to override them; the world plugin reads them when the level is built.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub player_speed: f32,
    pub player_max_health: i32,
    pub player_bullet_speed: f32,
    pub enemy_bullet_speed: f32,
    /// Pool size for each player gun.
    pub bullets_per_gun: usize,
    /// Pool size for each minion gun.
    pub bullets_per_minion_gun: usize,
    /// Seconds an impacted projectile keeps its effect alive before it is recycled.
    pub impact_fade_secs: f32,
    /// Seconds a downed minion stays out of the fight before its re-entry warning.
    pub respawn_secs: f32,
    pub power_up_secs: f32,
    /// Seconds a power-up waits at the player line before it disappears.
    pub power_up_expiry_secs: f32,
    /// Half extents of the boundary sensor, centred on the origin.
    pub playfield_half_extents: Vec2,
    /// Region the player may steer inside.
    pub player_limits: Rect,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            player_speed: 420.0,
            player_max_health: 5,
            player_bullet_speed: 900.0,
            enemy_bullet_speed: 380.0,
            bullets_per_gun: 24,
            bullets_per_minion_gun: 6,
            impact_fade_secs: 0.25,
            respawn_secs: 6.0,
            power_up_secs: 8.0,
            power_up_expiry_secs: 1.5,
            playfield_half_extents: Vec2::new(480.0, 640.0),
            player_limits: Rect::new(-440.0, -600.0, 440.0, 0.0),
        }
    }
}
