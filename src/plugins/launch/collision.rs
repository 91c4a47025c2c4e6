//! Hit resolution for active projectiles.
//!
//! A projectile only stops on a target that can take what it carries: damaging
//! projectiles need `Health`, charging projectiles need `Chargeable`. Anything else
//! is flown through. A stopped projectile is withdrawn at once and returned to its
//! pool when its impact fade runs out.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::{Chargeable, Health, ImpactFade, Launchable, Projectile, ProjectileKind};
use super::launcher::{withdraw, LaunchableQuery};
use super::messages::{Charged, Cue, FxCue};

#[derive(Clone, Copy, Debug)]
struct CollisionSide {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionSide {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn sides(ev: &CollisionStart) -> (CollisionSide, CollisionSide) {
    (
        CollisionSide {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionSide {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

pub fn process_projectile_hits(
    mut started: MessageReader<CollisionStart>,
    q_projectiles: Query<&Projectile, With<Launchable>>,
    q_chargeable: Query<(), With<Chargeable>>,
    mut q: LaunchableQuery,
    mut q_fade: Query<&mut ImpactFade>,
    mut q_health: Query<&mut Health>,
    mut charged: MessageWriter<Charged>,
    mut fx: MessageWriter<FxCue>,
    // Per-frame dedupe: one hit per projectile.
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (s1, s2) = sides(ev);

        let p1 = q_projectiles.get(s1.collider).ok();
        let p2 = q_projectiles.get(s2.collider).ok();
        let (projectile_side, projectile, other_side) = match (p1, p2) {
            (Some(p), None) => (s1, *p, s2),
            (None, Some(p)) => (s2, *p, s1),
            _ => continue, // must be exactly one projectile
        };
        let bullet = projectile_side.collider;

        if seen.contains(&bullet) {
            continue;
        }
        let Ok((state, ..)) = q.get(bullet) else {
            continue;
        };
        if !state.is_active() {
            continue;
        }

        let target = other_side.gameplay_owner();
        let stopped = match projectile.kind {
            ProjectileKind::Damaging => match q_health.get_mut(target) {
                Ok(mut health) => {
                    if health.invulnerable {
                        fx.write(FxCue::new(target, Cue::ShieldStruck));
                    } else {
                        health.hp -= projectile.strength;
                    }
                    true
                }
                Err(_) => false,
            },
            ProjectileKind::Charging => {
                let chargeable = q_chargeable.contains(target);
                if chargeable {
                    charged.write(Charged {
                        target,
                        amount: projectile.strength,
                    });
                }
                chargeable
            }
        };
        if !stopped {
            continue;
        }

        seen.insert(bullet);
        withdraw(&mut q, bullet);
        if let Ok(mut fade) = q_fade.get_mut(bullet) {
            fade.reset();
        }
        fx.write(FxCue::new(bullet, Cue::Impact));
    }
}
