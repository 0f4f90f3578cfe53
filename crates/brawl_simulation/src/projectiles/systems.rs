//! Projectile systems
//!
//! Порядок в тике:
//! 1. tick_projectiles (Timers): lifetime / fuse
//! 2. resolve_projectile_overlaps, bounce_bombs, explode_bombs (Resolve)
//!    → DamageRequest → resolve_damage_requests
//! 3. ReturnToPool (с generation выдачи) обрабатывается в Cleanup

use bevy::prelude::*;

use super::components::{explosion_hit, Projectile, ProjectileKind, ProjectileTick};
use crate::combat::{Combatant, DamageRequest};
use crate::components::{Fighter, PhysicsBody};
use crate::physics::{ProjectileGroundContact, ProjectileOverlap, SpatialBackend};
use crate::pool::{Inactive, ObjectPool, ReturnToPool};

/// Маркер: бомба должна взорваться в этом тике
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingDetonation;

/// Событие: бомба взорвалась
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BombExploded {
    pub bomb: Entity,
    pub owner: Option<Entity>,
    pub center: Vec2,
    pub radius: f32,
    /// Кого задело (до проверки неуязвимости/щита)
    pub hits: Vec<Entity>,
}

/// Система: lifetime пуль и fuse бомб
pub fn tick_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile), Without<Inactive>>,
    pool: Res<ObjectPool>,
    mut returns: EventWriter<ReturnToPool>,
) {
    let delta = time.delta_secs();
    for (entity, mut projectile) in projectiles.iter_mut() {
        match projectile.tick(delta) {
            ProjectileTick::Alive => {}
            ProjectileTick::Expired => {
                returns.write(ReturnToPool::issued(entity, &pool));
            }
            ProjectileTick::Detonate => {
                commands.entity(entity).insert(PendingDetonation);
            }
        }
    }
}

/// Система: попадание пули в игрока
///
/// - owner пропускается при ignore_owner
/// - щит поглощает пулю без урона
/// - направление отлёта = направление полёта (fallback: от пули к цели)
pub fn resolve_projectile_overlaps(
    mut overlaps: EventReader<ProjectileOverlap>,
    mut projectiles: Query<(&mut Projectile, &Transform), Without<Inactive>>,
    targets: Query<(&Combatant, &Transform), With<Fighter>>,
    mut damage_requests: EventWriter<DamageRequest>,
    pool: Res<ObjectPool>,
    mut returns: EventWriter<ReturnToPool>,
) {
    for overlap in overlaps.read() {
        let Ok((mut projectile, projectile_transform)) = projectiles.get_mut(overlap.projectile) else {
            continue;
        };
        if !projectile.is_trigger() || projectile.ignores(overlap.other) {
            continue;
        }
        // Не игрок (или уже despawned): пуля летит дальше
        let Ok((combatant, target_transform)) = targets.get(overlap.other) else {
            continue;
        };

        if combatant.has_shield() {
            crate::logger::log(&format!("🛡️ Shield absorbed projectile {:?}", overlap.projectile));
            projectile.mark_spent();
            returns.write(ReturnToPool::issued(overlap.projectile, &pool));
            continue;
        }

        let mut direction = projectile.velocity.normalize_or_zero();
        if direction == Vec2::ZERO {
            direction = (target_transform.translation - projectile_transform.translation)
                .truncate()
                .normalize_or_zero();
        }

        damage_requests.write(DamageRequest {
            target: overlap.other,
            source: projectile.owner,
            base_damage: projectile.damage,
            base_knockback: projectile.knockback,
            direction,
        });

        if projectile.destroy_on_hit {
            projectile.mark_spent();
            returns.write(ReturnToPool::issued(overlap.projectile, &pool));
        }
    }
}

/// Система: отскок бомбы от земли (урона нет)
pub fn bounce_bombs(
    mut contacts: EventReader<ProjectileGroundContact>,
    mut bombs: Query<(&mut Projectile, &mut PhysicsBody), Without<Inactive>>,
) {
    for contact in contacts.read() {
        let Ok((mut projectile, mut body)) = bombs.get_mut(contact.projectile) else {
            continue;
        };
        if !projectile.is_bomb() {
            continue;
        }
        body.velocity = projectile.land(body.velocity);
    }
}

/// Система: взрыв бомб
///
/// Ровно один раз на бомбу: `Projectile::detonate` отклоняет повтор.
/// Damage/knockback линейно падают от центра: ratio = 1 - d / r.
pub fn explode_bombs(
    mut commands: Commands,
    spatial: Res<SpatialBackend>,
    mut bombs: Query<(Entity, &mut Projectile, &Transform), (With<PendingDetonation>, Without<Inactive>)>,
    targets: Query<&Transform, With<Fighter>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut exploded_events: EventWriter<BombExploded>,
    pool: Res<ObjectPool>,
    mut returns: EventWriter<ReturnToPool>,
) {
    for (entity, mut projectile, transform) in bombs.iter_mut() {
        commands.entity(entity).remove::<PendingDetonation>();

        let ProjectileKind::Bomb(fuse) = projectile.kind else {
            continue;
        };
        if !projectile.detonate() {
            continue;
        }

        let center = transform.translation.truncate();
        let mut hits = Vec::new();

        for target in spatial.query_circle(center, fuse.radius) {
            if projectile.ignores(target) {
                continue;
            }
            let Ok(target_transform) = targets.get(target) else {
                continue;
            };
            let Some(hit) = explosion_hit(
                center,
                fuse.radius,
                target,
                target_transform.translation.truncate(),
                projectile.damage,
                projectile.knockback,
            ) else {
                continue;
            };

            crate::logger::log(&format!(
                "💣 Explosion hits {:?}: ratio {:.2}, damage {:.1}",
                target, hit.ratio, hit.damage
            ));
            damage_requests.write(DamageRequest {
                target,
                source: projectile.owner,
                base_damage: hit.damage,
                base_knockback: hit.knockback,
                direction: hit.direction,
            });
            hits.push(target);
        }

        crate::logger::log_info(&format!(
            "💥 Bomb {:?} exploded at ({:.2}, {:.2}), {} target(s)",
            entity,
            center.x,
            center.y,
            hits.len()
        ));
        exploded_events.write(BombExploded {
            bomb: entity,
            owner: projectile.owner,
            center,
            radius: fuse.radius,
            hits,
        });
        returns.write(ReturnToPool::issued(entity, &pool));
    }
}
