//! Headless arena backend
//!
//! Reference backend для тестов и headless demo, когда настоящий 2D движок
//! не подключен:
//! - gravity + прямая интеграция velocity → Transform
//! - горизонтальные поверхности (solid или one-way platform) и вертикальные стены
//! - overlap detection для trigger projectiles и pickups (только enter-события)
//!
//! Никакого broad phase, сортировки контактов или вращения: это заглушка
//! на границе, а не физический движок.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{PickupOverlap, ProjectileGroundContact, ProjectileOverlap};
use crate::components::{ContactState, Fighter, Hurtbox, PhysicsBody, WallSide};
use crate::items::Pickup;
use crate::locomotion::Mobility;
use crate::pool::Inactive;
use crate::projectiles::Projectile;
use crate::SimulationSet;

/// Допуск касания стены
const WALL_EPSILON: f32 = 0.02;
/// Радиус trigger'а pickup'а
const PICKUP_RADIUS: f32 = 0.5;
/// Радиус тела без Hurtbox (бомбы, выброшенное оружие)
const DEFAULT_BODY_RADIUS: f32 = 0.25;

/// Горизонтальная поверхность
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneWayPlatform {
    pub y: f32,
    pub min_x: f32,
    pub max_x: f32,
    /// true = можно пролететь снизу и спрыгнуть вниз (drop-down)
    pub one_way: bool,
}

impl OneWayPlatform {
    fn spans(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

/// Вертикальная стена
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// Геометрия арены для headless backend'а
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaGeometry {
    /// Ускорение свободного падения (units/s²), умножается на gravity_scale тела
    pub gravity: f32,
    pub surfaces: Vec<OneWayPlatform>,
    pub walls: Vec<Wall>,
    /// Ниже этой вертикальной скорости удар о землю не считается отскоком
    pub settle_speed: f32,
}

impl Default for ArenaGeometry {
    fn default() -> Self {
        Self {
            // Unity-подобная гравитация ×3 (platform fighter feel)
            gravity: 29.43,
            surfaces: vec![
                // Основная сцена
                OneWayPlatform { y: 0.0, min_x: -10.0, max_x: 10.0, one_way: false },
                // Две боковые платформы
                OneWayPlatform { y: 3.0, min_x: -7.0, max_x: -3.0, one_way: true },
                OneWayPlatform { y: 3.0, min_x: 3.0, max_x: 7.0, one_way: true },
            ],
            walls: vec![
                Wall { x: -10.0, min_y: -4.0, max_y: 0.0 },
                Wall { x: 10.0, min_y: -4.0, max_y: 0.0 },
            ],
            settle_speed: 0.5,
        }
    }
}

/// Система: gravity + интеграция + контакты с поверхностями
pub fn integrate_arena_bodies(
    time: Res<Time>,
    arena: Res<ArenaGeometry>,
    mut bodies: Query<
        (
            Entity,
            &mut PhysicsBody,
            &mut Transform,
            Option<&mut ContactState>,
            Option<&Hurtbox>,
            Option<&Mobility>,
            Option<&Projectile>,
        ),
        Without<Inactive>,
    >,
    mut ground_contacts: EventWriter<ProjectileGroundContact>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut body, mut transform, contact, hurtbox, mobility, projectile) in bodies.iter_mut() {
        body.velocity.y -= arena.gravity * body.gravity_scale * dt;

        let previous = transform.translation.truncate();
        let mut position = previous + body.velocity * dt;
        let mut grounded = false;
        let mut on_one_way_platform = false;
        let mut wall = None;

        if body.solid {
            let dropping = mobility.is_some_and(|m| m.is_dropping_down());

            // Приземление: пересекли поверхность сверху вниз
            for surface in &arena.surfaces {
                if surface.one_way && dropping {
                    continue;
                }
                let crossed = previous.y >= surface.y && position.y <= surface.y;
                if crossed && body.velocity.y <= 0.0 && surface.spans(position.x) {
                    position.y = surface.y;
                    grounded = true;
                    on_one_way_platform = surface.one_way;

                    if projectile.is_some() && body.velocity.y < -arena.settle_speed {
                        // Отражаем, затухание применяет сама бомба
                        body.velocity.y = -body.velocity.y;
                        ground_contacts.write(ProjectileGroundContact { projectile: entity });
                    } else {
                        body.velocity.y = 0.0;
                    }
                    break;
                }
            }

            // Стены: выталкиваем и отмечаем касание
            let radius = hurtbox.map_or(DEFAULT_BODY_RADIUS, |h| h.radius);
            for w in &arena.walls {
                if position.y < w.min_y || position.y > w.max_y {
                    continue;
                }
                if position.x < w.x && position.x + radius >= w.x - WALL_EPSILON {
                    position.x = w.x - radius;
                    body.velocity.x = body.velocity.x.min(0.0);
                    wall = Some(WallSide::Right);
                } else if position.x >= w.x && position.x - radius <= w.x + WALL_EPSILON {
                    position.x = w.x + radius;
                    body.velocity.x = body.velocity.x.max(0.0);
                    wall = Some(WallSide::Left);
                }
            }
        }

        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if let Some(mut contact) = contact {
            contact.grounded = grounded;
            contact.on_one_way_platform = on_one_way_platform;
            contact.wall = wall;
        }
    }
}

/// Система: trigger overlaps (bullets и pickups против игроков)
///
/// Генерирует события только на "вход" в пересечение, как trigger enter.
pub fn detect_arena_overlaps(
    mut previous_pairs: Local<HashSet<(Entity, Entity)>>,
    fighters: Query<(Entity, &Transform, &Hurtbox), With<Fighter>>,
    projectiles: Query<(Entity, &Transform, &Projectile), Without<Inactive>>,
    pickups: Query<(Entity, &Transform, &Pickup)>,
    mut projectile_overlaps: EventWriter<ProjectileOverlap>,
    mut pickup_overlaps: EventWriter<PickupOverlap>,
) {
    let mut current_pairs = HashSet::new();

    for (fighter, fighter_transform, hurtbox) in fighters.iter() {
        let fighter_pos = fighter_transform.translation.truncate();

        for (entity, transform, projectile) in projectiles.iter() {
            if !projectile.is_trigger() {
                continue;
            }
            let distance = transform.translation.truncate().distance(fighter_pos);
            if distance <= hurtbox.radius + projectile.hit_radius {
                current_pairs.insert((entity, fighter));
                if !previous_pairs.contains(&(entity, fighter)) {
                    projectile_overlaps.write(ProjectileOverlap { projectile: entity, other: fighter });
                }
            }
        }

        for (entity, transform, pickup) in pickups.iter() {
            if !pickup.is_available() {
                continue;
            }
            let distance = transform.translation.truncate().distance(fighter_pos);
            if distance <= hurtbox.radius + PICKUP_RADIUS {
                current_pairs.insert((entity, fighter));
                if !previous_pairs.contains(&(entity, fighter)) {
                    pickup_overlaps.write(PickupOverlap { pickup: entity, fighter });
                }
            }
        }
    }

    *previous_pairs = current_pairs;
}

/// Plugin: headless backend (подключается вместо настоящего движка)
pub struct HeadlessArenaPlugin;

impl Plugin for HeadlessArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaGeometry>().add_systems(
            FixedUpdate,
            (integrate_arena_bodies, detect_arena_overlaps)
                .chain()
                .in_set(SimulationSet::Physics),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_span() {
        let platform = OneWayPlatform { y: 3.0, min_x: -1.0, max_x: 1.0, one_way: true };
        assert!(platform.spans(0.0));
        assert!(platform.spans(1.0));
        assert!(!platform.spans(1.5));
    }

    #[test]
    fn test_default_arena_has_solid_stage() {
        let arena = ArenaGeometry::default();
        assert!(arena.surfaces.iter().any(|s| !s.one_way && s.spans(0.0)));
        assert!(arena.gravity > 0.0);
    }
}
