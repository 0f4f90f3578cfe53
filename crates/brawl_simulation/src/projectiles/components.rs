//! Projectile components
//!
//! - `Projectile`: runtime state (owner, damage, lifetime, kind)
//! - `ProjectileKind::Bomb`: fuse, bounce, explosion radius
//! - `ProjectilePrefab` / `ProjectilePrefabs`: blueprints для pool instancing

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::PhysicsBody;
use crate::pool::Poolable;

// ============================================================================
// Projectile
// ============================================================================

/// Состояние бомбы
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BombFuse {
    /// Задержка до взрыва (секунды)
    pub delay: f32,
    pub countdown: f32,
    pub radius: f32,
    /// Множитель скорости при ударе о землю
    pub bounce_factor: f32,
    pub landed: bool,
    pub exploded: bool,
}

impl BombFuse {
    pub fn new(delay: f32, radius: f32, bounce_factor: f32) -> Self {
        Self {
            delay,
            countdown: delay,
            radius,
            bounce_factor,
            landed: false,
            exploded: false,
        }
    }

    fn rearm(&mut self) {
        self.countdown = self.delay;
        self.landed = false;
        self.exploded = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ProjectileKind {
    /// Trigger пуля: урон при первом пересечении
    Bullet,
    /// Solid бомба: урон только при взрыве
    Bomb(BombFuse),
}

/// Что случилось за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileTick {
    Alive,
    /// Пуля отжила lifetime → в pool
    Expired,
    /// Бомба должна взорваться (fuse или lifetime)
    Detonate,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Слабая ссылка: владелец может исчезнуть раньше пули
    pub owner: Option<Entity>,
    pub damage: f32,
    pub knockback: f32,
    /// Скорость на момент выстрела (направление отлёта)
    pub velocity: Vec2,
    pub lifetime: f32,
    remaining: f32,
    pub ignore_owner: bool,
    pub destroy_on_hit: bool,
    /// Радиус trigger'а пули
    pub hit_radius: f32,
    /// Пуля уже попала и ждёт возврата в pool
    spent: bool,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn bullet(lifetime: f32) -> Self {
        Self {
            owner: None,
            damage: 0.0,
            knockback: 0.0,
            velocity: Vec2::ZERO,
            lifetime,
            remaining: lifetime,
            ignore_owner: true,
            destroy_on_hit: true,
            hit_radius: 0.1,
            spent: false,
            kind: ProjectileKind::Bullet,
        }
    }

    pub fn bomb(lifetime: f32, fuse: BombFuse) -> Self {
        Self {
            kind: ProjectileKind::Bomb(fuse),
            ..Self::bullet(lifetime)
        }
    }

    /// Сброс перед выстрелом: lifetime и fuse с начала
    pub fn initialize(&mut self, owner: Option<Entity>, damage: f32, knockback: f32, velocity: Vec2) {
        self.owner = owner;
        self.damage = damage;
        self.knockback = knockback;
        self.velocity = velocity;
        self.remaining = self.lifetime;
        self.spent = false;
        if let ProjectileKind::Bomb(fuse) = &mut self.kind {
            fuse.rearm();
        }
    }

    pub fn remaining_lifetime(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self.kind, ProjectileKind::Bomb(_))
    }

    /// Trigger projectiles генерируют overlap события, бомбы: нет
    pub fn is_trigger(&self) -> bool {
        !self.is_bomb() && !self.spent
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn mark_spent(&mut self) {
        self.spent = true;
    }

    /// Игнорировать ли столкновение с `other`
    pub fn ignores(&self, other: Entity) -> bool {
        self.ignore_owner && self.owner == Some(other)
    }

    pub fn tick(&mut self, delta: f32) -> ProjectileTick {
        if self.spent {
            return ProjectileTick::Alive;
        }
        self.remaining -= delta;

        match &mut self.kind {
            ProjectileKind::Bullet => {
                if self.remaining <= 0.0 {
                    self.spent = true;
                    ProjectileTick::Expired
                } else {
                    ProjectileTick::Alive
                }
            }
            ProjectileKind::Bomb(fuse) => {
                if fuse.exploded {
                    return ProjectileTick::Alive;
                }
                if self.remaining <= 0.0 {
                    return ProjectileTick::Detonate;
                }
                fuse.countdown -= delta;
                if fuse.countdown <= 0.0 {
                    ProjectileTick::Detonate
                } else {
                    ProjectileTick::Alive
                }
            }
        }
    }

    /// Пометить взрыв. `false` если бомба уже взорвалась (или это не бомба)
    pub fn detonate(&mut self) -> bool {
        match &mut self.kind {
            ProjectileKind::Bomb(fuse) if !fuse.exploded => {
                fuse.exploded = true;
                self.spent = true;
                true
            }
            _ => false,
        }
    }

    /// Удар бомбы о землю: гасим скорость, отмечаем приземление.
    /// Урон НЕ наносится.
    pub fn land(&mut self, velocity: Vec2) -> Vec2 {
        match &mut self.kind {
            ProjectileKind::Bomb(fuse) => {
                fuse.landed = true;
                velocity * fuse.bounce_factor
            }
            ProjectileKind::Bullet => velocity,
        }
    }
}

impl Poolable for Projectile {
    fn reset_for_pool(&mut self) {
        self.owner = None;
        self.velocity = Vec2::ZERO;
        self.remaining = self.lifetime;
        self.spent = false;
        if let ProjectileKind::Bomb(fuse) = &mut self.kind {
            fuse.rearm();
        }
    }
}

// ============================================================================
// Explosion falloff
// ============================================================================

/// Одна цель взрыва
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionHit {
    pub target: Entity,
    /// 1 - distance / radius
    pub ratio: f32,
    pub damage: f32,
    pub knockback: f32,
    pub direction: Vec2,
}

/// Линейный falloff: цели на краю радиуса и дальше пропускаются
pub fn explosion_hit(
    center: Vec2,
    radius: f32,
    target: Entity,
    target_position: Vec2,
    damage: f32,
    knockback: f32,
) -> Option<ExplosionHit> {
    if radius <= 0.0 {
        return None;
    }
    let distance = center.distance(target_position);
    let ratio = 1.0 - distance / radius;
    if ratio <= 0.0 {
        return None;
    }

    Some(ExplosionHit {
        target,
        ratio,
        damage: damage * ratio,
        knockback: knockback * ratio,
        direction: (target_position - center).normalize_or_zero(),
    })
}

// ============================================================================
// Prefabs
// ============================================================================

/// Blueprint projectile'а (pool instancing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectilePrefab {
    pub name: String,
    pub lifetime: f32,
    pub hit_radius: f32,
    pub ignore_owner: bool,
    pub destroy_on_hit: bool,
    pub bomb: Option<BombPrefab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombPrefab {
    pub explosion_delay: f32,
    pub explosion_radius: f32,
    pub bounce_factor: f32,
    pub gravity_scale: f32,
}

impl ProjectilePrefab {
    pub fn bullet(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lifetime: 5.0,
            hit_radius: 0.1,
            ignore_owner: true,
            destroy_on_hit: true,
            bomb: None,
        }
    }

    pub fn bomb(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lifetime: 5.0,
            hit_radius: 0.2,
            ignore_owner: true,
            destroy_on_hit: false,
            bomb: Some(BombPrefab {
                explosion_delay: 2.0,
                explosion_radius: 3.0,
                bounce_factor: 0.3,
                gravity_scale: 1.0,
            }),
        }
    }

    pub fn instantiate(&self) -> Projectile {
        let mut projectile = match &self.bomb {
            Some(bomb) => Projectile::bomb(
                self.lifetime,
                BombFuse::new(bomb.explosion_delay, bomb.explosion_radius, bomb.bounce_factor),
            ),
            None => Projectile::bullet(self.lifetime),
        };
        projectile.hit_radius = self.hit_radius;
        projectile.ignore_owner = self.ignore_owner;
        projectile.destroy_on_hit = self.destroy_on_hit;
        projectile
    }

    /// Тело: бомба: solid с гравитацией, пуля: trigger без гравитации
    pub fn body(&self, velocity: Vec2) -> PhysicsBody {
        let mut body = match &self.bomb {
            Some(bomb) => PhysicsBody {
                gravity_scale: bomb.gravity_scale,
                ..default()
            },
            None => PhysicsBody::kinematic_trigger(),
        };
        body.velocity = velocity;
        body
    }
}

/// Registry prefab'ов (name → blueprint)
#[derive(Resource, Debug, Clone)]
pub struct ProjectilePrefabs {
    prefabs: HashMap<String, ProjectilePrefab>,
}

impl ProjectilePrefabs {
    pub fn empty() -> Self {
        Self { prefabs: HashMap::new() }
    }

    pub fn register(&mut self, prefab: ProjectilePrefab) {
        self.prefabs.insert(prefab.name.clone(), prefab);
    }

    pub fn get(&self, name: &str) -> Option<&ProjectilePrefab> {
        self.prefabs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prefabs.contains_key(name)
    }
}

impl Default for ProjectilePrefabs {
    fn default() -> Self {
        let mut prefabs = Self::empty();
        prefabs.register(ProjectilePrefab::bullet("Bullet"));
        prefabs.register(ProjectilePrefab::bullet("HeavyBullet"));
        prefabs.register(ProjectilePrefab::bomb("Bomb"));
        prefabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bomb() -> Projectile {
        let mut projectile = ProjectilePrefab::bomb("Bomb").instantiate();
        projectile.initialize(None, 20.0, 10.0, Vec2::new(1.0, 1.0));
        projectile
    }

    #[test]
    fn test_bullet_expires_once() {
        let mut bullet = Projectile::bullet(0.1);
        assert_eq!(bullet.tick(0.05), ProjectileTick::Alive);
        assert_eq!(bullet.tick(0.06), ProjectileTick::Expired);
        // Уже spent: повторно не expire'ится
        assert_eq!(bullet.tick(0.06), ProjectileTick::Alive);
        assert!(!bullet.is_trigger());
    }

    #[test]
    fn test_bomb_detonates_on_fuse() {
        let mut bomb = bomb();
        assert_eq!(bomb.tick(1.9), ProjectileTick::Alive);
        assert_eq!(bomb.tick(0.2), ProjectileTick::Detonate);
        assert!(bomb.detonate());
        assert!(!bomb.detonate());
        assert_eq!(bomb.tick(0.1), ProjectileTick::Alive);
    }

    #[test]
    fn test_bomb_detonates_on_lifetime_before_fuse() {
        let mut bomb = bomb();
        bomb.lifetime = 1.0;
        bomb.initialize(None, 20.0, 10.0, Vec2::ZERO);
        assert_eq!(bomb.tick(1.0), ProjectileTick::Detonate);
    }

    #[test]
    fn test_bomb_is_never_a_trigger() {
        let bomb = bomb();
        assert!(!bomb.is_trigger());
        assert!(Projectile::bullet(1.0).is_trigger());
    }

    #[test]
    fn test_land_applies_bounce_factor() {
        let mut bomb = bomb();
        let v = bomb.land(Vec2::new(4.0, 10.0));
        assert!((v.x - 1.2).abs() < 1e-5);
        assert!((v.y - 3.0).abs() < 1e-5);
        let ProjectileKind::Bomb(fuse) = bomb.kind else {
            panic!("expected bomb");
        };
        assert!(fuse.landed);
    }

    #[test]
    fn test_reset_for_pool_rearms_fuse() {
        let mut bomb = bomb();
        bomb.owner = Some(Entity::from_raw(7));
        bomb.tick(2.5);
        bomb.detonate();

        bomb.reset_for_pool();

        assert_eq!(bomb.owner, None);
        assert!(!bomb.is_spent());
        assert_eq!(bomb.remaining_lifetime(), bomb.lifetime);
        let ProjectileKind::Bomb(fuse) = bomb.kind else {
            panic!("expected bomb");
        };
        assert!(!fuse.exploded);
        assert_eq!(fuse.countdown, fuse.delay);
    }

    #[test]
    fn test_explosion_falloff_half_radius() {
        let target = Entity::from_raw(1);
        let hit = explosion_hit(Vec2::ZERO, 3.0, target, Vec2::new(1.5, 0.0), 20.0, 10.0).unwrap();
        assert!((hit.ratio - 0.5).abs() < 1e-5);
        assert!((hit.damage - 10.0).abs() < 1e-5);
        assert!((hit.knockback - 5.0).abs() < 1e-5);
        assert_eq!(hit.direction, Vec2::X);
    }

    #[test]
    fn test_explosion_skips_edge_and_beyond() {
        let target = Entity::from_raw(1);
        assert!(explosion_hit(Vec2::ZERO, 3.0, target, Vec2::new(3.0, 0.0), 20.0, 10.0).is_none());
        assert!(explosion_hit(Vec2::ZERO, 3.0, target, Vec2::new(0.0, 4.0), 20.0, 10.0).is_none());
    }

    #[test]
    fn test_ignores_owner_only_when_configured() {
        let owner = Entity::from_raw(3);
        let mut bullet = Projectile::bullet(1.0);
        bullet.initialize(Some(owner), 10.0, 5.0, Vec2::X);
        assert!(bullet.ignores(owner));
        bullet.ignore_owner = false;
        assert!(!bullet.ignores(owner));
    }
}
