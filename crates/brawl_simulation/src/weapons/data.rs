//! Weapon definitions: статические blueprints
//!
//! **WeaponData**: immutable параметры оружия (урон, темп, магазин, projectile).
//! **WeaponCatalog**: resource `WeaponId → WeaponData`, hardcoded default content.
//!
//! Runtime состояние (патроны, таймеры) живёт в `WeaponInstance`.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};

// ============================================================================
// WeaponId
// ============================================================================

/// Weapon identifier
///
/// # Examples
/// - "pistol"
/// - "shotgun"
/// - "bomb"
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct WeaponId(pub String);

impl From<&str> for WeaponId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for WeaponId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// WeaponData
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Горизонтальные пули по facing
    Gun,
    /// Бросок по дуге (throw angle)
    Bomb,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct WeaponData {
    pub name: String,
    pub kind: WeaponKind,
    pub base_damage: f32,
    pub base_knockback: f32,
    /// Выстрелов в секунду
    pub fire_rate: f32,
    pub max_ammo: u32,
    /// Секунды
    pub reload_time: f32,
    /// Имя projectile prefab'а (= tag пула)
    pub projectile: String,
    pub projectile_speed: f32,
    /// > 1 = shotgun spread
    pub projectiles_per_shot: u32,
    /// Полный угол веера для projectiles_per_shot > 1
    pub spread_degrees: f32,
    pub throw_angle_degrees: f32,
    pub throw_force: f32,
}

impl Default for WeaponData {
    fn default() -> Self {
        Self::pistol()
    }
}

impl WeaponData {
    pub fn pistol() -> Self {
        Self {
            name: "Pistol".into(),
            kind: WeaponKind::Gun,
            base_damage: 10.0,
            base_knockback: 5.0,
            fire_rate: 1.0,
            max_ammo: 10,
            reload_time: 2.0,
            projectile: "Bullet".into(),
            projectile_speed: 20.0,
            projectiles_per_shot: 1,
            spread_degrees: 0.0,
            throw_angle_degrees: 45.0,
            throw_force: 15.0,
        }
    }

    pub fn shotgun() -> Self {
        Self {
            name: "Shotgun".into(),
            base_damage: 6.0,
            base_knockback: 7.0,
            fire_rate: 0.8,
            max_ammo: 6,
            projectile_speed: 18.0,
            projectiles_per_shot: 3,
            spread_degrees: 20.0,
            ..Self::pistol()
        }
    }

    pub fn rifle() -> Self {
        Self {
            name: "Rifle".into(),
            base_damage: 4.0,
            base_knockback: 2.5,
            fire_rate: 8.0,
            max_ammo: 30,
            projectile_speed: 28.0,
            ..Self::pistol()
        }
    }

    pub fn cannon() -> Self {
        Self {
            name: "Cannon".into(),
            base_damage: 18.0,
            base_knockback: 14.0,
            fire_rate: 0.5,
            max_ammo: 4,
            projectile: "HeavyBullet".into(),
            projectile_speed: 14.0,
            ..Self::pistol()
        }
    }

    pub fn bomb() -> Self {
        Self {
            name: "Bomb".into(),
            kind: WeaponKind::Bomb,
            base_damage: 20.0,
            base_knockback: 10.0,
            fire_rate: 1.0,
            max_ammo: 3,
            projectile: "Bomb".into(),
            ..Self::pistol()
        }
    }

    /// Интервал между выстрелами (1 / fire_rate)
    pub fn fire_interval(&self) -> f32 {
        if self.fire_rate > 0.0 {
            1.0 / self.fire_rate
        } else {
            f32::INFINITY
        }
    }

    /// Начальные скорости projectiles одного выстрела
    ///
    /// - Gun: горизонтально по facing, веер на spread_degrees
    /// - Bomb: (cos θ, sin θ), x по facing, × throw_force
    pub fn launch_velocities(&self, facing: f32) -> Vec<Vec2> {
        let facing = if facing < 0.0 { -1.0 } else { 1.0 };
        match self.kind {
            WeaponKind::Gun => {
                let count = self.projectiles_per_shot.max(1);
                let step = if count > 1 {
                    self.spread_degrees / (count - 1) as f32
                } else {
                    0.0
                };
                let start = -self.spread_degrees / 2.0;
                (0..count)
                    .map(|i| {
                        let angle = if count > 1 { start + step * i as f32 } else { 0.0 };
                        let radians = angle.to_radians();
                        Vec2::new(radians.cos() * facing, radians.sin()) * self.projectile_speed
                    })
                    .collect()
            }
            WeaponKind::Bomb => {
                let radians = self.throw_angle_degrees.to_radians();
                let direction = Vec2::new(radians.cos() * facing, radians.sin()).normalize_or_zero();
                vec![direction * self.throw_force]
            }
        }
    }

    /// Все проблемы конфигурации (пустой список = ок)
    pub fn validate(&self) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.fire_rate <= 0.0 {
            errors.push(SimulationError::configuration(format!("{}: fire rate must be positive", self.name)));
        }
        if self.max_ammo == 0 {
            errors.push(SimulationError::configuration(format!("{}: max ammo must be positive", self.name)));
        }
        if self.reload_time < 0.0 {
            errors.push(SimulationError::configuration(format!("{}: negative reload time", self.name)));
        }
        if self.projectile.is_empty() {
            errors.push(SimulationError::configuration(format!("{}: no projectile prefab", self.name)));
        }
        errors
    }
}

// ============================================================================
// WeaponCatalog
// ============================================================================

/// Registry всех оружий
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponCatalog {
    weapons: HashMap<WeaponId, WeaponData>,
}

impl WeaponCatalog {
    pub fn empty() -> Self {
        Self { weapons: HashMap::new() }
    }

    pub fn register(&mut self, id: impl Into<WeaponId>, data: WeaponData) {
        self.weapons.insert(id.into(), data);
    }

    pub fn get(&self, id: &WeaponId) -> Option<&WeaponData> {
        self.weapons.get(id)
    }

    /// Lookup с ConfigurationError вместо None
    pub fn require(&self, id: &WeaponId) -> SimResult<&WeaponData> {
        self.get(id)
            .ok_or_else(|| SimulationError::configuration(format!("unknown weapon '{}'", id)))
    }

    pub fn contains(&self, id: &WeaponId) -> bool {
        self.weapons.contains_key(id)
    }

    /// Отсортированные ids (детерминированный порядок для random pick)
    pub fn ids(&self) -> Vec<WeaponId> {
        let mut ids: Vec<WeaponId> = self.weapons.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Оружия, которые можно подобрать (всё кроме bomb kind)
    pub fn pickup_ids(&self) -> Vec<WeaponId> {
        self.ids()
            .into_iter()
            .filter(|id| self.weapons.get(id).is_some_and(|w| w.kind == WeaponKind::Gun))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WeaponId, &WeaponData)> {
        self.weapons.iter()
    }
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.register("pistol", WeaponData::pistol());
        catalog.register("shotgun", WeaponData::shotgun());
        catalog.register("rifle", WeaponData::rifle());
        catalog.register("cannon", WeaponData::cannon());
        catalog.register("bomb", WeaponData::bomb());
        catalog
    }
}
