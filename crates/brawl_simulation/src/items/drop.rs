//! Drop profiles: что может выпасть из spawner'а
//!
//! **DropProfile**: kind + weight + payload id (слабая ссылка в каталоги) + visual metadata.
//! **DropTable**: взвешенный выбор профиля.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::{EffectCatalog, EffectId};
use crate::error::SimulationError;
use crate::weapons::{WeaponCatalog, WeaponId};

/// Содержимое pickup'а
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub enum DropPayload {
    Effect(EffectId),
    Weapon(WeaponId),
    /// Hidden weapon: выбирается при подборе, выдаётся после reveal
    WeaponCrate(Vec<CrateEntry>),
}

/// Оружие в пуле crate'а
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct CrateEntry {
    pub weapon: WeaponId,
    pub weight: f32,
}

impl CrateEntry {
    pub fn new(weapon: &str, weight: f32) -> Self {
        Self {
            weapon: weapon.into(),
            weight,
        }
    }
}

impl DropPayload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DropPayload::Effect(_) => "Effect",
            DropPayload::Weapon(_) => "Weapon",
            DropPayload::WeaponCrate(_) => "WeaponCrate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct DropProfile {
    pub name: String,
    pub payload: DropPayload,
    /// Вес в таблице (≥ 0)
    pub weight: f32,
    /// Имя иконки для presentation слоя
    pub icon: String,
    /// RGBA
    pub color: [f32; 4],
}

impl DropProfile {
    pub fn new(name: &str, payload: DropPayload, weight: f32) -> Self {
        Self {
            name: name.to_string(),
            payload,
            weight,
            icon: name.to_lowercase().replace(' ', "_"),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// Взвешенный выбор: первый элемент, чей накопленный вес ≥ roll.
///
/// roll ожидается в [0, total]. Если ни один не подошёл: первый элемент.
pub fn weighted_pick<T>(items: &[T], weight: impl Fn(&T) -> f32, roll: f32) -> Option<&T> {
    let mut cumulative = 0.0;
    for item in items {
        cumulative += weight(item).max(0.0);
        if roll <= cumulative {
            return Some(item);
        }
    }
    items.first()
}

/// Таблица лута
#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct DropTable {
    pub profiles: Vec<DropProfile>,
}

impl DropTable {
    pub fn new(profiles: Vec<DropProfile>) -> Self {
        Self { profiles }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.profiles.iter().map(|p| p.weight.max(0.0)).sum()
    }

    /// Профиль для roll ∈ [0, total_weight]. Пустая таблица → None.
    pub fn select(&self, roll: f32) -> Option<&DropProfile> {
        weighted_pick(&self.profiles, |p| p.weight, roll)
    }

    /// Все ConfigurationError таблицы (пустая, отрицательные веса, битые ссылки)
    pub fn validate(&self, weapons: &WeaponCatalog, effects: &EffectCatalog) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.is_empty() {
            errors.push(SimulationError::configuration("loot table is empty, no items will spawn"));
        }
        for profile in &self.profiles {
            if profile.weight < 0.0 {
                errors.push(SimulationError::configuration(format!(
                    "{} has negative weight {}",
                    profile.name, profile.weight
                )));
            }
            match &profile.payload {
                DropPayload::Effect(id) if !effects.contains(id) => errors.push(SimulationError::configuration(
                    format!("{} references unknown effect '{}'", profile.name, id),
                )),
                DropPayload::Weapon(id) if !weapons.contains(id) => errors.push(SimulationError::configuration(
                    format!("{} references unknown weapon '{}'", profile.name, id),
                )),
                DropPayload::WeaponCrate(pool) => {
                    if pool.is_empty() {
                        errors.push(SimulationError::configuration(format!("{} crate has no weapons", profile.name)));
                    }
                    for entry in pool.iter().filter(|e| !weapons.contains(&e.weapon)) {
                        errors.push(SimulationError::configuration(format!(
                            "{} crate references unknown weapon '{}'",
                            profile.name, entry.weapon
                        )));
                    }
                }
                _ => {}
            }
        }
        errors
    }

    /// Стандартный лут арены
    pub fn default_loot() -> Self {
        Self::new(vec![
            DropProfile::new("Speed Up", DropPayload::Effect("speed_up".into()), 3.0).with_color([0.3, 0.9, 0.3, 1.0]),
            DropProfile::new("Slow Down", DropPayload::Effect("slow_down".into()), 2.0).with_color([0.9, 0.5, 0.2, 1.0]),
            DropProfile::new("Reverse", DropPayload::Effect("reverse".into()), 1.0).with_color([0.7, 0.2, 0.9, 1.0]),
            DropProfile::new("Shield", DropPayload::Effect("shield".into()), 2.0).with_color([0.2, 0.6, 1.0, 1.0]),
            DropProfile::new("Silence", DropPayload::Effect("silence".into()), 1.0).with_color([0.5, 0.5, 0.5, 1.0]),
            DropProfile::new("Triple Jump", DropPayload::Effect("triple_jump".into()), 2.0),
            DropProfile::new("Double Ammo", DropPayload::Effect("double_ammo".into()), 3.0),
            DropProfile::new("Shotgun", DropPayload::Weapon("shotgun".into()), 2.0),
            DropProfile::new("Rifle", DropPayload::Weapon("rifle".into()), 2.0),
            DropProfile::new(
                "Weapon Crate",
                DropPayload::WeaponCrate(vec![
                    CrateEntry::new("shotgun", 3.0),
                    CrateEntry::new("rifle", 3.0),
                    CrateEntry::new("cannon", 1.0),
                ]),
                1.0,
            ),
        ])
    }
}
