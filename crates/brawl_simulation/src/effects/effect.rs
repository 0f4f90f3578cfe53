//! Effect definitions: что делает эффект и как долго
//!
//! **EffectKind**: вид эффекта (мгновенный или длительный).
//! **EffectSpec**: blueprint из каталога (kind + duration + buff + target policy).
//! **EffectInstance**: runtime копия на конкретном игроке.
//!
//! Hooks `apply` / `remove` / `update` / `is_expired`: один `match` по kind.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::Combatant;
use crate::error::{SimResult, SimulationError};
use crate::locomotion::Mobility;
use crate::weapons::{Loadout, WeaponCatalog, WeaponChanged, WeaponId, WeaponInstance};

// ============================================================================
// Ids & kinds
// ============================================================================

/// Effect identifier
///
/// # Examples
/// - "speed_up"
/// - "silence"
/// - "grant:rifle" (выдача оружия с weapon pickup'а)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct EffectId(pub String);

impl From<&str> for EffectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// На кого действует эффект при подборе
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Тот, кто подобрал
    #[default]
    Picker,
    /// Каждый другой живой игрок (независимо)
    Others,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub enum EffectKind {
    // Мгновенные
    DoubleAmmo,
    GrantWeapon(WeaponId),

    // Длительные
    /// Множитель скорости (1.3 speed up, 0.7 slow down)
    SpeedChange { multiplier: f32 },
    ReverseControls,
    Shield,
    Silence,
    TripleJump,
}

/// Доступ эффекта к компонентам цели
pub struct EffectTarget<'a> {
    pub entity: Entity,
    pub combatant: &'a mut Combatant,
    pub mobility: &'a mut Mobility,
    pub loadout: &'a mut Loadout,
    pub catalog: &'a WeaponCatalog,
}

impl EffectKind {
    /// Мгновенный эффект снимается сразу после apply
    pub fn is_instant(&self) -> bool {
        matches!(self, EffectKind::DoubleAmmo | EffectKind::GrantWeapon(_))
    }

    /// Apply hook. Возвращает WeaponChanged для weapon grant.
    pub fn apply(&self, target: &mut EffectTarget) -> SimResult<Option<WeaponChanged>> {
        match self {
            EffectKind::DoubleAmmo => {
                let ammo = target.loadout.double_ammo();
                crate::logger::log(&format!("📦 {:?} double ammo → {}", target.entity, ammo));
            }
            EffectKind::GrantWeapon(id) => {
                let data = target.catalog.require(id)?.clone();
                let previous = target.loadout.current().id.clone();
                target.loadout.equip_pickup(WeaponInstance::new(id.clone(), data));
                return Ok(Some(WeaponChanged {
                    entity: target.entity,
                    previous,
                    current: id.clone(),
                }));
            }
            EffectKind::SpeedChange { multiplier } => target.mobility.scale_speed(*multiplier),
            EffectKind::ReverseControls => target.mobility.reverse(),
            EffectKind::Shield => target.combatant.raise_shield(),
            EffectKind::Silence => target.loadout.silence(),
            EffectKind::TripleJump => target.mobility.enable_triple_jump(),
        }
        Ok(None)
    }

    /// Remove hook: откат ровно того, что сделал apply
    pub fn remove(&self, target: &mut EffectTarget) {
        match self {
            EffectKind::DoubleAmmo | EffectKind::GrantWeapon(_) => {}
            EffectKind::SpeedChange { multiplier } => target.mobility.unscale_speed(*multiplier),
            EffectKind::ReverseControls => target.mobility.unreverse(),
            EffectKind::Shield => target.combatant.lower_shield(),
            EffectKind::Silence => target.loadout.unsilence(),
            EffectKind::TripleJump => target.mobility.disable_triple_jump(),
        }
    }

    /// Per-tick hook (сейчас все эффекты статичны)
    pub fn update(&self, _target: &mut EffectTarget, _delta: f32) {}
}

// ============================================================================
// Spec & instance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct EffectSpec {
    pub name: String,
    pub kind: EffectKind,
    /// Секунды (игнорируется мгновенными эффектами)
    pub duration: f32,
    pub is_buff: bool,
    pub targeting: TargetPolicy,
}

impl EffectSpec {
    pub fn new(name: &str, kind: EffectKind, duration: f32, is_buff: bool, targeting: TargetPolicy) -> Self {
        Self {
            name: name.to_string(),
            kind,
            duration,
            is_buff,
            targeting,
        }
    }

    /// Эффект выдачи оружия (weapon pickup / crate)
    pub fn grant_weapon(weapon: &WeaponId) -> Self {
        Self::new(
            &format!("Weapon: {}", weapon),
            EffectKind::GrantWeapon(weapon.clone()),
            0.0,
            true,
            TargetPolicy::Picker,
        )
    }

    pub fn instantiate(&self, id: EffectId) -> EffectInstance {
        EffectInstance {
            id,
            kind: self.kind.clone(),
            targeting: self.targeting,
            duration: self.duration,
            remaining: self.duration,
            is_buff: self.is_buff,
            active: false,
            target: None,
        }
    }

    pub fn validate(&self) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(SimulationError::configuration("effect name cannot be empty"));
        }
        if !self.kind.is_instant() && self.duration <= 0.0 {
            errors.push(SimulationError::configuration(format!(
                "{} has invalid duration: {}",
                self.name, self.duration
            )));
        }
        if let EffectKind::SpeedChange { multiplier } = self.kind {
            if multiplier <= 0.0 {
                errors.push(SimulationError::configuration(format!(
                    "{} has non-positive speed multiplier {}",
                    self.name, multiplier
                )));
            }
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct EffectInstance {
    pub id: EffectId,
    pub kind: EffectKind,
    pub targeting: TargetPolicy,
    pub duration: f32,
    pub remaining: f32,
    pub is_buff: bool,
    pub active: bool,
    pub target: Option<Entity>,
}

impl EffectInstance {
    pub fn is_expired(&self) -> bool {
        !self.active || self.remaining <= 0.0
    }

    /// remaining / duration в [0, 1]
    pub fn remaining_fraction(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Registry эффектов (`EffectId → EffectSpec`)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectCatalog {
    effects: HashMap<EffectId, EffectSpec>,
}

impl EffectCatalog {
    pub fn empty() -> Self {
        Self { effects: HashMap::new() }
    }

    pub fn register(&mut self, id: impl Into<EffectId>, spec: EffectSpec) {
        self.effects.insert(id.into(), spec);
    }

    pub fn get(&self, id: &EffectId) -> Option<&EffectSpec> {
        self.effects.get(id)
    }

    pub fn require(&self, id: &EffectId) -> SimResult<&EffectSpec> {
        self.get(id)
            .ok_or_else(|| SimulationError::configuration(format!("unknown effect '{}'", id)))
    }

    pub fn contains(&self, id: &EffectId) -> bool {
        self.effects.contains_key(id)
    }

    pub fn ids(&self) -> Vec<EffectId> {
        let mut ids: Vec<EffectId> = self.effects.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectId, &EffectSpec)> {
        self.effects.iter()
    }
}

impl Default for EffectCatalog {
    fn default() -> Self {
        use EffectKind::*;
        use TargetPolicy::*;

        let mut catalog = Self::empty();
        catalog.register("speed_up", EffectSpec::new("Speed Up", SpeedChange { multiplier: 1.3 }, 5.0, true, Picker));
        catalog.register("slow_down", EffectSpec::new("Slow Down", SpeedChange { multiplier: 0.7 }, 5.0, false, Others));
        catalog.register("reverse", EffectSpec::new("Reverse", ReverseControls, 5.0, false, Others));
        catalog.register("shield", EffectSpec::new("Shield", Shield, 5.0, true, Picker));
        catalog.register("silence", EffectSpec::new("Silence", Silence, 5.0, false, Others));
        catalog.register("triple_jump", EffectSpec::new("Triple Jump", TripleJump, 10.0, true, Picker));
        catalog.register("double_ammo", EffectSpec::new("Double Ammo", DoubleAmmo, 0.0, true, Picker));
        catalog
    }
}
