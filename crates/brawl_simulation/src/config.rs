//! SimulationConfig: все настраиваемые параметры симуляции одним RON документом
//!
//! ```ron
//! (
//!     combat: (max_damage_percent: 200.0, invulnerability_duration: 0.05, ...),
//!     effects: (max_active_effects: 10),
//!     match_rules: (stocks: 3, round_time: 300.0, ...),
//! )
//! ```
//! Отсутствующие секции берутся из `Default`. Каталоги (оружие, эффекты,
//! prefabs): отдельные resources с hard-coded контентом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{CombatSettings, Combatant};
use crate::components::Fighter;
use crate::effects::{ActiveEffects, EffectCatalog, DEFAULT_MAX_ACTIVE_EFFECTS};
use crate::error::{SimResult, SimulationError};
use crate::items::ItemSettings;
use crate::locomotion::LocomotionSettings;
use crate::pool::PoolSettings;
use crate::projectiles::ProjectilePrefabs;
use crate::session::{MatchRules, MatchState};
use crate::weapons::{WeaponCatalog, WeaponSettings};

/// Секция `effects`
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    pub max_active_effects: usize,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            max_active_effects: DEFAULT_MAX_ACTIVE_EFFECTS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub combat: CombatSettings,
    pub effects: EffectSettings,
    pub locomotion: LocomotionSettings,
    pub weapons: WeaponSettings,
    pub pools: PoolSettings,
    pub match_rules: MatchRules,
    pub items: ItemSettings,
}

impl SimulationConfig {
    pub fn from_ron_str(source: &str) -> SimResult<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron_string(&self) -> SimResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SimulationError::configuration(format!("cannot serialize config: {}", e)))
    }

    /// Все ConfigurationError конфига против каталогов (пустой список = ок)
    pub fn validate(
        &self,
        weapons: &WeaponCatalog,
        effects: &EffectCatalog,
        prefabs: &ProjectilePrefabs,
    ) -> Vec<SimulationError> {
        let mut errors = Vec::new();

        if self.combat.max_damage_percent <= 0.0 {
            errors.push(SimulationError::configuration("combat.max_damage_percent must be positive"));
        }
        if self.combat.invulnerability_duration < 0.0 {
            errors.push(SimulationError::configuration("combat.invulnerability_duration is negative"));
        }
        if self.effects.max_active_effects == 0 {
            errors.push(SimulationError::configuration("effects.max_active_effects must be at least 1"));
        }
        errors.extend(self.locomotion.validate());

        // Оружие
        if !weapons.contains(&self.weapons.starting_weapon) {
            errors.push(SimulationError::configuration(format!(
                "weapons.starting_weapon '{}' is not in the catalog",
                self.weapons.starting_weapon
            )));
        }
        if let Some(bomb) = self.weapons.bomb_weapon.as_ref().filter(|id| !weapons.contains(id)) {
            errors.push(SimulationError::configuration(format!(
                "weapons.bomb_weapon '{}' is not in the catalog",
                bomb
            )));
        }
        for id in weapons.ids() {
            let Some(data) = weapons.get(&id) else {
                continue;
            };
            errors.extend(data.validate());
            if !data.projectile.is_empty() && !prefabs.contains(&data.projectile) {
                errors.push(SimulationError::configuration(format!(
                    "weapon '{}' uses unknown projectile prefab '{}'",
                    id, data.projectile
                )));
            }
        }

        // Эффекты
        for id in effects.ids() {
            if let Some(spec) = effects.get(&id) {
                errors.extend(spec.validate());
            }
        }

        // Пулы
        for pool in &self.pools.pools {
            if !prefabs.contains(&pool.prefab) {
                errors.push(SimulationError::configuration(format!(
                    "pool '{}' uses unknown prefab '{}'",
                    pool.tag, pool.prefab
                )));
            }
        }

        errors.extend(self.match_rules.validate());

        if self.items.reveal_delay < 0.0 {
            errors.push(SimulationError::configuration("items.reveal_delay is negative"));
        }
        errors.extend(self.items.loot_table.validate(weapons, effects));

        errors
    }

    /// Положить все секции в App как resources (до первого тика)
    pub fn apply(&self, app: &mut App) {
        app.insert_resource(self.combat.clone())
            .insert_resource(self.effects.clone())
            .insert_resource(self.locomotion.clone())
            .insert_resource(self.weapons.clone())
            .insert_resource(self.pools.clone())
            .insert_resource(self.match_rules.clone())
            .insert_resource(MatchState::new(&self.match_rules))
            .insert_resource(self.items.clone());
    }
}

/// Система: новые fighters получают combat настройки и лимит эффектов
pub fn configure_new_fighters(
    combat: Res<CombatSettings>,
    effects_settings: Res<EffectSettings>,
    mut fighters: Query<(Entity, &mut Combatant, &mut ActiveEffects), Added<Fighter>>,
) {
    for (entity, mut combatant, mut effects) in fighters.iter_mut() {
        *combatant = Combatant::from_settings(&combat);
        effects.max_active = effects_settings.max_active_effects;
        crate::logger::log(&format!(
            "⚙️ Fighter {:?} configured (max damage {}%, {} effect slots)",
            entity, combat.max_damage_percent, effects.max_active
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(config: &SimulationConfig) -> Vec<SimulationError> {
        config.validate(&WeaponCatalog::default(), &EffectCatalog::default(), &ProjectilePrefabs::default())
    }

    #[test]
    fn test_default_config_is_valid() {
        let errors = validate(&SimulationConfig::default());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_ron_roundtrip_preserves_sections() {
        let mut config = SimulationConfig::default();
        config.match_rules.stocks = 5;
        config.weapons.bomb_count = 1;

        let text = config.to_ron_string().unwrap();
        let parsed = SimulationConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = SimulationConfig::from_ron_str("(effects: (max_active_effects: 3))").unwrap();
        assert_eq!(config.effects.max_active_effects, 3);
        assert_eq!(config.match_rules, MatchRules::default());
    }

    #[test]
    fn test_broken_ron_is_configuration_error() {
        let err = SimulationConfig::from_ron_str("(combat: 12").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("RON parse failed"), "{}", err);
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = SimulationConfig::default();
        config.effects.max_active_effects = 0;
        config.weapons.starting_weapon = "laser".into();
        config.pools.pools[0].prefab = "Rocket".into();
        config.items.loot_table = Default::default();

        let errors = validate(&config);
        assert_eq!(errors.len(), 4, "{:?}", errors);
        assert!(errors.iter().all(|e| e.is_configuration()));
    }
}
