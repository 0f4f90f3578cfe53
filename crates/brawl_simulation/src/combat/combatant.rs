//! Combatant: percent-based damage + knockback (platform fighter модель)
//!
//! Урон не убивает, а копится в процентах и усиливает отлёт:
//! - damage_percent ∈ [0, max_damage_percent]
//! - launch multiplier = 1 + damage_percent / 100
//! - force = base_knockback × launch × knockback_multiplier
//! - после попадания короткое окно неуязвимости (одно физическое
//!   пересечение = один hit)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};

/// Порог "высокого" урона (UI warning)
pub const HIGH_DAMAGE_PERCENT: f32 = 100.0;
/// Порог "критического" урона (UI flashing)
pub const CRITICAL_DAMAGE_PERCENT: f32 = 150.0;

/// Настройки combat (секция конфига)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSettings {
    pub max_damage_percent: f32,
    /// Окно неуязвимости после попадания (секунды)
    pub invulnerability_duration: f32,
    /// Множитель отлёта владельца компонента
    pub knockback_multiplier: f32,
    /// Множитель любого полученного импульса (1 = без изменений)
    pub knockback_resistance: f32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            max_damage_percent: 200.0,
            invulnerability_duration: 0.05,
            knockback_multiplier: 1.0,
            knockback_resistance: 1.0,
        }
    }
}

/// Результат применённого попадания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedHit {
    /// Сколько процентов реально добавилось (с учётом clamp)
    pub damage_added: f32,
    /// Итоговый damage percent
    pub damage_percent: f32,
    /// Модуль импульса
    pub force: f32,
    /// Импульс = normalize(direction) × force. Сопротивление здесь не применяется,
    /// оно только в `apply_knockback` для внешних толчков.
    pub impulse: Vec2,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Combatant {
    damage_percent: f32,
    pub max_damage_percent: f32,
    invulnerability_timer: f32,
    pub invulnerability_duration: f32,
    /// Слои щита (несколько shield-эффектов не снимают друг друга)
    shield_layers: u32,
    pub knockback_multiplier: f32,
    pub knockback_resistance: f32,
}

impl Default for Combatant {
    fn default() -> Self {
        Self::from_settings(&CombatSettings::default())
    }
}

impl Combatant {
    pub fn from_settings(settings: &CombatSettings) -> Self {
        Self {
            damage_percent: 0.0,
            max_damage_percent: settings.max_damage_percent.max(0.0),
            invulnerability_timer: 0.0,
            invulnerability_duration: settings.invulnerability_duration.max(0.0),
            shield_layers: 0,
            knockback_multiplier: settings.knockback_multiplier,
            knockback_resistance: settings.knockback_resistance.max(0.0),
        }
    }

    pub fn damage_percent(&self) -> f32 {
        self.damage_percent
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability_timer > 0.0
    }

    pub fn has_shield(&self) -> bool {
        self.shield_layers > 0
    }

    /// Применить попадание.
    ///
    /// `Err(InvalidOperation)` если неуязвим или под щитом: состояние не меняется.
    pub fn take_damage(&mut self, base_damage: f32, base_knockback: f32, direction: Vec2) -> SimResult<AppliedHit> {
        if self.is_invulnerable() {
            return Err(SimulationError::invalid("target is invulnerable"));
        }
        if self.has_shield() {
            return Err(SimulationError::invalid("target is shielded"));
        }

        let before = self.damage_percent;
        self.damage_percent = self.clamp_percent(before + base_damage);

        let force = base_knockback * self.launch_multiplier() * self.knockback_multiplier;
        let impulse = direction.normalize_or_zero() * force;

        self.invulnerability_timer = self.invulnerability_duration;

        Ok(AppliedHit {
            damage_added: self.damage_percent - before,
            damage_percent: self.damage_percent,
            force,
            impulse,
        })
    }

    /// Внешний толчок (не от попадания) с учётом сопротивления
    pub fn apply_knockback(&self, force: Vec2) -> Vec2 {
        force * self.knockback_resistance
    }

    pub fn heal(&mut self, amount: f32) {
        self.damage_percent = self.clamp_percent(self.damage_percent - amount);
    }

    pub fn reset_damage(&mut self) {
        self.damage_percent = 0.0;
    }

    pub fn set_damage_percent(&mut self, value: f32) {
        self.damage_percent = self.clamp_percent(value);
    }

    /// 1 + damage% / 100
    pub fn launch_multiplier(&self) -> f32 {
        1.0 + self.damage_percent / 100.0
    }

    pub fn is_high_damage(&self) -> bool {
        self.damage_percent > HIGH_DAMAGE_PERCENT
    }

    pub fn is_critical_damage(&self) -> bool {
        self.damage_percent > CRITICAL_DAMAGE_PERCENT
    }

    /// damage% / max (для HUD полоски)
    pub fn normalized_damage(&self) -> f32 {
        if self.max_damage_percent <= 0.0 {
            return 0.0;
        }
        self.damage_percent / self.max_damage_percent
    }

    /// Уменьшить таймер неуязвимости (вызывается раз в тик)
    pub fn tick(&mut self, delta: f32) {
        if self.invulnerability_timer > 0.0 {
            self.invulnerability_timer = (self.invulnerability_timer - delta).max(0.0);
        }
    }

    pub fn remove_invulnerability(&mut self) {
        self.invulnerability_timer = 0.0;
    }

    /// Продлить окно неуязвимости (или открыть новое длиной `extra`)
    pub fn extend_invulnerability(&mut self, extra: f32) {
        if self.is_invulnerable() {
            self.invulnerability_timer += extra;
        } else {
            self.invulnerability_timer = extra.max(0.0);
        }
    }

    pub fn raise_shield(&mut self) {
        self.shield_layers += 1;
    }

    pub fn lower_shield(&mut self) {
        self.shield_layers = self.shield_layers.saturating_sub(1);
    }

    fn clamp_percent(&self, value: f32) -> f32 {
        value.clamp(0.0, self.max_damage_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_reference_hit_scenario() {
        let mut combatant = Combatant::default();

        let hit = combatant
            .take_damage(10.0, 5.0, Vec2::new(1.0, 0.0))
            .expect("first hit applies");

        assert!(approx(combatant.damage_percent(), 10.0));
        assert!(approx(hit.force, 5.5));
        assert!(approx(hit.impulse.x, 5.5));
        assert!(approx(hit.impulse.y, 0.0));
        assert!(combatant.is_invulnerable());
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut combatant = Combatant::default();
        let hit = combatant.take_damage(0.0, 2.0, Vec2::new(3.0, 4.0)).unwrap();
        assert!(approx(hit.impulse.length(), 2.0));
        assert!(approx(hit.impulse.x, 1.2));
    }

    #[test]
    fn test_zero_direction_gives_zero_impulse() {
        let mut combatant = Combatant::default();
        let hit = combatant.take_damage(5.0, 5.0, Vec2::ZERO).unwrap();
        assert_eq!(hit.impulse, Vec2::ZERO);
        assert!(approx(combatant.damage_percent(), 5.0));
    }

    #[test]
    fn test_damage_never_exceeds_max() {
        let mut combatant = Combatant::default();
        for step in 0..50 {
            combatant.remove_invulnerability();
            let _ = combatant.take_damage(step as f32 * 3.7, 1.0, Vec2::X);
            assert!(combatant.damage_percent() <= combatant.max_damage_percent);
            assert!(combatant.damage_percent() >= 0.0);
        }
        assert!(approx(combatant.damage_percent(), 200.0));
    }

    #[test]
    fn test_knockback_monotonic_in_damage_percent() {
        let mut previous_force = 0.0;
        for percent in (0..=220).step_by(10) {
            let mut combatant = Combatant::default();
            combatant.set_damage_percent(percent as f32);
            let hit = combatant.take_damage(0.0, 5.0, Vec2::X).unwrap();
            assert!(hit.force >= previous_force, "force dropped at {}%", percent);
            previous_force = hit.force;
        }
    }

    #[test]
    fn test_invulnerability_window_collapses_hits() {
        let mut combatant = Combatant::default();

        assert!(combatant.take_damage(10.0, 5.0, Vec2::X).is_ok());
        let second = combatant.take_damage(10.0, 5.0, Vec2::X);
        assert!(second.unwrap_err().is_invalid_operation());
        assert!(approx(combatant.damage_percent(), 10.0));

        // Окно 0.05s истекло
        combatant.tick(0.06);
        assert!(!combatant.is_invulnerable());
        assert!(combatant.take_damage(10.0, 5.0, Vec2::X).is_ok());
        assert!(approx(combatant.damage_percent(), 20.0));
    }

    #[test]
    fn test_shield_blocks_damage() {
        let mut combatant = Combatant::default();
        combatant.raise_shield();
        assert!(combatant.take_damage(10.0, 5.0, Vec2::X).is_err());
        assert_eq!(combatant.damage_percent(), 0.0);

        combatant.lower_shield();
        assert!(combatant.take_damage(10.0, 5.0, Vec2::X).is_ok());
    }

    #[test]
    fn test_shield_layers_stack() {
        let mut combatant = Combatant::default();
        combatant.raise_shield();
        combatant.raise_shield();
        combatant.lower_shield();
        assert!(combatant.has_shield());
        combatant.lower_shield();
        combatant.lower_shield();
        assert!(!combatant.has_shield());
    }

    #[test]
    fn test_heal_and_set_clamp() {
        let mut combatant = Combatant::default();
        combatant.set_damage_percent(500.0);
        assert_eq!(combatant.damage_percent(), 200.0);
        assert!(combatant.is_critical_damage());

        combatant.heal(80.0);
        assert_eq!(combatant.damage_percent(), 120.0);
        assert!(combatant.is_high_damage());
        assert!(!combatant.is_critical_damage());

        combatant.heal(1000.0);
        assert_eq!(combatant.damage_percent(), 0.0);

        combatant.set_damage_percent(-5.0);
        assert_eq!(combatant.damage_percent(), 0.0);

        combatant.set_damage_percent(50.0);
        combatant.reset_damage();
        assert_eq!(combatant.damage_percent(), 0.0);
    }

    #[test]
    fn test_extend_invulnerability() {
        let mut combatant = Combatant::default();
        combatant.extend_invulnerability(1.0);
        assert!(combatant.is_invulnerable());

        combatant.extend_invulnerability(0.5);
        combatant.tick(1.4);
        assert!(combatant.is_invulnerable());
        combatant.tick(0.2);
        assert!(!combatant.is_invulnerable());
    }

    #[test]
    fn test_hit_impulse_ignores_resistance() {
        let mut combatant = Combatant::from_settings(&CombatSettings {
            knockback_resistance: 0.5,
            ..default()
        });
        let hit = combatant.take_damage(10.0, 5.0, Vec2::X).unwrap();
        assert!(approx(hit.force, 5.5));
        assert!(approx(hit.impulse.x, 5.5));

        // Внешний толчок масштабируется
        let pushed = combatant.apply_knockback(Vec2::new(0.0, 4.0));
        assert!(approx(pushed.y, 2.0));
    }

    #[test]
    fn test_normalized_damage() {
        let mut combatant = Combatant::default();
        combatant.set_damage_percent(50.0);
        assert!(approx(combatant.normalized_damage(), 0.25));
        assert!(approx(combatant.launch_multiplier(), 1.5));
    }
}
