//! ActiveEffects: список эффектов на игроке
//!
//! Правила:
//! - не больше `max_active` эффектов одновременно
//! - один и тот же EffectId активен максимум один раз
//! - мгновенные эффекты: apply → сразу remove, в список не попадают
//! - tick: remaining −= dt, update hook, авто-remove по истечении

use bevy::prelude::*;

use super::effect::{EffectId, EffectInstance, EffectKind, EffectTarget};
use crate::error::{SimResult, SimulationError};
use crate::weapons::WeaponChanged;

/// Лимит активных эффектов по умолчанию
pub const DEFAULT_MAX_ACTIVE_EFFECTS: usize = 10;

/// Результат успешного apply
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEffect {
    pub id: EffectId,
    /// Мгновенный: уже снят
    pub instant: bool,
    pub duration: f32,
    pub is_buff: bool,
    pub weapon_changed: Option<WeaponChanged>,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ActiveEffects {
    effects: Vec<EffectInstance>,
    pub max_active: usize,
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ACTIVE_EFFECTS)
    }
}

impl ActiveEffects {
    pub fn with_capacity(max_active: usize) -> Self {
        Self {
            effects: Vec::new(),
            max_active,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, id: &EffectId) -> Option<&EffectInstance> {
        self.effects.iter().find(|e| &e.id == id)
    }

    pub fn has_effect(&self, id: &EffectId) -> bool {
        self.get(id).is_some()
    }

    /// Эффекты того же вида (параметры варианта не сравниваются)
    pub fn effects_of_kind(&self, kind: &EffectKind) -> Vec<&EffectInstance> {
        let wanted = std::mem::discriminant(kind);
        self.effects
            .iter()
            .filter(|e| std::mem::discriminant(&e.kind) == wanted)
            .collect()
    }

    pub fn buff_count(&self) -> usize {
        self.effects.iter().filter(|e| e.is_buff).count()
    }

    pub fn debuff_count(&self) -> usize {
        self.effects.iter().filter(|e| !e.is_buff).count()
    }

    /// Применить эффект
    ///
    /// Err(InvalidOperation): лимит достигнут или тот же id уже активен.
    /// Err(Configuration): apply hook не смог (например, неизвестное оружие).
    pub fn apply(&mut self, mut instance: EffectInstance, target: &mut EffectTarget) -> SimResult<AppliedEffect> {
        if self.effects.len() >= self.max_active {
            return Err(SimulationError::invalid(format!(
                "maximum active effects ({}) reached",
                self.max_active
            )));
        }
        if self.has_effect(&instance.id) {
            return Err(SimulationError::invalid(format!("effect {} is already active", instance.id)));
        }

        let weapon_changed = instance.kind.apply(target)?;
        instance.target = Some(target.entity);
        instance.remaining = instance.duration;
        instance.active = true;

        let applied = AppliedEffect {
            id: instance.id.clone(),
            instant: instance.kind.is_instant(),
            duration: instance.duration,
            is_buff: instance.is_buff,
            weapon_changed,
        };

        if applied.instant {
            instance.kind.remove(target);
        } else {
            self.effects.push(instance);
        }
        Ok(applied)
    }

    /// Снять активный эффект (remove hook)
    pub fn remove(&mut self, id: &EffectId, target: &mut EffectTarget) -> SimResult<EffectInstance> {
        let Some(index) = self.effects.iter().position(|e| &e.id == id) else {
            return Err(SimulationError::invalid(format!("effect {} is not active", id)));
        };
        let mut instance = self.effects.remove(index);
        instance.kind.remove(target);
        deactivate(&mut instance);
        Ok(instance)
    }

    /// Продлить активный эффект. Возвращает новый remaining.
    pub fn extend_duration(&mut self, id: &EffectId, extra: f32) -> SimResult<f32> {
        let Some(instance) = self.effects.iter_mut().find(|e| &e.id == id && e.active) else {
            return Err(SimulationError::invalid(format!("cannot extend inactive effect {}", id)));
        };
        instance.remaining += extra;
        Ok(instance.remaining)
    }

    /// Продвинуть таймеры. Возвращает истёкшие (уже снятые) эффекты.
    pub fn tick(&mut self, delta: f32, target: &mut EffectTarget) -> Vec<EffectInstance> {
        for instance in self.effects.iter_mut() {
            instance.remaining -= delta;
            instance.kind.update(target, delta);
        }

        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.effects.len() {
            if self.effects[index].is_expired() {
                let mut instance = self.effects.remove(index);
                instance.kind.remove(target);
                deactivate(&mut instance);
                expired.push(instance);
            } else {
                index += 1;
            }
        }
        expired
    }

    /// Снять все эффекты в обратном порядке (respawn)
    pub fn remove_all(&mut self, target: &mut EffectTarget) -> Vec<EffectId> {
        let mut removed = Vec::with_capacity(self.effects.len());
        while let Some(mut instance) = self.effects.pop() {
            instance.kind.remove(target);
            deactivate(&mut instance);
            removed.push(instance.id);
        }
        removed
    }
}

fn deactivate(instance: &mut EffectInstance) {
    instance.active = false;
    instance.remaining = 0.0;
    instance.target = None;
}
