//! Effect systems
//!
//! - tick_effects (Timers): таймеры, авто-снятие истёкших
//! - process_effect_requests (Actions): внешние запросы apply / remove / extend
//!
//! `apply_effect`: общий helper: его же использует items при подборе.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::effect::{EffectCatalog, EffectId, EffectInstance, EffectTarget};
use super::engine::ActiveEffects;
use crate::combat::Combatant;
use crate::error::{SimResult, SimulationError};
use crate::locomotion::Mobility;
use crate::weapons::{Loadout, WeaponCatalog, WeaponChanged};

// ============================================================================
// Events
// ============================================================================

#[derive(Event, Debug, Clone, PartialEq)]
pub struct EffectApplied {
    pub entity: Entity,
    pub effect: EffectId,
    pub duration: f32,
    pub is_buff: bool,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct EffectRemoved {
    pub entity: Entity,
    pub effect: EffectId,
    /// true = истёк по таймеру, false = снят явно / мгновенный / respawn
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectAction {
    Apply,
    Remove,
    Extend(f32),
}

/// Внешний запрос к effect engine (debug console, scripted events)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EffectRequest {
    pub target: Entity,
    pub effect: EffectId,
    pub action: EffectAction,
}

/// Все writers effect уведомлений одним параметром
#[derive(SystemParam)]
pub struct EffectNotifier<'w> {
    pub applied: EventWriter<'w, EffectApplied>,
    pub removed: EventWriter<'w, EffectRemoved>,
    pub weapon_changed: EventWriter<'w, WeaponChanged>,
}

/// Компоненты игрока, которые трогают эффекты
pub type EffectTargetQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut ActiveEffects,
        &'static mut Combatant,
        &'static mut Mobility,
        &'static mut Loadout,
    ),
>;

// ============================================================================
// Helpers
// ============================================================================

/// Применить эффект к игроку и разослать уведомления
pub fn apply_effect(
    effects: &mut ActiveEffects,
    target: &mut EffectTarget,
    instance: EffectInstance,
    notifier: &mut EffectNotifier,
) -> SimResult<()> {
    let applied = effects.apply(instance, target)?;

    crate::logger::log_info(&format!(
        "✨ {} applied to {:?} ({}s)",
        applied.id, target.entity, applied.duration
    ));
    notifier.applied.write(EffectApplied {
        entity: target.entity,
        effect: applied.id.clone(),
        duration: applied.duration,
        is_buff: applied.is_buff,
    });
    if let Some(changed) = applied.weapon_changed {
        notifier.weapon_changed.write(changed);
    }
    if applied.instant {
        notifier.removed.write(EffectRemoved {
            entity: target.entity,
            effect: applied.id,
            expired: false,
        });
    }
    Ok(())
}

/// Снять все эффекты (respawn) с уведомлениями
pub fn clear_effects(effects: &mut ActiveEffects, target: &mut EffectTarget, removed: &mut EventWriter<EffectRemoved>) {
    for effect in effects.remove_all(target) {
        removed.write(EffectRemoved {
            entity: target.entity,
            effect,
            expired: false,
        });
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Система: таймеры эффектов
pub fn tick_effects(
    time: Res<Time>,
    catalog: Res<WeaponCatalog>,
    mut fighters: EffectTargetQuery,
    mut removed_events: EventWriter<EffectRemoved>,
) {
    let delta = time.delta_secs();
    for (entity, mut effects, mut combatant, mut mobility, mut loadout) in fighters.iter_mut() {
        if effects.is_empty() {
            continue;
        }
        let mut target = EffectTarget {
            entity,
            combatant: &mut *combatant,
            mobility: &mut *mobility,
            loadout: &mut *loadout,
            catalog: &catalog,
        };
        for expired in effects.tick(delta, &mut target) {
            crate::logger::log(&format!("⌛ {} expired on {:?}", expired.id, entity));
            removed_events.write(EffectRemoved {
                entity,
                effect: expired.id,
                expired: true,
            });
        }
    }
}

/// Система: внешние запросы apply / remove / extend
pub fn process_effect_requests(
    mut requests: EventReader<EffectRequest>,
    effect_catalog: Res<EffectCatalog>,
    weapon_catalog: Res<WeaponCatalog>,
    mut fighters: EffectTargetQuery,
    mut notifier: EffectNotifier,
) {
    for request in requests.read() {
        let Ok((entity, mut effects, mut combatant, mut mobility, mut loadout)) = fighters.get_mut(request.target)
        else {
            SimulationError::state(format!("effect request for missing fighter {:?}", request.target))
                .log("process_effect_requests");
            continue;
        };
        let mut target = EffectTarget {
            entity,
            combatant: &mut *combatant,
            mobility: &mut *mobility,
            loadout: &mut *loadout,
            catalog: &weapon_catalog,
        };

        let result = match request.action {
            EffectAction::Apply => effect_catalog
                .require(&request.effect)
                .map(|spec| spec.instantiate(request.effect.clone()))
                .and_then(|instance| apply_effect(&mut effects, &mut target, instance, &mut notifier)),
            EffectAction::Remove => effects.remove(&request.effect, &mut target).map(|instance| {
                notifier.removed.write(EffectRemoved {
                    entity,
                    effect: instance.id,
                    expired: false,
                });
            }),
            EffectAction::Extend(extra) => effects.extend_duration(&request.effect, extra).map(|remaining| {
                crate::logger::log(&format!("⏱️ {} on {:?} extended to {}s", request.effect, entity, remaining));
            }),
        };

        if let Err(e) = result {
            e.log("process_effect_requests");
        }
    }
}
