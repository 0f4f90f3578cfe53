//! Effect engine: временные баффы / дебаффы и мгновенные эффекты
//!
//! ECS ответственность:
//! - ActiveEffects компонент (лимит, уникальность id, таймеры)
//! - apply / remove hooks пишут в Combatant, Mobility, Loadout
//! - уведомления EffectApplied / EffectRemoved
//!
//! Флаги длительных эффектов: слои-счётчики и множители, поэтому
//! пересекающиеся разные эффекты корректно откатываются.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod effect;
pub mod engine;
pub mod systems;

#[cfg(test)]
mod engine_tests;

pub use effect::{EffectCatalog, EffectId, EffectInstance, EffectKind, EffectSpec, EffectTarget, TargetPolicy};
pub use engine::{ActiveEffects, AppliedEffect, DEFAULT_MAX_ACTIVE_EFFECTS};
pub use systems::{
    apply_effect, clear_effects, EffectAction, EffectApplied, EffectNotifier, EffectRemoved, EffectRequest,
    EffectTargetQuery,
};

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EffectApplied>()
            .add_event::<EffectRemoved>()
            .add_event::<EffectRequest>()
            .init_resource::<EffectCatalog>()
            .add_systems(FixedUpdate, systems::tick_effects.in_set(SimulationSet::Timers))
            .add_systems(FixedUpdate, systems::process_effect_requests.in_set(SimulationSet::Actions));
    }
}
