//! Combat module (percent damage + knockback)
//!
//! ECS ответственность:
//! - Game state: Combatant (damage %, invulnerability, shield layers)
//! - Combat rules: clamp, launch multiplier, knockback impulse
//! - Events: DamageRequest (in), DamageDealt (out)
//!
//! Физика отлёта: через PhysicsBody::apply_impulse, интеграция снаружи.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod combatant;
pub mod damage;

#[cfg(test)]
mod damage_tests;

pub use combatant::{AppliedHit, CombatSettings, Combatant, CRITICAL_DAMAGE_PERCENT, HIGH_DAMAGE_PERCENT};
pub use damage::{resolve_damage_requests, tick_invulnerability, DamageDealt, DamageRequest};

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. tick_invulnerability (Timers)
/// 2. resolve_damage_requests (Resolve): после того как projectiles и взрывы
///    записали запросы в Actions/Resolve
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .init_resource::<CombatSettings>();

        app.add_systems(FixedUpdate, tick_invulnerability.in_set(SimulationSet::Timers))
            .add_systems(FixedUpdate, resolve_damage_requests.in_set(SimulationSet::Resolve));
    }
}
