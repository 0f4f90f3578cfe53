//! Damage resolution система
//!
//! Projectiles и взрывы не трогают Combatant напрямую, а пишут `DamageRequest`.
//! Resolve фаза применяет запросы по порядку:
//! 1. Combatant::take_damage (clamp, invulnerability, shield)
//! 2. импульс в PhysicsBody (boundary)
//! 3. DamageDealt событие (UI, звук, камера)

use bevy::prelude::*;

use super::combatant::Combatant;
use crate::components::PhysicsBody;
use crate::error::SimulationError;
use crate::logger;

/// Запрос на попадание
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    /// Кто стрелял (None = окружение)
    pub source: Option<Entity>,
    pub base_damage: f32,
    pub base_knockback: f32,
    /// Не обязан быть нормализован
    pub direction: Vec2,
}

/// Событие: урон применён
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub source: Option<Entity>,
    pub target: Entity,
    pub damage_added: f32,
    pub damage_percent: f32,
    pub knockback: Vec2,
    /// Цель перешла critical порог (>150%)
    pub critical: bool,
}

/// Система: применить DamageRequest события
///
/// Два запроса внутри окна неуязвимости схлопываются в один hit:
/// второй отклоняется самим Combatant.
pub fn resolve_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Combatant, &mut PhysicsBody)>,
    mut dealt_events: EventWriter<DamageDealt>,
) {
    for request in requests.read() {
        let Ok((mut combatant, mut body)) = targets.get_mut(request.target) else {
            SimulationError::state(format!("damage target {:?} is gone", request.target))
                .log("resolve_damage_requests");
            continue;
        };

        match combatant.take_damage(request.base_damage, request.base_knockback, request.direction) {
            Ok(hit) => {
                body.apply_impulse(hit.impulse);

                logger::log(&format!(
                    "💥 Hit {:?} → {:?}: +{:.1}% (now {:.1}%), knockback {:.2}",
                    request.source, request.target, hit.damage_added, hit.damage_percent, hit.force
                ));

                dealt_events.write(DamageDealt {
                    source: request.source,
                    target: request.target,
                    damage_added: hit.damage_added,
                    damage_percent: hit.damage_percent,
                    knockback: hit.impulse,
                    critical: combatant.is_critical_damage(),
                });
            }
            Err(e) => e.log("resolve_damage_requests"),
        }
    }
}

/// Система: countdown окна неуязвимости
pub fn tick_invulnerability(time: Res<Time>, mut combatants: Query<&mut Combatant>) {
    let delta = time.delta_secs();
    for mut combatant in combatants.iter_mut() {
        combatant.tick(delta);
    }
}
