//! Match systems
//!
//! - process_match_commands (до SimulationSet, работает и на паузе)
//! - register_fighters (Input): новые Fighter → MatchState
//! - tick_match_clock (Timers)
//! - record_hits, check_blast_zone, check_match_end (Cleanup)
//!
//! Вылет за blast zone стоит stock. Есть stocks → respawn (позиция, скорость,
//! урон, эффекты, оружие, прыжки), нет → fighter удаляется из мира.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::rules::MatchRules;
use super::state::MatchState;
use crate::combat::{Combatant, DamageDealt};
use crate::components::{Fighter, PhysicsBody};
use crate::effects::{clear_effects, ActiveEffects, EffectRemoved, EffectTarget};
use crate::error::{SimResult, SimulationError};
use crate::locomotion::{LocomotionMachine, Mobility, PlayerStateChanged};
use crate::weapons::{Loadout, WeaponCatalog, WeaponSettings};

// ============================================================================
// Events
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerKnockedOut {
    pub entity: Entity,
    pub player_id: u8,
    pub stocks_left: u32,
    /// Кому засчитан вылет
    pub credited_to: Option<Entity>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerRespawned {
    pub entity: Entity,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerEliminated {
    pub entity: Entity,
    pub player_id: u8,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MatchEnded {
    pub winner: Option<Entity>,
    pub winner_id: Option<u8>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommand {
    Pause,
    Resume,
    /// Новый раунд с живыми fighters
    Restart,
}

// ============================================================================
// Respawn
// ============================================================================

pub type RespawnQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Fighter,
        &'static mut Transform,
        &'static mut PhysicsBody,
        &'static mut Combatant,
        &'static mut Mobility,
        &'static mut Loadout,
        &'static mut ActiveEffects,
        &'static mut LocomotionMachine,
    ),
>;

#[derive(SystemParam)]
pub struct RespawnNotifier<'w> {
    pub respawned: EventWriter<'w, PlayerRespawned>,
    pub effects_removed: EventWriter<'w, EffectRemoved>,
    pub state_changed: EventWriter<'w, PlayerStateChanged>,
}

/// Вернуть fighter'а на его точку спавна в исходном состоянии
pub fn respawn_fighter(
    fighters: &mut RespawnQuery,
    entity: Entity,
    rules: &MatchRules,
    weapons: &WeaponSettings,
    catalog: &WeaponCatalog,
    notifier: &mut RespawnNotifier,
) -> SimResult<Vec2> {
    let (_, fighter, mut transform, mut body, mut combatant, mut mobility, mut loadout, mut effects, mut machine) =
        fighters
            .get_mut(entity)
            .map_err(|_| SimulationError::state(format!("cannot respawn missing fighter {:?}", entity)))?;

    let position = rules.spawn_point(fighter.player_id);
    transform.translation = position.extend(transform.translation.z);
    body.velocity = Vec2::ZERO;
    body.angular_velocity = 0.0;

    let mut target = EffectTarget {
        entity,
        combatant: &mut *combatant,
        mobility: &mut *mobility,
        loadout: &mut *loadout,
        catalog,
    };
    clear_effects(&mut effects, &mut target, &mut notifier.effects_removed);

    combatant.reset_damage();
    combatant.extend_invulnerability(rules.respawn_invulnerability);
    mobility.reset();
    loadout.reset(weapons.bomb_count);
    if let Some((previous, current)) = machine.reset(entity) {
        notifier.state_changed.write(PlayerStateChanged {
            entity,
            previous,
            current,
        });
    }

    notifier.respawned.write(PlayerRespawned { entity, position });
    Ok(position)
}

// ============================================================================
// Run condition
// ============================================================================

/// Симуляция идёт, пока матч в фазе Playing (без MatchState: всегда)
pub fn simulation_running(state: Option<Res<MatchState>>) -> bool {
    state.is_none_or(|state| state.is_running())
}

// ============================================================================
// Systems
// ============================================================================

/// Система: pause / resume / restart
pub fn process_match_commands(
    mut commands_in: EventReader<MatchCommand>,
    mut state: ResMut<MatchState>,
    rules: Res<MatchRules>,
    weapons: Res<WeaponSettings>,
    catalog: Res<WeaponCatalog>,
    mut fighters: RespawnQuery,
    mut notifier: RespawnNotifier,
) {
    for command in commands_in.read() {
        let result = match command {
            MatchCommand::Pause => state.pause(),
            MatchCommand::Resume => state.resume(),
            MatchCommand::Restart => {
                let gone: Vec<Entity> = state
                    .players()
                    .iter()
                    .map(|p| p.entity)
                    .filter(|entity| !fighters.contains(*entity))
                    .collect();
                for entity in gone {
                    state.forget(entity);
                }
                state.restart(&rules);
                let entities: Vec<Entity> = fighters.iter().map(|(entity, ..)| entity).collect();
                for entity in entities {
                    if let Err(e) = respawn_fighter(&mut fighters, entity, &rules, &weapons, &catalog, &mut notifier) {
                        e.log("process_match_commands");
                    }
                }
                Ok(())
            }
        };
        match result {
            Ok(()) => crate::logger::log_info(&format!("🎮 Match {:?} → {:?}", command, state.phase())),
            Err(e) => e.log("process_match_commands"),
        }
    }
}

/// Система: регистрация новых fighters
pub fn register_fighters(fighters: Query<(Entity, &Fighter), Added<Fighter>>, mut state: ResMut<MatchState>) {
    for (entity, fighter) in fighters.iter() {
        state.register(entity, fighter.player_id);
        crate::logger::log(&format!("🧍 Player {} joined the match as {:?}", fighter.player_id, entity));
    }
}

/// Система: часы раунда
pub fn tick_match_clock(time: Res<Time>, mut state: ResMut<MatchState>) {
    if state.tick(time.delta_secs()) {
        crate::logger::log_info("⏰ Round time is up");
    }
}

/// Система: кто последним попал (для засчитывания вылета)
pub fn record_hits(mut dealt: EventReader<DamageDealt>, mut state: ResMut<MatchState>) {
    for hit in dealt.read() {
        state.record_hit(hit.target, hit.source);
    }
}

/// Система: вылет за blast zone
#[allow(clippy::too_many_arguments)]
pub fn check_blast_zone(
    mut commands: Commands,
    mut state: ResMut<MatchState>,
    rules: Res<MatchRules>,
    weapons: Res<WeaponSettings>,
    catalog: Res<WeaponCatalog>,
    mut fighters: RespawnQuery,
    mut notifier: RespawnNotifier,
    mut knocked_out: EventWriter<PlayerKnockedOut>,
    mut eliminated: EventWriter<PlayerEliminated>,
) {
    let outside: Vec<(Entity, u8)> = fighters
        .iter()
        .filter(|(_, _, transform, ..)| !rules.blast_zone.contains(transform.translation.truncate()))
        .map(|(entity, fighter, ..)| (entity, fighter.player_id))
        .collect();

    for (entity, player_id) in outside {
        let (stocks_left, credited_to) = match state.lose_stock(entity) {
            Ok(result) => result,
            Err(e) => {
                e.log("check_blast_zone");
                continue;
            }
        };
        crate::logger::log_info(&format!(
            "💀 Player {} knocked out ({} stocks left, credited to {:?})",
            player_id, stocks_left, credited_to
        ));
        knocked_out.write(PlayerKnockedOut {
            entity,
            player_id,
            stocks_left,
            credited_to,
        });

        if stocks_left > 0 {
            if let Err(e) = respawn_fighter(&mut fighters, entity, &rules, &weapons, &catalog, &mut notifier) {
                e.log("check_blast_zone");
            }
        } else {
            crate::logger::log_info(&format!("☠️ Player {} eliminated", player_id));
            eliminated.write(PlayerEliminated { entity, player_id });
            commands.entity(entity).despawn();
        }
    }
}

/// Система: конец матча
pub fn check_match_end(mut state: ResMut<MatchState>, mut ended: EventWriter<MatchEnded>) {
    let Some(winner) = state.evaluate() else {
        return;
    };
    let winner_id = winner.and_then(|w| state.player(w)).map(|p| p.player_id);
    state.finish(winner);
    match winner_id {
        Some(id) => crate::logger::log_info(&format!("🏆 Match over, player {} wins", id)),
        None => crate::logger::log_info("🤝 Match over, no winner"),
    }
    ended.write(MatchEnded { winner, winner_id });
}
