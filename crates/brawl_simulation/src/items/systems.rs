//! Item systems
//!
//! - tick_item_spawners (Timers): интервальный спавн лута
//! - tick_pickups (Timers): reveal crate'ов + respawn спрятанных pickups
//! - process_spawner_requests (Actions): ручной spawn / очистка
//! - handle_pickup_overlaps (Resolve): подбор → эффект / оружие / reveal
//! - track_destroyed_items (Cleanup): RemovedComponents<Pickup> → untrack + ItemDestroyed

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::drop::{weighted_pick, DropPayload, DropTable};
use super::pickup::{Pickup, PickupFate};
use super::spawner::ItemSpawner;
use crate::effects::{
    apply_effect, EffectCatalog, EffectId, EffectInstance, EffectNotifier, EffectSpec, EffectTarget,
    EffectTargetQuery, TargetPolicy,
};
use crate::error::{SimResult, SimulationError};
use crate::physics::PickupOverlap;
use crate::weapons::{WeaponCatalog, WeaponId};
use crate::DeterministicRng;

// ============================================================================
// Settings & events
// ============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSettings {
    /// Задержка между подбором crate'а и выдачей оружия
    pub reveal_delay: f32,
    /// Таблица лута для spawner'ов, созданных из конфига
    pub loot_table: DropTable,
}

impl Default for ItemSettings {
    fn default() -> Self {
        Self {
            reveal_delay: 1.0,
            loot_table: DropTable::default_loot(),
        }
    }
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemSpawned {
    pub item: Entity,
    pub spawner: Entity,
    pub profile: String,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemPickedUp {
    pub item: Entity,
    pub picker: Entity,
    pub payload: DropPayload,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ItemDestroyed {
    pub item: Entity,
    pub spawner: Option<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerAction {
    SpawnNow,
    ClearAll,
}

/// Ручное управление spawner'ом (scripted events, debug)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SpawnerRequest {
    pub spawner: Entity,
    pub action: SpawnerAction,
}

// ============================================================================
// Helpers
// ============================================================================

/// Заспавнить взвешенный случайный предмет в случайной свободной точке
pub fn spawn_random_item(
    commands: &mut Commands,
    spawner_entity: Entity,
    spawner: &mut ItemSpawner,
    rng: &mut DeterministicRng,
    live_positions: &[Vec2],
) -> SimResult<ItemSpawned> {
    let points = spawner.available_points(live_positions);
    let Some(index) = rng.index(points.len()) else {
        return Err(SimulationError::configuration(format!(
            "spawner {:?} has no spawn points",
            spawner_entity
        )));
    };
    let roll = rng.roll(spawner.table.total_weight());
    let Some((profile_name, payload)) = spawner
        .table
        .select(roll)
        .map(|profile| (profile.name.clone(), profile.payload.clone()))
    else {
        return Err(SimulationError::configuration(format!(
            "spawner {:?} has an empty loot table",
            spawner_entity
        )));
    };

    let position = points[index];
    let mut pickup = Pickup::new(payload, position);
    pickup.spawner = Some(spawner_entity);
    let item = commands
        .spawn((pickup, Transform::from_translation(position.extend(0.0))))
        .id();
    spawner.track(item);

    Ok(ItemSpawned {
        item,
        spawner: spawner_entity,
        profile: profile_name,
        position,
    })
}

/// Удалить все живые предметы spawner'а (ItemDestroyed придёт через track_destroyed_items)
pub fn clear_all_items(commands: &mut Commands, spawner: &mut ItemSpawner) -> usize {
    let items = spawner.take_active_items();
    for item in &items {
        if let Ok(mut entity) = commands.get_entity(*item) {
            entity.despawn();
        }
    }
    items.len()
}

fn live_item_positions(spawner: &ItemSpawner, items: &Query<&Transform, With<Pickup>>) -> Vec<Vec2> {
    spawner
        .active_items()
        .iter()
        .filter_map(|item| items.get(*item).ok())
        .map(|transform| transform.translation.truncate())
        .collect()
}

fn apply_to_fighter(
    fighters: &mut EffectTargetQuery,
    catalog: &WeaponCatalog,
    recipient: Entity,
    instance: EffectInstance,
    notifier: &mut EffectNotifier,
) -> SimResult<()> {
    let (entity, mut effects, mut combatant, mut mobility, mut loadout) = fighters
        .get_mut(recipient)
        .map_err(|_| SimulationError::state(format!("pickup recipient {:?} no longer exists", recipient)))?;
    let mut target = EffectTarget {
        entity,
        combatant: &mut *combatant,
        mobility: &mut *mobility,
        loadout: &mut *loadout,
        catalog,
    };
    apply_effect(&mut effects, &mut target, instance, notifier)
}

fn grant_instance(weapon: &WeaponId) -> EffectInstance {
    EffectSpec::grant_weapon(weapon).instantiate(EffectId(format!("grant:{}", weapon)))
}

fn finish_pickup(commands: &mut Commands, item: Entity, pickup: &mut Pickup) {
    match pickup.consume() {
        PickupFate::Despawn => commands.entity(item).despawn(),
        PickupFate::Hide => crate::logger::log(&format!("👻 Pickup {:?} hidden until respawn", item)),
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Система: интервальный спавн
pub fn tick_item_spawners(
    mut commands: Commands,
    time: Res<Time>,
    mut rng: ResMut<DeterministicRng>,
    mut spawners: Query<(Entity, &mut ItemSpawner)>,
    items: Query<&Transform, With<Pickup>>,
    mut spawned_events: EventWriter<ItemSpawned>,
) {
    let delta = time.delta_secs();
    for (spawner_entity, mut spawner) in spawners.iter_mut() {
        if !spawner.tick(delta) {
            continue;
        }
        let live = live_item_positions(&spawner, &items);
        match spawn_random_item(&mut commands, spawner_entity, &mut spawner, &mut rng, &live) {
            Ok(spawned) => {
                crate::logger::log_info(&format!(
                    "🎁 {} spawned at ({:.1}, {:.1}) [{}/{}]",
                    spawned.profile,
                    spawned.position.x,
                    spawned.position.y,
                    spawner.active_count(),
                    spawner.max_items()
                ));
                spawned_events.write(spawned);
            }
            Err(e) => e.log("tick_item_spawners"),
        }
    }
}

/// Система: SpawnerRequest
pub fn process_spawner_requests(
    mut commands: Commands,
    mut requests: EventReader<SpawnerRequest>,
    mut rng: ResMut<DeterministicRng>,
    mut spawners: Query<&mut ItemSpawner>,
    items: Query<&Transform, With<Pickup>>,
    mut spawned_events: EventWriter<ItemSpawned>,
) {
    for request in requests.read() {
        let Ok(mut spawner) = spawners.get_mut(request.spawner) else {
            SimulationError::state(format!("spawner {:?} not found", request.spawner)).log("process_spawner_requests");
            continue;
        };
        match request.action {
            SpawnerAction::SpawnNow => {
                if !spawner.can_spawn() {
                    SimulationError::invalid(format!("spawner {:?} is full or has no points", request.spawner))
                        .log("process_spawner_requests");
                    continue;
                }
                let live = live_item_positions(&spawner, &items);
                match spawn_random_item(&mut commands, request.spawner, &mut spawner, &mut rng, &live) {
                    Ok(spawned) => {
                        spawned_events.write(spawned);
                    }
                    Err(e) => e.log("process_spawner_requests"),
                }
            }
            SpawnerAction::ClearAll => {
                let cleared = clear_all_items(&mut commands, &mut spawner);
                crate::logger::log(&format!("🧹 Spawner {:?} cleared {} items", request.spawner, cleared));
            }
        }
    }
}

/// Система: подбор предметов
///
/// Effect: Picker → подобравший, Others → каждый другой игрок независимо.
/// Pickup расходуется, только если хотя бы одно применение прошло.
/// Crate: оружие выбирается сразу (взвешенно), выдаётся после reveal_delay.
#[allow(clippy::too_many_arguments)]
pub fn handle_pickup_overlaps(
    mut commands: Commands,
    mut overlaps: EventReader<PickupOverlap>,
    mut rng: ResMut<DeterministicRng>,
    effect_catalog: Res<EffectCatalog>,
    weapon_catalog: Res<WeaponCatalog>,
    mut pickups: Query<&mut Pickup>,
    mut fighters: EffectTargetQuery,
    mut notifier: EffectNotifier,
    mut picked_events: EventWriter<ItemPickedUp>,
) {
    for overlap in overlaps.read() {
        let Ok(mut pickup) = pickups.get_mut(overlap.pickup) else {
            continue;
        };
        // Несколько игроков в одном тике: первый забирает
        if !pickup.is_available() || !fighters.contains(overlap.fighter) {
            continue;
        }

        let payload = pickup.payload.clone();
        let consumed = match &payload {
            DropPayload::Effect(id) => {
                let spec = match effect_catalog.require(id) {
                    Ok(spec) => spec,
                    Err(e) => {
                        e.log("handle_pickup_overlaps");
                        continue;
                    }
                };
                let recipients: Vec<Entity> = match spec.targeting {
                    TargetPolicy::Picker => vec![overlap.fighter],
                    TargetPolicy::Others => fighters
                        .iter()
                        .map(|(entity, ..)| entity)
                        .filter(|entity| *entity != overlap.fighter)
                        .collect(),
                };

                let mut successes = 0;
                for recipient in recipients {
                    let instance = spec.instantiate(id.clone());
                    match apply_to_fighter(&mut fighters, &weapon_catalog, recipient, instance, &mut notifier) {
                        Ok(()) => successes += 1,
                        Err(e) => e.log("handle_pickup_overlaps"),
                    }
                }
                successes > 0
            }
            DropPayload::Weapon(weapon) => {
                let instance = grant_instance(weapon);
                match apply_to_fighter(&mut fighters, &weapon_catalog, overlap.fighter, instance, &mut notifier) {
                    Ok(()) => true,
                    Err(e) => {
                        e.log("handle_pickup_overlaps");
                        false
                    }
                }
            }
            DropPayload::WeaponCrate(pool) => {
                let total: f32 = pool.iter().map(|entry| entry.weight.max(0.0)).sum();
                let roll = rng.roll(total);
                let Some(entry) = weighted_pick(pool, |entry| entry.weight, roll) else {
                    SimulationError::configuration(format!("crate {:?} has no weapons", overlap.pickup))
                        .log("handle_pickup_overlaps");
                    continue;
                };
                let weapon = entry.weapon.clone();
                crate::logger::log_info(&format!(
                    "📦 Crate {:?} revealing {} for {:?}",
                    overlap.pickup, weapon, overlap.fighter
                ));
                pickup.begin_reveal(overlap.fighter, weapon);
                picked_events.write(ItemPickedUp {
                    item: overlap.pickup,
                    picker: overlap.fighter,
                    payload: payload.clone(),
                });
                continue;
            }
        };

        if !consumed {
            crate::logger::log(&format!("⛔ Pickup {:?} not consumed (no valid recipient)", overlap.pickup));
            continue;
        }
        picked_events.write(ItemPickedUp {
            item: overlap.pickup,
            picker: overlap.fighter,
            payload,
        });
        finish_pickup(&mut commands, overlap.pickup, &mut pickup);
    }
}

/// Система: reveal crate'ов и respawn спрятанных pickups
pub fn tick_pickups(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<ItemSettings>,
    weapon_catalog: Res<WeaponCatalog>,
    mut pickups: Query<(Entity, &mut Pickup, &mut Transform)>,
    mut fighters: EffectTargetQuery,
    mut notifier: EffectNotifier,
) {
    let delta = time.delta_secs();
    for (item, mut pickup, mut transform) in pickups.iter_mut() {
        if let Some((recipient, weapon)) = pickup.tick_reveal(delta, settings.reveal_delay) {
            let instance = grant_instance(&weapon);
            if let Err(e) = apply_to_fighter(&mut fighters, &weapon_catalog, recipient, instance, &mut notifier) {
                e.log("tick_pickups");
            }
            finish_pickup(&mut commands, item, &mut pickup);
            continue;
        }

        if pickup.tick_respawn(delta) {
            transform.translation = pickup.home.extend(transform.translation.z);
            crate::logger::log(&format!("🔁 Pickup {:?} respawned", item));
        }
    }
}

/// Система: удалённые pickups → untrack + ItemDestroyed
pub fn track_destroyed_items(
    mut removed: RemovedComponents<Pickup>,
    mut spawners: Query<(Entity, &mut ItemSpawner)>,
    mut destroyed_events: EventWriter<ItemDestroyed>,
) {
    for item in removed.read() {
        let mut owner = None;
        for (spawner_entity, mut spawner) in spawners.iter_mut() {
            if spawner.untrack(item) {
                owner = Some(spawner_entity);
                break;
            }
        }
        destroyed_events.write(ItemDestroyed { item, spawner: owner });
    }
}
