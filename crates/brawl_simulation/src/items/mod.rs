//! Items: loot spawner, pickups, weapon crates
//!
//! ECS ответственность:
//! - ItemSpawner компонент (интервал, лимит, точки, spacing)
//! - Pickup компонент (payload + reveal / respawn state machine)
//! - подбор: эффекты через effect engine, оружие через GrantWeapon
//!
//! Случайность только через DeterministicRng.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod drop;
pub mod pickup;
pub mod spawner;
pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use drop::{weighted_pick, CrateEntry, DropPayload, DropProfile, DropTable};
pub use pickup::{Pickup, PickupFate, PickupState, RespawnPolicy};
pub use spawner::{ItemSpawner, MIN_SPAWN_INTERVAL};
pub use systems::{
    clear_all_items, spawn_random_item, ItemDestroyed, ItemPickedUp, ItemSettings, ItemSpawned, SpawnerAction,
    SpawnerRequest,
};

pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ItemSpawned>()
            .add_event::<ItemPickedUp>()
            .add_event::<ItemDestroyed>()
            .add_event::<SpawnerRequest>()
            .init_resource::<ItemSettings>();

        app.add_systems(
            FixedUpdate,
            (systems::tick_item_spawners, systems::tick_pickups).in_set(SimulationSet::Timers),
        )
        .add_systems(FixedUpdate, systems::process_spawner_requests.in_set(SimulationSet::Actions))
        .add_systems(FixedUpdate, systems::handle_pickup_overlaps.in_set(SimulationSet::Resolve))
        .add_systems(FixedUpdate, systems::track_destroyed_items.in_set(SimulationSet::Cleanup));
    }
}
