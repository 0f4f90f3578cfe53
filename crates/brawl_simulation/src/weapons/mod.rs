//! Weapons domain
//!
//! - `data`: WeaponData presets + WeaponCatalog (конфиг, без runtime состояния)
//! - `weapon`: WeaponInstance (ammo, cooldown, reload)
//! - `loadout`: Loadout компонент (starting / pickup / special)
//! - `systems`: стрельба, бомбы, перезарядка
//! - `events`: weapon lifecycle события для UI/audio

use bevy::prelude::*;

use crate::SimulationSet;

pub mod data;
pub mod events;
pub mod loadout;
pub mod systems;
pub mod weapon;


pub use data::{WeaponCatalog, WeaponData, WeaponId, WeaponKind};
pub use events::{BombUsed, WeaponChanged, WeaponFired, WeaponOutOfAmmo, WeaponReloadStarted, WeaponReloaded};
pub use loadout::{EmptyAction, Loadout, ShotPlan, UseOutcome, DEFAULT_BOMB_COUNT};
pub use systems::{launch_projectiles, EjectedWeapon, WeaponSettings};
pub use weapon::WeaponInstance;

/// Weapons Plugin
///
/// Порядок выполнения:
/// 1. tick_loadouts (Timers)
/// 2. fire_weapons → throw_bombs (Actions)
/// 3. tick_ejected_weapons (Cleanup)
pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponChanged>()
            .add_event::<WeaponFired>()
            .add_event::<WeaponOutOfAmmo>()
            .add_event::<WeaponReloadStarted>()
            .add_event::<WeaponReloaded>()
            .add_event::<BombUsed>()
            .init_resource::<WeaponCatalog>()
            .init_resource::<WeaponSettings>();

        app.add_systems(FixedUpdate, systems::tick_loadouts.in_set(SimulationSet::Timers))
            .add_systems(
                FixedUpdate,
                (systems::fire_weapons, systems::throw_bombs)
                    .chain()
                    .in_set(SimulationSet::Actions),
            )
            .add_systems(FixedUpdate, systems::tick_ejected_weapons.in_set(SimulationSet::Cleanup));
    }
}
