//! Weapon events (simulation → UI / audio / animation)
//!
//! **Weapon lifecycle:**
//! - `WeaponChanged`: pickup экипирован или выброшен
//! - `WeaponFired`: выстрел (N projectiles)
//! - `WeaponOutOfAmmo`: магазин опустел
//! - `WeaponReloadStarted` / `WeaponReloaded`: перезарядка стартового оружия
//!
//! **Special:**
//! - `BombUsed`: бомба брошена, `remaining` для HUD

use bevy::prelude::*;

use super::data::WeaponId;

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponChanged {
    pub entity: Entity,
    pub previous: WeaponId,
    pub current: WeaponId,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponFired {
    pub entity: Entity,
    pub weapon: WeaponId,
    /// Сколько projectiles реально заспавнено
    pub projectiles: u32,
    pub remaining_ammo: u32,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponOutOfAmmo {
    pub entity: Entity,
    pub weapon: WeaponId,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponReloadStarted {
    pub entity: Entity,
    pub weapon: WeaponId,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponReloaded {
    pub entity: Entity,
    pub weapon: WeaponId,
    pub ammo: u32,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct BombUsed {
    pub entity: Entity,
    pub remaining: u32,
}
