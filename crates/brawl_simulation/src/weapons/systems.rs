//! Weapon systems
//!
//! - tick_loadouts (Timers): cooldown / reload текущего оружия
//! - fire_weapons (Actions): удержание Shoot → Loadout::use_current → projectiles из пула
//! - throw_bombs (Actions): Special → Loadout::use_special → бомба из пула
//! - tick_ejected_weapons (Cleanup): выброшенное оружие исчезает по таймеру

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::data::{WeaponCatalog, WeaponId};
use super::events::{BombUsed, WeaponChanged, WeaponFired, WeaponOutOfAmmo, WeaponReloadStarted, WeaponReloaded};
use super::loadout::{EmptyAction, Loadout, ShotPlan, UseOutcome, DEFAULT_BOMB_COUNT};
use super::weapon::WeaponInstance;
use crate::components::{Fighter, PhysicsBody};
use crate::error::{SimResult, SimulationError};
use crate::input::PlayerInput;
use crate::pool::ObjectPool;
use crate::projectiles::ProjectilePrefabs;

// ============================================================================
// Settings
// ============================================================================

/// Секция конфига: стартовый loadout и выброс оружия
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSettings {
    pub starting_weapon: WeaponId,
    pub bomb_weapon: Option<WeaponId>,
    pub bomb_count: u32,
    /// Смещение точки вылета от центра игрока (x зеркалится по facing)
    pub muzzle_offset: [f32; 2],
    /// Импульс выброшенного оружия (x против facing)
    pub eject_impulse: [f32; 2],
    /// Через сколько секунд выброшенное оружие исчезает
    pub eject_lifetime: f32,
}

impl Default for WeaponSettings {
    fn default() -> Self {
        Self {
            starting_weapon: "pistol".into(),
            bomb_weapon: Some("bomb".into()),
            bomb_count: DEFAULT_BOMB_COUNT,
            muzzle_offset: [0.6, 0.2],
            eject_impulse: [3.0, 5.0],
            eject_lifetime: 2.0,
        }
    }
}

impl WeaponSettings {
    pub fn muzzle(&self, position: Vec2, facing: f32) -> Vec2 {
        position + Vec2::new(self.muzzle_offset[0] * facing.signum(), self.muzzle_offset[1])
    }

    pub fn eject_velocity(&self, facing: f32) -> Vec2 {
        Vec2::new(-self.eject_impulse[0] * facing.signum(), self.eject_impulse[1])
    }

    /// Стартовый loadout нового fighter'а
    pub fn build_loadout(&self, catalog: &WeaponCatalog) -> SimResult<Loadout> {
        Loadout::from_catalog(catalog, &self.starting_weapon, self.bomb_weapon.as_ref(), self.bomb_count)
    }
}

/// Выброшенное пустое оружие (визуальный мусор, без коллизий с игроками)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct EjectedWeapon {
    pub weapon: WeaponId,
    /// Секунды до despawn
    pub despawn_timer: f32,
}

// ============================================================================
// Systems
// ============================================================================

/// Система: таймеры оружия
pub fn tick_loadouts(
    time: Res<Time>,
    mut loadouts: Query<(Entity, &mut Loadout)>,
    mut reloaded_events: EventWriter<WeaponReloaded>,
) {
    let delta = time.delta_secs();
    for (entity, mut loadout) in loadouts.iter_mut() {
        if let Some(weapon) = loadout.tick(delta) {
            let ammo = loadout.current().current_ammo();
            crate::logger::log(&format!("🔄 {:?} reloaded {} ({} rounds)", entity, weapon, ammo));
            reloaded_events.write(WeaponReloaded { entity, weapon, ammo });
        }
    }
}

/// Система: стрельба при удержании Shoot
pub fn fire_weapons(
    mut commands: Commands,
    mut pool: ResMut<ObjectPool>,
    prefabs: Res<ProjectilePrefabs>,
    settings: Res<WeaponSettings>,
    mut fighters: Query<(Entity, &Fighter, &Transform, &PlayerInput, &mut Loadout)>,
    mut fired_events: EventWriter<WeaponFired>,
    mut changed_events: EventWriter<WeaponChanged>,
    mut reload_events: EventWriter<WeaponReloadStarted>,
    mut empty_events: EventWriter<WeaponOutOfAmmo>,
) {
    for (entity, fighter, transform, input, mut loadout) in fighters.iter_mut() {
        if !input.shoot_held {
            continue;
        }

        let outcome = match loadout.use_current() {
            Ok(outcome) => outcome,
            Err(e) => {
                e.log("fire_weapons");
                continue;
            }
        };

        let position = transform.translation.truncate();
        let (emptied, weapon) = match outcome {
            UseOutcome::NotReady => continue,
            UseOutcome::Fired { shot, emptied } => {
                let origin = settings.muzzle(position, fighter.facing);
                let spawned = launch_projectiles(&mut commands, &mut pool, &prefabs, entity, origin, fighter.facing, &shot);
                fired_events.write(WeaponFired {
                    entity,
                    weapon: shot.weapon.clone(),
                    projectiles: spawned,
                    remaining_ammo: shot.remaining,
                });
                (emptied, shot.weapon)
            }
            UseOutcome::Empty(action) => (Some(action), loadout.current().id.clone()),
        };

        let Some(action) = emptied else {
            continue;
        };
        match action {
            EmptyAction::ReloadStarted(weapon) => {
                empty_events.write(WeaponOutOfAmmo { entity, weapon: weapon.clone() });
                crate::logger::log(&format!("⏳ {:?} reloading {}", entity, weapon));
                reload_events.write(WeaponReloadStarted { entity, weapon });
            }
            EmptyAction::Ejected(ejected) => {
                empty_events.write(WeaponOutOfAmmo { entity, weapon: ejected.id.clone() });
                spawn_ejected_weapon(&mut commands, &settings, &ejected, position, fighter.facing);
                let current = loadout.current().id.clone();
                crate::logger::log_info(&format!(
                    "🗑️ {:?} ejected empty {}, back to {}",
                    entity, ejected.id, current
                ));
                changed_events.write(WeaponChanged {
                    entity,
                    previous: ejected.id,
                    current,
                });
            }
            EmptyAction::Waiting => {
                empty_events.write(WeaponOutOfAmmo { entity, weapon });
            }
        }
    }
}

/// Система: бросок бомбы по Special
pub fn throw_bombs(
    mut commands: Commands,
    mut pool: ResMut<ObjectPool>,
    prefabs: Res<ProjectilePrefabs>,
    settings: Res<WeaponSettings>,
    mut fighters: Query<(Entity, &Fighter, &Transform, &PlayerInput, &mut Loadout)>,
    mut bomb_events: EventWriter<BombUsed>,
) {
    for (entity, fighter, transform, input, mut loadout) in fighters.iter_mut() {
        if !input.special_pressed {
            continue;
        }

        match loadout.use_special() {
            Ok(shot) => {
                let origin = settings.muzzle(transform.translation.truncate(), fighter.facing);
                launch_projectiles(&mut commands, &mut pool, &prefabs, entity, origin, fighter.facing, &shot);
                crate::logger::log_info(&format!("💣 {:?} threw a bomb, {} left", entity, shot.remaining));
                bomb_events.write(BombUsed {
                    entity,
                    remaining: shot.remaining,
                });
            }
            Err(e) => e.log("throw_bombs"),
        }
    }
}

/// Система: despawn выброшенного оружия по таймеру
pub fn tick_ejected_weapons(
    mut commands: Commands,
    time: Res<Time>,
    mut ejected: Query<(Entity, &mut EjectedWeapon)>,
) {
    let delta = time.delta_secs();
    for (entity, mut weapon) in ejected.iter_mut() {
        weapon.despawn_timer -= delta;
        if weapon.despawn_timer <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Заспавнить projectiles выстрела из пула. Возвращает число заспавненных.
///
/// Нет prefab'а или пула → ConfigurationError в лог, выстрел пропущен
/// (патрон уже списан).
pub fn launch_projectiles(
    commands: &mut Commands,
    pool: &mut ObjectPool,
    prefabs: &ProjectilePrefabs,
    owner: Entity,
    origin: Vec2,
    facing: f32,
    shot: &ShotPlan,
) -> u32 {
    let Some(prefab) = prefabs.get(&shot.data.projectile) else {
        SimulationError::configuration(format!(
            "{} has no projectile prefab '{}'",
            shot.weapon, shot.data.projectile
        ))
        .log("launch_projectiles");
        return 0;
    };

    let mut spawned = 0;
    for velocity in shot.data.launch_velocities(facing) {
        let entity = match pool.spawn_from_pool(commands, prefabs, &shot.data.projectile, origin, Quat::IDENTITY) {
            Ok(entity) => entity,
            Err(e) => {
                e.log("launch_projectiles");
                continue;
            }
        };

        let mut projectile = prefab.instantiate();
        projectile.initialize(Some(owner), shot.data.base_damage, shot.data.base_knockback, velocity);
        commands.entity(entity).insert((projectile, prefab.body(velocity)));
        spawned += 1;
    }
    spawned
}

fn spawn_ejected_weapon(
    commands: &mut Commands,
    settings: &WeaponSettings,
    weapon: &WeaponInstance,
    position: Vec2,
    facing: f32,
) -> Entity {
    let mut body = PhysicsBody::default();
    body.apply_impulse(settings.eject_velocity(facing));
    body.angular_velocity = 10.0 * facing.signum();

    commands
        .spawn((
            EjectedWeapon {
                weapon: weapon.id.clone(),
                despawn_timer: settings.eject_lifetime,
            },
            Transform::from_translation(position.extend(0.0)),
            body,
        ))
        .id()
}
