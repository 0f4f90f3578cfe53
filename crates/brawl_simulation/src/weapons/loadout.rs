//! Loadout: оружие игрока
//!
//! Слоты:
//! - starting: всегда есть, бесконечные патроны через auto-reload
//! - pickup: подобранное оружие, выбрасывается когда пустое
//! - special: бомба (отдельный счётчик `bomb_count`)
//!
//! Current = pickup если есть, иначе starting. Ровно одно current.

use bevy::prelude::*;

use super::data::{WeaponCatalog, WeaponData, WeaponId};
use super::weapon::WeaponInstance;
use crate::error::{SimResult, SimulationError};

/// Начальное количество бомб
pub const DEFAULT_BOMB_COUNT: u32 = 3;

/// Параметры одного выстрела (для spawn projectiles)
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlan {
    pub weapon: WeaponId,
    pub data: WeaponData,
    /// Остаток патронов (или бомб) после выстрела
    pub remaining: u32,
}

/// Что произошло с опустевшим оружием
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyAction {
    /// Стартовое оружие ушло в перезарядку
    ReloadStarted(WeaponId),
    /// Pickup оружие выброшено, снова в руках стартовое
    Ejected(WeaponInstance),
    /// Стартовое оружие уже перезаряжается
    Waiting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UseOutcome {
    /// Cooldown или перезарядка: тихо ждём (удержание кнопки)
    NotReady,
    Fired { shot: ShotPlan, emptied: Option<EmptyAction> },
    /// Выстрела не было, магазин пуст
    Empty(EmptyAction),
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Loadout {
    starting: WeaponInstance,
    pickup: Option<WeaponInstance>,
    special: Option<WeaponInstance>,
    pub bomb_count: u32,
    /// Слои silence (несколько эффектов не снимают друг друга)
    silence_layers: u32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new(
            WeaponInstance::starting("pistol".into(), WeaponData::pistol()),
            Some(WeaponInstance::new("bomb".into(), WeaponData::bomb())),
            DEFAULT_BOMB_COUNT,
        )
    }
}

impl Loadout {
    pub fn new(starting: WeaponInstance, special: Option<WeaponInstance>, bomb_count: u32) -> Self {
        Self {
            starting,
            pickup: None,
            special,
            bomb_count,
            silence_layers: 0,
        }
    }

    /// Собрать loadout из каталога (отсутствующая бомба отключает только special)
    pub fn from_catalog(
        catalog: &WeaponCatalog,
        starting: &WeaponId,
        special: Option<&WeaponId>,
        bomb_count: u32,
    ) -> SimResult<Self> {
        let starting_data = catalog.require(starting)?.clone();
        let special = match special {
            Some(id) => match catalog.require(id) {
                Ok(data) => Some(WeaponInstance::new(id.clone(), data.clone())),
                Err(e) => {
                    e.log("Loadout::from_catalog");
                    None
                }
            },
            None => None,
        };
        Ok(Self::new(
            WeaponInstance::starting(starting.clone(), starting_data),
            special,
            bomb_count,
        ))
    }

    pub fn current(&self) -> &WeaponInstance {
        self.pickup.as_ref().unwrap_or(&self.starting)
    }

    pub fn current_mut(&mut self) -> &mut WeaponInstance {
        match self.pickup.as_mut() {
            Some(pickup) => pickup,
            None => &mut self.starting,
        }
    }

    pub fn starting(&self) -> &WeaponInstance {
        &self.starting
    }

    pub fn pickup(&self) -> Option<&WeaponInstance> {
        self.pickup.as_ref()
    }

    pub fn has_pickup(&self) -> bool {
        self.pickup.is_some()
    }

    pub fn can_shoot(&self) -> bool {
        self.silence_layers == 0
    }

    pub fn silence(&mut self) {
        self.silence_layers += 1;
    }

    pub fn unsilence(&mut self) {
        self.silence_layers = self.silence_layers.saturating_sub(1);
    }

    /// Экипировать подобранное оружие. Возвращает старый pickup (он уничтожается).
    pub fn equip_pickup(&mut self, weapon: WeaponInstance) -> Option<WeaponInstance> {
        self.pickup.replace(weapon)
    }

    /// Выбросить pickup и вернуться к стартовому
    pub fn eject_pickup(&mut self) -> Option<WeaponInstance> {
        self.pickup.take()
    }

    /// Выстрел текущим оружием
    ///
    /// Под silence: `Err(InvalidOperation)`, состояние не меняется.
    pub fn use_current(&mut self) -> SimResult<UseOutcome> {
        if !self.can_shoot() {
            return Err(SimulationError::invalid("weapon use blocked: silenced"));
        }

        let weapon = self.current_mut();
        if weapon.is_reloading() {
            return Ok(UseOutcome::NotReady);
        }
        if weapon.is_empty() {
            return Ok(UseOutcome::Empty(self.handle_empty()));
        }
        if !weapon.cooldown_ready() {
            return Ok(UseOutcome::NotReady);
        }

        weapon.consume_shot();
        let shot = ShotPlan {
            weapon: weapon.id.clone(),
            data: weapon.data.clone(),
            remaining: weapon.current_ammo(),
        };
        let emptied = if weapon.is_empty() {
            Some(self.handle_empty())
        } else {
            None
        };

        Ok(UseOutcome::Fired { shot, emptied })
    }

    /// Бросок бомбы (special)
    pub fn use_special(&mut self) -> SimResult<ShotPlan> {
        if !self.can_shoot() {
            return Err(SimulationError::invalid("bomb blocked: silenced"));
        }
        if self.bomb_count == 0 {
            return Err(SimulationError::invalid("no bombs left"));
        }
        let Some(special) = self.special.as_mut() else {
            return Err(SimulationError::configuration("loadout has no bomb weapon"));
        };
        if !special.cooldown_ready() {
            return Err(SimulationError::invalid("bomb is on cooldown"));
        }

        special.start_cooldown();
        self.bomb_count -= 1;
        Ok(ShotPlan {
            weapon: special.id.clone(),
            data: special.data.clone(),
            remaining: self.bomb_count,
        })
    }

    /// Double ammo для текущего оружия. Возвращает новый счётчик.
    pub fn double_ammo(&mut self) -> u32 {
        self.current_mut().double_ammo()
    }

    /// Продвинуть таймеры текущего оружия и special cooldown.
    /// Возвращает id оружия, если его перезарядка завершилась.
    pub fn tick(&mut self, delta: f32) -> Option<WeaponId> {
        if let Some(special) = self.special.as_mut() {
            special.tick(delta);
        }
        let weapon = self.current_mut();
        weapon.tick(delta).then(|| weapon.id.clone())
    }

    /// Сброс при respawn: снова только стартовое оружие, полный магазин
    pub fn reset(&mut self, bomb_count: u32) {
        self.pickup = None;
        let id = self.starting.id.clone();
        let data = self.starting.data.clone();
        self.starting = WeaponInstance::starting(id, data);
        self.bomb_count = bomb_count;
    }

    fn handle_empty(&mut self) -> EmptyAction {
        if let Some(ejected) = self.pickup.take() {
            return EmptyAction::Ejected(ejected);
        }
        match self.starting.reload() {
            Ok(()) => EmptyAction::ReloadStarted(self.starting.id.clone()),
            Err(_) => EmptyAction::Waiting,
        }
    }
}
