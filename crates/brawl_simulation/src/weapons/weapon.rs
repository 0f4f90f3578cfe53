//! WeaponInstance: runtime состояние одного оружия
//!
//! Инварианты:
//! - 0 ≤ ammo ≤ 2 × max_ammo (double ammo эффект может переполнить магазин)
//! - can_fire ⇔ !reloading ∧ ammo > 0 ∧ cooldown == 0

use bevy::prelude::*;

use super::data::{WeaponData, WeaponId};
use crate::error::{SimResult, SimulationError};

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct WeaponInstance {
    pub id: WeaponId,
    pub data: WeaponData,
    ammo: u32,
    /// Текущий cooldown timer (уменьшается до 0)
    cooldown_timer: f32,
    /// Осталось до конца перезарядки (0 = не перезаряжается)
    reload_timer: f32,
    reloading: bool,
    /// Стартовое оружие: бесконечные патроны через auto-reload
    is_starting: bool,
}

impl WeaponInstance {
    pub fn new(id: WeaponId, data: WeaponData) -> Self {
        let ammo = data.max_ammo;
        Self {
            id,
            data,
            ammo,
            cooldown_timer: 0.0,
            reload_timer: 0.0,
            reloading: false,
            is_starting: false,
        }
    }

    pub fn starting(id: WeaponId, data: WeaponData) -> Self {
        Self {
            is_starting: true,
            ..Self::new(id, data)
        }
    }

    pub fn current_ammo(&self) -> u32 {
        self.ammo
    }

    pub fn max_ammo(&self) -> u32 {
        self.data.max_ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn is_starting(&self) -> bool {
        self.is_starting
    }

    pub fn is_empty(&self) -> bool {
        self.ammo == 0
    }

    pub fn cooldown_ready(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn can_fire(&self) -> bool {
        !self.reloading && self.ammo > 0 && self.cooldown_ready()
    }

    /// Clamp в [0, 2 × max]
    pub fn set_ammo(&mut self, amount: u32) {
        self.ammo = amount.min(self.data.max_ammo.saturating_mul(2));
    }

    /// Double ammo: min(2 × max, 2 × current)
    pub fn double_ammo(&mut self) -> u32 {
        self.set_ammo(self.ammo.saturating_mul(2));
        self.ammo
    }

    /// Списать патрон и начать cooldown
    pub fn consume_shot(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
        self.start_cooldown();
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.data.fire_interval();
    }

    /// Начать перезарядку. Err если уже идёт или магазин полон.
    pub fn reload(&mut self) -> SimResult<()> {
        if self.reloading {
            return Err(SimulationError::invalid(format!("{} is already reloading", self.id)));
        }
        if self.ammo >= self.data.max_ammo {
            return Err(SimulationError::invalid(format!("{} magazine is full", self.id)));
        }
        self.reloading = true;
        self.reload_timer = self.data.reload_time;
        Ok(())
    }

    /// Продвинуть таймеры. `true` если перезарядка завершилась в этом тике.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }

        if self.reloading {
            self.reload_timer -= delta;
            if self.reload_timer <= 0.0 {
                self.reload_timer = 0.0;
                self.reloading = false;
                self.ammo = self.data.max_ammo;
                return true;
            }
        }
        false
    }
}
