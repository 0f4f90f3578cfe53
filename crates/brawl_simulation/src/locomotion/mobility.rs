//! Mobility: параметры движения игрока, которые меняют эффекты
//!
//! Слои (reverse, triple jump): счётчики, а не bool: два эффекта одного
//! вида не снимают друг друга раньше времени.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::ContactState;
use crate::error::{SimResult, SimulationError};

/// Настройки locomotion (секция конфига)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionSettings {
    /// Базовая горизонтальная скорость (units/s)
    pub move_speed: f32,
    /// Мёртвая зона стика
    pub deadzone: f32,
    pub jump_force: f32,
    pub double_jump_force: f32,
    pub triple_jump_force: f32,
    /// Максимальная скорость сползания по стене
    pub wall_slide_speed: f32,
    pub wall_jump_force: f32,
    /// Длительность окна спрыгивания с платформы
    pub drop_down_time: f32,
    /// Время сглаживания горизонтальной скорости
    pub smoothing_time: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            deadzone: 0.1,
            jump_force: 10.0,
            double_jump_force: 10.0,
            triple_jump_force: 10.0,
            wall_slide_speed: 2.0,
            wall_jump_force: 15.0,
            drop_down_time: 0.5,
            smoothing_time: 0.2,
        }
    }
}

impl LocomotionSettings {
    pub fn validate(&self) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.move_speed <= 0.0 {
            errors.push(SimulationError::configuration("locomotion.move_speed must be positive"));
        }
        if self.smoothing_time <= 0.0 {
            errors.push(SimulationError::configuration("locomotion.smoothing_time must be positive"));
        }
        if self.drop_down_time <= 0.0 {
            errors.push(SimulationError::configuration("locomotion.drop_down_time must be positive"));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            errors.push(SimulationError::configuration("locomotion.deadzone must be in [0, 1)"));
        }
        errors
    }
}

/// Какой прыжок выполнен
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum JumpKind {
    Ground,
    Double,
    Triple,
}

impl JumpKind {
    pub fn force(self, settings: &LocomotionSettings) -> f32 {
        match self {
            JumpKind::Ground => settings.jump_force,
            JumpKind::Double => settings.double_jump_force,
            JumpKind::Triple => settings.triple_jump_force,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Mobility {
    pub speed_multiplier: f32,
    pub enable_double_jump: bool,
    reversed_layers: u32,
    triple_jump_layers: u32,
    jump_count: u32,
    /// Эффективный grounded (контакт с землёй и не спрыгиваем)
    grounded: bool,
    /// Осталось окна drop-down (0 = не спрыгиваем)
    drop_timer: f32,
    /// Состояние SmoothDamp для горизонтальной скорости
    smoothing_velocity: f32,
}

impl Default for Mobility {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            enable_double_jump: true,
            reversed_layers: 0,
            triple_jump_layers: 0,
            jump_count: 0,
            grounded: false,
            drop_timer: 0.0,
            smoothing_velocity: 0.0,
        }
    }
}

impl Mobility {
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_dropping_down(&self) -> bool {
        self.drop_timer > 0.0
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed_layers > 0
    }

    pub fn reverse(&mut self) {
        self.reversed_layers += 1;
    }

    pub fn unreverse(&mut self) {
        self.reversed_layers = self.reversed_layers.saturating_sub(1);
    }

    pub fn triple_jump_enabled(&self) -> bool {
        self.triple_jump_layers > 0
    }

    pub fn enable_triple_jump(&mut self) {
        self.triple_jump_layers += 1;
    }

    /// Снять слой triple jump. Уже сделанный третий прыжок откатывается в счётчике.
    pub fn disable_triple_jump(&mut self) {
        self.triple_jump_layers = self.triple_jump_layers.saturating_sub(1);
        if !self.triple_jump_enabled() && self.jump_count >= 3 {
            self.jump_count = 2;
        }
    }

    pub fn scale_speed(&mut self, factor: f32) {
        if factor > 0.0 {
            self.speed_multiplier *= factor;
        }
    }

    pub fn unscale_speed(&mut self, factor: f32) {
        if factor > 0.0 {
            self.speed_multiplier /= factor;
        }
    }

    /// Обновить grounded по контакту. `true` на фронте "в воздухе → на земле":
    /// сбрасывает счётчик прыжков и drop-down.
    pub fn update_grounded(&mut self, contact_grounded: bool) -> bool {
        let was_grounded = self.grounded;
        self.grounded = contact_grounded && !self.is_dropping_down();
        let landed = !was_grounded && self.grounded;
        if landed {
            self.jump_count = 0;
            self.drop_timer = 0.0;
        }
        landed
    }

    /// Тик окна drop-down
    pub fn tick_drop_down(&mut self, delta: f32) {
        if self.drop_timer > 0.0 {
            self.drop_timer = (self.drop_timer - delta).max(0.0);
        }
    }

    /// Прыжок по правилам ground / double / triple
    pub fn try_jump(&mut self) -> SimResult<JumpKind> {
        if self.grounded {
            self.jump_count = 1;
            return Ok(JumpKind::Ground);
        }
        if self.is_dropping_down() && self.jump_count == 0 {
            return Err(SimulationError::invalid("jump blocked while dropping down"));
        }
        if self.enable_double_jump && self.jump_count == 1 {
            self.jump_count = 2;
            return Ok(JumpKind::Double);
        }
        if self.triple_jump_enabled() && self.jump_count == 2 {
            self.jump_count = 3;
            return Ok(JumpKind::Triple);
        }
        Err(SimulationError::invalid(format!(
            "no more jumps available (count {}, double {}, triple {})",
            self.jump_count,
            self.enable_double_jump,
            self.triple_jump_enabled()
        )))
    }

    /// Прыжок от стены: считается первым прыжком (double jump остаётся доступен)
    pub fn register_wall_jump(&mut self) {
        self.jump_count = 1;
    }

    /// Спрыгнуть с one-way платформы
    pub fn start_drop_down(&mut self, contact: &ContactState, duration: f32) -> SimResult<()> {
        if !self.grounded {
            return Err(SimulationError::invalid("drop down blocked: not grounded"));
        }
        if !contact.on_one_way_platform {
            return Err(SimulationError::invalid("drop down blocked: no platform below"));
        }
        self.drop_timer = duration;
        self.grounded = false;
        Ok(())
    }

    /// Целевая горизонтальная скорость из стика
    pub fn target_velocity_x(&self, move_x: f32, settings: &LocomotionSettings) -> f32 {
        if move_x.abs() <= settings.deadzone {
            return 0.0;
        }
        self.effective_move_x(move_x) * settings.move_speed * self.speed_multiplier
    }

    /// Направление с учётом reverse
    pub fn effective_move_x(&self, move_x: f32) -> f32 {
        if self.is_reversed() {
            -move_x
        } else {
            move_x
        }
    }

    /// Критически демпфированное сглаживание (SmoothDamp) current → target
    pub fn smooth_velocity_x(&mut self, current: f32, target: f32, smoothing_time: f32, delta: f32) -> f32 {
        let smoothing_time = smoothing_time.max(0.0001);
        let omega = 2.0 / smoothing_time;
        let x = omega * delta;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
        let change = current - target;
        let temp = (self.smoothing_velocity + omega * change) * delta;
        self.smoothing_velocity = (self.smoothing_velocity - omega * temp) * decay;
        let mut output = target + (change + temp) * decay;

        // Не перелетаем цель
        if (target - current > 0.0) == (output > target) {
            output = target;
            self.smoothing_velocity = if delta > 0.0 { (output - target) / delta } else { 0.0 };
        }
        output
    }

    /// Сброс при respawn (эффекты снимаются отдельно)
    pub fn reset(&mut self) {
        self.jump_count = 0;
        self.grounded = false;
        self.drop_timer = 0.0;
        self.smoothing_velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded() -> Mobility {
        let mut mobility = Mobility::default();
        mobility.update_grounded(true);
        mobility
    }

    #[test]
    fn test_jump_sequence_ground_double_then_rejected() {
        let mut mobility = grounded();
        assert_eq!(mobility.try_jump().unwrap(), JumpKind::Ground);
        mobility.update_grounded(false);
        assert_eq!(mobility.try_jump().unwrap(), JumpKind::Double);
        assert!(mobility.try_jump().unwrap_err().is_invalid_operation());
        assert_eq!(mobility.jump_count(), 2);
    }

    #[test]
    fn test_triple_jump_layer() {
        let mut mobility = grounded();
        mobility.enable_triple_jump();
        mobility.try_jump().unwrap();
        mobility.update_grounded(false);
        mobility.try_jump().unwrap();
        assert_eq!(mobility.try_jump().unwrap(), JumpKind::Triple);

        mobility.disable_triple_jump();
        assert_eq!(mobility.jump_count(), 2);
    }

    #[test]
    fn test_jump_count_resets_only_on_landing_edge() {
        let mut mobility = grounded();
        mobility.try_jump().unwrap();
        // Всё ещё стоим (physics ещё не подняла тело): не фронт
        assert!(!mobility.update_grounded(true));
        assert_eq!(mobility.jump_count(), 1);

        mobility.update_grounded(false);
        assert!(mobility.update_grounded(true));
        assert_eq!(mobility.jump_count(), 0);
    }

    #[test]
    fn test_drop_down_requires_one_way_platform() {
        let mut mobility = grounded();
        let solid = ContactState { grounded: true, ..default() };
        assert!(mobility.start_drop_down(&solid, 0.5).is_err());

        let platform = ContactState { grounded: true, on_one_way_platform: true, wall: None };
        mobility.start_drop_down(&platform, 0.5).unwrap();
        assert!(mobility.is_dropping_down());
        assert!(!mobility.is_grounded());
        assert!(mobility.try_jump().is_err());

        // Пока окно открыто, контакт с землёй не считается
        assert!(!mobility.update_grounded(true));
        mobility.tick_drop_down(0.5);
        assert!(mobility.update_grounded(true));
    }

    #[test]
    fn test_reverse_and_speed_layers() {
        let mut mobility = Mobility::default();
        let settings = LocomotionSettings::default();
        assert_eq!(mobility.target_velocity_x(1.0, &settings), 5.0);

        mobility.reverse();
        mobility.reverse();
        mobility.unreverse();
        assert!(mobility.is_reversed());
        assert_eq!(mobility.target_velocity_x(1.0, &settings), -5.0);

        mobility.unreverse();
        mobility.scale_speed(1.3);
        mobility.scale_speed(0.7);
        mobility.unscale_speed(1.3);
        assert!((mobility.target_velocity_x(1.0, &settings) - 3.5).abs() < 1e-4);
        assert_eq!(mobility.target_velocity_x(0.05, &settings), 0.0);
    }

    #[test]
    fn test_smoothing_converges_without_overshoot() {
        let mut mobility = Mobility::default();
        let mut vx = 0.0;
        for _ in 0..120 {
            vx = mobility.smooth_velocity_x(vx, 5.0, 0.2, 1.0 / 60.0);
            assert!(vx <= 5.0);
        }
        assert!((vx - 5.0).abs() < 0.01);
    }
}
