//! Physics boundary компоненты
//!
//! Позиция/скорость принадлежат внешнему physics backend'у.
//! Симуляция только читает контакты и пишет velocity/impulse через эти компоненты.

use bevy::prelude::*;

/// Минимальная масса (защита от деления на 0 в impulse)
const MIN_MASS: f32 = 0.001;

/// Rigid body state, которым обмениваемся с physics backend
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    /// Линейная скорость (units/s)
    pub velocity: Vec2,
    /// Угловая скорость (rad/s)
    pub angular_velocity: f32,
    pub mass: f32,
    /// Множитель гравитации (0 = летит прямо, bullets)
    pub gravity_scale: f32,
    /// Solid body сталкивается с землёй/стенами; trigger (bullet): нет
    pub solid: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            gravity_scale: 1.0,
            solid: true,
        }
    }
}

impl PhysicsBody {
    /// Trigger body без гравитации (bullets)
    pub fn kinematic_trigger() -> Self {
        Self {
            gravity_scale: 0.0,
            solid: false,
            ..default()
        }
    }

    /// Мгновенный импульс: Δv = J / m
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass.max(MIN_MASS);
    }

    /// Обнулить линейную и угловую скорость
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }
}

/// Сторона стены относительно entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// -1 для левой стены, +1 для правой
    pub fn sign(self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }
}

/// Контакты, которые physics backend пишет каждый fixed tick
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ContactState {
    pub grounded: bool,
    /// Стоим на one-way платформе (можно спрыгнуть вниз)
    pub on_one_way_platform: bool,
    pub wall: Option<WallSide>,
}

impl ContactState {
    /// Касаемся стены И давим в неё input'ом
    pub fn pressing_into_wall(&self, move_x: f32, deadzone: f32) -> bool {
        match self.wall {
            Some(side) => move_x.abs() > deadzone && move_x.signum() == side.sign(),
            None => false,
        }
    }
}

/// Круглый коллайдер игрока (для overlap/explosion queries)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}
