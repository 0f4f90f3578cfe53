//! Locomotion state machine
//!
//! Idle → Run → Jump → Fall → WallSlide (начальное Idle, терминального нет).
//!
//! Каждое состояние реализует одинаковый набор операций:
//! `enter`, `exit`, `update`, `fixed_update`, `handle_input`.
//! Dispatch: один `match` на операцию, без trait objects.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::mobility::LocomotionSettings;
use crate::components::PhysicsBody;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum LocomotionState {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    WallSlide,
}

/// Что state machine видит в текущем тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionContext {
    pub grounded: bool,
    pub velocity: Vec2,
    pub move_x: f32,
    /// Касаемся стены (в любую сторону)
    pub touching_wall: bool,
    /// Касаемся стены и давим в неё стиком
    pub pressing_into_wall: bool,
    pub deadzone: f32,
}

impl LocomotionContext {
    fn moving(&self) -> bool {
        self.move_x.abs() > self.deadzone
    }

    fn grounded_state(&self) -> LocomotionState {
        if self.moving() {
            LocomotionState::Run
        } else {
            LocomotionState::Idle
        }
    }

    fn airborne_state(&self) -> LocomotionState {
        if self.velocity.y > 0.0 {
            LocomotionState::Jump
        } else {
            LocomotionState::Fall
        }
    }
}

/// Реакция состояния на нажатие прыжка
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpIntent {
    /// Обычные правила ground / double / triple (Mobility::try_jump)
    Jump,
    /// Прыжок от стены с заданной скоростью
    WallJump(Vec2),
}

impl LocomotionState {
    pub fn name(self) -> &'static str {
        match self {
            LocomotionState::Idle => "Idle",
            LocomotionState::Run => "Run",
            LocomotionState::Jump => "Jump",
            LocomotionState::Fall => "Fall",
            LocomotionState::WallSlide => "WallSlide",
        }
    }

    pub fn enter(self, entity: Entity) {
        crate::logger::log(&format!("🏃 {:?} entered {}", entity, self.name()));
    }

    pub fn exit(self, entity: Entity) {
        crate::logger::log(&format!("🏃 {:?} left {}", entity, self.name()));
    }

    /// Переход по контактам и скорости. `None` = остаёмся.
    pub fn update(self, ctx: &LocomotionContext) -> Option<LocomotionState> {
        let next = match self {
            LocomotionState::Idle | LocomotionState::Run => {
                if !ctx.grounded {
                    ctx.airborne_state()
                } else {
                    ctx.grounded_state()
                }
            }
            LocomotionState::Jump => {
                if ctx.velocity.y <= 0.0 {
                    LocomotionState::Fall
                } else if ctx.pressing_into_wall {
                    LocomotionState::WallSlide
                } else {
                    self
                }
            }
            LocomotionState::Fall => {
                if ctx.grounded {
                    ctx.grounded_state()
                } else if ctx.pressing_into_wall {
                    LocomotionState::WallSlide
                } else {
                    self
                }
            }
            LocomotionState::WallSlide => {
                if !ctx.pressing_into_wall {
                    ctx.airborne_state()
                } else if ctx.grounded {
                    ctx.grounded_state()
                } else {
                    self
                }
            }
        };
        (next != self).then_some(next)
    }

    /// Физика, специфичная для состояния (fixed step)
    pub fn fixed_update(self, body: &mut PhysicsBody, settings: &LocomotionSettings) {
        if self == LocomotionState::WallSlide {
            body.velocity.y = body.velocity.y.max(-settings.wall_slide_speed);
        }
    }

    pub fn handle_input(
        self,
        ctx: &LocomotionContext,
        jump_pressed: bool,
        settings: &LocomotionSettings,
    ) -> Option<JumpIntent> {
        if !jump_pressed {
            return None;
        }
        match self {
            LocomotionState::WallSlide => Some(JumpIntent::WallJump(wall_jump_velocity(ctx.move_x, settings))),
            LocomotionState::Fall if ctx.touching_wall => {
                Some(JumpIntent::WallJump(wall_jump_velocity(ctx.move_x, settings)))
            }
            _ => Some(JumpIntent::Jump),
        }
    }
}

/// normalize(-moveX, 1) × wall_jump_force
fn wall_jump_velocity(move_x: f32, settings: &LocomotionSettings) -> Vec2 {
    Vec2::new(-move_x, 1.0).normalize_or_zero() * settings.wall_jump_force
}

/// Текущее и предыдущее состояние
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LocomotionMachine {
    current: LocomotionState,
    previous: Option<LocomotionState>,
    time_in_state: f32,
}

impl LocomotionMachine {
    pub fn current(&self) -> LocomotionState {
        self.current
    }

    pub fn previous(&self) -> Option<LocomotionState> {
        self.previous
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn tick(&mut self, delta: f32) {
        self.time_in_state += delta;
    }

    /// Сменить состояние: exit(old) → enter(new). `None`: no-op.
    ///
    /// Возвращает (previous, current) для PlayerStateChanged.
    pub fn change_state(
        &mut self,
        entity: Entity,
        next: Option<LocomotionState>,
    ) -> Option<(LocomotionState, LocomotionState)> {
        let next = next?;
        let previous = self.current;
        previous.exit(entity);
        self.previous = Some(previous);
        self.current = next;
        self.time_in_state = 0.0;
        next.enter(entity);
        Some((previous, next))
    }

    /// Сброс при respawn
    pub fn reset(&mut self, entity: Entity) -> Option<(LocomotionState, LocomotionState)> {
        if self.current == LocomotionState::Idle {
            return None;
        }
        self.change_state(entity, Some(LocomotionState::Idle))
    }
}

/// Уведомление о смене состояния (анимация / audio)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerStateChanged {
    pub entity: Entity,
    pub previous: LocomotionState,
    pub current: LocomotionState,
}
