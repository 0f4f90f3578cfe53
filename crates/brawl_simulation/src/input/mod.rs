//! Player input boundary
//!
//! Внешний input слой (клавиатура / геймпад / сеть / AI) пишет `PlayerCommand`
//! события. Симуляция складывает их в компонент `PlayerInput`:
//! - `move_axis` держится до следующего Move
//! - `shoot_held` держится до Shoot(false)
//! - jump / drop / special: одноразовые нажатия, очищаются в конце тика
//!
//! Move-axis edges (как на геймпаде): стик вверх = Jump, стик вниз на земле = DropDown.

use bevy::prelude::*;

use crate::components::ContactState;
use crate::error::SimulationError;
use crate::SimulationSet;

/// Порог стика для вертикальных edge-нажатий
pub const AXIS_PRESS_THRESHOLD: f32 = 0.1;

/// Команда от input слоя
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FighterCommand {
    /// Направление стика (x: -1..1, y: -1..1)
    Move(Vec2),
    Jump,
    /// Удержание / отпускание кнопки выстрела
    Shoot(bool),
    Special,
    DropDown,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerCommand {
    pub entity: Entity,
    pub command: FighterCommand,
}

impl PlayerCommand {
    pub fn new(entity: Entity, command: FighterCommand) -> Self {
        Self { entity, command }
    }
}

/// Накопленный input игрока на текущий тик
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub jump_pressed: bool,
    pub drop_pressed: bool,
    pub shoot_held: bool,
    pub special_pressed: bool,
}

impl PlayerInput {
    /// Применить команду. `grounded` нужен для drop-down edge по стику.
    pub fn apply(&mut self, command: FighterCommand, grounded: bool) {
        match command {
            FighterCommand::Move(axis) => {
                let was_up = self.move_axis.y > AXIS_PRESS_THRESHOLD;
                let was_down = self.move_axis.y < -AXIS_PRESS_THRESHOLD;
                if axis.y > AXIS_PRESS_THRESHOLD && !was_up {
                    self.jump_pressed = true;
                }
                if axis.y < -AXIS_PRESS_THRESHOLD && grounded && !was_down {
                    self.drop_pressed = true;
                }
                self.move_axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
            }
            FighterCommand::Jump => self.jump_pressed = true,
            FighterCommand::Shoot(held) => self.shoot_held = held,
            FighterCommand::Special => self.special_pressed = true,
            FighterCommand::DropDown => self.drop_pressed = true,
        }
    }

    /// Сбросить одноразовые нажатия (конец тика)
    pub fn clear_presses(&mut self) {
        self.jump_pressed = false;
        self.drop_pressed = false;
        self.special_pressed = false;
    }
}

/// Система: PlayerCommand события → PlayerInput
pub fn apply_player_commands(
    mut commands_in: EventReader<PlayerCommand>,
    mut inputs: Query<(&mut PlayerInput, Option<&ContactState>)>,
) {
    for event in commands_in.read() {
        let Ok((mut input, contact)) = inputs.get_mut(event.entity) else {
            SimulationError::state(format!("command {:?} for missing fighter {:?}", event.command, event.entity))
                .log("apply_player_commands");
            continue;
        };
        let grounded = contact.is_some_and(|c| c.grounded);
        input.apply(event.command, grounded);
    }
}

/// Система: очистка одноразовых нажатий
pub fn clear_one_shot_input(mut inputs: Query<&mut PlayerInput>) {
    for mut input in inputs.iter_mut() {
        input.clear_presses();
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerCommand>()
            .add_systems(FixedUpdate, apply_player_commands.in_set(SimulationSet::Input))
            .add_systems(FixedUpdate, clear_one_shot_input.in_set(SimulationSet::Cleanup));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_up_is_a_single_jump_press() {
        let mut input = PlayerInput::default();
        input.apply(FighterCommand::Move(Vec2::new(0.0, 0.8)), true);
        assert!(input.jump_pressed);

        input.clear_presses();
        input.apply(FighterCommand::Move(Vec2::new(0.3, 0.9)), true);
        assert!(!input.jump_pressed, "holding up must not repeat the jump");

        input.apply(FighterCommand::Move(Vec2::ZERO), true);
        input.apply(FighterCommand::Move(Vec2::new(0.0, 1.0)), true);
        assert!(input.jump_pressed);
    }

    #[test]
    fn test_stick_down_drops_only_when_grounded() {
        let mut input = PlayerInput::default();
        input.apply(FighterCommand::Move(Vec2::new(0.0, -1.0)), false);
        assert!(!input.drop_pressed);

        input.apply(FighterCommand::Move(Vec2::ZERO), true);
        input.apply(FighterCommand::Move(Vec2::new(0.0, -1.0)), true);
        assert!(input.drop_pressed);
    }

    #[test]
    fn test_shoot_is_held_across_ticks() {
        let mut input = PlayerInput::default();
        input.apply(FighterCommand::Shoot(true), false);
        input.apply(FighterCommand::Special, false);
        input.clear_presses();

        assert!(input.shoot_held);
        assert!(!input.special_pressed);

        input.apply(FighterCommand::Shoot(false), false);
        assert!(!input.shoot_held);
    }

    #[test]
    fn test_move_axis_is_clamped() {
        let mut input = PlayerInput::default();
        input.apply(FighterCommand::Move(Vec2::new(3.0, -0.05)), true);
        assert_eq!(input.move_axis, Vec2::new(1.0, -0.05));
        assert!(!input.drop_pressed);
    }
}
