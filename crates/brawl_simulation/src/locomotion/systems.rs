//! Locomotion systems
//!
//! Timers:  update_grounding → update_locomotion_states
//! Actions: handle_locomotion_input → apply_locomotion_movement

use bevy::prelude::*;

use super::mobility::{LocomotionSettings, Mobility};
use super::state::{JumpIntent, LocomotionContext, LocomotionMachine, LocomotionState, PlayerStateChanged};
use crate::components::{ContactState, Fighter, PhysicsBody};
use crate::input::PlayerInput;

fn context(
    mobility: &Mobility,
    contact: &ContactState,
    body: &PhysicsBody,
    input: &PlayerInput,
    settings: &LocomotionSettings,
) -> LocomotionContext {
    LocomotionContext {
        grounded: mobility.is_grounded(),
        velocity: body.velocity,
        move_x: input.move_axis.x,
        touching_wall: contact.wall.is_some(),
        pressing_into_wall: contact.pressing_into_wall(input.move_axis.x, settings.deadzone),
        deadzone: settings.deadzone,
    }
}

fn emit_change(
    events: &mut EventWriter<PlayerStateChanged>,
    entity: Entity,
    change: Option<(LocomotionState, LocomotionState)>,
) {
    if let Some((previous, current)) = change {
        events.write(PlayerStateChanged {
            entity,
            previous,
            current,
        });
    }
}

/// Система: grounded edge + окно drop-down
pub fn update_grounding(time: Res<Time>, mut fighters: Query<(Entity, &ContactState, &mut Mobility)>) {
    let delta = time.delta_secs();
    for (entity, contact, mut mobility) in fighters.iter_mut() {
        if mobility.update_grounded(contact.grounded) {
            crate::logger::log(&format!("🦶 {:?} landed, jumps reset", entity));
        }
        mobility.tick_drop_down(delta);
    }
}

/// Система: переходы state machine по контактам и скорости
pub fn update_locomotion_states(
    time: Res<Time>,
    settings: Res<LocomotionSettings>,
    mut fighters: Query<(Entity, &Mobility, &ContactState, &PhysicsBody, &PlayerInput, &mut LocomotionMachine)>,
    mut state_events: EventWriter<PlayerStateChanged>,
) {
    let delta = time.delta_secs();
    for (entity, mobility, contact, body, input, mut machine) in fighters.iter_mut() {
        machine.tick(delta);
        let ctx = context(mobility, contact, body, input, &settings);
        let next = machine.current().update(&ctx);
        let change = machine.change_state(entity, next);
        emit_change(&mut state_events, entity, change);
    }
}

/// Система: прыжки, wall jump, drop-down, facing
pub fn handle_locomotion_input(
    settings: Res<LocomotionSettings>,
    mut fighters: Query<(
        Entity,
        &mut Fighter,
        &PlayerInput,
        &ContactState,
        &mut Mobility,
        &mut LocomotionMachine,
        &mut PhysicsBody,
    )>,
    mut state_events: EventWriter<PlayerStateChanged>,
) {
    for (entity, mut fighter, input, contact, mut mobility, mut machine, mut body) in fighters.iter_mut() {
        if input.move_axis.x.abs() > settings.deadzone {
            let direction = mobility.effective_move_x(input.move_axis.x);
            fighter.face_towards(direction);
        }

        if input.drop_pressed {
            match mobility.start_drop_down(contact, settings.drop_down_time) {
                Ok(()) => crate::logger::log(&format!("⬇️ {:?} dropping through platform", entity)),
                Err(e) => e.log("handle_locomotion_input"),
            }
        }

        let ctx = context(&mobility, contact, &body, input, &settings);
        let Some(intent) = machine.current().handle_input(&ctx, input.jump_pressed, &settings) else {
            continue;
        };

        match intent {
            JumpIntent::WallJump(velocity) => {
                body.velocity = velocity;
                mobility.register_wall_jump();
                crate::logger::log(&format!("🧗 {:?} wall jump {:?}", entity, velocity));
            }
            JumpIntent::Jump => match mobility.try_jump() {
                Ok(kind) => {
                    body.velocity.y = kind.force(&settings);
                    crate::logger::log(&format!("⤴️ {:?} {:?} jump", entity, kind));
                }
                Err(e) => {
                    e.log("handle_locomotion_input");
                    continue;
                }
            },
        }

        if machine.current() != LocomotionState::Jump {
            let change = machine.change_state(entity, Some(LocomotionState::Jump));
            emit_change(&mut state_events, entity, change);
        }
    }
}

/// Система: горизонтальное движение + физика состояния (fixed step)
pub fn apply_locomotion_movement(
    time: Res<Time>,
    settings: Res<LocomotionSettings>,
    mut fighters: Query<(&PlayerInput, &LocomotionMachine, &mut Mobility, &mut PhysicsBody)>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }
    for (input, machine, mut mobility, mut body) in fighters.iter_mut() {
        machine.current().fixed_update(&mut body, &settings);

        let target = mobility.target_velocity_x(input.move_axis.x, &settings);
        let current = body.velocity.x;
        body.velocity.x = mobility.smooth_velocity_x(current, target, settings.smoothing_time, delta);
    }
}
