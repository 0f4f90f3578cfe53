//! Locomotion: бег, прыжки, wall slide, drop-down
//!
//! ECS ответственность:
//! - LocomotionMachine: Idle / Run / Jump / Fall / WallSlide
//! - Mobility: jump count, speed multiplier, reverse / triple jump слои
//! - целевая скорость и сглаживание (пишем PhysicsBody.velocity)
//!
//! Backend ответственность: интеграция, контакты (ContactState).

use bevy::prelude::*;

use crate::SimulationSet;

pub mod mobility;
pub mod state;
pub mod systems;

#[cfg(test)]
mod state_tests;

pub use mobility::{JumpKind, LocomotionSettings, Mobility};
pub use state::{JumpIntent, LocomotionContext, LocomotionMachine, LocomotionState, PlayerStateChanged};

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerStateChanged>()
            .init_resource::<LocomotionSettings>()
            .add_systems(
                FixedUpdate,
                (systems::update_grounding, systems::update_locomotion_states)
                    .chain()
                    .in_set(SimulationSet::Timers),
            )
            .add_systems(
                FixedUpdate,
                (systems::handle_locomotion_input, systems::apply_locomotion_movement)
                    .chain()
                    .in_set(SimulationSet::Actions),
            );
    }
}
