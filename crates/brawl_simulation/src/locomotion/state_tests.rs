//! Tests for the locomotion state machine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::components::PhysicsBody;
    use crate::locomotion::{JumpIntent, LocomotionContext, LocomotionMachine, LocomotionSettings, LocomotionState};

    fn ctx() -> LocomotionContext {
        LocomotionContext {
            grounded: true,
            velocity: Vec2::ZERO,
            move_x: 0.0,
            touching_wall: false,
            pressing_into_wall: false,
            deadzone: 0.1,
        }
    }

    #[test]
    fn test_grounded_transitions() {
        let idle = LocomotionState::Idle;
        assert_eq!(idle.update(&ctx()), None);
        assert_eq!(idle.update(&LocomotionContext { move_x: 0.5, ..ctx() }), Some(LocomotionState::Run));
        assert_eq!(
            LocomotionState::Run.update(&LocomotionContext { move_x: 0.05, ..ctx() }),
            Some(LocomotionState::Idle)
        );
    }

    #[test]
    fn test_airborne_transitions_follow_vertical_velocity() {
        let rising = LocomotionContext { grounded: false, velocity: Vec2::new(0.0, 4.0), ..ctx() };
        let falling = LocomotionContext { grounded: false, velocity: Vec2::new(0.0, -1.0), ..ctx() };

        assert_eq!(LocomotionState::Idle.update(&rising), Some(LocomotionState::Jump));
        assert_eq!(LocomotionState::Run.update(&falling), Some(LocomotionState::Fall));
        assert_eq!(LocomotionState::Jump.update(&rising), None);
        assert_eq!(LocomotionState::Jump.update(&falling), Some(LocomotionState::Fall));
        assert_eq!(LocomotionState::Fall.update(&ctx()), Some(LocomotionState::Idle));
    }

    #[test]
    fn test_wall_slide_requires_pressing_into_wall() {
        let touching = LocomotionContext {
            grounded: false,
            velocity: Vec2::new(0.0, -3.0),
            move_x: 1.0,
            touching_wall: true,
            ..ctx()
        };
        assert_eq!(LocomotionState::Fall.update(&touching), None);

        let pressing = LocomotionContext { pressing_into_wall: true, ..touching };
        assert_eq!(LocomotionState::Fall.update(&pressing), Some(LocomotionState::WallSlide));
        assert_eq!(LocomotionState::WallSlide.update(&pressing), None);
        assert_eq!(LocomotionState::WallSlide.update(&touching), Some(LocomotionState::Fall));
    }

    #[test]
    fn test_wall_slide_caps_fall_speed() {
        let settings = LocomotionSettings::default();
        let mut body = PhysicsBody { velocity: Vec2::new(1.0, -9.0), ..default() };

        LocomotionState::Fall.fixed_update(&mut body, &settings);
        assert_eq!(body.velocity.y, -9.0);

        LocomotionState::WallSlide.fixed_update(&mut body, &settings);
        assert_eq!(body.velocity.y, -2.0);
    }

    #[test]
    fn test_wall_jump_pushes_away_from_wall() {
        let settings = LocomotionSettings::default();
        let on_wall = LocomotionContext { grounded: false, move_x: 1.0, touching_wall: true, ..ctx() };

        let Some(JumpIntent::WallJump(velocity)) = LocomotionState::WallSlide.handle_input(&on_wall, true, &settings)
        else {
            panic!("wall slide + jump must wall jump");
        };
        assert!(velocity.x < 0.0 && velocity.y > 0.0);
        assert!((velocity.length() - 15.0).abs() < 1e-4);

        assert!(matches!(
            LocomotionState::Fall.handle_input(&on_wall, true, &settings),
            Some(JumpIntent::WallJump(_))
        ));
        assert_eq!(LocomotionState::Idle.handle_input(&ctx(), true, &settings), Some(JumpIntent::Jump));
        assert_eq!(LocomotionState::Idle.handle_input(&ctx(), false, &settings), None);
    }

    #[test]
    fn test_change_state_tracks_previous() {
        let entity = Entity::from_raw(7);
        let mut machine = LocomotionMachine::default();
        assert_eq!(machine.current(), LocomotionState::Idle);
        assert_eq!(machine.previous(), None);

        assert_eq!(machine.change_state(entity, None), None);
        assert_eq!(machine.current(), LocomotionState::Idle);

        machine.tick(0.3);
        let change = machine.change_state(entity, Some(LocomotionState::Run));
        assert_eq!(change, Some((LocomotionState::Idle, LocomotionState::Run)));
        assert_eq!(machine.previous(), Some(LocomotionState::Idle));
        assert_eq!(machine.time_in_state(), 0.0);
    }
}
