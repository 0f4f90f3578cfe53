//! Tests for damage resolution system.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::{resolve_damage_requests, Combatant, DamageDealt, DamageRequest};
    use crate::components::PhysicsBody;

    fn damage_app() -> App {
        let mut app = App::new();
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_systems(Update, resolve_damage_requests);
        app
    }

    fn dealt(app: &App) -> Vec<DamageDealt> {
        app.world()
            .resource::<Events<DamageDealt>>()
            .iter_current_update_events()
            .copied()
            .collect()
    }

    #[test]
    fn test_request_applies_damage_and_impulse() {
        let mut app = damage_app();
        let target = app.world_mut().spawn((Combatant::default(), PhysicsBody::default())).id();

        app.world_mut().send_event(DamageRequest {
            target,
            source: None,
            base_damage: 10.0,
            base_knockback: 5.0,
            direction: Vec2::new(2.0, 0.0),
        });
        app.update();

        let combatant = app.world().get::<Combatant>(target).unwrap();
        let body = app.world().get::<PhysicsBody>(target).unwrap();
        assert!((combatant.damage_percent() - 10.0).abs() < 1e-4);
        assert!((body.velocity.x - 5.5).abs() < 1e-4);

        let events = dealt(&app);
        assert_eq!(events.len(), 1);
        assert!(!events[0].critical);
    }

    #[test]
    fn test_two_requests_same_tick_collapse_to_one_hit() {
        let mut app = damage_app();
        let target = app.world_mut().spawn((Combatant::default(), PhysicsBody::default())).id();

        for _ in 0..2 {
            app.world_mut().send_event(DamageRequest {
                target,
                source: None,
                base_damage: 10.0,
                base_knockback: 5.0,
                direction: Vec2::X,
            });
        }
        app.update();

        let combatant = app.world().get::<Combatant>(target).unwrap();
        assert!((combatant.damage_percent() - 10.0).abs() < 1e-4);
        assert_eq!(dealt(&app).len(), 1);
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let mut app = damage_app();
        let ghost = app.world_mut().spawn_empty().id();
        app.world_mut().despawn(ghost);

        app.world_mut().send_event(DamageRequest {
            target: ghost,
            source: None,
            base_damage: 10.0,
            base_knockback: 5.0,
            direction: Vec2::X,
        });
        app.update();

        assert!(dealt(&app).is_empty());
    }
}
