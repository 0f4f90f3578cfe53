//! Tests for pickup / spawner systems.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;

    use crate::combat::Combatant;
    use crate::components::Fighter;
    use crate::effects::{EffectApplied, EffectCatalog, EffectRemoved};
    use crate::items::systems::{handle_pickup_overlaps, tick_item_spawners, tick_pickups, track_destroyed_items};
    use crate::items::{
        CrateEntry, DropPayload, DropProfile, DropTable, ItemDestroyed, ItemPickedUp, ItemSettings, ItemSpawned,
        ItemSpawner, Pickup, PickupState,
    };
    use crate::locomotion::Mobility;
    use crate::physics::PickupOverlap;
    use crate::weapons::{Loadout, WeaponCatalog, WeaponChanged};
    use crate::DeterministicRng;

    fn items_app() -> App {
        let mut app = App::new();
        app.add_event::<PickupOverlap>()
            .add_event::<ItemSpawned>()
            .add_event::<ItemPickedUp>()
            .add_event::<ItemDestroyed>()
            .add_event::<EffectApplied>()
            .add_event::<EffectRemoved>()
            .add_event::<WeaponChanged>()
            .insert_resource(Time::<()>::default())
            .insert_resource(DeterministicRng::new(7))
            .init_resource::<EffectCatalog>()
            .init_resource::<WeaponCatalog>()
            .init_resource::<ItemSettings>()
            .add_systems(
                Update,
                (tick_item_spawners, tick_pickups, handle_pickup_overlaps, track_destroyed_items).chain(),
            );
        app
    }

    fn spawn_pickup(app: &mut App, payload: DropPayload) -> Entity {
        app.world_mut()
            .spawn((Pickup::new(payload, Vec2::ZERO), Transform::default()))
            .id()
    }

    fn touch(app: &mut App, pickup: Entity, fighter: Entity) {
        app.world_mut().send_event(PickupOverlap { pickup, fighter });
        app.update();
    }

    fn advance(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
    }

    fn picked(app: &App) -> Vec<ItemPickedUp> {
        app.world()
            .resource::<Events<ItemPickedUp>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    #[test]
    fn test_self_effect_goes_to_picker_and_consumes() {
        let mut app = items_app();
        let fighter = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = spawn_pickup(&mut app, DropPayload::Effect("shield".into()));

        touch(&mut app, pickup, fighter);

        assert!(app.world().get::<Combatant>(fighter).unwrap().has_shield());
        assert!(app.world().get_entity(pickup).is_err());
        assert_eq!(picked(&app).len(), 1);
    }

    #[test]
    fn test_others_effect_skips_picker() {
        let mut app = items_app();
        let picker = app.world_mut().spawn(Fighter::new(1)).id();
        let rival = app.world_mut().spawn(Fighter::new(2)).id();
        let pickup = spawn_pickup(&mut app, DropPayload::Effect("slow_down".into()));

        touch(&mut app, pickup, picker);

        let picker_speed = app.world().get::<Mobility>(picker).unwrap().speed_multiplier;
        let rival_speed = app.world().get::<Mobility>(rival).unwrap().speed_multiplier;
        assert!((picker_speed - 1.0).abs() < 1e-5);
        assert!((rival_speed - 0.7).abs() < 1e-5);
        assert!(app.world().get_entity(pickup).is_err());
    }

    #[test]
    fn test_others_effect_without_rivals_is_not_consumed() {
        let mut app = items_app();
        let picker = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = spawn_pickup(&mut app, DropPayload::Effect("silence".into()));

        touch(&mut app, pickup, picker);

        let state = &app.world().get::<Pickup>(pickup).unwrap().state;
        assert_eq!(*state, PickupState::Available);
        assert!(app.world().get::<Loadout>(picker).unwrap().can_shoot());
        assert!(picked(&app).is_empty());
    }

    #[test]
    fn test_weapon_pickup_equips_weapon() {
        let mut app = items_app();
        let fighter = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = spawn_pickup(&mut app, DropPayload::Weapon("shotgun".into()));

        touch(&mut app, pickup, fighter);

        let loadout = app.world().get::<Loadout>(fighter).unwrap();
        assert_eq!(loadout.current().id, "shotgun".into());
        let changes = app.world().resource::<Events<WeaponChanged>>().iter_current_update_events().count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_crate_reveals_weapon_after_delay() {
        let mut app = items_app();
        let fighter = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = spawn_pickup(&mut app, DropPayload::WeaponCrate(vec![CrateEntry::new("rifle", 1.0)]));

        touch(&mut app, pickup, fighter);
        assert!(matches!(
            app.world().get::<Pickup>(pickup).unwrap().state,
            PickupState::Revealing { .. }
        ));
        assert_eq!(app.world().get::<Loadout>(fighter).unwrap().current().id, "pistol".into());

        advance(&mut app, 0.6);
        app.update();
        assert_eq!(app.world().get::<Loadout>(fighter).unwrap().current().id, "pistol".into());

        app.update();
        assert_eq!(app.world().get::<Loadout>(fighter).unwrap().current().id, "rifle".into());
        assert!(app.world().get_entity(pickup).is_err());
    }

    #[test]
    fn test_respawning_crate_hides_with_full_timer() {
        let mut app = items_app();
        let fighter = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = app
            .world_mut()
            .spawn((
                Pickup::new(DropPayload::WeaponCrate(vec![CrateEntry::new("rifle", 1.0)]), Vec2::ZERO).with_respawn(2.0),
                Transform::default(),
            ))
            .id();

        touch(&mut app, pickup, fighter);
        advance(&mut app, 0.6);
        app.update();
        app.update();

        // Тик выдачи не списывается с таймера respawn
        assert_eq!(app.world().get::<Loadout>(fighter).unwrap().current().id, "rifle".into());
        assert_eq!(
            app.world().get::<Pickup>(pickup).unwrap().state,
            PickupState::Hidden { timer: 2.0 }
        );
    }

    #[test]
    fn test_spawner_spawns_and_untracks_destroyed_items() {
        let mut app = items_app();
        let table = DropTable::new(vec![DropProfile::new("Shield", DropPayload::Effect("shield".into()), 1.0)]);
        let spawner = app
            .world_mut()
            .spawn(ItemSpawner::new(table, vec![Vec2::new(2.0, 1.0)]).with_initial_delay(0.0))
            .id();

        advance(&mut app, 0.1);
        app.update();

        let spawned: Vec<ItemSpawned> = app
            .world()
            .resource::<Events<ItemSpawned>>()
            .iter_current_update_events()
            .cloned()
            .collect();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].position, Vec2::new(2.0, 1.0));
        assert_eq!(app.world().get::<ItemSpawner>(spawner).unwrap().active_count(), 1);

        app.world_mut().despawn(spawned[0].item);
        app.update();

        assert_eq!(app.world().get::<ItemSpawner>(spawner).unwrap().active_count(), 0);
        let destroyed: Vec<ItemDestroyed> = app
            .world()
            .resource::<Events<ItemDestroyed>>()
            .iter_current_update_events()
            .copied()
            .collect();
        assert_eq!(destroyed, vec![ItemDestroyed { item: spawned[0].item, spawner: Some(spawner) }]);
    }

    #[test]
    fn test_respawning_pickup_returns_home() {
        let mut app = items_app();
        let fighter = app.world_mut().spawn(Fighter::new(1)).id();
        let pickup = app
            .world_mut()
            .spawn((
                Pickup::new(DropPayload::Effect("speed_up".into()), Vec2::new(4.0, 2.0)).with_respawn(1.0),
                Transform::default(),
            ))
            .id();

        touch(&mut app, pickup, fighter);
        assert!(!app.world().get::<Pickup>(pickup).unwrap().is_available());

        advance(&mut app, 1.0);
        app.update();
        assert!(app.world().get::<Pickup>(pickup).unwrap().is_available());
        let position = app.world().get::<Transform>(pickup).unwrap().translation.truncate();
        assert_eq!(position, Vec2::new(4.0, 2.0));
    }
}
