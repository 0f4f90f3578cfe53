//! Tests for ActiveEffects rules and effect hooks.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::Combatant;
    use crate::effects::{ActiveEffects, EffectCatalog, EffectId, EffectKind, EffectSpec, EffectTarget, TargetPolicy};
    use crate::locomotion::Mobility;
    use crate::weapons::{Loadout, UseOutcome, WeaponCatalog};

    struct Player {
        combatant: Combatant,
        mobility: Mobility,
        loadout: Loadout,
        catalog: WeaponCatalog,
    }

    impl Player {
        fn new() -> Self {
            Self {
                combatant: Combatant::default(),
                mobility: Mobility::default(),
                loadout: Loadout::default(),
                catalog: WeaponCatalog::default(),
            }
        }

        fn target(&mut self) -> EffectTarget<'_> {
            EffectTarget {
                entity: Entity::from_raw(1),
                combatant: &mut self.combatant,
                mobility: &mut self.mobility,
                loadout: &mut self.loadout,
                catalog: &self.catalog,
            }
        }
    }

    fn instance(id: &str) -> crate::effects::EffectInstance {
        let catalog = EffectCatalog::default();
        let id = EffectId::from(id);
        catalog.require(&id).unwrap().instantiate(id)
    }

    #[test]
    fn test_duplicate_effect_is_rejected() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();

        effects.apply(instance("shield"), &mut player.target()).unwrap();
        let err = effects.apply(instance("shield"), &mut player.target()).unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(effects.len(), 1);
        assert!(player.combatant.has_shield());
    }

    #[test]
    fn test_capacity_limit() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::with_capacity(2);
        effects.apply(instance("shield"), &mut player.target()).unwrap();
        effects.apply(instance("reverse"), &mut player.target()).unwrap();

        assert!(effects.apply(instance("silence"), &mut player.target()).is_err());
        assert!(player.loadout.can_shoot());
    }

    #[test]
    fn test_timed_effect_expires_and_reverts() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        effects.apply(instance("silence"), &mut player.target()).unwrap();
        assert!(!player.loadout.can_shoot());

        assert!(effects.tick(4.0, &mut player.target()).is_empty());
        assert!((effects.get(&"silence".into()).unwrap().remaining_fraction() - 0.2).abs() < 1e-4);

        let expired = effects.tick(1.0, &mut player.target());
        assert_eq!(expired.len(), 1);
        assert!(!expired[0].active);
        assert!(effects.is_empty());
        assert!(player.loadout.can_shoot());
    }

    #[test]
    fn test_overlapping_speed_effects_restore_base_speed() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        effects.apply(instance("speed_up"), &mut player.target()).unwrap();
        effects.apply(instance("slow_down"), &mut player.target()).unwrap();
        assert!((player.mobility.speed_multiplier - 0.91).abs() < 1e-4);

        // Снимаем в "неправильном" порядке: базовая скорость всё равно восстанавливается
        effects.remove(&"speed_up".into(), &mut player.target()).unwrap();
        effects.remove(&"slow_down".into(), &mut player.target()).unwrap();
        assert!((player.mobility.speed_multiplier - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_instant_double_ammo_is_not_listed() {
        let mut player = Player::new();
        player.loadout.tick(1.0);
        assert!(matches!(player.loadout.use_current().unwrap(), UseOutcome::Fired { .. }));

        let mut effects = ActiveEffects::default();
        let applied = effects.apply(instance("double_ammo"), &mut player.target()).unwrap();
        assert!(applied.instant);
        assert!(effects.is_empty());
        assert_eq!(player.loadout.current().current_ammo(), 18);

        // Мгновенный эффект можно применить снова
        effects.apply(instance("double_ammo"), &mut player.target()).unwrap();
        assert_eq!(player.loadout.current().current_ammo(), 20);
    }

    #[test]
    fn test_grant_weapon_equips_pickup() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        let spec = EffectSpec::grant_weapon(&"shotgun".into());

        let applied = effects.apply(spec.instantiate("grant:shotgun".into()), &mut player.target()).unwrap();
        let changed = applied.weapon_changed.unwrap();
        assert_eq!(changed.previous, "pistol".into());
        assert_eq!(changed.current, "shotgun".into());
        assert_eq!(player.loadout.current().id, "shotgun".into());
    }

    #[test]
    fn test_grant_unknown_weapon_is_configuration_error() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        let spec = EffectSpec::grant_weapon(&"railgun".into());

        let err = effects.apply(spec.instantiate("grant:railgun".into()), &mut player.target()).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(player.loadout.current().id, "pistol".into());
    }

    #[test]
    fn test_remove_and_extend_require_active_effect() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        assert!(effects.remove(&"shield".into(), &mut player.target()).is_err());
        assert!(effects.extend_duration(&"shield".into(), 2.0).is_err());

        effects.apply(instance("shield"), &mut player.target()).unwrap();
        assert_eq!(effects.extend_duration(&"shield".into(), 2.0).unwrap(), 7.0);
    }

    #[test]
    fn test_remove_all_and_queries() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        effects.apply(instance("shield"), &mut player.target()).unwrap();
        effects.apply(instance("triple_jump"), &mut player.target()).unwrap();
        effects.apply(instance("reverse"), &mut player.target()).unwrap();
        effects.apply(instance("speed_up"), &mut player.target()).unwrap();

        assert_eq!(effects.buff_count(), 3);
        assert_eq!(effects.debuff_count(), 1);
        assert_eq!(effects.effects_of_kind(&EffectKind::SpeedChange { multiplier: 0.0 }).len(), 1);
        assert!(effects.has_effect(&"reverse".into()));

        let removed = effects.remove_all(&mut player.target());
        assert_eq!(removed.len(), 4);
        assert!(!player.combatant.has_shield());
        assert!(!player.mobility.is_reversed());
        assert!(!player.mobility.triple_jump_enabled());
        assert!((player.mobility.speed_multiplier - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shield_blocks_damage_until_removed() {
        let mut player = Player::new();
        let mut effects = ActiveEffects::default();
        let spec = EffectSpec::new("Shield", EffectKind::Shield, 1.0, true, TargetPolicy::Picker);
        effects.apply(spec.instantiate("shield".into()), &mut player.target()).unwrap();

        assert!(player.combatant.take_damage(10.0, 5.0, Vec2::X).is_err());
        effects.tick(1.0, &mut player.target());
        assert!(player.combatant.take_damage(10.0, 5.0, Vec2::X).is_ok());
    }
}
