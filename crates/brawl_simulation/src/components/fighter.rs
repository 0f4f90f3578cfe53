//! Fighter: игрок на арене
//!
//! Архитектура: один marker-компонент + required components по доменам
//! (combat / locomotion / effects / weapons / input). Каждый домен владеет
//! своим компонентом, Fighter только собирает их вместе.

use bevy::prelude::*;

use super::body::{ContactState, Hurtbox, PhysicsBody};
use crate::combat::Combatant;
use crate::effects::{ActiveEffects, EffectId};
use crate::input::PlayerInput;
use crate::locomotion::{LocomotionMachine, LocomotionState, Mobility};
use crate::weapons::{Loadout, WeaponId};

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    PhysicsBody,
    ContactState,
    Hurtbox,
    Combatant,
    Mobility,
    LocomotionMachine,
    ActiveEffects,
    Loadout,
    PlayerInput
)]
pub struct Fighter {
    /// Номер игрока (1, 2, ...): для UI и подсчёта stocks
    pub player_id: u8,
    /// Направление взгляда: +1 вправо, -1 влево
    pub facing: f32,
}

impl Fighter {
    pub fn new(player_id: u8) -> Self {
        Self {
            player_id,
            facing: 1.0,
        }
    }

    /// Обновить facing по горизонтальному направлению (0 не меняет)
    pub fn face_towards(&mut self, x: f32) {
        if x > 0.0 {
            self.facing = 1.0;
        } else if x < 0.0 {
            self.facing = -1.0;
        }
    }
}

impl Default for Fighter {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Spawn helper: fighter с заданным loadout в позиции
pub fn spawn_fighter(commands: &mut Commands, player_id: u8, position: Vec2, loadout: Loadout) -> Entity {
    commands
        .spawn((
            Fighter::new(player_id),
            Transform::from_translation(position.extend(0.0)),
            loadout,
        ))
        .id()
}

/// Read-only снимок состояния fighter'а для UI/audio/animation слоёв
#[derive(Debug, Clone, PartialEq)]
pub struct FighterStatus {
    pub player_id: u8,
    pub damage_percent: f32,
    pub weapon: WeaponId,
    pub current_ammo: u32,
    pub max_ammo: u32,
    pub is_reloading: bool,
    pub bomb_count: u32,
    pub active_effects: Vec<EffectId>,
    pub state: LocomotionState,
    pub previous_state: Option<LocomotionState>,
}

impl FighterStatus {
    pub fn read(world: &World, entity: Entity) -> Option<Self> {
        let fighter = world.get::<Fighter>(entity)?;
        let combatant = world.get::<Combatant>(entity)?;
        let loadout = world.get::<Loadout>(entity)?;
        let effects = world.get::<ActiveEffects>(entity)?;
        let machine = world.get::<LocomotionMachine>(entity)?;
        let weapon = loadout.current();

        Some(Self {
            player_id: fighter.player_id,
            damage_percent: combatant.damage_percent(),
            weapon: weapon.id.clone(),
            current_ammo: weapon.current_ammo(),
            max_ammo: weapon.max_ammo(),
            is_reloading: weapon.is_reloading(),
            bomb_count: loadout.bomb_count,
            active_effects: effects.iter().map(|effect| effect.id.clone()).collect(),
            state: machine.current(),
            previous_state: machine.previous(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_towards_ignores_zero() {
        let mut fighter = Fighter::new(2);
        fighter.face_towards(-0.5);
        assert_eq!(fighter.facing, -1.0);
        fighter.face_towards(0.0);
        assert_eq!(fighter.facing, -1.0);
        fighter.face_towards(3.0);
        assert_eq!(fighter.facing, 1.0);
    }
}
