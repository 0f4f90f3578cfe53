//! Pickup: предмет на арене
//!
//! Жизненный цикл:
//! ```text
//! Available ──pickup──→ (despawn) | Hidden{respawn} ──timer──→ Available
//!     │
//!     └─crate──→ Revealing{recipient, weapon, elapsed} ──reveal_delay──→ Opened
//! ```
//! Despawn crate'а во время Revealing отменяет выдачу (состояние живёт в компоненте).

use bevy::prelude::*;

use super::drop::DropPayload;
use crate::weapons::WeaponId;

/// Самостоятельный respawn (предметы, расставленные на уровне)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RespawnPolicy {
    pub delay: f32,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum PickupState {
    Available,
    Revealing {
        recipient: Entity,
        weapon: WeaponId,
        elapsed: f32,
    },
    /// Подобран, ждёт respawn
    Hidden { timer: f32 },
    /// Подобран окончательно (ждёт despawn)
    Opened,
}

/// Что сделать с entity после подбора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupFate {
    Despawn,
    Hide,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Pickup {
    pub payload: DropPayload,
    pub state: PickupState,
    pub respawn: Option<RespawnPolicy>,
    /// Позиция, куда предмет возвращается после respawn
    pub home: Vec2,
    /// Spawner, который его создал
    pub spawner: Option<Entity>,
}

impl Pickup {
    pub fn new(payload: DropPayload, home: Vec2) -> Self {
        Self {
            payload,
            state: PickupState::Available,
            respawn: None,
            home,
            spawner: None,
        }
    }

    pub fn with_respawn(mut self, delay: f32) -> Self {
        self.respawn = Some(RespawnPolicy { delay: delay.max(0.0) });
        self
    }

    pub fn is_available(&self) -> bool {
        self.state == PickupState::Available
    }

    pub fn is_crate(&self) -> bool {
        matches!(self.payload, DropPayload::WeaponCrate(_))
    }

    /// Начать reveal crate'а для получателя
    pub fn begin_reveal(&mut self, recipient: Entity, weapon: WeaponId) {
        self.state = PickupState::Revealing {
            recipient,
            weapon,
            elapsed: 0.0,
        };
    }

    /// Продвинуть reveal. По истечении `delay` возвращает (получатель, оружие)
    /// и переводит crate в Opened.
    pub fn tick_reveal(&mut self, delta: f32, delay: f32) -> Option<(Entity, WeaponId)> {
        let PickupState::Revealing { recipient, weapon, elapsed } = &mut self.state else {
            return None;
        };
        *elapsed += delta;
        if *elapsed < delay {
            return None;
        }
        let granted = (*recipient, weapon.clone());
        self.state = PickupState::Opened;
        Some(granted)
    }

    /// Подбор завершён: спрятать до respawn или удалить
    pub fn consume(&mut self) -> PickupFate {
        match self.respawn {
            Some(policy) => {
                self.state = PickupState::Hidden { timer: policy.delay };
                PickupFate::Hide
            }
            None => {
                self.state = PickupState::Opened;
                PickupFate::Despawn
            }
        }
    }

    /// Таймер respawn. `true` когда предмет снова доступен.
    pub fn tick_respawn(&mut self, delta: f32) -> bool {
        let PickupState::Hidden { timer } = &mut self.state else {
            return false;
        };
        *timer -= delta;
        if *timer > 0.0 {
            return false;
        }
        self.state = PickupState::Available;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_reveal_grants_after_delay() {
        let fighter = Entity::from_raw(3);
        let mut pickup = Pickup::new(DropPayload::WeaponCrate(Vec::new()), Vec2::ZERO);
        assert!(pickup.is_crate());

        pickup.begin_reveal(fighter, "rifle".into());
        assert!(!pickup.is_available());
        assert_eq!(pickup.tick_reveal(0.5, 1.0), None);
        assert_eq!(pickup.tick_reveal(0.5, 1.0), Some((fighter, "rifle".into())));
        assert_eq!(pickup.state, PickupState::Opened);
        assert_eq!(pickup.tick_reveal(1.0, 1.0), None);
    }

    #[test]
    fn test_respawning_pickup_hides_and_returns() {
        let mut pickup = Pickup::new(DropPayload::Effect("shield".into()), Vec2::new(1.0, 2.0)).with_respawn(10.0);
        assert_eq!(pickup.consume(), PickupFate::Hide);
        assert!(!pickup.is_available());

        assert!(!pickup.tick_respawn(9.0));
        assert!(pickup.tick_respawn(1.0));
        assert!(pickup.is_available());
    }

    #[test]
    fn test_one_shot_pickup_despawns() {
        let mut pickup = Pickup::new(DropPayload::Weapon("rifle".into()), Vec2::ZERO);
        assert_eq!(pickup.consume(), PickupFate::Despawn);
        assert!(!pickup.tick_respawn(100.0));
    }
}
