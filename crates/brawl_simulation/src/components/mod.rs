//! ECS Components, общие для нескольких доменов
//!
//! Организация:
//! - body: граница с физикой (PhysicsBody, ContactState, Hurtbox)
//! - fighter: игрок (Fighter marker + required components, FighterStatus snapshot)
//!
//! Доменные компоненты (Combatant, Mobility, Loadout, ActiveEffects...) живут
//! в своих модулях.

pub mod body;
pub mod fighter;

pub use body::{ContactState, Hurtbox, PhysicsBody, WallSide};
pub use fighter::{spawn_fighter, Fighter, FighterStatus};
