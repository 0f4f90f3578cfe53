//! Projectiles: пули и бомбы
//!
//! ECS ответственность:
//! - lifetime, fuse, owner filtering, shield absorb
//! - falloff взрыва и DamageRequest
//! - возврат в пул
//!
//! Backend ответственность: движение, overlap и ground contact события.

use bevy::prelude::*;

use crate::combat::resolve_damage_requests;
use crate::SimulationSet;

pub mod components;
pub mod systems;

pub use components::{
    explosion_hit, BombFuse, BombPrefab, ExplosionHit, Projectile, ProjectileKind, ProjectilePrefab,
    ProjectilePrefabs, ProjectileTick,
};
pub use systems::{BombExploded, PendingDetonation};

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BombExploded>()
            .add_systems(
                FixedUpdate,
                systems::tick_projectiles.in_set(SimulationSet::Timers),
            )
            .add_systems(
                FixedUpdate,
                (
                    systems::bounce_bombs,
                    systems::resolve_projectile_overlaps,
                    systems::explode_bombs,
                )
                    .chain()
                    .in_set(SimulationSet::Resolve)
                    .before(resolve_damage_requests),
            );
    }
}
