//! Pool systems: prewarm на Startup, обработка возвратов

use bevy::prelude::*;

use super::{Inactive, ObjectPool, PoolSettings, Poolable, Pooled, ReturnToPool};
use crate::components::PhysicsBody;
use crate::error::SimulationError;
use crate::projectiles::{Projectile, ProjectilePrefabs};

/// Система (Startup): создать пулы из PoolSettings
pub fn prewarm_pools(
    mut commands: Commands,
    mut pool: ResMut<ObjectPool>,
    settings: Res<PoolSettings>,
    prefabs: Res<ProjectilePrefabs>,
) {
    for config in &settings.pools {
        if let Err(e) = pool.add_pool(&mut commands, &prefabs, config) {
            // Фича отключается, остальная симуляция работает
            e.log("prewarm_pools");
        }
    }
}

/// Система: вернуть instance'ы в пул
///
/// - деактивация (`Inactive`)
/// - velocity / angular velocity = 0, transform в ноль
/// - `Poolable::reset_for_pool`
/// - instance переезжает в хвост очереди
///
/// Запросы старой generation пропускаются: instance уже снова в игре.
pub fn process_pool_returns(
    mut commands: Commands,
    mut events: EventReader<ReturnToPool>,
    mut pool: ResMut<ObjectPool>,
    mut instances: Query<(
        Option<&Pooled>,
        &mut Transform,
        Option<&mut PhysicsBody>,
        Option<&mut Projectile>,
    )>,
) {
    for event in events.read() {
        if pool.is_stale(event) {
            crate::logger::log(&format!(
                "⏭️ Stale return for {:?} ignored (instance was re-issued)",
                event.entity
            ));
            continue;
        }
        let Ok((pooled, mut transform, body, projectile)) = instances.get_mut(event.entity) else {
            SimulationError::state(format!("cannot return {:?}: entity is gone", event.entity))
                .log("process_pool_returns");
            continue;
        };

        let tag = match (&event.tag, pooled) {
            (Some(tag), _) => Some(tag.clone()),
            (None, Some(pooled)) => pool.tag_for_prefab(&pooled.prefab),
            (None, None) => None,
        };
        let Some(tag) = tag else {
            SimulationError::invalid(format!("could not find pool for {:?}", event.entity))
                .log("process_pool_returns");
            continue;
        };

        if let Err(e) = pool.release(&tag, event.entity) {
            e.log("process_pool_returns");
            continue;
        }

        *transform = Transform::IDENTITY;
        if let Some(mut body) = body {
            body.stop();
        }
        if let Some(mut projectile) = projectile {
            projectile.reset_for_pool();
        }
        commands.entity(event.entity).insert(Inactive);

        crate::logger::log(&format!("↩️ Returned {:?} to pool '{}'", event.entity, tag));
    }
}
