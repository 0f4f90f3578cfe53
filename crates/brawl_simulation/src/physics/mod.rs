//! Physics boundary
//!
//! Симуляция НЕ реализует физику. Здесь только контракт с внешним backend'ом:
//! - `SpatialQuery::query_circle`: overlap query для взрывов
//! - boundary events (overlap / ground contact), которые backend генерирует
//! - `PhysicsBody` / `ContactState` / `Hurtbox` (в `components::body`)
//!
//! `headless`: минимальный reference backend для тестов и headless demo.

use bevy::prelude::*;

use crate::components::{Fighter, Hurtbox};
use crate::SimulationSet;

pub mod headless;

pub use headless::{ArenaGeometry, HeadlessArenaPlugin, OneWayPlatform};

// ============================================================================
// Spatial query boundary
// ============================================================================

/// Снимок коллайдера для синхронизации с backend'ом
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSample {
    pub entity: Entity,
    pub position: Vec2,
    pub radius: f32,
}

/// Overlap queries, которые симуляция делает через backend
pub trait SpatialQuery: Send + Sync + 'static {
    /// Все коллайдеры, пересекающие круг
    fn query_circle(&self, center: Vec2, radius: f32) -> Vec<Entity>;

    /// Backend'ы, которые сами ведут broad phase, игнорируют это
    fn sync_colliders(&mut self, _colliders: &[ColliderSample]) {}
}

/// Brute-force индекс: O(n) по коллайдерам игроков (их единицы)
#[derive(Debug, Default, Clone)]
pub struct BruteForceIndex {
    colliders: Vec<ColliderSample>,
}

impl SpatialQuery for BruteForceIndex {
    fn query_circle(&self, center: Vec2, radius: f32) -> Vec<Entity> {
        self.colliders
            .iter()
            .filter(|c| c.position.distance(center) <= radius + c.radius)
            .map(|c| c.entity)
            .collect()
    }

    fn sync_colliders(&mut self, colliders: &[ColliderSample]) {
        self.colliders.clear();
        self.colliders.extend_from_slice(colliders);
    }
}

/// Активный spatial backend (подменяется при подключении реального движка)
#[derive(Resource)]
pub struct SpatialBackend(Box<dyn SpatialQuery>);

impl SpatialBackend {
    pub fn new(backend: impl SpatialQuery) -> Self {
        Self(Box::new(backend))
    }

    pub fn query_circle(&self, center: Vec2, radius: f32) -> Vec<Entity> {
        self.0.query_circle(center, radius)
    }

    pub fn sync_colliders(&mut self, colliders: &[ColliderSample]) {
        self.0.sync_colliders(colliders);
    }
}

impl Default for SpatialBackend {
    fn default() -> Self {
        Self::new(BruteForceIndex::default())
    }
}

// ============================================================================
// Boundary events (backend → simulation)
// ============================================================================

/// Trigger projectile пересёкся с коллайдером
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileOverlap {
    pub projectile: Entity,
    pub other: Entity,
}

/// Solid projectile (bomb) ударился о землю
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileGroundContact {
    pub projectile: Entity,
}

/// Игрок вошёл в trigger pickup'а
#[derive(Event, Debug, Clone, Copy)]
pub struct PickupOverlap {
    pub pickup: Entity,
    pub fighter: Entity,
}

/// Система: синхронизировать коллайдеры игроков с spatial backend
pub fn sync_spatial_backend(
    mut backend: ResMut<SpatialBackend>,
    fighters: Query<(Entity, &Transform, &Hurtbox), With<Fighter>>,
) {
    let samples: Vec<ColliderSample> = fighters
        .iter()
        .map(|(entity, transform, hurtbox)| ColliderSample {
            entity,
            position: transform.translation.truncate(),
            radius: hurtbox.radius,
        })
        .collect();
    backend.sync_colliders(&samples);
}

/// Plugin: boundary events + spatial backend
pub struct PhysicsBoundaryPlugin;

impl Plugin for PhysicsBoundaryPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ProjectileOverlap>()
            .add_event::<ProjectileGroundContact>()
            .add_event::<PickupOverlap>()
            .init_resource::<SpatialBackend>()
            .add_systems(FixedUpdate, sync_spatial_backend.in_set(SimulationSet::Timers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_query_includes_collider_radius() {
        let mut index = BruteForceIndex::default();
        let near = Entity::from_raw(1);
        let edge = Entity::from_raw(2);
        let far = Entity::from_raw(3);
        index.sync_colliders(&[
            ColliderSample { entity: near, position: Vec2::new(1.0, 0.0), radius: 0.5 },
            ColliderSample { entity: edge, position: Vec2::new(3.4, 0.0), radius: 0.5 },
            ColliderSample { entity: far, position: Vec2::new(10.0, 0.0), radius: 0.5 },
        ]);

        let hits = index.query_circle(Vec2::ZERO, 3.0);
        assert_eq!(hits, vec![near, edge]);
    }
}
