//! Object pool: переиспользование projectile entities
//!
//! Архитектура:
//! - `ObjectPool` resource: tag → кольцевая очередь instance'ов + active set
//! - неактивный instance помечен `Inactive` (все gameplay queries фильтруют его)
//! - spawn: берём голову очереди, активируем, ставим в хвост (кольцо)
//! - return: `ReturnToPool` событие → деактивация + сброс состояния + в хвост
//!
//! Размер пула не меняется ни от spawn, ни от return: instance только
//! переезжает в хвост очереди, дубликатов нет.
//!
//! Возврат отложен до Cleanup, а spawn мгновенный, поэтому каждый spawn
//! увеличивает generation instance'а. `ReturnToPool` со старой generation
//! (instance успели выдать заново) игнорируется.

use std::collections::{HashMap, HashSet, VecDeque};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::projectiles::ProjectilePrefabs;

pub mod systems;


pub use systems::{prewarm_pools, process_pool_returns};

// ============================================================================
// Components & events
// ============================================================================

/// Marker: instance лежит в пуле и не участвует в симуляции
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Inactive;

/// Принадлежность instance'а пулу
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Pooled {
    pub tag: String,
    /// Имя prefab'а (по нему выводится tag, если не передан)
    pub prefab: String,
}

/// Hook сброса состояния при возврате в пул
pub trait Poolable {
    fn reset_for_pool(&mut self);
}

/// Запрос на возврат instance'а (tag = None → по имени prefab'а)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ReturnToPool {
    pub entity: Entity,
    pub tag: Option<String>,
    /// Generation на момент запроса (None = вернуть безусловно)
    pub generation: Option<u32>,
}

impl ReturnToPool {
    pub fn inferred(entity: Entity) -> Self {
        Self {
            entity,
            tag: None,
            generation: None,
        }
    }

    /// Возврат текущей выдачи instance'а
    pub fn issued(entity: Entity, pool: &ObjectPool) -> Self {
        Self {
            entity,
            tag: None,
            generation: pool.generation(entity),
        }
    }
}

/// Конфиг одного пула
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub tag: String,
    pub prefab: String,
    pub size: usize,
}

impl PoolConfig {
    /// Пул, чей tag совпадает с именем prefab'а (так их ищет оружие)
    pub fn for_prefab(prefab: &str, size: usize) -> Self {
        Self {
            tag: prefab.to_string(),
            prefab: prefab.to_string(),
            size,
        }
    }
}

// ============================================================================
// ObjectPool
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PoolQueue {
    pub prefab: String,
    queue: VecDeque<Entity>,
    active: HashSet<Entity>,
}

impl PoolQueue {
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.queue.contains(&entity)
    }

    /// Переставить instance в хвост (без дубликатов)
    fn move_to_tail(&mut self, entity: Entity) {
        if let Some(index) = self.queue.iter().position(|e| *e == entity) {
            self.queue.remove(index);
        }
        self.queue.push_back(entity);
    }
}

#[derive(Resource, Debug, Default)]
pub struct ObjectPool {
    pools: HashMap<String, PoolQueue>,
    /// Сколько раз instance выдавался (entity → generation)
    generations: HashMap<Entity, u32>,
}

impl ObjectPool {
    /// Создать пул и наполнить его `size` неактивными instance'ами.
    /// Уже существующий tag: no-op.
    pub fn add_pool(
        &mut self,
        commands: &mut Commands,
        prefabs: &ProjectilePrefabs,
        config: &PoolConfig,
    ) -> SimResult<()> {
        if config.tag.is_empty() {
            return Err(SimulationError::configuration("pool tag cannot be empty"));
        }
        if self.pools.contains_key(&config.tag) {
            crate::logger::log_warning(&format!("⚠️ Pool '{}' already exists", config.tag));
            return Ok(());
        }
        if !prefabs.contains(&config.prefab) {
            return Err(SimulationError::configuration(format!(
                "pool '{}' has no prefab '{}'",
                config.tag, config.prefab
            )));
        }

        let mut pool = PoolQueue {
            prefab: config.prefab.clone(),
            ..default()
        };
        for _ in 0..config.size {
            let entity = instantiate(commands, prefabs, &config.tag, &config.prefab)?;
            pool.queue.push_back(entity);
        }

        crate::logger::log_info(&format!(
            "🗃️ Created pool '{}' with {} '{}' instances",
            config.tag, config.size, config.prefab
        ));
        self.pools.insert(config.tag.clone(), pool);
        Ok(())
    }

    /// Удалить пул вместе со всеми его instance'ами
    pub fn remove_pool(&mut self, commands: &mut Commands, tag: &str) -> SimResult<()> {
        let Some(pool) = self.pools.remove(tag) else {
            return Err(SimulationError::invalid(format!("pool '{}' doesn't exist", tag)));
        };
        for entity in pool.queue {
            self.generations.remove(&entity);
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
        crate::logger::log_info(&format!("🗑️ Removed pool '{}'", tag));
        Ok(())
    }

    /// Активировать instance из пула в позиции.
    ///
    /// Instance сразу уходит в хвост очереди. Если голова ещё активна
    /// (пул мал для темпа стрельбы), её переиспользуем.
    pub fn spawn_from_pool(
        &mut self,
        commands: &mut Commands,
        prefabs: &ProjectilePrefabs,
        tag: &str,
        position: Vec2,
        rotation: Quat,
    ) -> SimResult<Entity> {
        let Some(pool) = self.pools.get_mut(tag) else {
            return Err(SimulationError::invalid(format!("pool '{}' doesn't exist", tag)));
        };

        // Голова очереди (despawned снаружи instance'ы выкидываем)
        let mut candidate = None;
        while let Some(entity) = pool.queue.pop_front() {
            if commands.get_entity(entity).is_ok() {
                candidate = Some(entity);
                break;
            }
            pool.active.remove(&entity);
            self.generations.remove(&entity);
        }

        let entity = match candidate {
            Some(entity) => entity,
            None => {
                crate::logger::log(&format!("➕ Pool '{}' empty, instancing overflow object", tag));
                instantiate(commands, prefabs, tag, &pool.prefab)?
            }
        };

        if pool.active.contains(&entity) {
            crate::logger::log(&format!("♻️ Pool '{}' recycles active instance {:?}", tag, entity));
        }

        pool.queue.push_back(entity);
        pool.active.insert(entity);
        *self.generations.entry(entity).or_default() += 1;

        commands.entity(entity).remove::<Inactive>().insert(Transform {
            translation: position.extend(0.0),
            rotation,
            ..default()
        });

        Ok(entity)
    }

    /// Учёт возврата: instance становится неактивным и переезжает в хвост.
    /// Сброс компонентов делает `process_pool_returns`.
    pub fn release(&mut self, tag: &str, entity: Entity) -> SimResult<()> {
        let Some(pool) = self.pools.get_mut(tag) else {
            return Err(SimulationError::invalid(format!("pool '{}' doesn't exist", tag)));
        };
        pool.active.remove(&entity);
        pool.move_to_tail(entity);
        Ok(())
    }

    /// Tag пула, чей prefab совпадает с именем
    pub fn tag_for_prefab(&self, prefab: &str) -> Option<String> {
        let mut tags: Vec<&String> = self
            .pools
            .iter()
            .filter(|(_, pool)| pool.prefab == prefab)
            .map(|(tag, _)| tag)
            .collect();
        tags.sort();
        tags.first().map(|tag| (*tag).clone())
    }

    /// Generation последней выдачи (None: instance ни разу не выдавался)
    pub fn generation(&self, entity: Entity) -> Option<u32> {
        self.generations.get(&entity).copied()
    }

    /// Запрос относится к прошлой выдаче instance'а
    pub fn is_stale(&self, request: &ReturnToPool) -> bool {
        match (request.generation, self.generation(request.entity)) {
            (Some(requested), Some(current)) => requested != current,
            _ => false,
        }
    }

    pub fn pool_size(&self, tag: &str) -> usize {
        self.pools.get(tag).map_or(0, PoolQueue::size)
    }

    pub fn active_count(&self, tag: &str) -> usize {
        self.pools.get(tag).map_or(0, PoolQueue::active_count)
    }

    pub fn pool_exists(&self, tag: &str) -> bool {
        self.pools.contains_key(tag)
    }

    pub fn pool(&self, tag: &str) -> Option<&PoolQueue> {
        self.pools.get(tag)
    }

    /// Отсортированные tags
    pub fn pool_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.pools.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn total_pools(&self) -> usize {
        self.pools.len()
    }

    /// Удалить все пулы (смена арены)
    pub fn clear_all(&mut self, commands: &mut Commands) {
        for tag in self.pool_tags() {
            if let Err(e) = self.remove_pool(commands, &tag) {
                e.log("clear_all");
            }
        }
    }
}

/// Spawn неактивного instance'а из prefab'а
fn instantiate(commands: &mut Commands, prefabs: &ProjectilePrefabs, tag: &str, prefab_name: &str) -> SimResult<Entity> {
    let Some(prefab) = prefabs.get(prefab_name) else {
        return Err(SimulationError::configuration(format!("unknown projectile prefab '{}'", prefab_name)));
    };

    let entity = commands
        .spawn((
            Pooled {
                tag: tag.to_string(),
                prefab: prefab_name.to_string(),
            },
            Inactive,
            Transform::default(),
            prefab.body(Vec2::ZERO),
            prefab.instantiate(),
        ))
        .id();
    Ok(entity)
}

// ============================================================================
// Plugin
// ============================================================================

/// Пулы, создаваемые на Startup
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub pools: Vec<PoolConfig>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pools: vec![
                PoolConfig::for_prefab("Bullet", 20),
                PoolConfig::for_prefab("HeavyBullet", 10),
                PoolConfig::for_prefab("Bomb", 6),
            ],
        }
    }
}

pub struct PoolPlugin;

impl Plugin for PoolPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ReturnToPool>()
            .init_resource::<ObjectPool>()
            .init_resource::<PoolSettings>()
            .init_resource::<ProjectilePrefabs>()
            .add_systems(Startup, prewarm_pools)
            .add_systems(
                FixedUpdate,
                process_pool_returns.in_set(crate::SimulationSet::Cleanup),
            );
    }
}
