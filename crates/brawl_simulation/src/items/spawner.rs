//! ItemSpawner: периодический спавн лута по точкам арены
//!
//! Каждые `spawn_interval` секунд (после `initial_delay`), если живых
//! предметов меньше `max_items` и есть точки спавна: взвешенный профиль
//! из DropTable + случайная (свободная) точка.

use bevy::prelude::*;

use super::drop::DropTable;
use crate::error::SimulationError;

/// Минимальный интервал спавна
pub const MIN_SPAWN_INTERVAL: f32 = 1.0;

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ItemSpawner {
    pub table: DropTable,
    spawn_interval: f32,
    max_items: usize,
    spawn_points: Vec<Vec2>,
    /// Минимальная дистанция до живого предмета (0 = без ограничения)
    pub min_spacing: f32,
    pub auto_spawn: bool,
    timer: f32,
    active_items: Vec<Entity>,
}

impl Default for ItemSpawner {
    fn default() -> Self {
        Self::new(DropTable::default_loot(), Vec::new())
    }
}

impl ItemSpawner {
    pub fn new(table: DropTable, spawn_points: Vec<Vec2>) -> Self {
        Self {
            table,
            spawn_interval: 10.0,
            max_items: 5,
            spawn_points,
            min_spacing: 0.0,
            auto_spawn: true,
            timer: 10.0,
            active_items: Vec::new(),
        }
    }

    /// Задержка перед первым спавном
    pub fn with_initial_delay(mut self, delay: f32) -> Self {
        self.timer = delay.max(0.0);
        self
    }

    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing.max(0.0);
        self
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn spawn_points(&self) -> &[Vec2] {
        &self.spawn_points
    }

    pub fn active_items(&self) -> &[Entity] {
        &self.active_items
    }

    pub fn active_count(&self) -> usize {
        self.active_items.len()
    }

    pub fn can_spawn(&self) -> bool {
        self.active_items.len() < self.max_items && !self.spawn_points.is_empty()
    }

    pub fn set_spawn_interval(&mut self, interval: f32) {
        self.spawn_interval = interval.max(MIN_SPAWN_INTERVAL);
    }

    pub fn set_max_items(&mut self, max: usize) {
        self.max_items = max.max(1);
    }

    pub fn add_spawn_point(&mut self, point: Vec2) {
        if !self.spawn_points.contains(&point) {
            self.spawn_points.push(point);
        }
    }

    pub fn remove_spawn_point(&mut self, point: Vec2) -> bool {
        let before = self.spawn_points.len();
        self.spawn_points.retain(|p| *p != point);
        before != self.spawn_points.len()
    }

    pub fn track(&mut self, item: Entity) {
        self.active_items.push(item);
    }

    /// Перестать отслеживать предмет. `true` если он был наш.
    pub fn untrack(&mut self, item: Entity) -> bool {
        let before = self.active_items.len();
        self.active_items.retain(|e| *e != item);
        before != self.active_items.len()
    }

    /// Забыть все предметы (entities удаляет вызывающий)
    pub fn take_active_items(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.active_items)
    }

    /// Продвинуть таймер. `true` когда пора спавнить (таймер перезапускается).
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.auto_spawn {
            return false;
        }
        self.timer -= delta;
        if self.timer > 0.0 || !self.can_spawn() {
            return false;
        }
        self.timer = self.spawn_interval;
        true
    }

    /// Точки, достаточно далёкие от живых предметов. Если таких нет: все точки.
    pub fn available_points(&self, live_positions: &[Vec2]) -> Vec<Vec2> {
        if self.min_spacing <= 0.0 {
            return self.spawn_points.clone();
        }
        let free: Vec<Vec2> = self
            .spawn_points
            .iter()
            .copied()
            .filter(|point| live_positions.iter().all(|p| p.distance(*point) >= self.min_spacing))
            .collect();
        if free.is_empty() {
            self.spawn_points.clone()
        } else {
            free
        }
    }

    pub fn validate(&self) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.spawn_points.is_empty() {
            errors.push(SimulationError::configuration("item spawner has no spawn points"));
        }
        if self.table.is_empty() {
            errors.push(SimulationError::configuration("item spawner loot table is empty"));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_and_max_are_clamped() {
        let mut spawner = ItemSpawner::default();
        spawner.set_spawn_interval(0.2);
        spawner.set_max_items(0);
        assert_eq!(spawner.spawn_interval(), 1.0);
        assert_eq!(spawner.max_items(), 1);
    }

    #[test]
    fn test_tick_respects_initial_delay_and_capacity() {
        let mut spawner = ItemSpawner::new(DropTable::default_loot(), vec![Vec2::ZERO]).with_initial_delay(2.0);
        spawner.set_max_items(1);

        assert!(!spawner.tick(1.0));
        assert!(spawner.tick(1.0));
        spawner.track(Entity::from_raw(10));

        // Лимит достигнут: таймер истёк, но спавна нет
        assert!(!spawner.tick(20.0));
        assert!(spawner.untrack(Entity::from_raw(10)));
        assert!(spawner.tick(0.0));
    }

    #[test]
    fn test_no_spawn_points_means_no_spawn() {
        let mut spawner = ItemSpawner::new(DropTable::default_loot(), Vec::new()).with_initial_delay(0.0);
        assert!(!spawner.can_spawn());
        assert!(!spawner.tick(1.0));
        assert_eq!(spawner.validate().len(), 1);
    }

    #[test]
    fn test_spawn_points_are_unique() {
        let mut spawner = ItemSpawner::default();
        spawner.add_spawn_point(Vec2::ONE);
        spawner.add_spawn_point(Vec2::ONE);
        assert_eq!(spawner.spawn_points().len(), 1);
        assert!(spawner.remove_spawn_point(Vec2::ONE));
        assert!(!spawner.remove_spawn_point(Vec2::ONE));
    }

    #[test]
    fn test_min_spacing_filters_occupied_points() {
        let spawner = ItemSpawner::new(DropTable::default_loot(), vec![Vec2::ZERO, Vec2::new(5.0, 0.0)])
            .with_min_spacing(3.0);
        assert_eq!(spawner.available_points(&[Vec2::new(1.0, 0.0)]), vec![Vec2::new(5.0, 0.0)]);
        // Все заняты → fallback на любые
        assert_eq!(spawner.available_points(&[Vec2::ZERO, Vec2::new(5.0, 0.0)]).len(), 2);
    }
}
