//! Brawl Simulation Core
//!
//! ECS-симуляция 2D platform fighter'а на Bevy 0.16 (headless)
//!
//! Симуляция владеет правилами (locomotion, урон, эффекты, оружие, лут, матч).
//! Физика, рендер, звук и устройства ввода: снаружи, через границу в `physics`.
//!
//! Порядок тика (FixedUpdate, 60Hz):
//! ```text
//! Input → Timers → Actions → Resolve → Physics → Cleanup
//! ```

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod items;
pub mod locomotion;
pub mod logger;
pub mod physics;
pub mod pool;
pub mod projectiles;
pub mod session;
pub mod weapons;

// Re-export базовых типов для удобства
pub use combat::{CombatPlugin, CombatSettings, Combatant, DamageDealt, DamageRequest};
pub use components::*;
pub use config::{EffectSettings, SimulationConfig};
pub use effects::{ActiveEffects, EffectCatalog, EffectId, EffectsPlugin};
pub use error::{SimResult, SimulationError};
pub use input::{FighterCommand, InputPlugin, PlayerCommand, PlayerInput};
pub use items::{DropTable, ItemSpawner, ItemsPlugin, Pickup};
pub use locomotion::{LocomotionMachine, LocomotionPlugin, LocomotionState, Mobility};
pub use logger::init_logger;
pub use physics::{HeadlessArenaPlugin, PhysicsBoundaryPlugin};
pub use pool::{ObjectPool, PoolPlugin};
pub use projectiles::{Projectile, ProjectilePlugin};
pub use session::{simulation_running, MatchRules, MatchState, SessionPlugin};
pub use weapons::{Loadout, WeaponCatalog, WeaponId, WeaponsPlugin};

/// Фазы тика (цепочкой, все в FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Команды игроков → PlayerInput
    Input,
    /// Таймеры: cooldown, reload, эффекты, fuse, spawner'ы, смены состояний
    Timers,
    /// Прыжки, движение, выстрелы, запросы эффектов
    Actions,
    /// Попадания, взрывы, подбор предметов, урон
    Resolve,
    /// Интеграция (внешний backend или HeadlessArenaPlugin)
    Physics,
    /// Возврат в пул, вылеты, конец матча, сброс one-shot ввода
    Cleanup,
}

impl SimulationSet {
    pub const ALL: [SimulationSet; 6] = [
        SimulationSet::Input,
        SimulationSet::Timers,
        SimulationSet::Actions,
        SimulationSet::Resolve,
        SimulationSet::Physics,
        SimulationSet::Cleanup,
    ];
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Физический backend не входит: подключите `HeadlessArenaPlugin` или
/// настоящий движок, который пишет boundary events.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        // Детерминистичный RNG (seed по умолчанию, если App собран не через create_headless_app)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Input,
                SimulationSet::Timers,
                SimulationSet::Actions,
                SimulationSet::Resolve,
                SimulationSet::Physics,
                SimulationSet::Cleanup,
            )
                .chain(),
        );
        for set in SimulationSet::ALL {
            app.configure_sets(FixedUpdate, set.run_if(simulation_running));
        }

        app.init_resource::<EffectSettings>()
            .add_systems(FixedUpdate, config::configure_new_fighters.in_set(SimulationSet::Input));

        // Подсистемы
        app.add_plugins((
            InputPlugin,
            LocomotionPlugin,
            CombatPlugin,
            EffectsPlugin,
            WeaponsPlugin,
            ProjectilePlugin,
            PoolPlugin,
            PhysicsBoundaryPlugin,
            ItemsPlugin,
            SessionPlugin,
        ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Равномерно в [0, max] (max ≤ 0 → 0)
    pub fn roll(&mut self, max: f32) -> f32 {
        if max <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..=max)
    }

    /// Случайный индекс в [0, len), None для пустой коллекции
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..len))
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_seeded() {
        let mut a = DeterministicRng::new(9);
        let mut b = DeterministicRng::new(9);
        for _ in 0..16 {
            assert_eq!(a.roll(10.0), b.roll(10.0));
        }
        assert_eq!(a.index(0), None);
        assert!(a.index(3).unwrap() < 3);
        assert_eq!(a.roll(0.0), 0.0);
    }
}
