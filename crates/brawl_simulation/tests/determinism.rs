//! Тесты детерминизма
//!
//! Проверяем что полный матч (арена, лут, скриптованный ввод) с одинаковым
//! seed даёт идентичные результаты

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use brawl_simulation::items::{ItemSettings, ItemSpawned};
use brawl_simulation::weapons::WeaponSettings;
use brawl_simulation::{
    create_headless_app, spawn_fighter, world_snapshot, Combatant, FighterCommand, HeadlessArenaPlugin, ItemSpawner,
    Loadout, PlayerCommand, SimulationPlugin, WeaponCatalog,
};

const TICK_COUNT: u32 = 1200;

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let run1 = run_match(SEED, TICK_COUNT);
    let run2 = run_match(SEED, TICK_COUNT);

    assert_eq!(run1, run2, "Матч с одинаковым seed ({}) дал разные результаты!", SEED);
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    // Запускаем 3 раза: все должны быть идентичны
    let runs: Vec<_> = (0..3).map(|_| run_match(SEED, TICK_COUNT / 2)).collect();

    for (i, run) in runs.iter().enumerate().skip(1) {
        assert_eq!(runs[0], *run, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[derive(Debug, PartialEq)]
struct MatchTrace {
    transforms: Vec<u8>,
    combatants: Vec<u8>,
    loadouts: Vec<u8>,
    /// (tick, profile, позиция) всех появлений лута
    spawned_items: Vec<(u32, String, Vec2)>,
}

/// Запускает матч и возвращает trace мира
fn run_match(seed: u64, tick_count: u32) -> MatchTrace {
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessArenaPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    let (p1, p2) = {
        let world = app.world_mut();
        let catalog = world.resource::<WeaponCatalog>().clone();
        let loadout = world.resource::<WeaponSettings>().build_loadout(&catalog).unwrap();
        let loot = world.resource::<ItemSettings>().loot_table.clone();

        let fighters = {
            let mut commands = world.commands();
            let p1 = spawn_fighter(&mut commands, 1, Vec2::new(-4.0, 2.0), loadout.clone());
            let p2 = spawn_fighter(&mut commands, 2, Vec2::new(4.0, 2.0), loadout);
            commands.spawn(
                ItemSpawner::new(loot, vec![Vec2::new(-4.0, 0.5), Vec2::new(0.0, 0.5), Vec2::new(4.0, 0.5)])
                    .with_initial_delay(1.0),
            );
            (p1, p2)
        };
        world.flush();
        fighters
    };

    let mut spawned_items = Vec::new();
    for tick in 0..tick_count {
        let direction = if (tick / 90) % 2 == 0 { 1.0 } else { -1.0 };
        let world = app.world_mut();
        world.send_event(PlayerCommand::new(p1, FighterCommand::Move(Vec2::new(direction, 0.0))));
        world.send_event(PlayerCommand::new(p1, FighterCommand::Shoot(tick % 120 < 60)));
        world.send_event(PlayerCommand::new(p2, FighterCommand::Move(Vec2::new(-direction, 0.0))));
        if tick % 40 == 0 {
            world.send_event(PlayerCommand::new(p2, FighterCommand::Jump));
        }
        if tick % 300 == 0 {
            world.send_event(PlayerCommand::new(p2, FighterCommand::Special));
        }

        app.update();

        let events = app.world().resource::<Events<ItemSpawned>>();
        for event in events.iter_current_update_events() {
            spawned_items.push((tick, event.profile.clone(), event.position));
        }
    }

    let world = app.world_mut();
    MatchTrace {
        transforms: world_snapshot::<Transform>(world),
        combatants: world_snapshot::<Combatant>(world),
        loadouts: world_snapshot::<Loadout>(world),
        spawned_items,
    }
}
