//! Headless матч
//!
//! Два скриптованных игрока на default арене + spawner лута.
//! Печатает статус каждые 5 секунд симуляции.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use brawl_simulation::items::ItemSettings;
use brawl_simulation::logger::{log_info, log_warning};
use brawl_simulation::session::MatchEnded;
use brawl_simulation::weapons::WeaponSettings;
use brawl_simulation::{
    create_headless_app, spawn_fighter, FighterCommand, FighterStatus, HeadlessArenaPlugin, ItemSpawner, MatchState,
    PlayerCommand, SimulationPlugin, WeaponCatalog,
};

const TICKS_PER_SECOND: u32 = 60;
const MATCH_SECONDS: u32 = 120;

fn main() {
    let seed = 42;
    log_info(&format!("🚀 Starting brawl headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessArenaPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / TICKS_PER_SECOND as f64,
        )));

    let (p1, p2) = {
        let world = app.world_mut();
        let catalog = world.resource::<WeaponCatalog>().clone();
        let settings = world.resource::<WeaponSettings>().clone();
        let loot = world.resource::<ItemSettings>().loot_table.clone();

        let loadout = match settings.build_loadout(&catalog) {
            Ok(loadout) => loadout,
            Err(e) => {
                e.log("main");
                return;
            }
        };

        let fighters = {
            let mut commands = world.commands();
            let p1 = spawn_fighter(&mut commands, 1, Vec2::new(-4.0, 2.0), loadout.clone());
            let p2 = spawn_fighter(&mut commands, 2, Vec2::new(4.0, 2.0), loadout);
            commands.spawn(
                ItemSpawner::new(loot, vec![Vec2::new(-5.0, 3.5), Vec2::new(0.0, 0.5), Vec2::new(5.0, 3.5)])
                    .with_initial_delay(3.0)
                    .with_min_spacing(2.0),
            );
            (p1, p2)
        };
        world.flush();
        fighters
    };

    for tick in 0..MATCH_SECONDS * TICKS_PER_SECOND {
        script_players(&mut app, tick, p1, p2);
        app.update();

        if tick % (5 * TICKS_PER_SECOND) == 0 {
            for fighter in [p1, p2] {
                if let Some(status) = FighterStatus::read(app.world(), fighter) {
                    log_info(&format!(
                        "📊 t={}s P{}: {:.0}% {} {}/{} bombs={} {:?} effects={:?}",
                        tick / TICKS_PER_SECOND,
                        status.player_id,
                        status.damage_percent,
                        status.weapon,
                        status.current_ammo,
                        status.max_ammo,
                        status.bomb_count,
                        status.state,
                        status.active_effects
                    ));
                }
            }
        }

        let ended = app
            .world()
            .resource::<Events<MatchEnded>>()
            .iter_current_update_events()
            .next()
            .copied();
        if let Some(ended) = ended {
            log_info(&format!("🏁 Match ended at tick {}: {:?}", tick, ended.winner_id));
            break;
        }
    }

    let state = app.world().resource::<MatchState>();
    for record in state.players() {
        log_info(&format!(
            "Player {}: {} stocks, {} knockouts",
            record.player_id, record.stocks, record.knockouts
        ));
    }
    if !state.is_finished() {
        log_warning("Match did not finish within the demo window");
    }
}

/// Простейший скрипт: P1 наступает и стреляет, P2 прыгает и бросает бомбы
fn script_players(app: &mut App, tick: u32, p1: Entity, p2: Entity) {
    let phase = (tick / TICKS_PER_SECOND) % 4;
    let direction = if phase < 2 { 1.0 } else { -1.0 };

    let world = app.world_mut();
    world.send_event(PlayerCommand::new(p1, FighterCommand::Move(Vec2::new(direction, 0.0))));
    world.send_event(PlayerCommand::new(p1, FighterCommand::Shoot(phase % 2 == 0)));

    world.send_event(PlayerCommand::new(p2, FighterCommand::Move(Vec2::new(-direction * 0.5, 0.0))));
    if tick % 45 == 0 {
        world.send_event(PlayerCommand::new(p2, FighterCommand::Jump));
    }
    if tick % (7 * TICKS_PER_SECOND) == 0 {
        world.send_event(PlayerCommand::new(p2, FighterCommand::Special));
    }
}
