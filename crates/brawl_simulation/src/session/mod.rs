//! Session: правила матча (stocks, часы раунда, blast zone)
//!
//! ECS ответственность:
//! - MatchRules / MatchState resources
//! - вылет → PlayerKnockedOut → respawn или элиминация
//! - MatchEnded, pause / resume (run condition `simulation_running`)

use bevy::prelude::*;

use crate::SimulationSet;

pub mod rules;
pub mod state;
pub mod systems;


pub use rules::{BlastZone, MatchRules};
pub use state::{MatchPhase, MatchState, PlayerRecord};
pub use systems::{
    respawn_fighter, simulation_running, MatchCommand, MatchEnded, PlayerEliminated, PlayerKnockedOut,
    PlayerRespawned, RespawnNotifier, RespawnQuery,
};

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        let rules = app.world().get_resource::<MatchRules>().cloned().unwrap_or_default();
        if !app.world().contains_resource::<MatchState>() {
            app.insert_resource(MatchState::new(&rules));
        }

        app.add_event::<PlayerKnockedOut>()
            .add_event::<PlayerRespawned>()
            .add_event::<PlayerEliminated>()
            .add_event::<MatchEnded>()
            .add_event::<MatchCommand>()
            .insert_resource(rules);

        // Команды матча обрабатываются и на паузе
        app.add_systems(
            FixedUpdate,
            systems::process_match_commands.before(SimulationSet::Input),
        )
        .add_systems(FixedUpdate, systems::register_fighters.in_set(SimulationSet::Input))
        .add_systems(FixedUpdate, systems::tick_match_clock.in_set(SimulationSet::Timers))
        .add_systems(
            FixedUpdate,
            (systems::record_hits, systems::check_blast_zone, systems::check_match_end)
                .chain()
                .in_set(SimulationSet::Cleanup),
        );
    }
}
