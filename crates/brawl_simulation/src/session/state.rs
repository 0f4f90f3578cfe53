//! MatchState: фаза матча, часы раунда, stocks и очки
//!
//! ```text
//! Playing ⇄ Paused
//!    │
//!    └──(один игрок остался | время вышло)──→ Finished{winner}
//! ```

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::rules::MatchRules;
use crate::error::{SimResult, SimulationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MatchPhase {
    Playing,
    Paused,
    Finished { winner: Option<Entity> },
}

/// Игрок в матче
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub entity: Entity,
    pub player_id: u8,
    pub stocks: u32,
    /// Сколько раз выбил соперников
    pub knockouts: u32,
    /// Последний, кто нанёс урон (кому засчитать вылет)
    pub last_attacker: Option<Entity>,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MatchState {
    phase: MatchPhase,
    remaining_time: f32,
    round_time: f32,
    starting_stocks: u32,
    players: Vec<PlayerRecord>,
    /// Выигранные раунды по player_id
    wins: BTreeMap<u8, u32>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(&MatchRules::default())
    }
}

impl MatchState {
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            phase: MatchPhase::Playing,
            remaining_time: rules.round_time,
            round_time: rules.round_time,
            starting_stocks: rules.stocks,
            players: Vec::new(),
            wins: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Playing
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::Finished { .. })
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn player(&self, entity: Entity) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.entity == entity)
    }

    pub fn stocks(&self, entity: Entity) -> Option<u32> {
        self.player(entity).map(|p| p.stocks)
    }

    pub fn wins(&self, player_id: u8) -> u32 {
        self.wins.get(&player_id).copied().unwrap_or(0)
    }

    /// Игроки, у которых остались stocks
    pub fn alive_players(&self) -> Vec<Entity> {
        self.players.iter().filter(|p| p.stocks > 0).map(|p| p.entity).collect()
    }

    pub fn register(&mut self, entity: Entity, player_id: u8) {
        if self.player(entity).is_some() {
            return;
        }
        self.players.push(PlayerRecord {
            entity,
            player_id,
            stocks: self.starting_stocks,
            knockouts: 0,
            last_attacker: None,
        });
    }

    pub fn record_hit(&mut self, target: Entity, attacker: Option<Entity>) {
        let Some(attacker) = attacker.filter(|a| *a != target) else {
            return;
        };
        if let Some(record) = self.players.iter_mut().find(|p| p.entity == target) {
            record.last_attacker = Some(attacker);
        }
    }

    /// Минус stock. Возвращает (оставшиеся stocks, кому засчитан вылет).
    pub fn lose_stock(&mut self, entity: Entity) -> SimResult<(u32, Option<Entity>)> {
        let record = self
            .players
            .iter_mut()
            .find(|p| p.entity == entity)
            .ok_or_else(|| SimulationError::state(format!("{:?} is not registered in the match", entity)))?;
        if record.stocks == 0 {
            return Err(SimulationError::invalid(format!("{:?} has no stocks left", entity)));
        }
        record.stocks -= 1;
        let remaining = record.stocks;
        let credited = record.last_attacker.take();

        if let Some(attacker) = credited {
            if let Some(scorer) = self.players.iter_mut().find(|p| p.entity == attacker) {
                scorer.knockouts += 1;
            }
        }
        Ok((remaining, credited))
    }

    /// Часы раунда. `true` когда время только что вышло.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.is_running() || self.round_time <= 0.0 || self.remaining_time <= 0.0 {
            return false;
        }
        self.remaining_time = (self.remaining_time - delta).max(0.0);
        self.remaining_time <= 0.0
    }

    /// Проверка конца матча: один живой игрок (из ≥ 2) или время вышло.
    pub fn evaluate(&self) -> Option<Option<Entity>> {
        if !self.is_running() {
            return None;
        }
        let alive = self.alive_players();
        if self.players.len() >= 2 && alive.len() <= 1 {
            return Some(alive.first().copied());
        }
        if self.round_time > 0.0 && self.remaining_time <= 0.0 {
            return Some(self.leader());
        }
        None
    }

    /// Больше stocks: победитель, ничья → None
    pub fn leader(&self) -> Option<Entity> {
        let best = self.players.iter().map(|p| p.stocks).max()?;
        let mut leaders = self.players.iter().filter(|p| p.stocks == best);
        let first = leaders.next()?;
        match leaders.next() {
            Some(_) => None,
            None => Some(first.entity),
        }
    }

    pub fn finish(&mut self, winner: Option<Entity>) {
        if let Some(player_id) = winner.and_then(|w| self.player(w)).map(|p| p.player_id) {
            *self.wins.entry(player_id).or_insert(0) += 1;
        }
        self.phase = MatchPhase::Finished { winner };
    }

    pub fn pause(&mut self) -> SimResult<()> {
        if self.phase != MatchPhase::Playing {
            return Err(SimulationError::invalid(format!("cannot pause in {:?}", self.phase)));
        }
        self.phase = MatchPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> SimResult<()> {
        if self.phase != MatchPhase::Paused {
            return Err(SimulationError::invalid(format!("cannot resume from {:?}", self.phase)));
        }
        self.phase = MatchPhase::Playing;
        Ok(())
    }

    /// Новый раунд: полные stocks, часы сначала, очки сохраняются
    pub fn restart(&mut self, rules: &MatchRules) {
        self.round_time = rules.round_time;
        self.remaining_time = rules.round_time;
        self.starting_stocks = rules.stocks;
        for record in &mut self.players {
            record.stocks = rules.stocks;
            record.last_attacker = None;
        }
        self.phase = MatchPhase::Playing;
    }

    pub fn forget(&mut self, entity: Entity) {
        self.players.retain(|p| p.entity != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_match() -> (MatchState, Entity, Entity) {
        let mut state = MatchState::default();
        let p1 = Entity::from_raw(1);
        let p2 = Entity::from_raw(2);
        state.register(p1, 1);
        state.register(p2, 2);
        (state, p1, p2)
    }

    #[test]
    fn test_last_stock_ends_match() {
        let (mut state, p1, p2) = two_player_match();
        state.record_hit(p2, Some(p1));

        assert_eq!(state.lose_stock(p2).unwrap(), (2, Some(p1)));
        assert_eq!(state.player(p1).unwrap().knockouts, 1);
        // Повторный вылет без нового попадания никому не засчитан
        assert_eq!(state.lose_stock(p2).unwrap(), (1, None));
        assert_eq!(state.evaluate(), None);

        state.lose_stock(p2).unwrap();
        assert_eq!(state.evaluate(), Some(Some(p1)));
        assert!(state.lose_stock(p2).unwrap_err().is_invalid_operation());

        state.finish(Some(p1));
        assert_eq!(state.wins(1), 1);
        assert!(state.is_finished());
    }

    #[test]
    fn test_time_up_picks_player_with_more_stocks() {
        let (mut state, p1, p2) = two_player_match();
        state.lose_stock(p1).unwrap();

        assert!(!state.tick(299.0));
        assert!(state.tick(2.0));
        assert_eq!(state.remaining_time(), 0.0);
        assert_eq!(state.evaluate(), Some(Some(p2)));
    }

    #[test]
    fn test_time_up_tie_has_no_winner() {
        let (mut state, _, _) = two_player_match();
        state.tick(300.0);
        assert_eq!(state.evaluate(), Some(None));
    }

    #[test]
    fn test_pause_stops_clock() {
        let (mut state, _, _) = two_player_match();
        state.pause().unwrap();
        assert!(state.pause().is_err());
        assert!(!state.tick(500.0));
        assert_eq!(state.remaining_time(), 300.0);
        assert_eq!(state.evaluate(), None);

        state.resume().unwrap();
        assert!(state.resume().is_err());
        assert!(state.is_running());
    }

    #[test]
    fn test_restart_keeps_wins() {
        let (mut state, p1, _) = two_player_match();
        state.finish(Some(p1));
        state.restart(&MatchRules::default());
        assert!(state.is_running());
        assert_eq!(state.stocks(p1), Some(3));
        assert_eq!(state.wins(1), 1);
    }

    #[test]
    fn test_self_damage_is_not_credited() {
        let (mut state, p1, _) = two_player_match();
        state.record_hit(p1, Some(p1));
        assert_eq!(state.lose_stock(p1).unwrap(), (2, None));
    }
}
