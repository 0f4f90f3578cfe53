//! Match rules (секция конфига `match_rules`)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Прямоугольник арены: вылет за него стоит stock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlastZone {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl BlastZone {
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= self.min[0] && position.x <= self.max[0] && position.y >= self.min[1] && position.y <= self.max[1]
    }
}

impl Default for BlastZone {
    fn default() -> Self {
        Self {
            min: [-20.0, -10.0],
            max: [20.0, 15.0],
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Жизней на игрока
    pub stocks: u32,
    /// Длительность раунда (секунды), 0 = без лимита
    pub round_time: f32,
    pub blast_zone: BlastZone,
    /// Точки respawn; игрок N использует точку (N-1) % len
    pub spawn_points: Vec<[f32; 2]>,
    /// Неуязвимость после respawn
    pub respawn_invulnerability: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            stocks: 3,
            round_time: 300.0,
            blast_zone: BlastZone::default(),
            spawn_points: vec![[-4.0, 2.0], [4.0, 2.0], [-1.5, 2.0], [1.5, 2.0]],
            respawn_invulnerability: 2.0,
        }
    }
}

impl MatchRules {
    pub fn spawn_point(&self, player_id: u8) -> Vec2 {
        if self.spawn_points.is_empty() {
            return Vec2::ZERO;
        }
        let index = (player_id.max(1) as usize - 1) % self.spawn_points.len();
        Vec2::from_array(self.spawn_points[index])
    }

    pub fn validate(&self) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        if self.stocks == 0 {
            errors.push(SimulationError::configuration("match needs at least one stock"));
        }
        if self.round_time < 0.0 {
            errors.push(SimulationError::configuration(format!("negative round time {}", self.round_time)));
        }
        let zone = &self.blast_zone;
        if zone.min[0] >= zone.max[0] || zone.min[1] >= zone.max[1] {
            errors.push(SimulationError::configuration("blast zone is empty"));
        }
        for point in self.spawn_points.iter().filter(|p| !zone.contains(Vec2::from_array(**p))) {
            errors.push(SimulationError::configuration(format!(
                "spawn point {:?} is outside the blast zone",
                point
            )));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_points_cycle_by_player_id() {
        let rules = MatchRules {
            spawn_points: vec![[-1.0, 0.0], [1.0, 0.0]],
            ..Default::default()
        };
        assert_eq!(rules.spawn_point(1), Vec2::new(-1.0, 0.0));
        assert_eq!(rules.spawn_point(2), Vec2::new(1.0, 0.0));
        assert_eq!(rules.spawn_point(3), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_validate() {
        assert!(MatchRules::default().validate().is_empty());

        let broken = MatchRules {
            stocks: 0,
            spawn_points: vec![[100.0, 0.0]],
            ..Default::default()
        };
        assert_eq!(broken.validate().len(), 2);
    }
}
