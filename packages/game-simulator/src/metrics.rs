//! Per-game records and the closing summary, one JSON object per line.

use mafia_backend::domain::roles::Team;
use mafia_backend::domain::state::GameState;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_number: u64,
    pub seed: u64,
    pub players: usize,
    /// `None` when the game was cancelled or timed out.
    pub winner: Option<Team>,
    pub rounds: u32,
    pub survivors: Vec<SurvivorRecord>,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurvivorRecord {
    pub name: String,
    pub role: String,
}

impl GameRecord {
    pub fn from_state(state: &GameState, seed: u64, winner: Option<Team>, duration_ms: f64) -> Self {
        let mut survivors: Vec<SurvivorRecord> = state
            .alive_players()
            .map(|p| SurvivorRecord {
                name: p.name.clone(),
                role: p.role.to_string(),
            })
            .collect();
        survivors.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            game_number: state.game_number,
            seed,
            players: state.players.len(),
            winner,
            rounds: state.round,
            survivors,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub games: u32,
    pub completed: u32,
    pub town_wins: u32,
    pub mafia_wins: u32,
    pub town_win_rate: f64,
    pub mafia_win_rate: f64,
    pub avg_rounds: f64,
    pub elapsed_ms: f64,
}

impl Summary {
    pub fn from_records(games: u32, records: &[GameRecord], elapsed_ms: f64) -> Self {
        let town_wins = count(records, Team::Town);
        let mafia_wins = count(records, Team::Mafia);
        let completed = town_wins + mafia_wins;
        let rate = |wins: u32| {
            if completed == 0 {
                0.0
            } else {
                f64::from(wins) / f64::from(completed)
            }
        };
        let avg_rounds = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| f64::from(r.rounds)).sum::<f64>() / records.len() as f64
        };
        Self {
            games,
            completed,
            town_wins,
            mafia_wins,
            town_win_rate: rate(town_wins),
            mafia_win_rate: rate(mafia_wins),
            avg_rounds,
            elapsed_ms,
        }
    }
}

fn count(records: &[GameRecord], team: Team) -> u32 {
    records.iter().filter(|r| r.winner == Some(team)).count() as u32
}
