use crate::model::player::Seat;
use serde::{Deserialize, Serialize};

/// Cumulative match scores, one entry per seat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    totals: Vec<i32>,
}

impl ScoreBoard {
    pub fn new(players: usize) -> Self {
        Self {
            totals: vec![0; players],
        }
    }

    pub fn score(&self, seat: Seat) -> i32 {
        self.totals.get(seat.index()).copied().unwrap_or(0)
    }

    pub fn standings(&self) -> &[i32] {
        &self.totals
    }

    pub fn set_totals(&mut self, totals: Vec<i32>) {
        self.totals = totals;
    }

    pub fn apply_round(&mut self, round_scores: &[i32]) {
        for (total, delta) in self.totals.iter_mut().zip(round_scores) {
            *total += delta;
        }
    }

    /// Seats holding the highest total, lowest seat first.
    pub fn leaders(&self) -> Vec<Seat> {
        let Some(best) = self.totals.iter().copied().max() else {
            return Vec::new();
        };
        Seat::all(self.totals.len())
            .filter(|seat| self.score(*seat) == best)
            .collect()
    }
}
