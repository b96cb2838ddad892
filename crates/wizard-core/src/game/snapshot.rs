use super::match_state::MatchState;
use crate::error::InvalidStateError;
use crate::model::deck::TrumpRule;
use serde::{Deserialize, Serialize};

/// Enough to rebuild a match at the start of its current round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub players: usize,
    #[serde(default)]
    pub trump_rule: TrumpRule,
    pub round_number: usize,
    pub scores: Vec<i32>,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            seed: state.seed(),
            players: state.players(),
            trump_rule: state.trump_rule(),
            round_number: state.round_number(),
            scores: state.scores().standings().to_vec(),
        }
    }

    pub fn restore(self) -> Result<MatchState, InvalidStateError> {
        let mut state = MatchState::with_seed_round(
            self.players,
            self.seed,
            self.round_number,
            self.trump_rule,
        )?;
        state.scores_mut().set_totals(self.scores);
        Ok(state)
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(state))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
