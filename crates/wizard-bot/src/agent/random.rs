use super::{Agent, AgentError};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use wizard_core::belief::InformationSet;
use wizard_core::model::card::Card;

/// Uniformly random legal bids and cards.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    name: String,
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, AgentError> {
        let range = info.legal_bids()?;
        Ok(self.rng.gen_range(range))
    }

    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, AgentError> {
        let legal = info.legal_moves()?;
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or(AgentError::NoLegalMoves(info.seat()))
    }
}
