mod heuristic;
mod mcts;
mod random;

pub use heuristic::{HeuristicAgent, choose_card, estimate_bid};
pub use mcts::MctsAgent;
pub use random::RandomAgent;

use crate::mcts::SearchError;
use thiserror::Error;
use wizard_core::belief::InformationSet;
use wizard_core::error::{ConsistencyError, InvalidStateError};
use wizard_core::model::card::Card;
use wizard_core::model::player::Seat;

/// A seat at the table. The driver hands each decision the seat's information
/// set and checks the answer against the rules.
pub trait Agent {
    fn name(&self) -> &str;

    /// Bid in `0..=hand_size`.
    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, AgentError>;

    /// One of `info.legal_moves()`.
    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, AgentError>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, AgentError> {
        (**self).choose_bid(info)
    }

    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, AgentError> {
        (**self).choose_play(info)
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
    #[error("{0} has no legal move")]
    NoLegalMoves(Seat),
}

impl From<SearchError> for AgentError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidState(inner) => AgentError::InvalidState(inner),
            SearchError::Consistency(inner) => AgentError::Consistency(inner),
        }
    }
}
