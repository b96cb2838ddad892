//! Plays matches between agents, checking every answer against the rules.

use crate::agent::{Agent, AgentError};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use wizard_core::error::InvalidStateError;
use wizard_core::game::match_state::MatchState;
use wizard_core::model::card::Card;
use wizard_core::model::player::Seat;
use wizard_core::model::round::RoundPhase;
use wizard_core::model::suit::Trump;

/// An agent answered outside the rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentContractViolation {
    #[error("{agent} at {seat} bid {bid}, allowed 0..={max}")]
    BidOutOfRange {
        agent: String,
        seat: Seat,
        bid: u8,
        max: u8,
    },
    #[error("{agent} at {seat} played {card}, which is not a legal move")]
    IllegalCard { agent: String, seat: Seat, card: Card },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Contract(#[from] AgentContractViolation),
    #[error("agent {agent} failed: {source}")]
    Agent {
        agent: String,
        #[source]
        source: AgentError,
    },
    #[error(transparent)]
    Rules(#[from] InvalidStateError),
    #[error("match has {expected} seats but {actual} agents")]
    AgentCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub round_number: usize,
    pub trump: Trump,
    /// Per seat.
    pub bids: Vec<u8>,
    pub tricks_won: Vec<u8>,
    pub scores: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub seed: u64,
    pub rounds: Vec<RoundRecord>,
    pub totals: Vec<i32>,
    /// Seats sharing the highest total.
    pub winners: Vec<Seat>,
}

/// Agents by seat: `agents[i]` plays `Seat::new(i)`.
pub struct GameDriver {
    agents: Vec<Box<dyn Agent>>,
}

impl GameDriver {
    pub fn new(agents: Vec<Box<dyn Agent>>) -> Self {
        Self { agents }
    }

    /// Plays every remaining round of `state`.
    pub fn play_game(&mut self, mut state: MatchState) -> Result<GameRecord, DriverError> {
        self.check_seats(&state)?;
        let mut rounds = Vec::with_capacity(state.total_rounds());
        while !state.is_game_over() {
            rounds.push(self.play_round(&mut state)?);
        }
        Ok(GameRecord {
            seed: state.seed(),
            rounds,
            totals: state.scores().standings().to_vec(),
            winners: state.scores().leaders(),
        })
    }

    /// Plays the current round to the end, scores it and deals the next.
    pub fn play_round(&mut self, state: &mut MatchState) -> Result<RoundRecord, DriverError> {
        self.check_seats(state)?;

        while let Some(seat) = state.round().expected_seat() {
            let info = state.information_set(seat)?;
            let agent = &mut self.agents[seat.index()];

            match state.round().phase() {
                RoundPhase::Bidding => {
                    let range = info.legal_bids()?;
                    let bid = agent.choose_bid(&info).map_err(|source| DriverError::Agent {
                        agent: agent.name().to_string(),
                        source,
                    })?;
                    if !range.contains(&bid) {
                        let violation = AgentContractViolation::BidOutOfRange {
                            agent: agent.name().to_string(),
                            seat,
                            bid,
                            max: *range.end(),
                        };
                        event!(target: "wizard_bot::driver", Level::WARN, %violation);
                        return Err(violation.into());
                    }
                    state.round_mut().place_bid(seat, bid)?;
                }
                RoundPhase::Playing => {
                    let legal = info.legal_moves()?;
                    let card = agent.choose_play(&info).map_err(|source| DriverError::Agent {
                        agent: agent.name().to_string(),
                        source,
                    })?;
                    if !legal.contains(&card) {
                        let violation = AgentContractViolation::IllegalCard {
                            agent: agent.name().to_string(),
                            seat,
                            card,
                        };
                        event!(target: "wizard_bot::driver", Level::WARN, %violation);
                        return Err(violation.into());
                    }
                    state.round_mut().play_card(seat, card)?;
                }
                RoundPhase::Scored => break,
            }
        }

        let round = state.round();
        let round_number = state.round_number();
        let trump = round.trump();
        let bids: Vec<u8> = round.bids().iter().map(|bid| bid.unwrap_or(0)).collect();
        let tricks_won = round.tricks_won_all().to_vec();
        let scores = state.finish_round_and_start_next()?;

        event!(
            target: "wizard_bot::driver",
            Level::DEBUG,
            round = round_number,
            trump = %trump,
            bids = ?bids,
            tricks_won = ?tricks_won,
            scores = ?scores,
        );

        Ok(RoundRecord {
            round_number,
            trump,
            bids,
            tricks_won,
            scores,
        })
    }

    fn check_seats(&self, state: &MatchState) -> Result<(), DriverError> {
        if self.agents.len() != state.players() {
            return Err(DriverError::AgentCount {
                expected: state.players(),
                actual: self.agents.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DriverError, GameDriver};
    use crate::agent::{Agent, HeuristicAgent, RandomAgent};
    use wizard_core::game::match_state::MatchState;
    use wizard_core::model::deck::TrumpRule;

    fn table(players: usize) -> Vec<Box<dyn Agent>> {
        (0..players)
            .map(|i| Box::new(RandomAgent::new(format!("random-{i}"), i as u64)) as Box<dyn Agent>)
            .collect()
    }

    #[test]
    fn round_record_is_consistent() {
        let mut state = MatchState::with_seed_round(3, 5, 4, TrumpRule::default()).unwrap();
        let mut driver = GameDriver::new(table(3));
        let record = driver.play_round(&mut state).unwrap();
        assert_eq!(record.round_number, 4);
        assert_eq!(record.tricks_won.iter().map(|w| *w as usize).sum::<usize>(), 4);
        assert_eq!(state.round_number(), 5);
        assert_eq!(state.scores().standings(), record.scores.as_slice());
    }

    #[test]
    fn agent_count_must_match_seats() {
        let state = MatchState::with_seed(4, 1, TrumpRule::default()).unwrap();
        let mut driver = GameDriver::new(vec![Box::new(HeuristicAgent::default())]);
        assert!(matches!(
            driver.play_game(state),
            Err(DriverError::AgentCount {
                expected: 4,
                actual: 1
            })
        ));
    }
}
