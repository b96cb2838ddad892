use crate::agent::choose_card;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use wizard_core::error::InvalidStateError;
use wizard_core::model::card::Card;
use wizard_core::model::player::Seat;
use wizard_core::model::round::RoundState;

/// Default policy: picks the card for a seat when the tree has nothing to say,
/// both for opponents during descent and for everyone after the leaf.
pub trait RolloutPolicy {
    /// `legal` is never empty when called by the search.
    fn choose(
        &self,
        state: &RoundState,
        seat: Seat,
        legal: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<Card>;
}

/// Uniformly random legal card.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRollout;

/// Plays to win while the seat is short of its bid and ducks once it has it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRollout;

impl RolloutPolicy for RandomRollout {
    fn choose(
        &self,
        _state: &RoundState,
        _seat: Seat,
        legal: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<Card> {
        legal.choose(rng).copied()
    }
}

impl RolloutPolicy for GreedyRollout {
    fn choose(
        &self,
        state: &RoundState,
        seat: Seat,
        legal: &[Card],
        _rng: &mut dyn RngCore,
    ) -> Option<Card> {
        let want_to_win = state.tricks_won(seat) < state.bid(seat).unwrap_or(0);
        choose_card(legal, state.current_trick(), state.trump(), seat, want_to_win)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutKind {
    #[default]
    Random,
    Greedy,
}

impl RolloutKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" | "uniform" => Some(RolloutKind::Random),
            "greedy" | "heuristic" => Some(RolloutKind::Greedy),
            _ => None,
        }
    }
}

impl RolloutPolicy for RolloutKind {
    fn choose(
        &self,
        state: &RoundState,
        seat: Seat,
        legal: &[Card],
        rng: &mut dyn RngCore,
    ) -> Option<Card> {
        match self {
            RolloutKind::Random => RandomRollout.choose(state, seat, legal, rng),
            RolloutKind::Greedy => GreedyRollout.choose(state, seat, legal, rng),
        }
    }
}

/// Plays the round out with `policy` for every seat.
pub fn rollout<P: RolloutPolicy + ?Sized>(
    state: &mut RoundState,
    policy: &P,
    rng: &mut dyn RngCore,
) -> Result<(), InvalidStateError> {
    while let Some(seat) = state.expected_seat() {
        play_one(state, seat, policy, rng)?;
    }
    Ok(())
}

/// Plays the other seats with `policy` until `searcher` is on turn or the
/// round is over.
pub fn advance_environment<P: RolloutPolicy + ?Sized>(
    state: &mut RoundState,
    searcher: Seat,
    policy: &P,
    rng: &mut dyn RngCore,
) -> Result<(), InvalidStateError> {
    while let Some(seat) = state.expected_seat() {
        if seat == searcher {
            break;
        }
        play_one(state, seat, policy, rng)?;
    }
    Ok(())
}

fn play_one<P: RolloutPolicy + ?Sized>(
    state: &mut RoundState,
    seat: Seat,
    policy: &P,
    rng: &mut dyn RngCore,
) -> Result<(), InvalidStateError> {
    let legal = state.legal_moves(seat)?;
    let card = policy
        .choose(state, seat, &legal, rng)
        .filter(|card| legal.contains(card))
        .ok_or(InvalidStateError::EmptyHand(seat))?;
    state.play_card(seat, card)?;
    Ok(())
}

/// Keeps one representative of each group of interchangeable cards: the first
/// Wizard and the first Jester in sort order.
pub fn collapse_specials(legal: &[Card]) -> Vec<Card> {
    let mut kept: Vec<Card> = Vec::with_capacity(legal.len());
    for &card in legal {
        if !kept.iter().any(|other| other.plays_like(card)) {
            kept.push(card);
        }
    }
    kept
}
