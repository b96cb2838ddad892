use super::{Agent, AgentError};
use tracing::{Level, event};
use wizard_core::belief::InformationSet;
use wizard_core::model::card::Card;
use wizard_core::model::hand::Hand;
use wizard_core::model::player::Seat;
use wizard_core::model::suit::Trump;
use wizard_core::model::trick::{Play, Trick};
use wizard_core::rules::winning_play;

/// Rule-of-thumb player: bids on sure and likely winners, then plays to win
/// while short of its bid and ducks once it has made it.
#[derive(Debug, Clone)]
pub struct HeuristicAgent {
    name: String,
}

impl HeuristicAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        Self::new("heuristic")
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, AgentError> {
        let range = info.legal_bids()?;
        let bid = estimate_bid(info.hand(), info.trump(), info.hand_size()).min(*range.end());
        log_bid_decision(&self.name, info, bid);
        Ok(bid)
    }

    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, AgentError> {
        let legal = info.legal_moves()?;
        let seat = info.seat();
        let want_to_win = info.tricks_won(seat) < info.bid(seat).unwrap_or(0);
        let card = choose_card(&legal, info.current_trick(), info.trump(), seat, want_to_win)
            .ok_or(AgentError::NoLegalMoves(seat))?;
        log_play_decision(&self.name, info, &legal, card, want_to_win);
        Ok(card)
    }
}

/// Expected tricks, deliberately shaded low: Wizards count in full, high trumps
/// at 0.6, side-suit thirteens at 0.3, and the total is halved.
pub fn estimate_bid(hand: &Hand, trump: Trump, hand_size: usize) -> u8 {
    let wizards = hand.iter().filter(|card| card.is_wizard()).count();
    let mut likely = wizards as f64;

    for card in hand.iter() {
        let (Some(suit), Some(rank)) = (card.suit(), card.rank()) else {
            continue;
        };
        if trump.is_trump(suit) {
            if rank.value() >= 12 {
                likely += 0.6;
            }
        } else if rank.value() == 13 {
            likely += 0.3;
        }
    }

    let mut bid = (likely * 0.5).floor() as usize;
    if bid == 0 && wizards == 0 && hand_size > 1 {
        let face_card = hand
            .iter()
            .any(|card| card.rank().is_some_and(|rank| rank.value() >= 11));
        if face_card {
            bid = 1;
        }
    }
    bid.min(hand_size) as u8
}

/// Card the heuristic plays from `legal` onto `trick` for `seat`.
pub fn choose_card(
    legal: &[Card],
    trick: &Trick,
    trump: Trump,
    seat: Seat,
    want_to_win: bool,
) -> Option<Card> {
    if legal.is_empty() {
        return None;
    }
    let card = if want_to_win {
        play_to_win(legal, trick, trump, seat)
    } else {
        play_to_duck(legal, trump)
    };
    Some(card)
}

fn play_to_win(legal: &[Card], trick: &Trick, trump: Trump, seat: Seat) -> Card {
    if let Some(wizard) = legal.iter().copied().find(|card| card.is_wizard()) {
        return wizard;
    }

    if trick.is_empty() {
        let highest_trump = trump
            .suit()
            .and_then(|suit| highest(legal.iter().copied().filter(|card| card.is_suit(suit))));
        let highest_any = || highest(legal.iter().copied().filter(|card| !card.is_special()));
        return highest_trump.or_else(highest_any).unwrap_or(legal[0]);
    }

    let winners = legal
        .iter()
        .copied()
        .filter(|card| would_take(trick, trump, seat, *card));
    cheapest(winners, trump)
        .or_else(|| cheapest(legal.iter().copied(), trump))
        .unwrap_or(legal[0])
}

fn play_to_duck(legal: &[Card], trump: Trump) -> Card {
    if let Some(jester) = legal.iter().copied().find(|card| card.is_jester()) {
        return jester;
    }
    let non_wizards = legal.iter().copied().filter(|card| !card.is_wizard());
    cheapest(non_wizards, trump).unwrap_or(legal[0])
}

fn would_take(trick: &Trick, trump: Trump, seat: Seat, card: Card) -> bool {
    let mut plays: Vec<Play> = trick.plays().to_vec();
    plays.push(Play { seat, card });
    winning_play(&plays, trump).is_some_and(|play| play.seat == seat)
}

/// Highest-ranked card, lowest sort key on ties.
fn highest(cards: impl Iterator<Item = Card>) -> Option<Card> {
    cards.min_by_key(|card| (std::cmp::Reverse(card.rank()), card.sort_key()))
}

/// Least valuable card: Jesters, then side suits by rank, then trumps by rank,
/// then Wizards.
fn cheapest(cards: impl Iterator<Item = Card>, trump: Trump) -> Option<Card> {
    cards.min_by_key(|card| (play_cost(*card, trump), card.sort_key()))
}

fn play_cost(card: Card, trump: Trump) -> (u8, u8) {
    match card {
        Card::Jester(_) => (0, 0),
        Card::Wizard(_) => (3, 0),
        Card::Standard { rank, suit } if trump.is_trump(suit) => (2, rank.value()),
        Card::Standard { rank, .. } => (1, rank.value()),
    }
}

fn log_bid_decision(agent: &str, info: &InformationSet, bid: u8) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    let bids_so_far: u32 = info.bids().iter().flatten().map(|b| u32::from(*b)).sum();
    event!(
        target: "wizard_bot::bid",
        Level::INFO,
        agent,
        seat = %info.seat(),
        round = info.round_number(),
        trump = %info.trump(),
        bids_so_far,
        bid,
    );
}

fn log_play_decision(
    agent: &str,
    info: &InformationSet,
    legal_moves: &[Card],
    chosen: Card,
    want_to_win: bool,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    let legal_preview = if legal_moves.len() <= 6 {
        legal_moves
            .iter()
            .map(|card| card.to_string())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", legal_moves.len())
    };
    event!(
        target: "wizard_bot::play",
        Level::INFO,
        agent,
        seat = %info.seat(),
        legal_count = legal_moves.len(),
        legal_moves = %legal_preview,
        chosen = %chosen,
        want_to_win,
        trick_cards = info.current_trick().plays().len(),
    );
}
