//! Stateless rules shared by the round state, the information set and the bots.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::suit::{Suit, Trump};
use crate::model::trick::{Play, Trick};

/// Cards from `hand` that may be played onto a trick whose led suit is `lead`.
///
/// Specials are always playable. Holding the led suit restricts the rest of the
/// hand to that suit; otherwise anything goes. Order follows the hand.
pub fn legal_cards(hand: &Hand, lead: Option<Suit>) -> Vec<Card> {
    match lead {
        Some(suit) if hand.has_suit(suit) => hand
            .iter()
            .copied()
            .filter(|card| card.is_special() || card.is_suit(suit))
            .collect(),
        _ => hand.cards().to_vec(),
    }
}

/// The play currently taking `plays`.
///
/// The first Wizard wins outright. A trick of nothing but Jesters goes to the
/// first of them. Otherwise the highest trump wins, or failing that the highest
/// card of the led suit (the first non-special card played).
pub fn winning_play(plays: &[Play], trump: Trump) -> Option<&Play> {
    let first = plays.first()?;
    if let Some(wizard) = plays.iter().find(|play| play.card.is_wizard()) {
        return Some(wizard);
    }

    let best_of = |suit: Suit| {
        plays
            .iter()
            .filter(move |play| play.card.is_suit(suit))
            .max_by_key(|play| play.card.rank())
    };

    let trump_winner = trump.suit().and_then(best_of);
    let lead = plays.iter().find_map(|play| play.card.suit());
    trump_winner
        .or_else(|| lead.and_then(best_of))
        .or(Some(first))
}

pub fn resolve_trick(trick: &Trick, trump: Trump) -> Option<Seat> {
    winning_play(trick.plays(), trump).map(|play| play.seat)
}

/// Round score for one player: `20 + 10 × tricks` on an exact bid, otherwise
/// minus ten per trick of difference.
pub fn score_round(bid: u8, tricks_won: u8) -> i32 {
    if bid == tricks_won {
        20 + 10 * i32::from(tricks_won)
    } else {
        -10 * (i32::from(bid) - i32::from(tricks_won)).abs()
    }
}

/// Best and worst round score reachable with `hand_size` cards in play.
pub fn score_bounds(hand_size: usize) -> (i32, i32) {
    let hand_size = hand_size as i32;
    (-10 * hand_size, 20 + 10 * hand_size)
}
