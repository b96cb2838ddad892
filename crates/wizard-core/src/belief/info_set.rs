use crate::error::InvalidStateError;
use crate::model::card::{Card, DECK_SIZE};
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::round::{RoundPhase, RoundState};
use crate::model::suit::{Suit, Trump};
use crate::model::trick::{Play, Trick};
use crate::rules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// What one seat can see of a round: its own hand plus everything public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationSet {
    seat: Seat,
    players: usize,
    hand_size: usize,
    first_seat: Seat,
    phase: RoundPhase,
    hand: Hand,
    trump: Trump,
    indicators: Vec<Card>,
    bids: Vec<Option<u8>>,
    tricks_won: Vec<u8>,
    trick_history: Vec<Trick>,
    current_trick: Trick,
    scores: Vec<i32>,
}

impl InformationSet {
    /// Projects `round` onto what `seat` is allowed to know. `scores` are the
    /// match totals before this round.
    pub fn from_round(round: &RoundState, seat: Seat, scores: &[i32]) -> Self {
        Self {
            seat,
            players: round.players(),
            hand_size: round.hand_size(),
            first_seat: round.first_seat(),
            phase: round.phase(),
            hand: round.hand(seat).clone(),
            trump: round.trump(),
            indicators: round.indicators().to_vec(),
            bids: round.bids().to_vec(),
            tricks_won: round.tricks_won_all().to_vec(),
            trick_history: round.trick_history().to_vec(),
            current_trick: round.current_trick().clone(),
            scores: scores.to_vec(),
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    /// Round number within the match; equal to the hand size.
    pub fn round_number(&self) -> usize {
        self.hand_size
    }

    pub fn first_seat(&self) -> Seat {
        self.first_seat
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn trump(&self) -> Trump {
        self.trump
    }

    pub fn indicators(&self) -> &[Card] {
        &self.indicators
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn bid(&self, seat: Seat) -> Option<u8> {
        self.bids.get(seat.index()).copied().flatten()
    }

    pub fn tricks_won(&self, seat: Seat) -> u8 {
        self.tricks_won.get(seat.index()).copied().unwrap_or(0)
    }

    pub fn tricks_won_all(&self) -> &[u8] {
        &self.tricks_won
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    /// Every play this round in order, the trick in progress last.
    pub fn played(&self) -> impl Iterator<Item = &Play> {
        self.trick_history
            .iter()
            .chain(std::iter::once(&self.current_trick))
            .flat_map(|trick| trick.plays().iter())
    }

    pub fn plays_by(&self, seat: Seat) -> usize {
        self.played().filter(|play| play.seat == seat).count()
    }

    /// Cards `seat` still holds.
    pub fn remaining_cards(&self, seat: Seat) -> usize {
        self.hand_size.saturating_sub(self.plays_by(seat))
    }

    /// Size of the face-down part of the deck nobody holds.
    pub fn hidden_remainder_len(&self) -> Option<usize> {
        DECK_SIZE.checked_sub(self.players * self.hand_size + self.indicators.len())
    }

    pub fn expected_seat(&self) -> Option<Seat> {
        match self.phase {
            RoundPhase::Bidding => {
                let placed = self.bids.iter().filter(|bid| bid.is_some()).count();
                Some(self.first_seat.offset(placed, self.players))
            }
            RoundPhase::Playing => Some(self.current_trick.expected_seat()),
            RoundPhase::Scored => None,
        }
    }

    pub fn legal_bids(&self) -> Result<RangeInclusive<u8>, InvalidStateError> {
        if self.phase != RoundPhase::Bidding {
            return Err(InvalidStateError::NotBidding);
        }
        self.check_turn()?;
        Ok(0..=self.hand_size as u8)
    }

    pub fn legal_moves(&self) -> Result<Vec<Card>, InvalidStateError> {
        if self.phase != RoundPhase::Playing {
            return Err(InvalidStateError::NotPlaying);
        }
        self.check_turn()?;
        if self.hand.is_empty() {
            return Err(InvalidStateError::EmptyHand(self.seat));
        }
        Ok(rules::legal_cards(&self.hand, self.current_trick.lead_suit()))
    }

    /// Suits each seat has publicly shown out of: it played a suited card of
    /// another suit after the led suit was set. Indexed by seat then suit.
    pub fn voids(&self) -> Vec<[bool; 4]> {
        let mut voids = vec![[false; 4]; self.players];
        for trick in self
            .trick_history
            .iter()
            .chain(std::iter::once(&self.current_trick))
        {
            let mut lead: Option<Suit> = None;
            for play in trick.plays() {
                let Some(suit) = play.card.suit() else {
                    continue;
                };
                match lead {
                    None => lead = Some(suit),
                    Some(led) if led != suit => voids[play.seat.index()][led.index()] = true,
                    Some(_) => {}
                }
            }
        }
        voids
    }

    /// Cards whose location is known to this seat: own hand, everything played,
    /// and the revealed indicators. Fails on a card known in two places.
    pub fn known_cards(&self) -> Result<HashSet<Card>, Card> {
        let mut known = HashSet::with_capacity(DECK_SIZE);
        let cards = self
            .hand
            .iter()
            .copied()
            .chain(self.played().map(|play| play.card))
            .chain(self.indicators.iter().copied());
        for card in cards {
            if !known.insert(card) {
                return Err(card);
            }
        }
        Ok(known)
    }

    /// Cards not visible to this seat, in sort order.
    pub fn unseen_cards(&self) -> Vec<Card> {
        let known = self.known_cards().unwrap_or_default();
        Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !known.contains(card))
            .collect()
    }

    fn check_turn(&self) -> Result<(), InvalidStateError> {
        match self.expected_seat() {
            Some(expected) if expected != self.seat => Err(InvalidStateError::OutOfTurn {
                expected,
                actual: self.seat,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InformationSet;
    use crate::model::card::Card;
    use crate::model::deck::{Deck, TrumpRule};
    use crate::model::hand::Hand;
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::round::{RoundParts, RoundState};
    use crate::model::suit::{Suit, Trump};
    use crate::model::trick::Trick;

    fn card(value: u8, suit: Suit) -> Card {
        Card::new(Rank::from_value(value).unwrap(), suit)
    }

    #[test]
    fn projection_hides_other_hands() {
        let deck = Deck::shuffled_with_seed(21);
        let round = RoundState::deal(&deck, 4, 3, Seat::new(0), TrumpRule::default()).unwrap();
        let info = InformationSet::from_round(&round, Seat::new(2), &[0, 10, -10, 0]);
        assert_eq!(info.hand(), round.hand(Seat::new(2)));
        assert_eq!(info.scores(), &[0, 10, -10, 0]);
        assert_eq!(info.remaining_cards(Seat::new(1)), 3);

        let unseen = info.unseen_cards();
        assert_eq!(unseen.len(), 60 - 3 - info.indicators().len());
        assert!(unseen.iter().all(|c| !info.hand().contains(*c)));
        assert_eq!(
            unseen.len(),
            3 * 3 + info.hidden_remainder_len().unwrap()
        );
    }

    #[test]
    fn legal_queries_respect_turn() {
        let deck = Deck::shuffled_with_seed(4);
        let round = RoundState::deal(&deck, 3, 2, Seat::new(1), TrumpRule::Classic).unwrap();
        let on_turn = InformationSet::from_round(&round, Seat::new(1), &[0, 0, 0]);
        let waiting = InformationSet::from_round(&round, Seat::new(0), &[0, 0, 0]);
        assert_eq!(on_turn.legal_bids().unwrap(), 0..=2);
        assert!(waiting.legal_bids().is_err());
        assert!(on_turn.legal_moves().is_err());
    }

    #[test]
    fn shown_out_suits_are_tracked() {
        let mut trick = Trick::new(Seat::new(0), 3);
        trick.play(Seat::new(0), Card::wizard(0)).unwrap();
        trick.play(Seat::new(1), card(4, Suit::Green)).unwrap();
        trick.play(Seat::new(2), card(9, Suit::Red)).unwrap();
        let round = RoundState::from_parts(RoundParts {
            hand_size: 2,
            first_seat: Seat::new(0),
            hands: vec![
                Hand::with_cards(vec![card(1, Suit::Blue)]),
                Hand::with_cards(vec![card(2, Suit::Blue)]),
                Hand::with_cards(vec![card(3, Suit::Blue)]),
            ],
            trump: Trump::NoTrump,
            indicators: vec![card(5, Suit::Yellow)],
            remainder: Vec::new(),
            bids: vec![Some(1), Some(0), Some(1)],
            current_trick: Trick::new(Seat::new(0), 3),
            trick_history: vec![trick],
        })
        .unwrap();

        let info = InformationSet::from_round(&round, Seat::new(0), &[0, 0, 0]);
        let voids = info.voids();
        let green = Suit::Green.index();
        assert!(voids[2][green]);
        assert!(!voids[1][green]);
        assert!(!voids[0][green]);
        assert_eq!(info.tricks_won(Seat::new(0)), 1);
        assert_eq!(info.remaining_cards(Seat::new(1)), 1);
        assert_eq!(info.legal_moves().unwrap(), vec![card(1, Suit::Blue)]);
    }
}
