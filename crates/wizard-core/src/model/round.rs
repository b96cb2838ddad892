use crate::error::InvalidStateError;
use crate::model::card::Card;
use crate::model::deck::{Deck, TrumpRule};
use crate::model::hand::Hand;
use crate::model::player::{Seat, valid_player_count};
use crate::model::suit::Trump;
use crate::model::trick::{Play, Trick};
use crate::rules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Bidding,
    Playing,
    Scored,
}

/// Complete state of one round: every hand, the indicator(s), the undealt rest,
/// bids, tricks taken so far and the trick in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    players: usize,
    hand_size: usize,
    first_seat: Seat,
    hands: Vec<Hand>,
    trump: Trump,
    indicators: Vec<Card>,
    remainder: Vec<Card>,
    bids: Vec<Option<u8>>,
    tricks_won: Vec<u8>,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    phase: RoundPhase,
}

/// Raw pieces of a round, used to rebuild a state from a sampled world or a
/// hand-written position.
#[derive(Debug, Clone)]
pub struct RoundParts {
    pub hand_size: usize,
    pub first_seat: Seat,
    pub hands: Vec<Hand>,
    pub trump: Trump,
    pub indicators: Vec<Card>,
    pub remainder: Vec<Card>,
    pub bids: Vec<Option<u8>>,
    pub current_trick: Trick,
    pub trick_history: Vec<Trick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: Seat, round_over: bool },
}

impl RoundState {
    pub fn deal(
        deck: &Deck,
        players: usize,
        hand_size: usize,
        first_seat: Seat,
        rule: TrumpRule,
    ) -> Result<Self, InvalidStateError> {
        let deal = deck.deal(players, hand_size, first_seat, rule)?;
        Ok(Self {
            players,
            hand_size,
            first_seat,
            hands: deal.hands,
            trump: deal.trump,
            indicators: deal.indicators,
            remainder: deal.remainder,
            bids: vec![None; players],
            tricks_won: vec![0; players],
            current_trick: Trick::new(first_seat, players),
            trick_history: Vec::new(),
            phase: RoundPhase::Bidding,
        })
    }

    /// Rebuilds a state from its parts, checking card accounting and recomputing
    /// tricks won and the phase.
    pub fn from_parts(parts: RoundParts) -> Result<Self, InvalidStateError> {
        let players = parts.hands.len();
        if !valid_player_count(players) {
            return Err(InvalidStateError::PlayerCount(players));
        }
        if parts.hand_size == 0 || parts.hand_size > Deck::max_hand_size(players) {
            return Err(InvalidStateError::HandSize {
                hand_size: parts.hand_size,
                players,
            });
        }
        if parts.first_seat.index() >= players {
            return Err(InvalidStateError::UnknownSeat(parts.first_seat));
        }
        if parts.bids.len() != players {
            return Err(InvalidStateError::PlayerCount(parts.bids.len()));
        }

        let mut seen = HashSet::new();
        let located = parts
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(parts.indicators.iter().copied())
            .chain(parts.remainder.iter().copied())
            .chain(
                parts
                    .trick_history
                    .iter()
                    .chain(std::iter::once(&parts.current_trick))
                    .flat_map(|trick| trick.plays().iter().map(|play| play.card)),
            );
        for card in located {
            if !seen.insert(card) {
                return Err(InvalidStateError::DuplicateCard(card));
            }
        }

        for trick in parts
            .trick_history
            .iter()
            .chain(std::iter::once(&parts.current_trick))
        {
            if trick.players() != players {
                return Err(InvalidStateError::PlayerCount(trick.players()));
            }
            let seats = trick.plays().iter().map(|play| play.seat);
            for seat in std::iter::once(trick.leader()).chain(seats) {
                if seat.index() >= players {
                    return Err(InvalidStateError::UnknownSeat(seat));
                }
            }
        }

        let mut played = vec![0usize; players];
        let mut tricks_won = vec![0u8; players];
        for trick in &parts.trick_history {
            if !trick.is_complete() {
                return Err(InvalidStateError::NotPlaying);
            }
            for play in trick.plays() {
                played[play.seat.index()] += 1;
            }
            if let Some(winner) = trick.winner(parts.trump) {
                tricks_won[winner.index()] += 1;
            }
        }
        for play in parts.current_trick.plays() {
            played[play.seat.index()] += 1;
        }
        for seat in Seat::all(players) {
            let expected = parts.hand_size - played[seat.index()].min(parts.hand_size);
            let actual = parts.hands[seat.index()].len();
            if actual != expected {
                return Err(InvalidStateError::HandCount {
                    seat,
                    expected,
                    actual,
                });
            }
        }
        let max_bid = parts.hand_size;
        if let Some(&bid) = parts.bids.iter().flatten().find(|bid| usize::from(**bid) > max_bid) {
            return Err(InvalidStateError::BidOutOfRange {
                bid,
                max: max_bid as u8,
            });
        }

        let any_played = played.iter().any(|&count| count > 0);
        let all_bid = parts.bids.iter().all(Option::is_some);
        let phase = if !all_bid {
            if any_played {
                return Err(InvalidStateError::NotPlaying);
            }
            RoundPhase::Bidding
        } else if parts.hands.iter().all(Hand::is_empty) {
            RoundPhase::Scored
        } else {
            RoundPhase::Playing
        };

        Ok(Self {
            players,
            hand_size: parts.hand_size,
            first_seat: parts.first_seat,
            hands: parts.hands,
            trump: parts.trump,
            indicators: parts.indicators,
            remainder: parts.remainder,
            bids: parts.bids,
            tricks_won,
            current_trick: parts.current_trick,
            trick_history: parts.trick_history,
            phase,
        })
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    pub fn first_seat(&self) -> Seat {
        self.first_seat
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn trump(&self) -> Trump {
        self.trump
    }

    pub fn indicators(&self) -> &[Card] {
        &self.indicators
    }

    pub fn remainder(&self) -> &[Card] {
        &self.remainder
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn bid(&self, seat: Seat) -> Option<u8> {
        self.bids.get(seat.index()).copied().flatten()
    }

    pub fn tricks_won(&self, seat: Seat) -> u8 {
        self.tricks_won[seat.index()]
    }

    pub fn tricks_won_all(&self) -> &[u8] {
        &self.tricks_won
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    /// Every play this round in order, the trick in progress last.
    pub fn played(&self) -> impl Iterator<Item = &Play> {
        self.trick_history
            .iter()
            .chain(std::iter::once(&self.current_trick))
            .flat_map(|trick| trick.plays().iter())
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == RoundPhase::Scored
    }

    /// Seat expected to bid or play next; `None` once the round is scored.
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

    pub fn legal_bids(&self, seat: Seat) -> Result<RangeInclusive<u8>, InvalidStateError> {
        self.check_seat(seat)?;
        if self.phase != RoundPhase::Bidding {
            return Err(InvalidStateError::NotBidding);
        }
        self.check_turn(seat)?;
        Ok(0..=self.hand_size as u8)
    }

    pub fn place_bid(&mut self, seat: Seat, bid: u8) -> Result<(), InvalidStateError> {
        self.check_seat(seat)?;
        if self.bids[seat.index()].is_some() {
            return Err(InvalidStateError::AlreadyBid(seat));
        }
        let range = self.legal_bids(seat)?;
        if !range.contains(&bid) {
            return Err(InvalidStateError::BidOutOfRange {
                bid,
                max: *range.end(),
            });
        }
        self.bids[seat.index()] = Some(bid);
        if self.bids.iter().all(Option::is_some) {
            self.phase = RoundPhase::Playing;
        }
        Ok(())
    }

    /// Cards `seat` may play now, in sort order.
    pub fn legal_moves(&self, seat: Seat) -> Result<Vec<Card>, InvalidStateError> {
        self.check_seat(seat)?;
        if self.phase != RoundPhase::Playing {
            return Err(InvalidStateError::NotPlaying);
        }
        self.check_turn(seat)?;
        let hand = &self.hands[seat.index()];
        if hand.is_empty() {
            return Err(InvalidStateError::EmptyHand(seat));
        }
        Ok(rules::legal_cards(hand, self.current_trick.lead_suit()))
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, InvalidStateError> {
        let legal = self.legal_moves(seat)?;
        if !legal.contains(&card) {
            if !self.hands[seat.index()].contains(card) {
                return Err(InvalidStateError::CardNotInHand { seat, card });
            }
            let suit = self
                .current_trick
                .lead_suit()
                .ok_or(InvalidStateError::CardNotInHand { seat, card })?;
            return Err(InvalidStateError::MustFollowSuit { seat, suit });
        }

        self.hands[seat.index()].remove(card);
        self.current_trick.play(seat, card)?;

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = self
            .current_trick
            .winner(self.trump)
            .unwrap_or(self.current_trick.leader());
        self.tricks_won[winner.index()] += 1;
        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner, self.players));
        self.trick_history.push(finished);

        let round_over = self.hands.iter().all(Hand::is_empty);
        if round_over {
            self.phase = RoundPhase::Scored;
        }
        Ok(PlayOutcome::TrickCompleted { winner, round_over })
    }

    /// Pure variant of [`RoundState::play_card`]: returns the successor state and
    /// leaves `self` untouched.
    pub fn apply_move(&self, seat: Seat, card: Card) -> Result<RoundState, InvalidStateError> {
        let mut next = self.clone();
        next.play_card(seat, card)?;
        Ok(next)
    }

    /// Per-seat round scores once every trick has been played.
    pub fn round_scores(&self) -> Option<Vec<i32>> {
        if !self.is_terminal() {
            return None;
        }
        Some(
            self.bids
                .iter()
                .zip(&self.tricks_won)
                .map(|(bid, &won)| rules::score_round(bid.unwrap_or(0), won))
                .collect(),
        )
    }

    fn check_seat(&self, seat: Seat) -> Result<(), InvalidStateError> {
        if seat.index() < self.players {
            Ok(())
        } else {
            Err(InvalidStateError::UnknownSeat(seat))
        }
    }

    fn check_turn(&self, seat: Seat) -> Result<(), InvalidStateError> {
        match self.expected_seat() {
            Some(expected) if expected != seat => Err(InvalidStateError::OutOfTurn {
                expected,
                actual: seat,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayOutcome, RoundParts, RoundPhase, RoundState};
    use crate::error::InvalidStateError;
    use crate::model::card::Card;
    use crate::model::deck::{Deck, TrumpRule};
    use crate::model::hand::Hand;
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::suit::{Suit, Trump};
    use crate::model::trick::Trick;

    fn card(value: u8, suit: Suit) -> Card {
        Card::new(Rank::from_value(value).unwrap(), suit)
    }

    fn seat(index: u8) -> Seat {
        Seat::new(index)
    }

    fn fixed_round() -> RoundState {
        RoundState::from_parts(RoundParts {
            hand_size: 2,
            first_seat: seat(0),
            hands: vec![
                Hand::with_cards(vec![card(5, Suit::Red), card(2, Suit::Blue)]),
                Hand::with_cards(vec![Card::wizard(0), card(7, Suit::Red)]),
                Hand::with_cards(vec![card(9, Suit::Red), card(13, Suit::Green)]),
            ],
            trump: Trump::Suit(Suit::Blue),
            indicators: vec![card(1, Suit::Blue)],
            remainder: Vec::new(),
            bids: vec![None; 3],
            current_trick: Trick::new(seat(0), 3),
            trick_history: Vec::new(),
        })
        .unwrap()
    }

    fn bid_all(round: &mut RoundState, bids: &[u8]) {
        for &bid in bids {
            let seat = round.expected_seat().unwrap();
            round.place_bid(seat, bid).unwrap();
        }
    }

    #[test]
    fn deal_starts_in_bidding_with_first_seat_on_turn() {
        let deck = Deck::shuffled_with_seed(5);
        let round = RoundState::deal(&deck, 4, 3, seat(2), TrumpRule::default()).unwrap();
        assert_eq!(round.phase(), RoundPhase::Bidding);
        assert_eq!(round.expected_seat(), Some(seat(2)));
        assert!(round.hands().iter().all(|hand| hand.len() == 3));
        assert_eq!(round.current_trick().leader(), seat(2));
    }

    #[test]
    fn bidding_enforces_turn_range_and_repeat() {
        let mut round = fixed_round();
        assert_eq!(round.legal_bids(seat(0)).unwrap(), 0..=2);
        assert!(matches!(
            round.place_bid(seat(1), 0),
            Err(InvalidStateError::OutOfTurn { .. })
        ));
        assert_eq!(
            round.place_bid(seat(0), 3),
            Err(InvalidStateError::BidOutOfRange { bid: 3, max: 2 })
        );
        round.place_bid(seat(0), 1).unwrap();
        assert_eq!(
            round.place_bid(seat(0), 1),
            Err(InvalidStateError::AlreadyBid(seat(0)))
        );
        assert!(matches!(
            round.legal_moves(seat(1)),
            Err(InvalidStateError::NotPlaying)
        ));
    }

    #[test]
    fn legal_moves_require_turn_and_follow_suit() {
        let mut round = fixed_round();
        bid_all(&mut round, &[1, 1, 0]);
        assert_eq!(round.phase(), RoundPhase::Playing);
        assert!(matches!(
            round.legal_moves(seat(1)),
            Err(InvalidStateError::OutOfTurn { .. })
        ));

        round.play_card(seat(0), card(5, Suit::Red)).unwrap();
        assert_eq!(
            round.legal_moves(seat(1)).unwrap(),
            vec![card(7, Suit::Red), Card::wizard(0)]
        );
        assert_eq!(
            round.play_card(seat(1), card(13, Suit::Green)),
            Err(InvalidStateError::CardNotInHand {
                seat: seat(1),
                card: card(13, Suit::Green)
            })
        );
    }

    #[test]
    fn must_follow_suit_error_names_led_suit() {
        let mut round = fixed_round();
        bid_all(&mut round, &[0, 0, 0]);
        round.play_card(seat(0), card(5, Suit::Red)).unwrap();
        round.play_card(seat(1), card(7, Suit::Red)).unwrap();
        assert_eq!(
            round.play_card(seat(2), card(13, Suit::Green)),
            Err(InvalidStateError::MustFollowSuit {
                seat: seat(2),
                suit: Suit::Red
            })
        );
    }

    #[test]
    fn full_round_scores_and_terminates() {
        let mut round = fixed_round();
        bid_all(&mut round, &[1, 1, 0]);

        round.play_card(seat(0), card(5, Suit::Red)).unwrap();
        round.play_card(seat(1), Card::wizard(0)).unwrap();
        let outcome = round.play_card(seat(2), card(9, Suit::Red)).unwrap();
        assert_eq!(
            outcome,
            PlayOutcome::TrickCompleted {
                winner: seat(1),
                round_over: false
            }
        );
        assert_eq!(round.expected_seat(), Some(seat(1)));

        round.play_card(seat(1), card(7, Suit::Red)).unwrap();
        round.play_card(seat(2), card(13, Suit::Green)).unwrap();
        let outcome = round.play_card(seat(0), card(2, Suit::Blue)).unwrap();
        assert_eq!(
            outcome,
            PlayOutcome::TrickCompleted {
                winner: seat(0),
                round_over: true
            }
        );

        assert!(round.is_terminal());
        assert_eq!(round.expected_seat(), None);
        assert_eq!(round.tricks_won_all(), &[1, 1, 0]);
        assert_eq!(round.round_scores(), Some(vec![30, 30, 20]));
        assert!(matches!(
            round.legal_moves(seat(0)),
            Err(InvalidStateError::NotPlaying)
        ));
    }

    #[test]
    fn apply_move_leaves_input_untouched() {
        let mut round = fixed_round();
        bid_all(&mut round, &[0, 1, 1]);
        let before = round.clone();
        let next = round.apply_move(seat(0), card(2, Suit::Blue)).unwrap();
        assert_eq!(round, before);
        assert_eq!(next.hand(seat(0)).len(), 1);
        assert_eq!(next.current_trick().plays().len(), 1);
    }

    #[test]
    fn from_parts_rejects_duplicates_and_bad_counts() {
        let mut parts = RoundParts {
            hand_size: 1,
            first_seat: seat(0),
            hands: vec![
                Hand::with_cards(vec![Card::wizard(0)]),
                Hand::with_cards(vec![Card::wizard(0)]),
                Hand::with_cards(vec![card(3, Suit::Red)]),
            ],
            trump: Trump::NoTrump,
            indicators: Vec::new(),
            remainder: Vec::new(),
            bids: vec![None; 3],
            current_trick: Trick::new(seat(0), 3),
            trick_history: Vec::new(),
        };
        assert_eq!(
            RoundState::from_parts(parts.clone()).unwrap_err(),
            InvalidStateError::DuplicateCard(Card::wizard(0))
        );

        parts.hands[1] = Hand::new();
        assert!(matches!(
            RoundState::from_parts(parts).unwrap_err(),
            InvalidStateError::HandCount { .. }
        ));
    }

    #[test]
    fn tricks_won_sum_to_hand_size_with_seeded_play() {
        let deck = Deck::shuffled_with_seed(11);
        let mut round = RoundState::deal(&deck, 5, 6, seat(3), TrumpRule::Classic).unwrap();
        while round.phase() == RoundPhase::Bidding {
            let seat = round.expected_seat().unwrap();
            round.place_bid(seat, 1).unwrap();
        }
        while let Some(seat) = round.expected_seat() {
            let card = round.legal_moves(seat).unwrap()[0];
            round.play_card(seat, card).unwrap();
        }
        let total: u32 = round.tricks_won_all().iter().map(|&t| u32::from(t)).sum();
        assert_eq!(total, 6);
        assert_eq!(round.tricks_completed(), 6);
    }

    #[test]
    fn from_parts_rejects_seats_beyond_the_table() {
        let parts = |current_trick: Trick| RoundParts {
            hand_size: 2,
            first_seat: seat(0),
            hands: vec![
                Hand::with_cards(vec![card(5, Suit::Red), card(2, Suit::Blue)]),
                Hand::with_cards(vec![Card::wizard(0), card(7, Suit::Red)]),
                Hand::with_cards(vec![card(9, Suit::Red), card(13, Suit::Green)]),
            ],
            trump: Trump::Suit(Suit::Blue),
            indicators: vec![card(1, Suit::Blue)],
            remainder: Vec::new(),
            bids: vec![Some(1); 3],
            current_trick,
            trick_history: Vec::new(),
        };

        let mut wide = Trick::new(seat(4), 5);
        wide.play(seat(4), card(11, Suit::Yellow)).unwrap();
        assert_eq!(
            RoundState::from_parts(parts(wide)),
            Err(InvalidStateError::PlayerCount(5))
        );

        assert_eq!(
            RoundState::from_parts(parts(Trick::new(seat(4), 3))),
            Err(InvalidStateError::UnknownSeat(seat(4)))
        );
    }
}
