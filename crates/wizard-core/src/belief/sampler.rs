use crate::belief::info_set::InformationSet;
use crate::error::ConsistencyError;
use crate::model::card::{Card, DECK_SIZE};
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::round::{RoundParts, RoundState};
use rand::Rng;
use rand::seq::SliceRandom;

pub const DEFAULT_SAMPLER_ATTEMPTS: usize = 64;

/// Deals the unseen cards of an information set into a complete round.
#[derive(Debug, Clone, Copy)]
pub struct Determinizer {
    max_attempts: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SamplingStats {
    pub attempts: usize,
    pub rejections: usize,
    pub repairs: usize,
}

impl SamplingStats {
    pub fn merge(&mut self, other: SamplingStats) {
        self.attempts += other.attempts;
        self.rejections += other.rejections;
        self.repairs += other.repairs;
    }
}

impl Default for Determinizer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLER_ATTEMPTS)
    }
}

/// One destination for unseen cards: an opponent's hand or the face-down rest.
#[derive(Debug, Clone)]
struct Slot {
    seat: Option<Seat>,
    voids: [bool; 4],
    cards: Vec<Card>,
}

impl Slot {
    fn accepts(&self, card: Card) -> bool {
        card.suit().is_none_or(|suit| !self.voids[suit.index()])
    }

    fn violation(&self) -> Option<usize> {
        self.cards.iter().position(|card| !self.accepts(*card))
    }
}

impl Determinizer {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        info: &InformationSet,
        rng: &mut R,
    ) -> Result<RoundState, ConsistencyError> {
        self.sample_with_stats(info, rng).map(|(world, _)| world)
    }

    /// Samples one world uniformly among those consistent with `info` and its
    /// shown-out suits. Falls back to a swap repair of the last draw once the
    /// attempt budget is spent.
    pub fn sample_with_stats<R: Rng + ?Sized>(
        &self,
        info: &InformationSet,
        rng: &mut R,
    ) -> Result<(RoundState, SamplingStats), ConsistencyError> {
        let known = info
            .known_cards()
            .map_err(ConsistencyError::DuplicateKnownCard)?;
        let mut unseen: Vec<Card> = info.unseen_cards();
        debug_assert_eq!(unseen.len() + known.len(), DECK_SIZE);

        let voids = info.voids();
        let mut slots: Vec<Slot> = Seat::all(info.players())
            .filter(|seat| *seat != info.seat())
            .map(|seat| Slot {
                seat: Some(seat),
                voids: voids[seat.index()],
                cards: Vec::with_capacity(info.remaining_cards(seat)),
            })
            .collect();
        let mut quotas: Vec<usize> = slots
            .iter()
            .filter_map(|slot| slot.seat)
            .map(|seat| info.remaining_cards(seat))
            .collect();

        let hidden = info.hidden_remainder_len().unwrap_or(0);
        let required = quotas.iter().sum::<usize>() + hidden;
        if info.hidden_remainder_len().is_none() || unseen.len() != required {
            return Err(ConsistencyError::CardCount {
                unseen: unseen.len(),
                required,
            });
        }
        slots.push(Slot {
            seat: None,
            voids: [false; 4],
            cards: Vec::with_capacity(hidden),
        });
        quotas.push(hidden);

        let mut stats = SamplingStats::default();
        for _ in 0..self.max_attempts {
            stats.attempts += 1;
            unseen.shuffle(rng);
            fill_slots(&mut slots, &quotas, &unseen);
            if slots.iter().all(|slot| slot.violation().is_none()) {
                return Ok((build_world(info, slots)?, stats));
            }
            stats.rejections += 1;
        }

        if attempt_repair(&mut slots) {
            stats.repairs += 1;
            return Ok((build_world(info, slots)?, stats));
        }

        Err(ConsistencyError::Unsatisfiable {
            attempts: stats.attempts,
        })
    }
}

fn fill_slots(slots: &mut [Slot], quotas: &[usize], cards: &[Card]) {
    let mut offset = 0;
    for (slot, &quota) in slots.iter_mut().zip(quotas) {
        slot.cards.clear();
        slot.cards.extend_from_slice(&cards[offset..offset + quota]);
        offset += quota;
    }
}

/// Swaps misplaced cards with cards from other slots until no slot holds a
/// suit it has shown out of. Every move removes one violation without adding
/// another, so the loop is bounded by the number of unseen cards.
fn attempt_repair(slots: &mut [Slot]) -> bool {
    let limit: usize = slots.iter().map(|slot| slot.cards.len()).sum();
    for _ in 0..=limit {
        let Some((needy, pos)) = slots
            .iter()
            .enumerate()
            .find_map(|(index, slot)| slot.violation().map(|pos| (index, pos)))
        else {
            return true;
        };

        let misplaced = slots[needy].cards[pos];
        let partner = (0..slots.len()).filter(|&other| other != needy).find_map(|other| {
            let target = &slots[other];
            if !target.accepts(misplaced) {
                return None;
            }
            target
                .cards
                .iter()
                .position(|card| slots[needy].accepts(*card))
                .map(|at| (other, at))
        });

        if let Some((other, at)) = partner {
            let (a, b) = split_two_mut(slots, needy, other);
            std::mem::swap(&mut a.cards[pos], &mut b.cards[at]);
            continue;
        }
        if !rotate_three(slots, needy, pos) {
            return false;
        }
    }
    false
}

/// Three-way move for when no direct swap exists: the misplaced card goes to
/// `middle`, a card of `middle` goes to `last`, and a card of `last` comes back
/// to `needy`.
fn rotate_three(slots: &mut [Slot], needy: usize, pos: usize) -> bool {
    let misplaced = slots[needy].cards[pos];
    let count = slots.len();
    for middle in (0..count).filter(|&m| m != needy && slots[m].accepts(misplaced)) {
        for last in (0..count).filter(|&l| l != needy && l != middle) {
            let Some(from_middle) = slots[middle]
                .cards
                .iter()
                .position(|card| slots[last].accepts(*card))
            else {
                continue;
            };
            let Some(from_last) = slots[last]
                .cards
                .iter()
                .position(|card| slots[needy].accepts(*card))
            else {
                continue;
            };
            let moved = slots[middle].cards[from_middle];
            let back = slots[last].cards[from_last];
            slots[middle].cards[from_middle] = misplaced;
            slots[last].cards[from_last] = moved;
            slots[needy].cards[pos] = back;
            return true;
        }
    }
    false
}

fn split_two_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b);
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

fn build_world(info: &InformationSet, slots: Vec<Slot>) -> Result<RoundState, ConsistencyError> {
    let mut hands = vec![Hand::new(); info.players()];
    hands[info.seat().index()] = info.hand().clone();
    let mut remainder = Vec::new();
    for slot in slots {
        match slot.seat {
            Some(seat) => hands[seat.index()] = Hand::with_cards(slot.cards),
            None => remainder = slot.cards,
        }
    }

    let world = RoundState::from_parts(RoundParts {
        hand_size: info.hand_size(),
        first_seat: info.first_seat(),
        hands,
        trump: info.trump(),
        indicators: info.indicators().to_vec(),
        remainder,
        bids: info.bids().to_vec(),
        current_trick: info.current_trick().clone(),
        trick_history: info.trick_history().to_vec(),
    })?;
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::{Determinizer, Slot, attempt_repair};
    use crate::belief::info_set::InformationSet;
    use crate::error::ConsistencyError;
    use crate::model::card::Card;
    use crate::model::deck::{Deck, TrumpRule};
    use crate::model::hand::Hand;
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::round::{RoundParts, RoundPhase, RoundState};
    use crate::model::suit::{Suit, Trump};
    use crate::model::trick::Trick;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn card(value: u8, suit: Suit) -> Card {
        Card::new(Rank::from_value(value).unwrap(), suit)
    }

    fn playing_round(seed: u64) -> RoundState {
        let deck = Deck::shuffled_with_seed(seed);
        let mut round = RoundState::deal(&deck, 4, 4, Seat::new(0), TrumpRule::default()).unwrap();
        while round.phase() == RoundPhase::Bidding {
            let seat = round.expected_seat().unwrap();
            round.place_bid(seat, 1).unwrap();
        }
        for _ in 0..5 {
            let seat = round.expected_seat().unwrap();
            let card = round.legal_moves(seat).unwrap()[0];
            round.play_card(seat, card).unwrap();
        }
        round
    }

    #[test]
    fn deterministic_with_fixed_seed() {
        let round = playing_round(8);
        let info = InformationSet::from_round(&round, Seat::new(1), &[0; 4]);
        let sampler = Determinizer::default();
        let a = sampler.sample(&info, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = sampler.sample(&info, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sampled_world_keeps_public_state_and_own_hand() {
        let round = playing_round(13);
        let seat = Seat::new(2);
        let info = InformationSet::from_round(&round, seat, &[0; 4]);
        let (world, stats) = Determinizer::default()
            .sample_with_stats(&info, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(world.hand(seat), round.hand(seat));
        assert_eq!(world.current_trick(), round.current_trick());
        assert_eq!(world.trick_history(), round.trick_history());
        assert_eq!(world.bids(), round.bids());
        assert_eq!(world.expected_seat(), round.expected_seat());
        assert_eq!(world.remainder().len(), round.remainder().len());
        for other in Seat::all(4) {
            assert_eq!(world.hand(other).len(), round.hand(other).len());
        }
        assert!(stats.attempts >= 1);
    }

    #[test]
    fn void_suits_are_respected() {
        let mut trick = Trick::new(Seat::new(0), 3);
        trick.play(Seat::new(0), card(2, Suit::Red)).unwrap();
        trick.play(Seat::new(1), card(2, Suit::Green)).unwrap();
        trick.play(Seat::new(2), card(3, Suit::Red)).unwrap();
        let round = RoundState::from_parts(RoundParts {
            hand_size: 6,
            first_seat: Seat::new(0),
            hands: vec![
                Hand::with_cards(vec![
                    card(4, Suit::Blue),
                    card(5, Suit::Blue),
                    card(6, Suit::Blue),
                    card(7, Suit::Blue),
                    card(8, Suit::Blue),
                ]),
                Hand::with_cards(vec![
                    card(3, Suit::Green),
                    card(4, Suit::Green),
                    card(5, Suit::Green),
                    card(6, Suit::Green),
                    card(7, Suit::Green),
                ]),
                Hand::with_cards(vec![
                    card(4, Suit::Red),
                    card(5, Suit::Red),
                    card(6, Suit::Red),
                    card(7, Suit::Red),
                    card(8, Suit::Red),
                ]),
            ],
            trump: Trump::Suit(Suit::Yellow),
            indicators: vec![Card::jester(0), card(9, Suit::Yellow)],
            remainder: Vec::new(),
            bids: vec![Some(1), Some(2), Some(0)],
            current_trick: Trick::new(Seat::new(2), 3),
            trick_history: vec![trick],
        })
        .unwrap();

        let info = InformationSet::from_round(&round, Seat::new(0), &[0; 3]);
        let sampler = Determinizer::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let world = sampler.sample(&info, &mut rng).unwrap();
            assert!(!world.hand(Seat::new(1)).has_suit(Suit::Red));
            assert_eq!(world.hand(Seat::new(1)).len(), 5);
            assert_eq!(world.remainder().len(), 60 - 18 - 2);
        }
    }

    #[test]
    fn count_mismatch_is_reported() {
        let round = playing_round(2);
        let info = corrupt_hand(InformationSet::from_round(&round, Seat::new(0), &[0; 4]));
        let err = Determinizer::default()
            .sample(&info, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, ConsistencyError::CardCount { .. }));
    }

    fn corrupt_hand(info: InformationSet) -> InformationSet {
        let mut value = serde_json::to_value(&info).unwrap();
        let hand = &mut value["hand"]["cards"];
        hand.as_array_mut().unwrap().pop();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn repair_moves_cards_out_of_void_slots() {
        let mut slots = vec![
            Slot {
                seat: Some(Seat::new(1)),
                voids: [true, false, false, false],
                cards: vec![card(2, Suit::Red), card(3, Suit::Blue)],
            },
            Slot {
                seat: None,
                voids: [false; 4],
                cards: vec![card(9, Suit::Green), card(4, Suit::Red)],
            },
        ];
        assert!(attempt_repair(&mut slots));
        assert!(slots[0].cards.iter().all(|c| !c.is_suit(Suit::Red)));
        assert_eq!(slots[1].cards.len(), 2);
    }

    #[test]
    fn repair_rotates_through_a_third_slot() {
        let mut slots = vec![
            Slot {
                seat: Some(Seat::new(1)),
                voids: [true, true, false, false],
                cards: vec![card(2, Suit::Red)],
            },
            Slot {
                seat: Some(Seat::new(2)),
                voids: [false, false, false, true],
                cards: vec![card(5, Suit::Yellow)],
            },
            Slot {
                seat: Some(Seat::new(3)),
                voids: [true, false, false, false],
                cards: vec![card(9, Suit::Green)],
            },
        ];
        assert!(attempt_repair(&mut slots));
        assert_eq!(slots[0].cards, vec![card(9, Suit::Green)]);
        assert_eq!(slots[1].cards, vec![card(2, Suit::Red)]);
        assert_eq!(slots[2].cards, vec![card(5, Suit::Yellow)]);
    }

    #[test]
    fn impossible_voids_are_unsatisfiable() {
        let mut slots = vec![Slot {
            seat: Some(Seat::new(1)),
            voids: [true, false, false, false],
            cards: vec![card(2, Suit::Red)],
        }];
        assert!(!attempt_repair(&mut slots));
    }
}
