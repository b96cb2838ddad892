//! Property tests for world sampling from an information set.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wizard_core::belief::{Determinizer, InformationSet};
use wizard_core::error::ConsistencyError;
use wizard_core::game::match_state::MatchState;
use wizard_core::model::card::Card;
use wizard_core::model::deck::TrumpRule;
use wizard_core::model::player::Seat;
use wizard_core::model::round::{RoundPhase, RoundState};

/// Plays `plays` cards of the current round with lowest-legal-card play.
fn advance(round: &mut RoundState, plays: usize) {
    while round.phase() == RoundPhase::Bidding {
        let seat = round.expected_seat().unwrap();
        round.place_bid(seat, 1).unwrap();
    }
    for _ in 0..plays {
        let Some(seat) = round.expected_seat() else { break };
        let card = round.legal_moves(seat).unwrap()[0];
        round.play_card(seat, card).unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sampled_worlds_respect_public_information(
        players in 3usize..=6,
        round_number in 1usize..=8,
        plays in 0usize..20,
        viewer in 0usize..6,
        seed in any::<u64>(),
    ) {
        let rule = TrumpRule::default();
        let mut state = MatchState::with_seed_round(players, seed, round_number, rule).unwrap();
        let hand_size = state.round().hand_size();
        advance(state.round_mut(), plays.min(players * hand_size - 1));

        let seat = Seat::new((viewer % players) as u8);
        let info = state.information_set(seat).unwrap();
        let (world, stats) = Determinizer::default()
            .sample_with_stats(&info, &mut StdRng::seed_from_u64(seed.rotate_left(7)))
            .unwrap();
        prop_assert!(stats.attempts >= 1);

        let known: HashSet<Card> = info.known_cards().unwrap();
        for other in Seat::all(players).filter(|s| *s != seat) {
            let hand = world.hand(other);
            prop_assert_eq!(hand.len(), info.remaining_cards(other));
            prop_assert!(hand.iter().all(|c| !known.contains(c)));
            for suit_index in 0..4 {
                if info.voids()[other.index()][suit_index] {
                    let off_suit = |c: &Card| c.suit().map(|s| s.index()) != Some(suit_index);
                    prop_assert!(hand.iter().all(off_suit));
                }
            }
        }
        prop_assert_eq!(world.hand(seat), info.hand());
        prop_assert!(world.remainder().iter().all(|c| !known.contains(c)));
        prop_assert_eq!(Some(world.remainder().len()), info.hidden_remainder_len());
        prop_assert_eq!(world.expected_seat(), state.round().expected_seat());
        prop_assert_eq!(world.tricks_won_all(), state.round().tricks_won_all());
    }
}

#[test]
fn same_seed_same_world() {
    let state = MatchState::with_seed_round(4, 31, 6, TrumpRule::Classic).unwrap();
    let info = state.information_set(Seat::new(3)).unwrap();
    let sampler = Determinizer::new(16);
    let a = sampler.sample(&info, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = sampler.sample(&info, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tampered_information_set_is_rejected() {
    let state = MatchState::with_seed_round(3, 8, 3, TrumpRule::default()).unwrap();
    let info = state.information_set(Seat::new(0)).unwrap();
    let mut value = serde_json::to_value(&info).unwrap();
    value["hand_size"] = serde_json::json!(4);
    let tampered: InformationSet = serde_json::from_value(value).unwrap();

    let err = Determinizer::default()
        .sample(&tampered, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(err, ConsistencyError::CardCount { .. }));
}
