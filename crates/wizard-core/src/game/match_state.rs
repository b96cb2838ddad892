use crate::belief::InformationSet;
use crate::error::InvalidStateError;
use crate::model::deck::{Deck, TrumpRule};
use crate::model::player::{Seat, valid_player_count};
use crate::model::round::RoundState;
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A full match: rounds `1..=60 / players`, round `r` dealing `r` cards, with
/// the first seat moving one place clockwise each round.
#[derive(Debug, Clone)]
pub struct MatchState {
    players: usize,
    rule: TrumpRule,
    seed: u64,
    rng: StdRng,
    round_number: usize,
    scores: ScoreBoard,
    current_round: RoundState,
    finished: bool,
}

impl MatchState {
    pub fn with_seed(
        players: usize,
        seed: u64,
        rule: TrumpRule,
    ) -> Result<Self, InvalidStateError> {
        Self::with_seed_round(players, seed, 1, rule)
    }

    /// Starts at `round_number` with the deals a match from `seed` would have
    /// produced up to that point.
    pub fn with_seed_round(
        players: usize,
        seed: u64,
        round_number: usize,
        rule: TrumpRule,
    ) -> Result<Self, InvalidStateError> {
        if !valid_player_count(players) {
            return Err(InvalidStateError::PlayerCount(players));
        }
        let total = Deck::max_hand_size(players);
        if round_number > total {
            return Err(InvalidStateError::MatchOver);
        }
        let round_number = round_number.max(1);
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 1..round_number {
            let _ = Deck::shuffled(&mut rng);
        }

        let deck = Deck::shuffled(&mut rng);
        let current_round = RoundState::deal(
            &deck,
            players,
            round_number,
            Self::first_seat_for(round_number, players),
            rule,
        )?;

        Ok(Self {
            players,
            rule,
            seed,
            rng,
            round_number,
            scores: ScoreBoard::new(players),
            current_round,
            finished: false,
        })
    }

    /// Seat that bids and leads first in `round_number`.
    pub fn first_seat_for(round_number: usize, players: usize) -> Seat {
        Seat::new((round_number.saturating_sub(1) % players) as u8)
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn trump_rule(&self) -> TrumpRule {
        self.rule
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut ScoreBoard {
        &mut self.scores
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_mut(&mut self) -> &mut RoundState {
        &mut self.current_round
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn total_rounds(&self) -> usize {
        Deck::max_hand_size(self.players)
    }

    pub fn is_game_over(&self) -> bool {
        self.finished
    }

    pub fn information_set(&self, seat: Seat) -> Result<InformationSet, InvalidStateError> {
        if seat.index() >= self.players {
            return Err(InvalidStateError::UnknownSeat(seat));
        }
        Ok(InformationSet::from_round(
            &self.current_round,
            seat,
            self.scores.standings(),
        ))
    }

    /// Scores the finished round, then deals the next one unless that was the
    /// last. Returns the round's per-seat scores.
    pub fn finish_round_and_start_next(&mut self) -> Result<Vec<i32>, InvalidStateError> {
        if self.finished {
            return Err(InvalidStateError::MatchOver);
        }
        let round_scores = self
            .current_round
            .round_scores()
            .ok_or(InvalidStateError::RoundInProgress)?;
        self.scores.apply_round(&round_scores);

        if self.round_number >= self.total_rounds() {
            self.finished = true;
            return Ok(round_scores);
        }

        self.round_number += 1;
        let deck = Deck::shuffled(&mut self.rng);
        self.current_round = RoundState::deal(
            &deck,
            self.players,
            self.round_number,
            Self::first_seat_for(self.round_number, self.players),
            self.rule,
        )?;
        Ok(round_scores)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchState;
    use crate::error::InvalidStateError;
    use crate::model::deck::TrumpRule;
    use crate::model::player::Seat;
    use crate::model::round::RoundPhase;

    fn play_out(state: &mut MatchState) {
        let round = state.round_mut();
        while let Some(seat) = round.expected_seat() {
            if round.phase() == RoundPhase::Bidding {
                round.place_bid(seat, 0).unwrap();
            } else {
                let card = round.legal_moves(seat).unwrap()[0];
                round.play_card(seat, card).unwrap();
            }
        }
    }

    #[test]
    fn new_match_starts_at_round_one() {
        let state = MatchState::with_seed(4, 9, TrumpRule::default()).unwrap();
        assert_eq!(state.round_number(), 1);
        assert_eq!(state.total_rounds(), 15);
        assert_eq!(state.round().hand_size(), 1);
        assert_eq!(state.round().first_seat(), Seat::new(0));
        assert_eq!(state.seed(), 9);
    }

    #[test]
    fn rejects_bad_player_counts() {
        assert_eq!(
            MatchState::with_seed(7, 0, TrumpRule::Classic).unwrap_err(),
            InvalidStateError::PlayerCount(7)
        );
    }

    #[test]
    fn unfinished_round_cannot_be_scored() {
        let mut state = MatchState::with_seed(3, 1, TrumpRule::default()).unwrap();
        assert_eq!(
            state.finish_round_and_start_next(),
            Err(InvalidStateError::RoundInProgress)
        );
    }

    #[test]
    fn finishing_rounds_rotates_first_seat_and_grows_hands() {
        let mut state = MatchState::with_seed(3, 5, TrumpRule::default()).unwrap();
        play_out(&mut state);
        let scores = state.finish_round_and_start_next().unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(state.scores().standings(), scores.as_slice());
        assert_eq!(state.round_number(), 2);
        assert_eq!(state.round().hand_size(), 2);
        assert_eq!(state.round().first_seat(), Seat::new(1));
    }

    #[test]
    fn restarting_at_a_round_reproduces_the_deal() {
        let mut played = MatchState::with_seed(5, 77, TrumpRule::Classic).unwrap();
        for _ in 0..3 {
            play_out(&mut played);
            played.finish_round_and_start_next().unwrap();
        }
        let restored = MatchState::with_seed_round(5, 77, 4, TrumpRule::Classic).unwrap();
        assert_eq!(restored.round().hands(), played.round().hands());
        assert_eq!(restored.round().first_seat(), played.round().first_seat());
    }

    #[test]
    fn last_round_ends_the_match() {
        let mut state = MatchState::with_seed_round(6, 3, 10, TrumpRule::default()).unwrap();
        play_out(&mut state);
        state.finish_round_and_start_next().unwrap();
        assert!(state.is_game_over());
        assert_eq!(
            state.finish_round_and_start_next(),
            Err(InvalidStateError::MatchOver)
        );
    }

    #[test]
    fn information_set_carries_scores() {
        let mut state = MatchState::with_seed(3, 2, TrumpRule::default()).unwrap();
        state.scores_mut().set_totals(vec![10, -20, 30]);
        let info = state.information_set(Seat::new(1)).unwrap();
        assert_eq!(info.scores(), &[10, -20, 30]);
        assert_eq!(info.seat(), Seat::new(1));
        assert!(state.information_set(Seat::new(3)).is_err());
    }
}
