use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use thiserror::Error;

/// An illegal query or mutation against the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("unsupported player count {0} (Wizard is played by 3 to 6 players)")]
    PlayerCount(usize),
    #[error("hand size {hand_size} cannot be dealt to {players} players")]
    HandSize { hand_size: usize, players: usize },
    #[error("round is not in the bidding phase")]
    NotBidding,
    #[error("round is not in the playing phase")]
    NotPlaying,
    #[error("expected {expected} to act but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("{0} is not seated at this table")]
    UnknownSeat(Seat),
    #[error("{0} has already bid this round")]
    AlreadyBid(Seat),
    #[error("bid {bid} outside 0..={max}")]
    BidOutOfRange { bid: u8, max: u8 },
    #[error("{0} has no cards left")]
    EmptyHand(Seat),
    #[error("{seat} does not hold {card}")]
    CardNotInHand { seat: Seat, card: Card },
    #[error("{seat} must follow {suit}")]
    MustFollowSuit { seat: Seat, suit: Suit },
    #[error("{0} appears in more than one place")]
    DuplicateCard(Card),
    #[error("{seat} holds {actual} cards but {expected} are required")]
    HandCount {
        seat: Seat,
        expected: usize,
        actual: usize,
    },
    #[error("the round still has cards to play")]
    RoundInProgress,
    #[error("the match is over")]
    MatchOver,
}

/// The determinizer could not build a world consistent with the information set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("{unseen} unseen cards cannot fill {required} hidden slots")]
    CardCount { unseen: usize, required: usize },
    #[error("{0} is known in more than one place")]
    DuplicateKnownCard(Card),
    #[error("no world satisfies the void constraints after {attempts} attempts")]
    Unsatisfiable { attempts: usize },
    #[error("sampled world rejected: {0}")]
    World(#[from] InvalidStateError),
}
