use crate::error::InvalidStateError;
use crate::model::card::{Card, DECK_SIZE, SPECIAL_COPIES};
use crate::model::hand::Hand;
use crate::model::player::{Seat, valid_player_count};
use crate::model::rank::Rank;
use crate::model::suit::{Suit, Trump};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How a special card turned up as trump indicator is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrumpRule {
    /// Specials are set aside face up and the next card is turned, until a
    /// suited card appears or the remainder runs out.
    #[default]
    DrawPastSpecials,
    /// A Jester means no trump; a Wizard fixes trump to Red.
    Classic,
}

impl TrumpRule {
    /// Turns indicator cards off the top of `remainder`. Returns the revealed
    /// cards (in order) and the resulting trump.
    pub fn reveal(self, remainder: &[Card]) -> (Vec<Card>, Trump) {
        match self {
            TrumpRule::Classic => match remainder.first().copied() {
                None => (Vec::new(), Trump::NoTrump),
                Some(card @ Card::Jester(_)) => (vec![card], Trump::NoTrump),
                Some(card @ Card::Wizard(_)) => (vec![card], Trump::Suit(Suit::Red)),
                Some(card) => (vec![card], trump_of(card)),
            },
            TrumpRule::DrawPastSpecials => {
                let mut revealed = Vec::new();
                for &card in remainder {
                    revealed.push(card);
                    if let Some(suit) = card.suit() {
                        return (revealed, Trump::Suit(suit));
                    }
                }
                (revealed, Trump::NoTrump)
            }
        }
    }

    /// Trump implied by an already revealed indicator sequence.
    pub fn trump_for(self, revealed: &[Card]) -> Trump {
        match self {
            TrumpRule::Classic => match revealed.first() {
                Some(Card::Wizard(_)) => Trump::Suit(Suit::Red),
                Some(card) => trump_of(*card),
                None => Trump::NoTrump,
            },
            TrumpRule::DrawPastSpecials => revealed
                .iter()
                .find_map(|card| card.suit())
                .map_or(Trump::NoTrump, Trump::Suit),
        }
    }
}

fn trump_of(card: Card) -> Trump {
    card.suit().map_or(Trump::NoTrump, Trump::Suit)
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

/// Result of dealing one round: hands in seat order, the face-up indicator
/// card(s), and the face-down rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: Vec<Hand>,
    pub indicators: Vec<Card>,
    pub trump: Trump,
    pub remainder: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for rank in Rank::ORDERED {
                cards.push(Card::new(rank, suit));
            }
        }
        for copy in 0..SPECIAL_COPIES {
            cards.push(Card::jester(copy));
        }
        for copy in 0..SPECIAL_COPIES {
            cards.push(Card::wizard(copy));
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Largest hand size playable with `players` at the table.
    pub const fn max_hand_size(players: usize) -> usize {
        if players == 0 { 0 } else { DECK_SIZE / players }
    }

    /// Deals `hand_size` cards to each player one at a time, starting with
    /// `first` and going clockwise, then reveals trump from the top of the rest.
    pub fn deal(
        &self,
        players: usize,
        hand_size: usize,
        first: Seat,
        rule: TrumpRule,
    ) -> Result<Deal, InvalidStateError> {
        if !valid_player_count(players) {
            return Err(InvalidStateError::PlayerCount(players));
        }
        if hand_size == 0 || hand_size > Self::max_hand_size(players) {
            return Err(InvalidStateError::HandSize { hand_size, players });
        }
        if first.index() >= players {
            return Err(InvalidStateError::UnknownSeat(first));
        }

        let mut hands = vec![Hand::new(); players];
        let dealt = players * hand_size;
        for (offset, card) in self.cards[..dealt].iter().enumerate() {
            let seat = first.offset(offset, players);
            hands[seat.index()].add(*card);
        }

        let (indicators, trump) = rule.reveal(&self.cards[dealt..]);
        let remainder = self.cards[dealt + indicators.len()..].to_vec();

        Ok(Deal {
            hands,
            indicators,
            trump,
            remainder,
        })
    }
}
