use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Number of Wizards (and of Jesters) in the deck.
pub const SPECIAL_COPIES: u8 = 4;

/// Total cards in a Wizard deck: 52 suited plus the specials.
pub const DECK_SIZE: usize = 52 + 2 * SPECIAL_COPIES as usize;

const FIRST_JESTER_ID: u8 = 52;
const FIRST_WIZARD_ID: u8 = FIRST_JESTER_ID + SPECIAL_COPIES;

/// A single card instance. Specials carry a copy index so that every card in the
/// deck is distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CardRepr", into = "CardRepr")]
pub enum Card {
    Standard { rank: Rank, suit: Suit },
    Jester(u8),
    Wizard(u8),
}

/// Wire form of `Card`; specials are checked for a valid copy index on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Card")]
enum CardRepr {
    Standard { rank: Rank, suit: Suit },
    Jester(u8),
    Wizard(u8),
}

impl TryFrom<CardRepr> for Card {
    type Error = String;

    fn try_from(repr: CardRepr) -> Result<Self, Self::Error> {
        let check = |kind: &str, copy: u8| {
            if copy < SPECIAL_COPIES {
                Ok(copy)
            } else {
                Err(format!("{kind} copy {copy} outside 0..{SPECIAL_COPIES}"))
            }
        };
        match repr {
            CardRepr::Standard { rank, suit } => Ok(Card::Standard { rank, suit }),
            CardRepr::Jester(copy) => check("jester", copy).map(Card::Jester),
            CardRepr::Wizard(copy) => check("wizard", copy).map(Card::Wizard),
        }
    }
}

impl From<Card> for CardRepr {
    fn from(card: Card) -> Self {
        match card {
            Card::Standard { rank, suit } => CardRepr::Standard { rank, suit },
            Card::Jester(copy) => CardRepr::Jester(copy),
            Card::Wizard(copy) => CardRepr::Wizard(copy),
        }
    }
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Standard { rank, suit }
    }

    pub const fn wizard(copy: u8) -> Self {
        Card::Wizard(copy % SPECIAL_COPIES)
    }

    pub const fn jester(copy: u8) -> Self {
        Card::Jester(copy % SPECIAL_COPIES)
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Standard { suit, .. } => Some(suit),
            Card::Jester(_) | Card::Wizard(_) => None,
        }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Standard { rank, .. } => Some(rank),
            Card::Jester(_) | Card::Wizard(_) => None,
        }
    }

    pub const fn is_wizard(self) -> bool {
        matches!(self, Card::Wizard(_))
    }

    pub const fn is_jester(self) -> bool {
        matches!(self, Card::Jester(_))
    }

    pub const fn is_special(self) -> bool {
        !matches!(self, Card::Standard { .. })
    }

    pub fn is_suit(self, suit: Suit) -> bool {
        self.suit() == Some(suit)
    }

    /// Dense identifier in `0..DECK_SIZE`: suited cards by suit then rank, then
    /// Jesters, then Wizards.
    pub const fn id(self) -> u8 {
        match self {
            Card::Standard { rank, suit } => suit as u8 * 13 + (rank.value() - 1),
            Card::Jester(copy) => FIRST_JESTER_ID + copy,
            Card::Wizard(copy) => FIRST_WIZARD_ID + copy,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id < FIRST_JESTER_ID {
            let suit = match Suit::from_index((id / 13) as usize) {
                Some(suit) => suit,
                None => return None,
            };
            let rank = match Rank::from_value(id % 13 + 1) {
                Some(rank) => rank,
                None => return None,
            };
            Some(Card::Standard { rank, suit })
        } else if id < FIRST_WIZARD_ID {
            Some(Card::Jester(id - FIRST_JESTER_ID))
        } else if (id as usize) < DECK_SIZE {
            Some(Card::Wizard(id - FIRST_WIZARD_ID))
        } else {
            None
        }
    }

    /// Fixed presentation and tie-break order. Not a measure of strength.
    pub const fn sort_key(self) -> u8 {
        self.id()
    }

    /// True when playing `self` or `other` is indistinguishable for the rules,
    /// i.e. they are the same card or two copies of the same special.
    pub const fn plays_like(self, other: Card) -> bool {
        match (self, other) {
            (Card::Wizard(_), Card::Wizard(_)) | (Card::Jester(_), Card::Jester(_)) => true,
            _ => self.id() == other.id(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Standard { rank, suit } => write!(f, "{rank}{suit}"),
            Card::Jester(copy) => write!(f, "Jes{}", copy + 1),
            Card::Wizard(copy) => write!(f, "Wiz{}", copy + 1),
        }
    }
}
