use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Blue = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Red, Suit::Yellow, Suit::Green, Suit::Blue];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Red),
            1 => Some(Suit::Yellow),
            2 => Some(Suit::Green),
            3 => Some(Suit::Blue),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Red => "R",
            Suit::Yellow => "Y",
            Suit::Green => "G",
            Suit::Blue => "B",
        };
        f.write_str(symbol)
    }
}

/// Trump for a round: one suit, or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trump {
    NoTrump,
    Suit(Suit),
}

impl Trump {
    pub const fn suit(self) -> Option<Suit> {
        match self {
            Trump::NoTrump => None,
            Trump::Suit(suit) => Some(suit),
        }
    }

    pub fn is_trump(self, suit: Suit) -> bool {
        self.suit() == Some(suit)
    }
}

impl fmt::Display for Trump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trump::NoTrump => f.write_str("no trump"),
            Trump::Suit(suit) => write!(f, "{suit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Suit, Trump};

    #[test]
    fn display_returns_ascii_symbols() {
        assert_eq!(Suit::Red.to_string(), "R");
        assert_eq!(Suit::Blue.to_string(), "B");
    }

    #[test]
    fn from_index_maps_valid_values() {
        assert_eq!(Suit::from_index(2), Some(Suit::Green));
        assert_eq!(Suit::from_index(4), None);
    }

    #[test]
    fn no_trump_matches_nothing() {
        for suit in Suit::ALL {
            assert!(!Trump::NoTrump.is_trump(suit));
        }
        assert!(Trump::Suit(Suit::Yellow).is_trump(Suit::Yellow));
        assert!(!Trump::Suit(Suit::Yellow).is_trump(Suit::Red));
    }
}
