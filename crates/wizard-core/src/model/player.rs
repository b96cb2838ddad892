use core::fmt;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 6;

/// Seat index around the table, `0..players`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(u8);

impl Seat {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn from_index(index: usize, players: usize) -> Option<Self> {
        (index < players && index < MAX_PLAYERS).then(|| Self(index as u8))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn next(self, players: usize) -> Seat {
        Seat(((self.0 as usize + 1) % players) as u8)
    }

    /// Seat `offset` places clockwise from `self`.
    pub const fn offset(self, offset: usize, players: usize) -> Seat {
        Seat(((self.0 as usize + offset) % players) as u8)
    }

    /// All seats of a table in clockwise order starting at seat 0.
    pub fn all(players: usize) -> impl Iterator<Item = Seat> {
        (0..players.min(MAX_PLAYERS)).map(|index| Seat(index as u8))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

pub const fn valid_player_count(players: usize) -> bool {
    players >= MIN_PLAYERS && players <= MAX_PLAYERS
}
