use crate::error::InvalidStateError;
use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::{Suit, Trump};
use crate::rules;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    players: usize,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

impl Trick {
    pub fn new(leader: Seat, players: usize) -> Self {
        Self {
            leader,
            players,
            plays: Vec::with_capacity(players),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.players
    }

    /// Suit of the first non-special card played, if any.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.iter().find_map(|play| play.card.suit())
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next(self.players))
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), InvalidStateError> {
        let expected = self.expected_seat();
        if self.is_complete() || expected != seat {
            return Err(InvalidStateError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        self.plays.push(Play { seat, card });
        Ok(())
    }

    /// Seat currently taking the trick; `None` while nothing has been played.
    pub fn winner(&self, trump: Trump) -> Option<Seat> {
        rules::winning_play(&self.plays, trump).map(|play| play.seat)
    }
}
