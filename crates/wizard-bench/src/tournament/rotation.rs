/// Seatings that move every agent through every seat: game `g` seats agent
/// `(seat + g) % players` at `seat`.
pub struct SeatRotations {
    players: usize,
}

impl SeatRotations {
    pub fn new(players: usize) -> Self {
        Self {
            players: players.max(1),
        }
    }

    /// Agent index for each seat in game `game_index`.
    pub fn seating(&self, game_index: usize) -> Vec<usize> {
        let shift = game_index % self.players;
        (0..self.players)
            .map(|seat| (seat + shift) % self.players)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_game_is_identity() {
        let rotations = SeatRotations::new(4);
        assert_eq!(rotations.seating(0), vec![0, 1, 2, 3]);
        assert_eq!(rotations.seating(1), vec![1, 2, 3, 0]);
        assert_eq!(rotations.seating(4), rotations.seating(0));
    }

    #[test]
    fn every_agent_sits_everywhere_once_per_cycle() {
        let rotations = SeatRotations::new(5);
        for seat in 0..5 {
            let mut agents: Vec<usize> = (0..5)
                .map(|game| rotations.seating(game)[seat])
                .collect();
            agents.sort();
            assert_eq!(agents, vec![0, 1, 2, 3, 4]);
        }
    }
}
