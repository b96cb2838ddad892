//! Search tree nodes, stored in an arena and addressed by index.

use wizard_core::model::card::Card;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root is always the first node.
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStats {
    pub visits: u32,
    /// Sum of rewards backed up through this node.
    pub value_sum: f64,
}

impl NodeStats {
    /// Average reward, 0.0 for an unvisited node.
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visits)
        }
    }

    pub fn record(&mut self, value: f64) {
        self.visits += 1;
        self.value_sum += value;
    }
}

/// A decision point of the searching seat. Opponent moves in between are
/// drawn from the rollout policy, so a node stands for the move sequence of
/// the searcher alone.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub stats: NodeStats,
    pub children: Vec<(Card, NodeId)>,
}

impl Node {
    pub fn new() -> Self {
        Self {
            stats: NodeStats::default(),
            children: Vec::new(),
        }
    }

    /// Child reached by `card` or an interchangeable copy of it.
    pub fn child(&self, card: Card) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(action, _)| action.plays_like(card))
            .map(|(_, id)| *id)
    }
}
