//! Arena-allocated search tree.

use crate::mcts::node::{Node, NodeId};
use wizard_core::model::card::Card;

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    /// # Panics
    /// Panics if `id` did not come from this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if `id` did not come from this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Appends a child of `parent` reached by `card`.
    pub fn add_child(&mut self, parent: NodeId, card: Card) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new());
        self.get_mut(parent).children.push((card, id));
        id
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
