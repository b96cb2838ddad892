//! Determinized Monte Carlo tree search for card play.

mod config;
mod node;
mod reward;
mod rollout;
mod search;
mod tree;

pub use config::{InvalidMctsConfig, MctsConfig};
pub use node::{NodeId, NodeStats};
pub use reward::{NormalizedScore, RewardKind, RewardModel, ScoreMargin};
pub use rollout::{
    GreedyRollout, RandomRollout, RolloutKind, RolloutPolicy, advance_environment,
    collapse_specials, rollout,
};
pub use search::{
    MoveStats, SearchError, SearchOptions, SearchReport, SearchStats, determinized_search, search,
};
