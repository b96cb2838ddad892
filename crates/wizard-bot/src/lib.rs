pub mod agent;
pub mod driver;
pub mod mcts;

pub use agent::{Agent, AgentError, HeuristicAgent, MctsAgent, RandomAgent};
pub use driver::{AgentContractViolation, DriverError, GameDriver, GameRecord, RoundRecord};
pub use mcts::{InvalidMctsConfig, MctsConfig, MoveStats, RewardKind, RolloutKind, SearchStats};
