//! Search parameters for the determinized MCTS agent.

use crate::mcts::reward::RewardKind;
use crate::mcts::rollout::RolloutKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use wizard_core::belief::DEFAULT_SAMPLER_ATTEMPTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MctsConfig {
    /// Iterations per sampled world.
    pub iterations: u32,
    /// `C` in `avg + C * sqrt(ln N / n)`.
    pub exploration_constant: f64,
    /// Worlds sampled per decision; statistics are summed across them.
    pub num_determinizations: usize,
    pub rollout: RolloutKind,
    pub reward: RewardKind,
    /// Fixed seed for the agent's RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Wall-clock cap for one decision across all sampled worlds.
    pub time_limit_ms: Option<u64>,
    /// Rejection-sampling attempts before the determinizer falls back to repair.
    pub sampler_attempts: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_constant: 1.41,
            num_determinizations: 5,
            rollout: RolloutKind::default(),
            reward: RewardKind::default(),
            rng_seed: None,
            time_limit_ms: None,
            sampler_attempts: DEFAULT_SAMPLER_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct InvalidMctsConfig {
    pub field: &'static str,
    pub message: String,
}

impl MctsConfig {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Defaults overridden by any `WIZ_MCTS_*` variables that parse.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let iterations = read("WIZ_MCTS_ITERATIONS")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.iterations);

        let exploration_constant = read("WIZ_MCTS_EXPLORATION")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(defaults.exploration_constant);

        let num_determinizations = read("WIZ_MCTS_DETERMINIZATIONS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.num_determinizations);

        let rollout = read("WIZ_MCTS_ROLLOUT")
            .and_then(|raw| RolloutKind::parse(&raw))
            .unwrap_or(defaults.rollout);

        let reward = read("WIZ_MCTS_REWARD")
            .and_then(|raw| RewardKind::parse(&raw))
            .unwrap_or(defaults.reward);

        let rng_seed = read("WIZ_MCTS_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());

        let time_limit_ms = read("WIZ_MCTS_TIME_LIMIT_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value > 0);

        let sampler_attempts = read("WIZ_MCTS_SAMPLER_ATTEMPTS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.sampler_attempts);

        Self {
            iterations,
            exploration_constant,
            num_determinizations,
            rollout,
            reward,
            rng_seed,
            time_limit_ms,
            sampler_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidMctsConfig> {
        let invalid = |field: &'static str, message: &str| InvalidMctsConfig {
            field,
            message: message.to_string(),
        };
        if self.iterations == 0 {
            return Err(invalid("iterations", "must be greater than zero"));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(invalid(
                "exploration_constant",
                "must be a finite, non-negative number",
            ));
        }
        if self.num_determinizations == 0 {
            return Err(invalid("num_determinizations", "must be greater than zero"));
        }
        if self.sampler_attempts == 0 {
            return Err(invalid("sampler_attempts", "must be greater than zero"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(invalid("time_limit_ms", "must be greater than zero when set"));
        }
        Ok(())
    }
}
