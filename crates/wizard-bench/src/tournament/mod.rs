mod rotation;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use wizard_bot::agent::{Agent, AgentError as DecisionError};
use wizard_bot::{
    DriverError, GameDriver, HeuristicAgent, InvalidMctsConfig, MctsAgent, MctsConfig, RandomAgent,
};
use wizard_core::belief::InformationSet;
use wizard_core::error::InvalidStateError;
use wizard_core::game::match_state::MatchState;
use wizard_core::model::card::Card;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ValidationError};

use rotation::SeatRotations;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    agents: Vec<AgentBlueprint>,
    rotations: SeatRotations,
}

/// Summary details returned after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub games_played: usize,
    pub players: usize,
    pub agents: Vec<AgentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub kind: AgentKind,
    pub total_score: i64,
    pub mean_score: f64,
    /// Games won, ties shared evenly.
    pub wins: f64,
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != config.games.players {
            return Err(RunnerError::SeatCount {
                expected: config.games.players,
                found: agents.len(),
            });
        }

        Ok(Self {
            rotations: SeatRotations::new(config.games.players),
            config,
            agents,
        })
    }

    /// Plays every configured game, rotating seats between games.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        let players = self.config.games.players;
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut tallies: Vec<Tally> = self.agents.iter().map(|_| Tally::default()).collect();
        let metrics: Vec<Rc<RefCell<DecisionMetrics>>> = self
            .agents
            .iter()
            .map(|_| Rc::new(RefCell::new(DecisionMetrics::default())))
            .collect();

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let seating = self.rotations.seating(game_index);
            let seated = seating
                .iter()
                .map(|&agent| -> Result<Box<dyn Agent>, AgentError> {
                    Ok(Box::new(TimedAgent {
                        inner: self.agents[agent].spawn(game_seed, agent as u64)?,
                        metrics: Rc::clone(&metrics[agent]),
                    }))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let state = MatchState::with_seed(players, game_seed, self.config.games.trump_rule)?;
            let record = GameDriver::new(seated).play_game(state)?;

            let share = 1.0 / record.winners.len().max(1) as f64;
            for (seat, &agent) in seating.iter().enumerate() {
                tallies[agent].total_score += i64::from(record.totals[seat]);
                tallies[agent].games += 1;
            }
            for winner in &record.winners {
                tallies[seating[winner.index()]].wins += share;
            }

            if tracing::enabled!(Level::INFO) {
                let seats = seating
                    .iter()
                    .map(|&agent| self.agents[agent].name.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                event!(
                    target: "wizard_bench::game",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    game_seed,
                    seats = %seats,
                    totals = ?record.totals,
                    winners = ?record.winners,
                    rounds = record.rounds.len(),
                );
            }
        }

        let agents = self
            .agents
            .iter()
            .zip(tallies)
            .zip(&metrics)
            .map(|((blueprint, tally), metrics)| {
                let decisions = metrics.borrow().summary();
                AgentSummary {
                    name: blueprint.name.clone(),
                    kind: blueprint.kind(),
                    total_score: tally.total_score,
                    mean_score: if tally.games == 0 {
                        0.0
                    } else {
                        tally.total_score as f64 / tally.games as f64
                    },
                    wins: tally.wins,
                    decisions: decisions.decisions,
                    avg_ms_per_decision: decisions.avg_ms_per_decision,
                }
            })
            .collect();

        Ok(RunSummary {
            run_id: self.config.run_id.clone(),
            games_played: self.config.games.count,
            players,
            agents,
        })
    }
}

#[derive(Default)]
struct Tally {
    games: usize,
    total_score: i64,
    wins: f64,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn summary(&self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };
        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
        }
    }
}

struct DecisionSummary {
    decisions: u32,
    avg_ms_per_decision: f64,
}

/// Times each decision of the wrapped agent.
struct TimedAgent {
    inner: Box<dyn Agent>,
    metrics: Rc<RefCell<DecisionMetrics>>,
}

impl Agent for TimedAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, DecisionError> {
        let start = Instant::now();
        let bid = self.inner.choose_bid(info);
        self.metrics.borrow_mut().record(start.elapsed());
        bid
    }

    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, DecisionError> {
        let start = Instant::now();
        let card = self.inner.choose_play(info);
        self.metrics.borrow_mut().record(start.elapsed());
        card
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("game execution failed: {0}")]
    Driver(#[from] DriverError),
    #[error("could not set up match: {0}")]
    Setup(#[from] InvalidStateError),
    #[error("configuration requires {expected} agents but found {found}")]
    SeatCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("agent '{name}' rejected its search settings: {source}")]
    InvalidSearch {
        name: String,
        #[source]
        source: InvalidMctsConfig,
    },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Random { seed: Option<u64> },
    Heuristic,
    Mcts(MctsConfig),
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let invalid = |source| AgentError::InvalidParams {
            name: config.name.clone(),
            source,
        };
        let implementation = match config.kind {
            AgentKind::Random => AgentImplementation::Random {
                seed: config.random_seed().map_err(invalid)?,
            },
            AgentKind::Heuristic => AgentImplementation::Heuristic,
            AgentKind::Mcts => AgentImplementation::Mcts(config.mcts_config().map_err(invalid)?),
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn kind(&self) -> AgentKind {
        match self.implementation {
            AgentImplementation::Random { .. } => AgentKind::Random,
            AgentImplementation::Heuristic => AgentKind::Heuristic,
            AgentImplementation::Mcts(_) => AgentKind::Mcts,
        }
    }

    /// Fresh agent for one game. Unseeded agents derive their seed from the
    /// game seed so a run is reproducible from `games.seed` alone.
    fn spawn(&self, game_seed: u64, salt: u64) -> Result<Box<dyn Agent>, AgentError> {
        let derived = game_seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let agent: Box<dyn Agent> = match &self.implementation {
            AgentImplementation::Random { seed } => Box::new(RandomAgent::new(
                self.name.clone(),
                seed.map_or(derived, |seed| seed ^ game_seed),
            )),
            AgentImplementation::Heuristic => Box::new(HeuristicAgent::new(self.name.clone())),
            AgentImplementation::Mcts(config) => {
                let mut config = config.clone();
                config.rng_seed = Some(config.rng_seed.map_or(derived, |seed| seed ^ game_seed));
                let agent = MctsAgent::new(self.name.clone(), config).map_err(|source| {
                    AgentError::InvalidSearch {
                        name: self.name.clone(),
                        source,
                    }
                })?;
                Box::new(agent)
            }
        };
        Ok(agent)
    }
}
