use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;
use wizard_bot::MctsConfig;
use wizard_core::model::deck::TrumpRule;
use wizard_core::model::player::{MAX_PLAYERS, MIN_PLAYERS};

const DEFAULT_LOG_FILE: &str = "bench/out/{run_id}/trace.jsonl";
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GamesConfig,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.logging.normalize();
        validate_agents(&mut self.agents, self.games.players)?;
        Ok(())
    }

    /// Trace file with `{run_id}` substituted.
    pub fn resolved_log_file(&self) -> PathBuf {
        let template = self.logging.file.as_deref().unwrap_or(DEFAULT_LOG_FILE);
        resolve_template(&self.run_id, template)
    }
}

/// Which matches to play.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub count: usize,
    pub seed: Option<u64>,
    pub players: usize,
    #[serde(default)]
    pub trump_rule: TrumpRule,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::invalid(
                "games.count",
                "number of games must be greater than zero",
            ));
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ValidationError::invalid(
                "games.players",
                format!("player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            ));
        }

        Ok(())
    }
}

/// Definition of a tournament participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    Heuristic,
    Mcts,
}

impl AgentConfig {
    /// Search settings for an `mcts` agent: defaults overlaid with `params`.
    pub fn mcts_config(&self) -> Result<MctsConfig, ValidationError> {
        let field = || format!("agents[{}].params", self.name);
        let config: MctsConfig = if self.params.is_null() {
            MctsConfig::default()
        } else {
            serde_yaml::from_value(self.params.clone())
                .map_err(|err| ValidationError::invalid(field(), err.to_string()))?
        };
        config.validate().map_err(|err| {
            ValidationError::invalid(format!("{}.{}", field(), err.field), err.message)
        })?;
        Ok(config)
    }

    /// Optional fixed `seed` for a `random` agent.
    pub fn random_seed(&self) -> Result<Option<u64>, ValidationError> {
        let Some(mapping) = self.params.as_mapping() else {
            return Ok(None);
        };
        let seed = mapping
            .iter()
            .find_map(|(key, value)| (key.as_str() == Some("seed")).then_some(value));
        match seed {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                ValidationError::invalid(
                    format!("agents[{}].params.seed", self.name),
                    "seed must be a non-negative integer",
                )
            }),
        }
    }

    fn validate_params(&self) -> Result<(), ValidationError> {
        match self.kind {
            AgentKind::Mcts => self.mcts_config().map(|_| ()),
            AgentKind::Random => self.random_seed().map(|_| ()),
            AgentKind::Heuristic => Ok(()),
        }
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Trace output path; may contain `{run_id}`.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig], players: usize) -> Result<(), ValidationError> {
    if agents.len() != players {
        return Err(ValidationError::invalid(
            "agents",
            format!("{players} players need {players} agents, found {}", agents.len()),
        ));
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::invalid("agents.name", "agent name must not be empty"));
        }

        if !agent
            .name
            .chars()
            .all(|c| RUN_ID_ALLOWED.contains(c) || c == '/')
        {
            return Err(ValidationError::invalid(
                format!("agents[{}].name", agent.name),
                "agent name contains invalid characters",
            ));
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::invalid(
                "agents",
                format!("agent name '{}' defined more than once", agent.name),
            ));
        }

        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
        agent.validate_params()?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
