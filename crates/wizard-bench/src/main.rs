use std::path::PathBuf;

use clap::Parser;

use wizard_bench::config::BenchmarkConfig;
use wizard_bench::logging::init_logging;
use wizard_bench::tournament::{RunSummary, TournamentRunner};
use wizard_core::AppInfo;

/// Tournament harness for Wizard agents.
#[derive(Debug, Parser)]
#[command(
    name = "wizard-bench",
    author,
    version,
    about = "Deterministic Wizard tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,

    /// Print the run summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let players = config.games.players;

    if !cli.json {
        println!("{} {}", AppInfo::name(), AppInfo::version());
        println!(
            "Loaded configuration '{run_id}' with {agent_count} agent{} ({games} games, {players} players)",
            if agent_count == 1 { "" } else { "s" }
        );
    }

    let logging_guard = init_logging(&config)?;
    let runner = TournamentRunner::new(config)?;

    if cli.validate_only {
        if !cli.json {
            println!("Validation-only mode: tournament execution skipped.");
        }
        return Ok(());
    }

    let summary = runner.run()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_table(&summary);
        if let Some(guard) = logging_guard.as_ref() {
            println!("Trace log: {}", guard.trace_path.display());
        }
    }

    Ok(())
}

fn print_table(summary: &RunSummary) {
    println!(
        "Tournament complete for '{}': {} games, {} players",
        summary.run_id, summary.games_played, summary.players
    );
    println!(
        "{:<20} {:>10} {:>10} {:>8} {:>12}",
        "agent", "total", "mean", "wins", "ms/decision"
    );
    for agent in &summary.agents {
        println!(
            "{:<20} {:>10} {:>10.1} {:>8.2} {:>12.2}",
            agent.name, agent.total_score, agent.mean_score, agent.wins, agent.avg_ms_per_decision
        );
    }
}
