use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use twenty48_env::config::{PolicyKind, RunConfig};
use twenty48_env::runner;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Play 2048 self-play episodes with simple policies"
)]
struct Cli {
    /// Optional TOML run configuration; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of episodes to play
    #[arg(long, value_name = "N")]
    episodes: Option<u32>,

    /// Fixed spawn seed (reseeded before every draw)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Move selection policy
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Cap on steps per episode
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Worker threads for parallel episodes
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Print the board after every move
    #[arg(long)]
    render: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_toml(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(episodes) = cli.episodes {
        config.episodes = episodes;
    }
    if let Some(seed) = cli.seed {
        config.random_seed = Some(seed);
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(workers) = cli.workers {
        config.workers = Some(workers);
    }
    if cli.render {
        config.render = true;
    }

    runner::run_all(&config)?;
    Ok(())
}
