use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::{PolicyKind, RunConfig};
use crate::session::Env;
use twenty48_engine::Direction;

/// Outcome of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    pub episode: u32,
    pub steps: u64,
    pub score: u64,
    pub highest_tile: u32,
}

/// Aggregate over a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub episodes: u32,
    pub total_steps: u64,
    pub mean_score: f64,
    pub best_score: u64,
    pub best_tile: u32,
}

/// Drive one session to terminal (or the step cap) under the
/// configured policy.
pub fn run_episode(episode: u32, config: &RunConfig) -> EpisodeResult {
    let mut env = match config.random_seed {
        // Offset the seed per episode; with reseed-before-draw spawns,
        // an unoffset seed would replay the identical episode N times.
        Some(seed) => Env::with_seed(seed.wrapping_add(u64::from(episode))),
        None => Env::new(),
    };
    let mut rng = StdRng::from_entropy();
    let mut steps = 0u64;
    while steps < config.max_steps {
        let Some(direction) = select_move(config.policy, &env, &mut rng) else {
            break;
        };
        let outcome = env.step(direction);
        steps += 1;
        if config.render {
            env.render_board();
        }
        if outcome.done {
            break;
        }
    }
    let result = EpisodeResult {
        episode,
        steps,
        score: env.score(),
        highest_tile: env.board().highest_tile(),
    };
    debug!(
        "episode {} finished: {} steps, score {}, highest tile {}",
        result.episode, result.steps, result.score, result.highest_tile
    );
    result
}

fn select_move(policy: PolicyKind, env: &Env, rng: &mut StdRng) -> Option<Direction> {
    match policy {
        PolicyKind::Random => env
            .get_valid_actions()
            .choose(rng)
            .map(|action| action.direction),
        PolicyKind::Greedy => env
            .get_valid_actions_by_reward()
            .first()
            .map(|action| action.direction),
    }
}

/// Run the configured number of episodes, in parallel when `workers`
/// is set, and log a run summary.
pub fn run_all(config: &RunConfig) -> Result<RunSummary> {
    let bar = ProgressBar::new(u64::from(config.episodes));
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} episodes ({elapsed})")
            .context("bad progress template")?,
    );

    let results: Vec<EpisodeResult> = match config.workers {
        Some(workers) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .context("failed to build worker pool")?;
            pool.install(|| {
                (0..config.episodes)
                    .into_par_iter()
                    .map(|episode| {
                        let result = run_episode(episode, config);
                        bar.inc(1);
                        result
                    })
                    .collect()
            })
        }
        None => (0..config.episodes)
            .map(|episode| {
                let result = run_episode(episode, config);
                bar.inc(1);
                result
            })
            .collect(),
    };
    bar.finish_and_clear();

    let summary = summarize(&results);
    info!(
        "played {} episodes ({} steps): mean score {:.1}, best score {}, best tile {}",
        summary.episodes,
        summary.total_steps,
        summary.mean_score,
        summary.best_score,
        summary.best_tile
    );
    Ok(summary)
}

fn summarize(results: &[EpisodeResult]) -> RunSummary {
    let episodes = results.len() as u32;
    let total_steps = results.iter().map(|r| r.steps).sum();
    let total_score: u64 = results.iter().map(|r| r.score).sum();
    RunSummary {
        episodes,
        total_steps,
        mean_score: if episodes == 0 {
            0.0
        } else {
            total_score as f64 / f64::from(episodes)
        },
        best_score: results.iter().map(|r| r.score).max().unwrap_or(0),
        best_tile: results.iter().map(|r| r.highest_tile).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> RunConfig {
        RunConfig {
            episodes: 2,
            random_seed: Some(7),
            policy: PolicyKind::Greedy,
            max_steps: 200,
            workers: None,
            render: false,
        }
    }

    #[test]
    fn episodes_terminate_and_accumulate_score() {
        let config = quiet_config();
        let result = run_episode(0, &config);
        assert!(result.steps > 0 && result.steps <= config.max_steps);
        assert!(result.score > 0);
        assert!(result.highest_tile >= 4);
    }

    #[test]
    fn step_cap_truncates_episodes() {
        let config = RunConfig {
            max_steps: 5,
            ..quiet_config()
        };
        let result = run_episode(1, &config);
        assert!(result.steps <= 5);
    }

    #[test]
    fn run_all_aggregates_results() {
        let summary = run_all(&quiet_config()).unwrap();
        assert_eq!(summary.episodes, 2);
        assert!(summary.total_steps > 0);
        assert!(summary.best_score as f64 >= summary.mean_score);
    }

    #[test]
    fn random_policy_plays_legal_moves_only() {
        let config = RunConfig {
            policy: PolicyKind::Random,
            ..quiet_config()
        };
        let result = run_episode(3, &config);
        assert!(result.steps > 0);
    }
}
