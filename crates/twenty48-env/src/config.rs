use std::io::Read;

/// Move selection used by the episode runner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
pub enum PolicyKind {
    /// Uniform choice among the legal moves.
    #[default]
    Random,
    /// Legal move with the highest immediate merge reward.
    Greedy,
}

/// Self-play run configuration, loadable from TOML.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct RunConfig {
    #[serde(default = "defaults::episodes")]
    pub episodes: u32,

    /// Fixed spawn seed. When set, every spawn draw reseeds from it
    /// (per-episode offset applied by the runner).
    #[serde(default)]
    pub random_seed: Option<u64>,

    #[serde(default)]
    pub policy: PolicyKind,

    /// Hard cap on steps per episode.
    #[serde(default = "defaults::max_steps")]
    pub max_steps: u64,

    /// Worker threads for parallel episodes. Omit to run sequentially.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Print the board after every move. Only sensible sequentially.
    #[serde(default)]
    pub render: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: defaults::episodes(),
            random_seed: None,
            policy: PolicyKind::default(),
            max_steps: defaults::max_steps(),
            workers: None,
            render: false,
        }
    }
}

impl RunConfig {
    pub fn from_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn episodes() -> u32 {
        1
    }
    pub fn max_steps() -> u64 {
        1_000_000
    }
}
