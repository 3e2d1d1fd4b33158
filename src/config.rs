use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::gameplan::Mode;

/// Round-robin tournaments between game-playing agents
#[derive(Parser, Debug)]
#[command(name = "gauntlet", version, about)]
pub struct CliArgs {
    /// Path to TOML config file
    #[arg(short, long, default_value = "configs/default.toml")]
    pub config: PathBuf,

    // --- Overrides ---
    #[arg(long)]
    pub game: Option<String>,

    /// Tournament mode: "single" or "double"
    #[arg(long)]
    pub mode: Option<String>,

    /// Episodes played per scheduled match
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Trim a double round-robin down to this many matches
    #[arg(long)]
    pub match_limit: Option<usize>,

    /// Random plies applied to every pre-generated start state
    #[arg(long)]
    pub random_start_plies: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the JSON results report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write the full tournament save blob here
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// One contestant in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    /// Policy kind understood by the chosen game ("random", "optimal", ...)
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_game")]
    pub game: String,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    /// Left unset, the runner warns and plays one episode per match
    #[serde(default)]
    pub episodes_per_match: Option<usize>,
    #[serde(default)]
    pub match_limit: Option<usize>,
    #[serde(default)]
    pub random_start_plies: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub save: Option<PathBuf>,
}

fn default_game() -> String {
    "nim".to_string()
}

fn default_mode() -> Mode {
    Mode::Double
}

fn default_seed() -> u64 {
    42
}

fn default_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec {
            name: "rando-1".to_string(),
            kind: "random".to_string(),
        },
        AgentSpec {
            name: "rando-2".to_string(),
            kind: "random".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: default_game(),
            mode: default_mode(),
            episodes_per_match: None,
            match_limit: None,
            random_start_plies: 0,
            seed: default_seed(),
            agents: default_agents(),
            report: None,
            save: None,
        }
    }
}

impl Config {
    /// Load the TOML config and apply CLI overrides.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let contents = fs::read_to_string(&args.config)
            .with_context(|| format!("Failed to read config {}", args.config.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", args.config.display()))?;

        if let Some(game) = &args.game {
            config.game = game.clone();
        }
        if let Some(mode) = &args.mode {
            config.mode = parse_mode(mode)?;
        }
        if let Some(episodes) = args.episodes {
            config.episodes_per_match = Some(episodes);
        }
        if let Some(limit) = args.match_limit {
            config.match_limit = Some(limit);
        }
        if let Some(plies) = args.random_start_plies {
            config.random_start_plies = plies;
        }
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        if let Some(report) = &args.report {
            config.report = Some(report.clone());
        }
        if let Some(save) = &args.save {
            config.save = Some(save.clone());
        }

        if config.agents.is_empty() {
            bail!("config declares no agents");
        }
        Ok(config)
    }
}

fn parse_mode(mode: &str) -> Result<Mode> {
    match mode {
        "single" => Ok(Mode::Single),
        "double" => Ok(Mode::Double),
        other => bail!("Invalid mode '{other}': expected 'single' or 'double'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.game, "nim");
        assert_eq!(config.mode, Mode::Double);
        assert_eq!(config.episodes_per_match, None);
        assert_eq!(config.seed, 42);
        assert_eq!(config.agents.len(), 2);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.game, "nim");
        assert_eq!(config.random_start_plies, 0);
    }

    #[test]
    fn test_parse_full_toml() {
        let config: Config = toml::from_str(
            r#"
game = "climb"
mode = "single"
episodes_per_match = 5
match_limit = 4
random_start_plies = 2
seed = 7

[[agents]]
name = "a"
kind = "random"

[[agents]]
name = "b"
kind = "exact"
"#,
        )
        .unwrap();
        assert_eq!(config.game, "climb");
        assert_eq!(config.mode, Mode::Single);
        assert_eq!(config.episodes_per_match, Some(5));
        assert_eq!(config.match_limit, Some(4));
        assert_eq!(config.random_start_plies, 2);
        assert_eq!(config.agents[1].kind, "exact");
    }

    #[test]
    fn test_parse_mode_strings() {
        assert_eq!(parse_mode("single").unwrap(), Mode::Single);
        assert_eq!(parse_mode("double").unwrap(), Mode::Double);
        assert!(parse_mode("triple").is_err());
    }
}
