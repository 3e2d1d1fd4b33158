use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use gauntlet::config::{CliArgs, Config};
use gauntlet::dispatch_game;
use gauntlet::game::GameState;
use gauntlet::{driver, report, store};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = Config::load(&args)?;

    println!("gauntlet v{}", env!("CARGO_PKG_VERSION"));
    println!("Game: {}", config.game);
    println!("Agents: {}", config.agents.len());
    println!("Mode: {:?}", config.mode);
    println!("Seed: {}", config.seed);

    let game = config.game.clone();
    dispatch_game!(game.as_str(), run::<G>(&config))
}

fn run<G: GameState>(config: &Config) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let tournament = driver::run::<G>(config, &mut rng)?;

    report::print_final_summary(&tournament);

    if let Some(path) = &config.report {
        let results = report::build_report(&tournament);
        std::fs::write(path, serde_json::to_string_pretty(&results)?)?;
        println!("\nReport saved to: {}", path.display());
    }
    if let Some(path) = &config.save {
        store::save_tournament(&tournament, path)?;
        println!("Tournament state saved to: {}", path.display());
    }
    Ok(())
}
