//! SquadSim - Party Battle Autobattler
//!
//! A headless autobattler where two AI-controlled parties fight each
//! other, every combatant driven by a utility-scoring action selector.

use squadsim::cli;
use squadsim::headless::{run_headless_battle, HeadlessBattleConfig};

fn main() {
    let args = cli::parse_args();

    let mut config = match HeadlessBattleConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid battle configuration: {}", e);
            std::process::exit(1);
        }
    };

    // CLI flags override the config file
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    if let Err(e) = run_headless_battle(config) {
        eprintln!("Battle failed: {}", e);
        std::process::exit(1);
    }
}
