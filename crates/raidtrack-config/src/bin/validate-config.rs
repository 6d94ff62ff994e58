//! Config validation CLI tool
//!
//! Validates a raidtrack configuration file and prints the roster it defines.

use raidtrack_util::{DayName, default_config_path};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a raidtrack configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match raidtrack_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", raidtrack_config::CURRENT_CONFIG_VERSION);
            println!("  Catalog: {}", config.service.catalog_path.display());
            println!("  Progress: {}", config.service.progress_path.display());
            println!("  Characters: {}", config.roster.len());

            for character in &config.roster {
                println!();
                println!("  {} ({})", character.label(), character.id);
                let mut any = false;
                for day in DayName::ALL {
                    let dungeons = character.schedule.dungeons_for(day);
                    if dungeons.is_empty() {
                        continue;
                    }
                    any = true;
                    let ids: Vec<&str> = dungeons.iter().map(|d| d.as_str()).collect();
                    println!("    {:<9} {}", day.as_str(), ids.join(", "));
                }
                if !any {
                    println!("    (no schedule)");
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match e {
                raidtrack_config::ConfigError::ValidationFailed { errors } => {
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                }
                other => eprintln!("  {}", other),
            }
            ExitCode::from(1)
        }
    }
}
