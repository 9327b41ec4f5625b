//! Config validation CLI tool
//!
//! Validates a wird configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use wird_util::default_config_path;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a wird configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match wird_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", wird_config::CURRENT_CONFIG_VERSION);
            println!(
                "  Book: {} (pages {}-{})",
                settings.book.title, settings.book.units.start, settings.book.units.end
            );
            println!("  Default duration: {} days", settings.plans.default_duration_days);
            println!("  Strict day lock: {}", settings.plans.strict_day_lock);
            println!(
                "  Restart resets start date: {}",
                settings.plans.restart_resets_start_date
            );
            println!("  Data directory: {}", settings.storage.data_dir.display());
            if let Some(catalog) = &settings.storage.catalog_path {
                println!("  Catalog file: {}", catalog.display());
            }

            if !settings.chapters.is_empty() {
                println!();
                println!("Chapters:");
                for chapter in &settings.chapters {
                    println!(
                        "  - {} {}: pages {}-{}",
                        chapter.id, chapter.name, chapter.pages.0, chapter.pages.1
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                wird_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                wird_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                wird_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                wird_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        wird_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
