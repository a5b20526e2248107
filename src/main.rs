use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use colored::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, Level};

mod cli;

use cli::{Args, Commands, OutputFormat};
use wordguard::config::{
    BlacklistConfig, DefaultsConfig, DictionaryConfig, ResolvedConfig, WordguardConfig,
};
use wordguard::{Blacklist, Guard, ValidateOptions};

/// Flags that override every configuration layer
fn cli_overrides(args: &Args) -> WordguardConfig {
    WordguardConfig {
        defaults: args.debug.then(|| DefaultsConfig {
            debug: Some(true),
            log_level: Some("debug".to_string()),
        }),
        dictionary: args.data_dir.as_ref().map(|dir| DictionaryConfig {
            data_dir: Some(dir.to_string_lossy().into_owned()),
            ..Default::default()
        }),
        blacklist: args.blacklist.as_ref().map(|path| BlacklistConfig {
            path: Some(path.to_string_lossy().into_owned()),
        }),
        validation: None,
    }
}

fn init_logging(config: &ResolvedConfig) {
    let log_level = if config.defaults.debug {
        Level::DEBUG
    } else {
        config.defaults.log_level.parse().unwrap_or(Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_terms(label: &str, terms: &[String]) {
    if terms.is_empty() {
        println!("{} {}", label.bold().green(), "(none)".dimmed());
    } else {
        println!("{} {}", label.bold().green(), terms.join(", "));
    }
}

fn handle_validate(
    guard: &Guard,
    config: &ResolvedConfig,
    format: OutputFormat,
    input: &str,
    verbose: bool,
    no_character_mapping: bool,
) -> Result<()> {
    let options = ValidateOptions {
        verbose: verbose || config.validation.verbose,
        character_mapping: config.validation.character_mapping && !no_character_mapping,
    };

    let start_time = Instant::now();
    let result = guard.validate(input, options)?;
    debug!("Validation completed in {:.2?}", start_time.elapsed());

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    if result.is_blacklisted {
        println!("{}", "Blacklisted".red().bold());
    } else {
        println!("{}", "Clean".green().bold());
    }
    if let Some(blacklist_match) = &result.blacklist_match {
        println!("{} {}", "Match:".bold().green(), blacklist_match);
    }
    if let Some(substituted) = &result.substituted_string {
        if !substituted.is_empty() {
            println!("{} {}", "Segmented:".bold().green(), substituted);
        }
    }

    Ok(())
}

fn handle_split(
    guard: &Guard,
    config: &ResolvedConfig,
    format: OutputFormat,
    input: &str,
    no_character_mapping: bool,
) -> Result<()> {
    let character_mapping = config.validation.character_mapping && !no_character_mapping;
    let words = guard.split_string(input, character_mapping)?;

    match format {
        OutputFormat::Json => print_json(&words),
        OutputFormat::Plain => {
            println!("{}", words.join(" "));
            Ok(())
        }
    }
}

fn handle_evaluate(guard: &Guard, format: OutputFormat, terms: &[String]) -> Result<()> {
    let evaluation = guard.evaluate_blacklist(terms)?;

    if format == OutputFormat::Json {
        return print_json(&evaluation);
    }

    if evaluation.is_empty() {
        println!("{}", "No terms evaluated.".yellow().bold());
    }
    for (category, terms) in evaluation.categories() {
        print_terms(&format!("{category}:"), terms);
    }

    Ok(())
}

fn print_blacklist(format: OutputFormat, blacklist: &Blacklist) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(blacklist);
    }

    print_terms("common:", &blacklist.common);
    print_terms("commonVariant:", &blacklist.common_variant);
    print_terms("special:", &blacklist.special);
    Ok(())
}

fn print_changed(format: OutputFormat, label: &str, terms: &[String]) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&terms),
        OutputFormat::Plain => {
            print_terms(label, terms);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = WordguardConfig::load_with(cli_overrides(&args))?;
    init_logging(&config);

    if let Commands::Config = args.command {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let guard = Guard::from_config(&config).context("Failed to initialize wordguard")?;

    match args.command {
        Commands::Validate {
            input,
            verbose,
            no_character_mapping,
        } => handle_validate(
            &guard,
            &config,
            args.format,
            &input,
            verbose,
            no_character_mapping,
        )?,
        Commands::Split {
            input,
            no_character_mapping,
        } => handle_split(&guard, &config, args.format, &input, no_character_mapping)?,
        Commands::Evaluate { terms } => handle_evaluate(&guard, args.format, &terms)?,
        Commands::Add {
            common,
            common_variant,
            special,
        } => {
            let added = guard.add_blacklist(&Blacklist {
                common,
                common_variant,
                special,
            })?;
            print_changed(args.format, "Added:", &added)?
        }
        Commands::Remove { terms } => {
            let removed = guard.remove_blacklist(&terms)?;
            print_changed(args.format, "Removed:", &removed)?
        }
        Commands::List => print_blacklist(args.format, &guard.blacklist()?)?,
        Commands::Config => {}
    }

    Ok(())
}
