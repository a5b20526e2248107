use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(
    name = "wordguard",
    author,
    version,
    about = "Detect blacklisted words hidden in leet-speak or run-together text",
    long_about = None
)]
pub struct Args {
    /// Directory holding the dictionary chunk files
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the blacklist JSON file (defaults to <data-dir>/blacklist.json)
    #[arg(long = "blacklist", global = true)]
    pub blacklist: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(short = 'o', long = "format", value_enum, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check text against the blacklist
    Validate {
        /// Text to check
        input: String,

        /// Show the matched term and the segmented text
        #[arg(short, long)]
        verbose: bool,

        /// Only strip non-letters instead of rewriting leet-speak
        #[arg(long = "no-character-mapping")]
        no_character_mapping: bool,
    },

    /// Normalize text and split it into words
    Split {
        /// Text to split
        input: String,

        /// Only strip non-letters instead of rewriting leet-speak
        #[arg(long = "no-character-mapping")]
        no_character_mapping: bool,
    },

    /// Suggest a blacklist category for each candidate term
    Evaluate {
        /// Candidate terms
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Add terms to the blacklist (terms are sanitized before storing)
    Add {
        /// Standalone bad words
        #[arg(long)]
        common: Vec<String>,

        /// Phrases made of ordinary words, matched literally
        #[arg(long = "common-variant")]
        common_variant: Vec<String>,

        /// Words that must stay whole during segmentation
        #[arg(long)]
        special: Vec<String>,
    },

    /// Remove terms from every blacklist category
    Remove {
        /// Exact terms to remove
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Print the current blacklist
    List,

    /// Print the resolved configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let args = Args::parse_from(["wordguard", "validate", "b4dw0rd", "--verbose"]);
        assert_eq!(args.format, OutputFormat::Plain);
        match args.command {
            Commands::Validate {
                input,
                verbose,
                no_character_mapping,
            } => {
                assert_eq!(input, "b4dw0rd");
                assert!(verbose);
                assert!(!no_character_mapping);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "wordguard",
            "add",
            "--common",
            "badword",
            "--special",
            "penisland",
            "--data-dir",
            "/tmp/data",
            "--format",
            "json",
        ]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/data")));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(matches!(
            args.command,
            Commands::Add { ref common, ref special, .. }
                if common == &["badword"] && special == &["penisland"]
        ));
    }

    #[test]
    fn test_evaluate_requires_terms() {
        assert!(Args::try_parse_from(["wordguard", "evaluate"]).is_err());
    }
}
