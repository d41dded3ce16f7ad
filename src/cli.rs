//! Command-line interface for signcap
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Real-time sign-language captions
#[derive(Parser, Debug)]
#[command(
    name = "signcap",
    version,
    about = "Real-time sign-language captions from hand-landmark streams"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Replace recognition with a fixed cycle of phrase tokens
    #[arg(long, global = true)]
    pub debug_tokens: bool,
}

/// Parse a duration such as `90s`, `2m` or a bare number of seconds.
fn parse_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Parse a duration into milliseconds; bare numbers are milliseconds.
fn parse_millis(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the caption server
    Serve {
        /// Address to listen on (default: 127.0.0.1:8765)
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,

        /// End sessions silent for this long. Examples: 60, 90s, 5m
        #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
        idle_timeout: Option<u64>,

        /// Give up on caption polishing after this long. Examples: 800, 500ms, 1s
        #[arg(long, value_name = "DURATION", value_parser = parse_millis)]
        polish_timeout: Option<u64>,

        /// Never call the polishing service
        #[arg(long)]
        no_polish: bool,
    },

    /// Caption a file of newline-delimited frame messages (use - for stdin)
    Classify {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["signcap"]).is_err());
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["signcap", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                listen,
                idle_timeout,
                polish_timeout,
                no_polish,
            } => {
                assert!(listen.is_none());
                assert!(idle_timeout.is_none());
                assert!(polish_timeout.is_none());
                assert!(!no_polish);
            }
            other => panic!("Expected Serve, got {:?}", other),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.debug_tokens);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_serve_with_options() {
        let cli = Cli::try_parse_from([
            "signcap",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--idle-timeout",
            "2m",
            "--polish-timeout",
            "500ms",
            "--no-polish",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                listen,
                idle_timeout,
                polish_timeout,
                no_polish,
            } => {
                assert_eq!(listen.as_deref(), Some("0.0.0.0:9000"));
                assert_eq!(idle_timeout, Some(120));
                assert_eq!(polish_timeout, Some(500));
                assert!(no_polish);
            }
            other => panic!("Expected Serve, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_numbers_keep_their_unit() {
        assert_eq!(parse_secs("45"), Ok(45));
        assert_eq!(parse_millis("250"), Ok(250));
        assert_eq!(parse_millis("1s"), Ok(1000));
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn test_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["signcap", "-v", "serve"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["signcap", "serve", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from([
            "signcap",
            "classify",
            "frames.jsonl",
            "--config",
            "/tmp/signcap.toml",
            "--debug-tokens",
            "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert!(cli.debug_tokens);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/signcap.toml")));
        match cli.command {
            Commands::Classify { file } => assert_eq!(file, PathBuf::from("frames.jsonl")),
            other => panic!("Expected Classify, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["signcap", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
        let cli = Cli::try_parse_from(["signcap", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Path
            }
        ));
        assert!(Cli::try_parse_from(["signcap", "config"]).is_err());
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["signcap", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_classify_requires_file() {
        assert!(Cli::try_parse_from(["signcap", "classify"]).is_err());
    }
}
