use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use signcap::app::{run_classify, run_serve};
use signcap::cli::{Cli, Commands, ConfigAction};
use signcap::config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Serve {
            listen,
            idle_timeout,
            polish_timeout,
            no_polish,
        } => {
            let config = load_config(cli.config.as_deref(), cli.debug_tokens, |config| {
                if let Some(listen) = listen {
                    config.server.listen = listen;
                }
                if let Some(secs) = idle_timeout {
                    config.session.idle_timeout_secs = secs;
                }
                if let Some(ms) = polish_timeout {
                    config.polish.timeout_ms = ms;
                }
                if no_polish {
                    config.polish.enabled = false;
                }
            })?;
            run_serve(config).await?;
        }
        Commands::Classify { file } => {
            let config = load_config(cli.config.as_deref(), cli.debug_tokens, |config| {
                config.polish.enabled = false;
            })?;
            run_classify(&config, &file)
                .await
                .with_context(|| format!("classifying {}", file.display()))?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref(), cli.debug_tokens)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "signcap", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise -q → warn, default → info, -v → debug, -vv → trace.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn config_path(custom_path: Option<&Path>) -> PathBuf {
    custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path)
}

/// Load configuration, apply env overrides and CLI flags, then validate.
fn load_config(
    custom_path: Option<&Path>,
    debug_tokens: bool,
    overrides: impl FnOnce(&mut Config),
) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // An explicit path must exist
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    let mut config = config.with_env_overrides();
    if debug_tokens {
        config.debug_tokens = true;
    }
    overrides(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&Path>,
    debug_tokens: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path, debug_tokens, |_| {})?;
            let toml = toml::to_string_pretty(&config).context("serializing configuration")?;
            print!("{}", toml);
        }
        ConfigAction::Path => {
            println!("{}", config_path(custom_path).display());
        }
    }
    Ok(())
}
