use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use searchica_client::{config, Config, SearchClient};
use tracing_subscriber::EnvFilter;

mod commands;
mod tui;

use commands::TuiArgs;

#[derive(Debug, Parser)]
#[command(name = "searchica", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    tui: TuiArgs,

    /// Base URL of the search service (overrides config and SEARCHICA_API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Log file for the interactive UI (default: ~/.local/share/searchica/searchica.log)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Explore the corpus interactively (the default)
    ///
    /// Opens a full-screen terminal UI with a search bar, a semantic map of the
    /// results and the ranked result list:
    ///
    /// - Similar emails are close together on the map
    /// - Red points are more relevant, blue points less
    /// - Hovering a result highlights its point; clicking a point scrolls to
    ///   its result
    /// - Selecting a result shows the full email in place of the map
    ///
    /// Log output goes to the log file so it does not disturb the screen.
    Tui(TuiArgs),
    /// Run one search and print the ranked results
    Search {
        /// The query, in plain language
        query: String,

        /// Show at most this many results
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Print the raw service response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the status of the search service
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file
    Get {
        /// api_base_url, initial_query, show_onboarding, request_timeout_secs,
        /// retry.max_retries or retry.min_delay_ms
        key: Option<String>,
    },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it doesn't exist
    Init,
}

/// Install the log subscriber. With a log file, output goes there without
/// colours; otherwise to stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(api_url: Option<String>) -> Result<Config> {
    Ok(Config::load()?.with_api_base_url(api_url))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui(cli.tui));

    let log_file = match command {
        Commands::Tui(_) => Some(cli.log_file.unwrap_or_else(config::default_log_path)),
        _ => cli.log_file,
    };
    init_logging(log_file.as_deref())?;

    match command {
        Commands::Tui(args) => {
            let config = load_config(cli.api_url)?;
            commands::run_tui(&config, args)?;
        }
        Commands::Search { query, limit, json } => {
            let config = load_config(cli.api_url)?;
            let client = SearchClient::from_config(&config)?;
            commands::run_search(&client, &query, limit, json).await?;
        }
        Commands::Status => {
            let config = load_config(cli.api_url)?;
            let client = SearchClient::from_config(&config)?;
            commands::show_status(&client).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config(cli.api_url)?,
            ConfigCommand::Get { key } => commands::config::get_config(key)?,
            ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigCommand::Path => commands::config::show_path()?,
            ConfigCommand::Example => commands::config::show_example()?,
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_is_tui() {
        let cli = Cli::try_parse_from(["searchica", "--query", "raptor", "--skip-intro"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.tui.query.as_deref(), Some("raptor"));
        assert!(cli.tui.skip_intro);
    }

    #[test]
    fn test_search_with_global_api_url() {
        let cli = Cli::try_parse_from([
            "searchica",
            "search",
            "special purpose entities",
            "-n",
            "5",
            "--api-url",
            "http://search.internal:5000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://search.internal:5000"));
        match cli.command {
            Some(Commands::Search { query, limit, json }) => {
                assert_eq!(query, "special purpose entities");
                assert_eq!(limit, Some(5));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_initial_search_conflicts_with_query() {
        let result = Cli::try_parse_from(["searchica", "tui", "--query", "x", "--no-initial-search"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tui_args_rejected_before_other_subcommands() {
        assert!(Cli::try_parse_from(["searchica", "--query", "x", "status"]).is_err());
        assert!(Cli::try_parse_from(["searchica", "--skip-intro", "search", "budget"]).is_err());

        let cli = Cli::try_parse_from(["searchica", "status", "--api-url", "http://localhost:5000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::try_parse_from(["searchica", "config", "set", "retry.max_retries", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config { command: ConfigCommand::Set { ref key, ref value } })
                if key == "retry.max_retries" && value == "4"
        ));
    }
}
