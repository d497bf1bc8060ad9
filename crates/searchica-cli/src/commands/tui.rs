use std::sync::Arc;

use anyhow::{Context, Result};
use searchica_client::{Config, SearchClient};
use searchica_core::EXAMPLE_QUERY;

use crate::tui::{self, AppOptions};

/// Options of the interactive UI.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct TuiArgs {
    /// Query to run on start-up instead of the configured one
    #[arg(long)]
    pub query: Option<String>,

    /// Don't show the welcome dialog
    #[arg(long)]
    pub skip_intro: bool,

    /// Start with an empty screen instead of running a search
    #[arg(long, conflicts_with = "query")]
    pub no_initial_search: bool,
}

impl TuiArgs {
    fn options(self, config: &Config) -> AppOptions {
        let initial_query = if self.no_initial_search {
            None
        } else {
            Some(self.query.unwrap_or_else(|| {
                if config.initial_query.trim().is_empty() {
                    EXAMPLE_QUERY.to_string()
                } else {
                    config.initial_query.clone()
                }
            }))
        };
        AppOptions {
            initial_query,
            show_onboarding: config.show_onboarding && !self.skip_intro,
        }
    }
}

/// Run the interactive UI against the configured search service.
pub fn run_tui(config: &Config, args: TuiArgs) -> Result<()> {
    let client = SearchClient::from_config(config).context("Failed to create search client")?;
    log::info!("starting UI against {}", client.base_url());

    tui::run_tui(Arc::new(client), args.options(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runs_example_query_with_intro() {
        let options = TuiArgs::default().options(&Config::default());
        assert_eq!(options.initial_query.as_deref(), Some(EXAMPLE_QUERY));
        assert!(options.show_onboarding);
    }

    #[test]
    fn test_query_flag_overrides_config() {
        let config = Config {
            initial_query: "budget".to_string(),
            ..Config::default()
        };
        let args = TuiArgs {
            query: Some("raptor".to_string()),
            ..TuiArgs::default()
        };
        assert_eq!(args.options(&config).initial_query.as_deref(), Some("raptor"));

        let options = TuiArgs::default().options(&config);
        assert_eq!(options.initial_query.as_deref(), Some("budget"));
    }

    #[test]
    fn test_blank_configured_query_falls_back_to_example() {
        let config = Config {
            initial_query: "  ".to_string(),
            ..Config::default()
        };
        let options = TuiArgs::default().options(&config);
        assert_eq!(options.initial_query.as_deref(), Some(EXAMPLE_QUERY));
    }

    #[test]
    fn test_no_initial_search_and_skip_intro() {
        let args = TuiArgs {
            skip_intro: true,
            no_initial_search: true,
            ..TuiArgs::default()
        };
        let options = args.options(&Config::default());
        assert_eq!(options.initial_query, None);
        assert!(!options.show_onboarding);

        let config = Config {
            show_onboarding: false,
            ..Config::default()
        };
        assert!(!TuiArgs::default().options(&config).show_onboarding);
    }
}
