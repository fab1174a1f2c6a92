//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RateSource, RetryPolicy};
use crate::output::{JsonLinesWriter, OutputFormat};
use crate::state::StateManager;
use crate::types::{format_day, Clock, SystemClock};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
    retry: RetryPolicy,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy used by the HTTP client
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            None => self.read(None).await,
            Some(Commands::Read { state_output }) => self.read(state_output.as_deref()).await,
            Some(Commands::Check) => self.check().await,
            Some(Commands::Spec) => {
                self.output_message(&json!({ "type": "SPEC", "spec": TapConfig::spec() }));
                Ok(())
            }
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }

        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config(
                "Config not specified (use -c or --config-json)",
            )),
        }
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    fn build_client(&self, config: &TapConfig) -> Result<HttpClient> {
        HttpClient::with_config(config.http_config(self.retry))
    }

    /// Replicate from the resolved start date through today
    async fn read(&self, state_output: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let state = self.load_state()?;

        let start_date = config.resolve_start_date(state.cursor(), SystemClock.today())?;
        info!("Starting sync from {}", format_day(start_date));

        let client = self.build_client(&config)?;
        let mut engine = SyncEngine::new(client);
        let mut sink = JsonLinesWriter::stdout(self.cli.format);

        let (final_state, result) = engine.run(start_date, &mut sink).await;

        if let Some(path) = state_output {
            if let Err(e) = state.save_to_file(path, &final_state).await {
                error!("Failed to write state to {}: {e}", path.display());
                if result.is_ok() {
                    return Err(e);
                }
            }
        }

        result.map(|_| ())
    }

    /// Fetch today's rates once
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = self.build_client(&config)?;
        let today = SystemClock.today();

        match client.fetch(today).await {
            Ok(payload) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "SUCCEEDED",
                    "base": payload.base,
                    "date": payload.date,
                    "currencies": payload.rates.len(),
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "FAILED",
                    "message": e.to_string(),
                }));
                Err(e)
            }
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
