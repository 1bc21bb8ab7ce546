use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use weather_core::{Config, LookupOrchestrator, SuggestionProvider, open_meteo_from_config};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for any place, by name")]
pub struct Cli {
    /// Show debug logs on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search places with live suggestions and show their weather.
    Interactive,

    /// Show current weather for a place.
    Show {
        /// Place name, e.g. "Paris" or "Paris, France".
        place: String,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List matching places for a partial name.
    Suggest {
        query: String,
    },

    /// Edit endpoints, startup location and debounce delay.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive) {
            Command::Interactive => interactive::run(&config).await,
            Command::Show { place, json } => show(&config, &place, json).await,
            Command::Suggest { query } => suggest(&config, &query).await,
            Command::Configure => configure(config),
        }
    }
}

async fn show(config: &Config, place: &str, json: bool) -> anyhow::Result<()> {
    let orch = LookupOrchestrator::new(open_meteo_from_config(config)?, &config.default_location);
    let snapshot = orch.lookup(place).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
        );
    } else {
        println!("{}", render::snapshot(&snapshot));
    }
    Ok(())
}

async fn suggest(config: &Config, query: &str) -> anyhow::Result<()> {
    let providers = open_meteo_from_config(config)?;
    let found = SuggestionProvider::new(providers.geocoder).suggest(query).await;

    if found.is_empty() {
        println!("No matching places.");
    } else {
        println!("{}", render::candidates(&found));
    }
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let location = Text::new("Startup location:")
        .with_default(&config.default_location)
        .prompt()?;
    let geocoding_url = Text::new("Geocoding service URL:")
        .with_default(&config.geocoding_url)
        .prompt()?;
    let forecast_url = Text::new("Forecast service URL:")
        .with_default(&config.forecast_url)
        .prompt()?;
    let debounce_ms = CustomType::<u64>::new("Suggestion delay (ms):")
        .with_default(config.debounce_ms)
        .with_error_message("Please enter a whole number of milliseconds")
        .prompt()?;

    config.default_location = location;
    config.geocoding_url = geocoding_url;
    config.forecast_url = forecast_url;
    config.debounce_ms = debounce_ms;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
