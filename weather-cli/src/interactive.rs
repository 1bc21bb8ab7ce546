//! Interactive session: startup lookup, then a search prompt whose
//! autocomplete list is fed by a debounced [`SuggestionFeed`].

use anyhow::Context;
use inquire::{
    CustomUserError, InquireError, Text,
    autocompletion::{Autocomplete, Replacement},
};
use weather_core::{
    Config, LookupError, LookupOrchestrator, PlaceCandidate, SuggestionFeed, SuggestionProvider,
    WeatherSnapshot, open_meteo_from_config,
};

use crate::render;

const RETRY: &str = ":retry";
const QUIT: &str = ":quit";

#[derive(Debug, PartialEq, Eq)]
enum Action<'a> {
    Lookup(&'a str),
    Retry,
    Quit,
    Nothing,
}

fn parse_action(input: &str) -> Action<'_> {
    match input.trim() {
        "" => Action::Nothing,
        RETRY | ":r" => Action::Retry,
        QUIT | ":q" => Action::Quit,
        place => Action::Lookup(place),
    }
}

/// Bridges inquire's synchronous autocomplete hook to the async feed.
///
/// Each keystroke restarts the debounce timer; the list shown is whatever the
/// feed last published, so it catches up on the next keystroke after a
/// response lands.
#[derive(Clone)]
struct PlaceCompleter {
    feed: SuggestionFeed,
}

impl Autocomplete for PlaceCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        if input.starts_with(':') {
            self.feed.clear();
            return Ok(Vec::new());
        }
        self.feed.on_input(input);
        Ok(self.feed.current().iter().map(PlaceCandidate::label).collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let providers = open_meteo_from_config(config)?;
    let orch = LookupOrchestrator::new(providers.clone(), &config.default_location);
    let feed = SuggestionFeed::new(SuggestionProvider::new(providers.geocoder), config.debounce());

    println!("Loading weather for {}...", orch.default_location());
    report(&orch, orch.load_default().await);

    loop {
        feed.clear();
        let completer = PlaceCompleter { feed: feed.clone() };

        let answer = tokio::task::spawn_blocking(move || {
            Text::new("Search for a city:")
                .with_autocomplete(completer)
                .with_help_message(":retry to refresh the last place, :quit to exit")
                .prompt()
        })
        .await
        .context("Prompt task failed")?;

        let input = match answer {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let outcome = match parse_action(&input) {
            Action::Nothing => continue,
            Action::Quit => break,
            Action::Retry => orch.retry_last().await,
            Action::Lookup(place) => {
                println!("Loading weather for {place}...");
                orch.lookup(place).await
            }
        };
        report(&orch, outcome);
    }

    feed.clear();
    Ok(())
}

fn report(orch: &LookupOrchestrator, outcome: Result<WeatherSnapshot, LookupError>) {
    match outcome {
        Ok(snapshot) => println!("\n{}\n", render::snapshot(&snapshot)),
        Err(e) => {
            tracing::debug!(error = %e.diagnostic(), "lookup failed");
            println!("\n{e}");
            let retryable = matches!(e, LookupError::Service(_));
            if let (true, Some(last)) = (retryable, orch.last_success()) {
                println!("Type {RETRY} to try {} again.", last.location);
            }
            println!();
        }
    }
}
