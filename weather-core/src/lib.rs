//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - An injectable HTTP transport and the Open-Meteo geocoding/forecast clients
//! - Debounced, stale-safe place suggestions
//! - The lookup orchestrator that owns the current [`LookupState`]
//!
//! It is used by `weather-cli`, but can also drive any other front end.

pub mod config;
pub mod debounce;
pub mod error;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod suggest;

pub use config::Config;
pub use debounce::Debouncer;
pub use error::{LookupError, Service, ServiceError};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use model::{Condition, LookupState, PlaceCandidate, WeatherSnapshot};
pub use orchestrator::LookupOrchestrator;
pub use provider::{ConditionsSource, Geocoder, Providers, open_meteo_from_config};
pub use suggest::{SuggestionFeed, SuggestionProvider};
