use crate::{
    Config, LookupError, PlaceCandidate, WeatherSnapshot,
    http::{HttpTransport, ReqwestTransport},
    provider::{forecast::OpenMeteoForecast, geocoding::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod forecast;
pub mod geocoding;

/// Place-name → coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Single best match for `place`. `NotFound` when there is none.
    async fn resolve(&self, place: &str) -> Result<PlaceCandidate, LookupError>;

    /// Up to `count` matches in upstream relevance order.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<PlaceCandidate>, LookupError>;
}

/// Coordinates → current conditions.
#[async_trait]
pub trait ConditionsSource: Send + Sync + Debug {
    /// The returned snapshot has blank `location`/`country`.
    async fn fetch_conditions(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, LookupError>;
}

/// The two upstreams a lookup needs.
#[derive(Debug, Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn Geocoder>,
    pub conditions: Arc<dyn ConditionsSource>,
}

impl Providers {
    /// Open-Meteo clients sharing one transport.
    pub fn open_meteo(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self {
            geocoder: Arc::new(OpenMeteoGeocoder::new(transport.clone(), &config.geocoding_url)),
            conditions: Arc::new(OpenMeteoForecast::new(transport, &config.forecast_url)),
        }
    }
}

/// Construct the production providers from config.
pub fn open_meteo_from_config(config: &Config) -> anyhow::Result<Providers> {
    let transport = ReqwestTransport::new(config.request_timeout())?;
    Ok(Providers::open_meteo(Arc::new(transport), config))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
