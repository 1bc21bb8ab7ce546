use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    Condition, LookupError, WeatherSnapshot,
    error::{Service, ServiceError},
    http::HttpTransport,
    model::DEFAULT_VISIBILITY_KM,
};

use super::{ConditionsSource, endpoint};

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,relative_humidity_2m,weather_code,wind_speed_10m,uv_index";

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    transport: Arc<dyn HttpTransport>,
    forecast_url: String,
}

impl OpenMeteoForecast {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            forecast_url: endpoint(base_url, "/v1/forecast"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    weather_code: i32,
    /// m/s as served; converted on the way out.
    wind_speed_10m: f64,
    #[serde(default)]
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
}

/// m/s → km/h, whole number.
pub fn wind_kmh(mps: f64) -> f64 {
    (mps * MPS_TO_KMH).round()
}

impl From<OmCurrent> for WeatherSnapshot {
    fn from(c: OmCurrent) -> Self {
        WeatherSnapshot {
            location: String::new(),
            country: String::new(),
            temperature: c.temperature_2m,
            feels_like: c.apparent_temperature,
            condition: Condition::from_weather_code(c.weather_code),
            humidity: c.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
            wind_speed: wind_kmh(c.wind_speed_10m),
            // No visibility reading upstream; fixed approximation.
            visibility: DEFAULT_VISIBILITY_KM,
            uv_index: c.uv_index.unwrap_or(0.0),
            fetched_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ConditionsSource for OpenMeteoForecast {
    async fn fetch_conditions(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, LookupError> {
        tracing::debug!(url = %self.forecast_url, latitude, longitude, "forecast request");

        let res = self
            .transport
            .get(
                &self.forecast_url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                    ("daily", "weather_code".to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await
            .map_err(|e| ServiceError::transport(Service::Forecast, &e))?;

        if !res.is_success() {
            return Err(ServiceError::status(Service::Forecast, res.status, &res.body).into());
        }

        let parsed: OmForecastResponse = serde_json::from_str(&res.body)
            .map_err(|e| ServiceError::malformed(Service::Forecast, res.status, &e))?;

        Ok(parsed.current.into())
    }
}
