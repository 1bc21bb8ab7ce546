use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    LookupError, PlaceCandidate,
    error::{Service, ServiceError},
    http::HttpTransport,
};

use super::{Geocoder, endpoint};

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    transport: Arc<dyn HttpTransport>,
    search_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            search_url: endpoint(base_url, "/v1/search"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

impl From<GeoResult> for PlaceCandidate {
    fn from(r: GeoResult) -> Self {
        PlaceCandidate {
            name: r.name,
            country: r.country,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn resolve(&self, place: &str) -> Result<PlaceCandidate, LookupError> {
        self.search(place, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound {
                query: place.to_string(),
            })
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<PlaceCandidate>, LookupError> {
        tracing::debug!(url = %self.search_url, query, count, "geocoding request");

        let res = self
            .transport
            .get(
                &self.search_url,
                &[
                    ("name", query.to_string()),
                    ("count", count.to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await
            .map_err(|e| ServiceError::transport(Service::Geocoding, &e))?;

        // No match, same as an empty result list.
        if res.status == 404 {
            return Ok(Vec::new());
        }

        if !res.is_success() {
            return Err(ServiceError::status(Service::Geocoding, res.status, &res.body).into());
        }

        let parsed: GeoResponse = serde_json::from_str(&res.body)
            .map_err(|e| ServiceError::malformed(Service::Geocoding, res.status, &e))?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(PlaceCandidate::from)
            .collect())
    }
}
