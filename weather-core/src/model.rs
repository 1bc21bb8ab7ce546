use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PlaceCandidate {
    /// Text submitted as a lookup when this candidate is picked.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    /// List identity. Not unique: two places can share name, country and
    /// latitude while differing in longitude.
    pub fn key(&self) -> (&str, &str, f64) {
        (&self.name, &self.country, self.latitude)
    }
}

/// Coarse weather classification derived from a WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Foggy,
    Rainy,
    Snowy,
    Thunderstorm,
    Unknown,
}

impl Condition {
    /// Banded mapping, first match wins. Every `i32` maps to something.
    pub fn from_weather_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            4..=48 => Self::Foggy,
            49..=67 => Self::Rainy,
            68..=77 => Self::Snowy,
            78..=82 => Self::Rainy,
            83..=86 => Self::Snowy,
            87..=99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Foggy => "foggy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Thunderstorm => "thunderstorm",
            Self::Unknown => "unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Foggy => "Foggy",
            Self::Rainy => "Rainy",
            Self::Snowy => "Snowy",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Current conditions for one place at one moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub country: String,
    /// °C
    pub temperature: f64,
    /// Apparent temperature, °C
    pub feels_like: f64,
    pub condition: Condition,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// km/h, rounded to a whole number.
    pub wind_speed: f64,
    /// km. The forecast service has no visibility reading, so this is always
    /// [`DEFAULT_VISIBILITY_KM`].
    pub visibility: f64,
    pub uv_index: f64,
    pub fetched_at: DateTime<Utc>,
}

pub const DEFAULT_VISIBILITY_KM: f64 = 10.0;

impl WeatherSnapshot {
    /// Copy of this snapshot labelled with a resolved place.
    pub fn with_place(self, place: &PlaceCandidate) -> Self {
        Self {
            location: place.name.clone(),
            country: place.country.clone(),
            ..self
        }
    }
}

/// What the presentation layer should show for the current lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success(WeatherSnapshot),
    /// Human-readable reason.
    Failure(String),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }
}
