//! Plain-text rendering of lookup results.

use chrono::Local;
use weather_core::{PlaceCandidate, WeatherSnapshot};

pub fn snapshot(s: &WeatherSnapshot) -> String {
    let title = if s.country.is_empty() {
        s.location.clone()
    } else {
        format!("{}, {}", s.location, s.country)
    };
    let updated = s.fetched_at.with_timezone(&Local).format("%H:%M");

    format!(
        "{title}\n\
         {temp:.0}°C  {condition}\n\
         Feels like {feels:.0}°C\n\
         Humidity    {humidity}%\n\
         Wind        {wind:.0} km/h\n\
         Visibility  {visibility:.0} km\n\
         UV index    {uv:.1}\n\
         Updated {updated}",
        temp = s.temperature,
        condition = s.condition,
        feels = s.feels_like,
        humidity = s.humidity,
        wind = s.wind_speed,
        visibility = s.visibility,
        uv = s.uv_index,
    )
}

pub fn candidates(found: &[PlaceCandidate]) -> String {
    found
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} ({:.2}, {:.2})", i + 1, p.label(), p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join("\n")
}
