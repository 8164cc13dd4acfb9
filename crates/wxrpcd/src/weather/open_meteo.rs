//! [`WeatherProvider`] backed by the public Open-Meteo APIs.

use std::time::Duration;

use serde::Deserialize;

use super::conditions::describe_weather_code;
use super::provider::{CurrentWeather, Location, ProviderError, WeatherProvider};

/// Geocoding search endpoint.
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
/// Forecast endpoint.
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const GEOCODING_LANGUAGE: &str = "en";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client for Open-Meteo geocoding and forecasts.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    agent: ureq::Agent,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoProvider {
    /// Creates a provider whose every request is bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_urls(timeout, GEOCODING_URL, FORECAST_URL)
    }

    /// Creates a provider that talks to alternative endpoints.
    #[must_use]
    pub fn with_base_urls(
        timeout: Duration,
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }
}

fn fetch(endpoint: &'static str, request: ureq::Request) -> Result<String, ProviderError> {
    let response = request.call().map_err(|source| ProviderError::Http {
        endpoint,
        source: Box::new(source),
    })?;
    response
        .into_string()
        .map_err(|source| ProviderError::Read { endpoint, source })
}

impl WeatherProvider for OpenMeteoProvider {
    fn geocode(&self, query: &str) -> Result<Location, ProviderError> {
        let request = self
            .agent
            .get(&self.geocoding_url)
            .query("name", query)
            .query("count", "1")
            .query("format", "json")
            .query("language", GEOCODING_LANGUAGE);
        let body = fetch(GEOCODING_URL, request)?;
        parse_geocoding(&body, query)
    }

    fn current_weather(&self, location: &Location) -> Result<CurrentWeather, ProviderError> {
        let request = self
            .agent
            .get(&self.forecast_url)
            .query("latitude", &location.latitude.to_string())
            .query("longitude", &location.longitude.to_string())
            .query("current_weather", "true")
            .query("hourly", "relative_humidity_2m")
            .query("timezone", "auto");
        let body = fetch(FORECAST_URL, request)?;
        parse_forecast(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingMatch>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentBlock,
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature: f64,
    #[serde(default)]
    windspeed: Option<f64>,
    #[serde(default)]
    weathercode: Option<u16>,
    time: String,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
}

impl HourlyBlock {
    /// Humidity for the hourly slot whose timestamp equals `time`.
    fn humidity_at(&self, time: &str) -> Option<f64> {
        let index = self.time.iter().position(|slot| slot == time)?;
        self.relative_humidity_2m.get(index).copied().flatten()
    }
}

fn payload_error(endpoint: &'static str, error: &serde_json::Error) -> ProviderError {
    ProviderError::Payload {
        endpoint,
        message: error.to_string(),
    }
}

fn parse_geocoding(body: &str, query: &str) -> Result<Location, ProviderError> {
    let response: GeocodingResponse =
        serde_json::from_str(body).map_err(|error| payload_error(GEOCODING_URL, &error))?;
    let first = response
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound {
            query: query.to_owned(),
        })?;
    Ok(Location {
        name: first.name,
        latitude: first.latitude,
        longitude: first.longitude,
    })
}

fn parse_forecast(body: &str) -> Result<CurrentWeather, ProviderError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|error| payload_error(FORECAST_URL, &error))?;
    let current = response.current_weather;
    let humidity = response
        .hourly
        .and_then(|hourly| hourly.humidity_at(&current.time));
    let condition = current
        .weathercode
        .map_or_else(|| "unknown".to_owned(), describe_weather_code);
    Ok(CurrentWeather {
        temp_c: current.temperature,
        humidity,
        condition,
        wind_kph: current.windspeed,
        updated_at: current.time,
    })
}
