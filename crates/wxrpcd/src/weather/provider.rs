//! Collaborator contract for weather data.

use std::io;

use thiserror::Error;

/// Resolved place returned by geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Canonical place name as reported by the provider.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Air temperature in degrees Celsius.
    pub temp_c: f64,
    /// Relative humidity in percent, when it lines up with the observation.
    pub humidity: Option<f64>,
    /// Human-readable description of the weather code.
    pub condition: String,
    /// Wind speed in kilometres per hour.
    pub wind_kph: Option<f64>,
    /// Observation time in the location's local time zone.
    pub updated_at: String,
}

/// Source of geocoding and weather observations.
#[cfg_attr(test, mockall::automock)]
pub trait WeatherProvider: Send + Sync + 'static {
    /// Resolves a free-text place name to coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when nothing matches, or a
    /// transport error.
    fn geocode(&self, query: &str) -> Result<Location, ProviderError>;

    /// Fetches the current conditions at a location.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the upstream call or its payload fails.
    fn current_weather(&self, location: &Location) -> Result<CurrentWeather, ProviderError>;
}

/// Failures reported by a [`WeatherProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No place matched the query.
    #[error("no location matches '{query}'")]
    NotFound {
        /// Query as submitted.
        query: String,
    },
    /// The HTTP exchange failed or returned an error status.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        /// Upstream endpoint.
        endpoint: &'static str,
        /// Transport or status error.
        #[source]
        source: Box<ureq::Error>,
    },
    /// The response body could not be read.
    #[error("failed to read response from {endpoint}: {source}")]
    Read {
        /// Upstream endpoint.
        endpoint: &'static str,
        /// Read error.
        #[source]
        source: io::Error,
    },
    /// The response body is not the expected JSON.
    #[error("unexpected payload from {endpoint}: {message}")]
    Payload {
        /// Upstream endpoint.
        endpoint: &'static str,
        /// Decoder explanation.
        message: String,
    },
}
