//! The `get_weather` operation and its data-provider collaborator.

mod conditions;
mod open_meteo;
mod provider;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use wxrpc_protocol::Arguments;

use crate::dispatch::{DispatchError, Operation, OperationDescriptor};

pub use self::conditions::describe_weather_code;
pub use self::open_meteo::{FORECAST_URL, GEOCODING_URL, OpenMeteoProvider};
#[cfg(test)]
pub use self::provider::MockWeatherProvider;
pub use self::provider::{CurrentWeather, Location, ProviderError, WeatherProvider};

const WEATHER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::weather");

/// Operation name published by [`GetWeather`].
pub const GET_WEATHER: &str = "get_weather";

/// Looks up the current weather for a city name.
#[derive(Debug)]
pub struct GetWeather<P> {
    provider: P,
}

impl<P: WeatherProvider> GetWeather<P> {
    /// Wraps a provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    fn lookup(&self, query: &str) -> Result<WeatherResult, ProviderError> {
        let location = self.provider.geocode(query)?;
        let current = self.provider.current_weather(&location)?;
        Ok(WeatherResult {
            location: query.to_owned(),
            temp_c: current.temp_c,
            humidity: current.humidity,
            condition: current.condition,
            wind_kph: current.wind_kph,
            updated_at: current.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
struct WeatherResult {
    location: String,
    temp_c: f64,
    humidity: Option<f64>,
    condition: String,
    wind_kph: Option<f64>,
    updated_at: String,
}

impl<P: WeatherProvider> Operation for GetWeather<P> {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(GET_WEATHER)
            .arg("q", "string")
            .returns("location", "string")
            .returns("temp_c", "number")
            .returns("humidity", "number?")
            .returns("condition", "string")
            .returns("wind_kph", "number?")
            .returns("updated_at", "string")
    }

    fn invoke(&self, arguments: &Arguments) -> Result<Value, DispatchError> {
        let query = arguments.optional_str("q")?.map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Err(DispatchError::invalid_arguments("missing parameter q (city name)"));
        }

        let report = self.lookup(query).map_err(|error| {
            warn!(target: WEATHER_TARGET, query, %error, "weather lookup failed");
            DispatchError::upstream_unavailable(format!(
                "city not found or no data available ({query})"
            ))
        })?;
        serde_json::to_value(report).map_err(|error| DispatchError::internal(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn lima() -> Location {
        Location {
            name: "Lima".to_owned(),
            latitude: -12.04,
            longitude: -77.03,
        }
    }

    fn overcast(humidity: Option<f64>) -> CurrentWeather {
        CurrentWeather {
            temp_c: 18.4,
            humidity,
            condition: "overcast".to_owned(),
            wind_kph: Some(9.7),
            updated_at: "2024-05-01T13:00".to_owned(),
        }
    }

    #[test]
    fn reports_weather_for_trimmed_query() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_geocode()
            .withf(|query| query == "Lima")
            .times(1)
            .returning(|_| Ok(lima()));
        provider
            .expect_current_weather()
            .with(eq(lima()))
            .times(1)
            .returning(|_| Ok(overcast(Some(81.0))));

        let result = GetWeather::new(provider)
            .invoke(&Arguments::new().with("q", "  Lima "))
            .expect("lookup succeeds");
        assert_eq!(
            result,
            json!({
                "location": "Lima",
                "temp_c": 18.4,
                "humidity": 81.0,
                "condition": "overcast",
                "wind_kph": 9.7,
                "updated_at": "2024-05-01T13:00"
            })
        );
    }

    #[test]
    fn unaligned_humidity_is_null() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_geocode().returning(|_| Ok(lima()));
        provider
            .expect_current_weather()
            .returning(|_| Ok(overcast(None)));

        let result = GetWeather::new(provider)
            .invoke(&Arguments::new().with("q", "Lima"))
            .expect("lookup succeeds");
        assert_eq!(result["humidity"], Value::Null);
        assert_eq!(result["temp_c"], 18.4);
    }

    #[rstest]
    #[case::missing(Arguments::new())]
    #[case::empty(Arguments::new().with("q", ""))]
    #[case::blank(Arguments::new().with("q", "   "))]
    #[case::null(Arguments::new().with("q", Value::Null))]
    fn empty_query_is_rejected_without_calling_provider(#[case] arguments: Arguments) {
        let mut provider = MockWeatherProvider::new();
        provider.expect_geocode().never();
        provider.expect_current_weather().never();

        let error = GetWeather::new(provider)
            .invoke(&arguments)
            .expect_err("query is required");
        assert_eq!(
            error.to_string(),
            "invalid arguments: missing parameter q (city name)"
        );
    }

    #[test]
    fn non_string_query_is_rejected() {
        let provider = MockWeatherProvider::new();
        let error = GetWeather::new(provider)
            .invoke(&Arguments::new().with("q", 42))
            .expect_err("q must be a string");
        assert!(matches!(error, DispatchError::InvalidArguments { .. }));
    }

    #[test]
    fn unknown_city_is_upstream_unavailable() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_geocode().returning(|query| {
            Err(ProviderError::NotFound {
                query: query.to_owned(),
            })
        });
        provider.expect_current_weather().never();

        let error = GetWeather::new(provider)
            .invoke(&Arguments::new().with("q", "Atlantis"))
            .expect_err("no such city");
        assert_eq!(
            error,
            DispatchError::upstream_unavailable("city not found or no data available (Atlantis)")
        );
    }

    #[test]
    fn forecast_failure_is_upstream_unavailable() {
        let mut provider = MockWeatherProvider::new();
        provider.expect_geocode().returning(|_| Ok(lima()));
        provider.expect_current_weather().returning(|_| {
            Err(ProviderError::Payload {
                endpoint: FORECAST_URL,
                message: "missing current_weather".to_owned(),
            })
        });

        let error = GetWeather::new(provider)
            .invoke(&Arguments::new().with("q", "Lima"))
            .expect_err("forecast failed");
        assert!(matches!(error, DispatchError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn descriptor_declares_argument_and_result_shape() {
        let descriptor = GetWeather::new(MockWeatherProvider::new()).descriptor();
        let value = serde_json::to_value(&descriptor).expect("serialise");
        assert_eq!(value["name"], GET_WEATHER);
        assert_eq!(value["args"], json!({"q": "string"}));
        assert_eq!(value["returns"]["humidity"], "number?");
    }
}
