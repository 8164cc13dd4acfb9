//! Typed views of the server's operation results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of the `tools.list` catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Operation name to pass as `tool`.
    pub name: String,
    /// Argument names mapped to type labels.
    #[serde(default)]
    pub args: BTreeMap<String, String>,
    /// Result fields mapped to type labels.
    #[serde(default)]
    pub returns: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolList {
    pub(crate) tools: Vec<ToolDescriptor>,
}

/// Result of `get_weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Location as queried.
    pub location: String,
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
    /// Relative humidity in percent, if known.
    pub humidity: Option<f64>,
    /// Description of the conditions.
    pub condition: String,
    /// Wind speed in kilometres per hour, if known.
    pub wind_kph: Option<f64>,
    /// Local observation time.
    pub updated_at: String,
}
