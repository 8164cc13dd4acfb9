//! WMO weather interpretation codes.

/// Describes a WMO weather code in plain English.
///
/// Codes without a description render as `code <n>`.
#[must_use]
pub fn describe_weather_code(code: u16) -> String {
    let text = match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "drizzle",
        55 => "dense drizzle",
        61 => "light rain",
        63 => "rain",
        65 => "heavy rain",
        80 => "rain showers",
        95 => "thunderstorm",
        other => return format!("code {other}"),
    };
    text.to_owned()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "clear sky")]
    #[case(3, "overcast")]
    #[case(48, "depositing rime fog")]
    #[case(65, "heavy rain")]
    #[case(95, "thunderstorm")]
    #[case(77, "code 77")]
    fn describes_codes(#[case] code: u16, #[case] expected: &str) {
        assert_eq!(describe_weather_code(code), expected);
    }
}
