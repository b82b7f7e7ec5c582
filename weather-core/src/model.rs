use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit suffix appended to hourly temperatures.
pub const CELSIUS: &str = "°C";

/// Scalar value sent by the backend for display.
///
/// The backend may send a number or a pre-formatted string; the client never
/// interprets it beyond turning it into text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
    Missing,
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => write_number(f, *n),
            DisplayValue::Text(s) => f.write_str(s),
            DisplayValue::Missing => Ok(()),
        }
    }
}

/// Number-to-text conversion as a browser does it: plain decimal for
/// magnitudes in `[1e-6, 1e21)`, exponent form (`1e+21`, `1.5e-7`) outside.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n == 0.0 {
        return f.write_str("0");
    }
    let magnitude = n.abs();
    if magnitude.is_finite() && !(1e-6..1e21).contains(&magnitude) {
        // `{:e}` prints the shortest digits but leaves positive exponents unsigned.
        let text = format!("{n:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&text),
        };
    }
    // f64's Display already drops a zero fraction: 20.0 -> "20".
    write!(f, "{n}")
}

impl From<f64> for DisplayValue {
    fn from(value: f64) -> Self {
        DisplayValue::Number(value)
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::Text(value.to_owned())
    }
}

/// Payload returned by `GET /weather?city=...` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub city: String,
    pub current_temp: DisplayValue,
    pub current_pressure: DisplayValue,
    pub current_rain: DisplayValue,
    pub tomorrow_min: DisplayValue,
    pub tomorrow_max: DisplayValue,
    pub hour_labels: Vec<String>,
    pub hour_temps: Vec<DisplayValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_humidity: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cloud: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_wind_speed: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_wind_direction: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hour_rain: Vec<DisplayValue>,
}

impl WeatherResponse {
    /// Whether every hour label has a matching temperature and vice versa.
    pub fn is_aligned(&self) -> bool {
        self.hour_labels.len() == self.hour_temps.len()
    }

    /// Rows for the hourly forecast, in label order.
    ///
    /// Only indices present in both `hour_labels` and `hour_temps` produce a
    /// row; trailing unmatched entries on either side are dropped.
    pub fn hourly_rows(&self) -> Vec<HourlyRow> {
        self.hour_labels
            .iter()
            .zip(&self.hour_temps)
            .enumerate()
            .map(|(idx, (label, temp))| HourlyRow {
                time: label.clone(),
                temp: format!("{temp}{CELSIUS}"),
                rain: self.hour_rain.get(idx).map(|rain| format!("{rain} mm")),
            })
            .collect()
    }
}

/// Body of a non-success response. `error` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// One rendered entry of the hourly forecast list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyRow {
    /// Text of the `hour-time` span.
    pub time: String,
    /// Text of the `hour-temp` span, unit included.
    pub temp: String,
    /// Text of the optional `hour-rain` span.
    pub rain: Option<String>,
}

impl fmt::Display for HourlyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.time, self.temp)?;
        if let Some(rain) = &self.rain {
            write!(f, " / {rain}")?;
        }
        Ok(())
    }
}
