use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Sentinel the provider writes for an unmeasured temperature,
/// precipitation or wind speed value.
pub const MISSING_METRIC: f64 = -999.0;
/// Sentinel for an unmeasured humidity value.
pub const MISSING_HUMIDITY: f64 = -1.0;
/// Sentinel for an unmeasured pressure value.
pub const MISSING_PRESSURE: f64 = 0.0;

/// One weather sample as delivered by the provider. Numeric fields carry
/// per-field sentinels instead of being optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "missing_metric")]
    pub temperature: f64,
    #[serde(default = "missing_humidity")]
    pub humidity: f64,
    #[serde(default = "missing_metric")]
    pub precipitation: f64,
    #[serde(default = "missing_metric")]
    pub wind_speed: f64,
    #[serde(default = "missing_pressure")]
    pub pressure: f64,
}

fn missing_metric() -> f64 {
    MISSING_METRIC
}

fn missing_humidity() -> f64 {
    MISSING_HUMIDITY
}

fn missing_pressure() -> f64 {
    MISSING_PRESSURE
}

impl Default for RawObservation {
    fn default() -> Self {
        RawObservation {
            code: None,
            label: None,
            temperature: MISSING_METRIC,
            humidity: MISSING_HUMIDITY,
            precipitation: MISSING_METRIC,
            wind_speed: MISSING_METRIC,
            pressure: MISSING_PRESSURE,
        }
    }
}

/// Canonical weather bucket every provider signal is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCategory {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Foggy,
    Storm,
    ClearNight,
    CloudyNight,
    Severe,
    Unknown,
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rainy => "rainy",
            WeatherCategory::Snowy => "snowy",
            WeatherCategory::Foggy => "foggy",
            WeatherCategory::Storm => "storm",
            WeatherCategory::ClearNight => "clear-night",
            WeatherCategory::CloudyNight => "cloudy-night",
            WeatherCategory::Severe => "severe",
            WeatherCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Narrow condition nested inside a category band. An override keeps the
/// base category but swaps the mascot's mood and phrase pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubBand {
    Heatwave,
    Fog,
    HeavyRain,
    HeavySnow,
}

struct CodeBand {
    range: RangeInclusive<i32>,
    category: WeatherCategory,
    overrides: &'static [(RangeInclusive<i32>, SubBand)],
}

/// Provider code scheme: contiguous hundred-wide bands with narrow
/// sub-ranges nested inside them.
const CODE_BANDS: &[CodeBand] = &[
    CodeBand {
        range: 100..=199,
        category: WeatherCategory::Sunny,
        overrides: &[(150..=159, SubBand::Heatwave)],
    },
    CodeBand {
        range: 200..=299,
        category: WeatherCategory::Cloudy,
        overrides: &[(241..=241, SubBand::Fog)],
    },
    CodeBand {
        range: 300..=399,
        category: WeatherCategory::Rainy,
        overrides: &[(350..=399, SubBand::HeavyRain)],
    },
    CodeBand {
        range: 400..=499,
        category: WeatherCategory::Snowy,
        overrides: &[(450..=499, SubBand::HeavySnow)],
    },
    CodeBand {
        range: 500..=599,
        category: WeatherCategory::Storm,
        overrides: &[],
    },
    CodeBand {
        range: 600..=699,
        category: WeatherCategory::ClearNight,
        overrides: &[],
    },
    CodeBand {
        range: 700..=799,
        category: WeatherCategory::CloudyNight,
        overrides: &[],
    },
    CodeBand {
        range: 800..=899,
        category: WeatherCategory::Severe,
        overrides: &[],
    },
];

/// Keyword table for free-form labels, checked in order, first match wins.
/// Compound phrases sit above the single words they contain.
const LABEL_RULES: &[(&str, WeatherCategory)] = &[
    ("thunder", WeatherCategory::Storm),
    ("storm", WeatherCategory::Storm),
    ("severe", WeatherCategory::Severe),
    ("warning", WeatherCategory::Severe),
    ("cloudy night", WeatherCategory::CloudyNight),
    ("clear night", WeatherCategory::ClearNight),
    ("starry", WeatherCategory::ClearNight),
    ("fog", WeatherCategory::Foggy),
    ("mist", WeatherCategory::Foggy),
    ("haze", WeatherCategory::Foggy),
    ("snow", WeatherCategory::Snowy),
    ("blizzard", WeatherCategory::Snowy),
    ("rain", WeatherCategory::Rainy),
    ("shower", WeatherCategory::Rainy),
    ("drizzle", WeatherCategory::Rainy),
    ("night", WeatherCategory::ClearNight),
    ("cloud", WeatherCategory::Cloudy),
    ("overcast", WeatherCategory::Cloudy),
    ("sun", WeatherCategory::Sunny),
    ("clear", WeatherCategory::Sunny),
    ("fine", WeatherCategory::Sunny),
];

/// A normalized reading: canonical category plus metrics with the provider
/// sentinels already filtered out. Threshold logic downstream only ever
/// sees `Some(value)` for metrics that were actually measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub category: WeatherCategory,
    pub sub_band: Option<SubBand>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
}

impl WeatherReading {
    /// Convenience constructor for a category with no measured metrics.
    pub fn bare(category: WeatherCategory) -> Self {
        WeatherReading {
            category,
            sub_band: None,
            temperature: None,
            humidity: None,
            precipitation: None,
            wind_speed: None,
            pressure: None,
        }
    }
}

pub fn classify_code(code: i32) -> (WeatherCategory, Option<SubBand>) {
    for band in CODE_BANDS {
        if band.range.contains(&code) {
            let sub_band = band
                .overrides
                .iter()
                .find(|(range, _)| range.contains(&code))
                .map(|(_, sub)| *sub);
            return (band.category, sub_band);
        }
    }
    (WeatherCategory::Unknown, None)
}

pub fn classify_label(label: &str) -> WeatherCategory {
    let lower = label.to_lowercase();
    for (keyword, category) in LABEL_RULES {
        if lower.contains(keyword) {
            return *category;
        }
    }
    WeatherCategory::Unknown
}

fn filter_sentinel(value: f64, sentinel: f64) -> Option<f64> {
    if value == sentinel || value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Normalize a raw provider sample. Sentinel filtering happens here, before
/// any banding or threshold comparison can see the values.
pub fn normalize(raw: &RawObservation) -> WeatherReading {
    let temperature = filter_sentinel(raw.temperature, MISSING_METRIC);
    let humidity = filter_sentinel(raw.humidity, MISSING_HUMIDITY);
    let precipitation = filter_sentinel(raw.precipitation, MISSING_METRIC);
    let wind_speed = filter_sentinel(raw.wind_speed, MISSING_METRIC);
    let pressure = filter_sentinel(raw.pressure, MISSING_PRESSURE);

    let (category, sub_band) = match (raw.code, raw.label.as_deref()) {
        (Some(code), _) => classify_code(code),
        (None, Some(label)) => (classify_label(label), None),
        (None, None) => (WeatherCategory::Unknown, None),
    };

    WeatherReading {
        category,
        sub_band,
        temperature,
        humidity,
        precipitation,
        wind_speed,
        pressure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_bands() {
        assert_eq!(classify_code(110), (WeatherCategory::Sunny, None));
        assert_eq!(classify_code(230), (WeatherCategory::Cloudy, None));
        assert_eq!(classify_code(310), (WeatherCategory::Rainy, None));
        assert_eq!(classify_code(420), (WeatherCategory::Snowy, None));
        assert_eq!(classify_code(505), (WeatherCategory::Storm, None));
        assert_eq!(classify_code(650), (WeatherCategory::ClearNight, None));
        assert_eq!(classify_code(750), (WeatherCategory::CloudyNight, None));
        assert_eq!(classify_code(820), (WeatherCategory::Severe, None));
        assert_eq!(classify_code(42), (WeatherCategory::Unknown, None));
        assert_eq!(classify_code(950), (WeatherCategory::Unknown, None));
    }

    #[test]
    fn test_sub_band_overrides() {
        assert_eq!(
            classify_code(155),
            (WeatherCategory::Sunny, Some(SubBand::Heatwave))
        );
        assert_eq!(
            classify_code(241),
            (WeatherCategory::Cloudy, Some(SubBand::Fog))
        );
        assert_eq!(
            classify_code(350),
            (WeatherCategory::Rainy, Some(SubBand::HeavyRain))
        );
        assert_eq!(
            classify_code(480),
            (WeatherCategory::Snowy, Some(SubBand::HeavySnow))
        );
        // Band edges just outside the override stay on the base category
        assert_eq!(classify_code(149), (WeatherCategory::Sunny, None));
        assert_eq!(classify_code(160), (WeatherCategory::Sunny, None));
        assert_eq!(classify_code(240), (WeatherCategory::Cloudy, None));
        assert_eq!(classify_code(349), (WeatherCategory::Rainy, None));
    }

    #[test]
    fn test_label_keywords() {
        assert_eq!(classify_label("Light rain showers"), WeatherCategory::Rainy);
        assert_eq!(classify_label("Partly cloudy"), WeatherCategory::Cloudy);
        assert_eq!(classify_label("Clear skies"), WeatherCategory::Sunny);
        assert_eq!(classify_label("Dense fog"), WeatherCategory::Foggy);
        assert_eq!(classify_label("gibberish"), WeatherCategory::Unknown);
    }

    #[test]
    fn test_label_compound_phrases_win() {
        // "thunderstorm with rain" must not land in the rainy bucket
        assert_eq!(
            classify_label("Thunderstorm with rain"),
            WeatherCategory::Storm
        );
        assert_eq!(classify_label("Clear night"), WeatherCategory::ClearNight);
        assert_eq!(classify_label("Cloudy night"), WeatherCategory::CloudyNight);
    }

    #[test]
    fn test_sentinels_are_filtered() {
        let raw = RawObservation {
            code: Some(110),
            temperature: MISSING_METRIC,
            humidity: MISSING_HUMIDITY,
            precipitation: 2.5,
            wind_speed: MISSING_METRIC,
            pressure: MISSING_PRESSURE,
            ..RawObservation::default()
        };
        let reading = normalize(&raw);
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.precipitation, Some(2.5));
        assert_eq!(reading.wind_speed, None);
        assert_eq!(reading.pressure, None);
    }

    #[test]
    fn test_code_takes_precedence_over_label() {
        let raw = RawObservation {
            code: Some(320),
            label: Some("sunny".to_string()),
            ..RawObservation::default()
        };
        assert_eq!(normalize(&raw).category, WeatherCategory::Rainy);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let reading = normalize(&RawObservation::default());
        assert_eq!(reading.category, WeatherCategory::Unknown);
        assert_eq!(reading.sub_band, None);
    }
}
