use serde::{Deserialize, Serialize};

/// Optional per-user tuning for the reply composer. Every field falls back
/// to its own default independently, so a partial preferences object is
/// always valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub temperature: TemperatureTolerance,
    #[serde(default)]
    pub activity: ActivityPreference,
    #[serde(default)]
    pub style: SpeechStyle,
    #[serde(default)]
    pub sensitivity: WeatherSensitivity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureTolerance {
    PrefersCool,
    #[default]
    Neutral,
    PrefersWarm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPreference {
    Indoor,
    Outdoor,
    #[default]
    Either,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechStyle {
    #[default]
    Casual,
    Polite,
    Cheerful,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSensitivity {
    Low,
    #[default]
    Normal,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_default_independently() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"activity": "indoor"}"#).unwrap();
        assert_eq!(prefs.activity, ActivityPreference::Indoor);
        assert_eq!(prefs.temperature, TemperatureTolerance::Neutral);
        assert_eq!(prefs.style, SpeechStyle::Casual);
        assert_eq!(prefs.sensitivity, WeatherSensitivity::Normal);
    }
}
