use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::weather::{SubBand, WeatherCategory, WeatherReading};

/// The mascot's mood. Exactly one label per computation, never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Neutral,
    Happy,
    Calm,
    Sad,
    Excited,
    Surprised,
    Hot,
    Cold,
    Freezing,
    Mysterious,
    Worried,
    Amazed,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Surprised => "surprised",
            Mood::Hot => "hot",
            Mood::Cold => "cold",
            Mood::Freezing => "freezing",
            Mood::Mysterious => "mysterious",
            Mood::Worried => "worried",
            Mood::Amazed => "amazed",
        };
        write!(f, "{}", name)
    }
}

impl Mood {
    pub fn emoji(&self) -> &str {
        match self {
            Mood::Neutral => "😐",
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Sad => "😢",
            Mood::Excited => "🤩",
            Mood::Surprised => "😲",
            Mood::Hot => "🥵",
            Mood::Cold => "🥶",
            Mood::Freezing => "🧊",
            Mood::Mysterious => "🌫️",
            Mood::Worried => "😟",
            Mood::Amazed => "✨",
        }
    }
}

/// Snapshot of the mascot, recomputed from scratch on every call. The three
/// vitals are always inside [0,100] once a computation returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MascotState {
    pub mood: Mood,
    pub energy: i32,
    pub happiness: i32,
    pub comfort: i32,
    pub reaction: String,
    pub recommendations: Vec<String>,
}

struct MoodEffect {
    mood: Mood,
    energy: i32,
    happiness: i32,
    comfort: i32,
}

fn category_effect(category: WeatherCategory) -> MoodEffect {
    match category {
        WeatherCategory::Sunny => MoodEffect {
            mood: Mood::Happy,
            energy: 25,
            happiness: 35,
            comfort: 0,
        },
        WeatherCategory::Cloudy => MoodEffect {
            mood: Mood::Calm,
            energy: 5,
            happiness: 5,
            comfort: 0,
        },
        WeatherCategory::Rainy => MoodEffect {
            mood: Mood::Sad,
            energy: -15,
            happiness: -25,
            comfort: 0,
        },
        WeatherCategory::Snowy => MoodEffect {
            mood: Mood::Excited,
            energy: 15,
            happiness: 20,
            comfort: 0,
        },
        WeatherCategory::Storm => MoodEffect {
            mood: Mood::Surprised,
            energy: 10,
            happiness: -10,
            comfort: -20,
        },
        WeatherCategory::Foggy => MoodEffect {
            mood: Mood::Mysterious,
            energy: 0,
            happiness: 0,
            comfort: -5,
        },
        WeatherCategory::ClearNight => MoodEffect {
            mood: Mood::Calm,
            energy: -10,
            happiness: 10,
            comfort: 5,
        },
        WeatherCategory::CloudyNight => MoodEffect {
            mood: Mood::Calm,
            energy: -10,
            happiness: 0,
            comfort: 0,
        },
        WeatherCategory::Severe => MoodEffect {
            mood: Mood::Worried,
            energy: -25,
            happiness: -35,
            comfort: -30,
        },
        WeatherCategory::Unknown => MoodEffect {
            mood: Mood::Neutral,
            energy: 0,
            happiness: 0,
            comfort: 0,
        },
    }
}

// An override replaces the mood and adds its deltas on top of the base
// category deltas.
fn sub_band_effect(sub_band: SubBand) -> MoodEffect {
    match sub_band {
        SubBand::Heatwave => MoodEffect {
            mood: Mood::Hot,
            energy: -10,
            happiness: 0,
            comfort: -20,
        },
        SubBand::Fog => MoodEffect {
            mood: Mood::Mysterious,
            energy: 0,
            happiness: 0,
            comfort: -5,
        },
        SubBand::HeavyRain => MoodEffect {
            mood: Mood::Worried,
            energy: -25,
            happiness: -35,
            comfort: -30,
        },
        SubBand::HeavySnow => MoodEffect {
            mood: Mood::Amazed,
            energy: 10,
            happiness: 0,
            comfort: -15,
        },
    }
}

fn reaction_pool(category: WeatherCategory, sub_band: Option<SubBand>) -> &'static [&'static str] {
    if let Some(sub_band) = sub_band {
        return match sub_band {
            SubBand::Heatwave => &[
                "It's a scorcher out there... I'm melting!",
                "This heat! Let's find some shade, quick.",
                "Phew... even the pavement is shimmering today.",
            ],
            SubBand::Fog => &[
                "Ooh, everything looks so mysterious in this fog...",
                "I can barely see past my nose! Spooky.",
                "The world turned soft and gray today.",
            ],
            SubBand::HeavyRain => &[
                "This rain is really coming down... stay safe, okay?",
                "I'm a little worried about this downpour.",
                "Maybe we should just stay in until it calms down.",
            ],
            SubBand::HeavySnow => &[
                "Wow, look at it snow! It's like a postcard out there!",
                "So much snow... it's beautiful, but bundle up!",
                "A real winter wonderland! Watch your step though.",
            ],
        };
    }
    match category {
        WeatherCategory::Sunny => &[
            "What a gorgeous day! Let's soak up some sun!",
            "The sky is so blue today, it makes me want to sing!",
            "Sunshine always puts a spring in my step!",
        ],
        WeatherCategory::Cloudy => &[
            "A calm, gray kind of day. Kind of cozy, isn't it?",
            "The clouds are drifting by so slowly today.",
            "Soft light today. Easy on the eyes!",
        ],
        WeatherCategory::Rainy => &[
            "Rain again... at least the plants are happy.",
            "The sound of rain makes me a little sleepy.",
            "Pitter-patter... let's stay dry today.",
        ],
        WeatherCategory::Snowy => &[
            "Snow! Snow! Can we build a snowman?",
            "Every snowflake is different, you know!",
            "It's snowing! My favorite kind of magic.",
        ],
        WeatherCategory::Foggy => &[
            "Ooh, everything looks so mysterious in this fog...",
            "I can barely see past my nose! Spooky.",
            "The world turned soft and gray today.",
        ],
        WeatherCategory::Storm => &[
            "Whoa, did you hear that thunder?!",
            "The sky is putting on quite a show today!",
            "Lightning! Let's watch from somewhere safe.",
        ],
        WeatherCategory::ClearNight => &[
            "The stars are out tonight... make a wish!",
            "Such a clear night. Perfect for stargazing.",
            "The moon looks lovely this evening.",
        ],
        WeatherCategory::CloudyNight => &[
            "A quiet, cloudy night. Good for winding down.",
            "No stars tonight, but that's okay. Cozy vibes.",
            "The night sky is all tucked in under clouds.",
        ],
        WeatherCategory::Severe => &[
            "This weather looks serious... please be careful.",
            "Let's stay inside until things settle down.",
            "I don't like the look of this at all. Safety first!",
        ],
        WeatherCategory::Unknown => &[
            "Hmm, I'm not sure what the sky is doing today.",
            "Mystery weather! Let's peek out the window together.",
            "No reading yet, but I'm sure it's a fine day somewhere.",
        ],
    }
}

/// Derives the mascot's mood, vitals, reaction phrase and recommendations
/// from a normalized weather reading. Pure apart from phrase selection,
/// which draws from the engine's own seedable generator.
pub struct MascotEngine {
    rng: StdRng,
}

impl MascotEngine {
    pub fn new() -> Self {
        MascotEngine {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed seed reproduces identical phrase picks for identical inputs.
    pub fn with_seed(seed: u64) -> Self {
        MascotEngine {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&mut self, weather: &WeatherReading) -> MascotState {
        let mut energy: i32 = 50;
        let mut happiness: i32 = 50;
        let mut comfort: i32 = 50;

        // Category layer, with the sub-band override stacked on top
        let base = category_effect(weather.category);
        let mut mood = base.mood;
        energy += base.energy;
        happiness += base.happiness;
        comfort += base.comfort;
        if let Some(sub_band) = weather.sub_band {
            let over = sub_band_effect(sub_band);
            mood = over.mood;
            energy += over.energy;
            happiness += over.happiness;
            comfort += over.comfort;
        }

        // Temperature layer. The extremes overwrite whatever the category
        // layer chose; the mild-cold band only claims a still-neutral mood.
        if let Some(t) = weather.temperature {
            if t < 0.0 {
                mood = Mood::Freezing;
                energy -= 20;
                comfort -= 30;
            } else if t < 10.0 {
                energy -= 10;
                comfort -= 15;
                if mood == Mood::Neutral {
                    mood = Mood::Cold;
                }
            } else if t > 35.0 {
                mood = Mood::Hot;
                energy -= 15;
                comfort -= 25;
            } else if t > 28.0 {
                energy -= 5;
                comfort -= 10;
            }
        }

        // Humidity layer
        if let Some(h) = weather.humidity {
            if h > 80.0 {
                comfort -= 20;
                energy -= 10;
            } else if h < 30.0 {
                comfort -= 10;
            }
        }

        // Precipitation layer
        if let Some(p) = weather.precipitation {
            if p > 10.0 {
                happiness -= 15;
                energy -= 10;
            } else if p > 0.0 {
                happiness -= 5;
            }
        }

        // Wind layer. A moderate breeze lifts energy; strong wind drains it.
        if let Some(w) = weather.wind_speed {
            if w > 10.0 {
                energy -= 5;
                comfort -= 10;
            } else if w > 5.0 {
                energy += 5;
            }
        }

        // Pressure layer
        if let Some(p) = weather.pressure {
            if p < 1000.0 {
                comfort -= 10;
            } else if p > 1025.0 {
                comfort += 5;
            }
        }

        MascotState {
            mood,
            energy: energy.clamp(0, 100),
            happiness: happiness.clamp(0, 100),
            comfort: comfort.clamp(0, 100),
            reaction: self.pick_reaction(weather),
            recommendations: build_recommendations(weather),
        }
    }

    // The pool starts category-appropriate and gains bonus entries behind
    // the same thresholds the vitals use, so a bonus phrase is eligible but
    // never guaranteed to win the draw.
    fn pick_reaction(&mut self, weather: &WeatherReading) -> String {
        let mut pool: Vec<&str> = reaction_pool(weather.category, weather.sub_band).to_vec();

        if let Some(t) = weather.temperature {
            if t > 35.0 {
                pool.push("It's way too hot to think straight...");
            }
            if t < 0.0 {
                pool.push("Brrr! My nose feels like an icicle!");
            }
        }
        if let Some(p) = weather.precipitation {
            if p > 10.0 {
                pool.push("That's a serious amount of rain out there.");
            }
        }
        if let Some(w) = weather.wind_speed {
            if w > 10.0 {
                pool.push("Hold onto your hat, the wind means business!");
            }
        }
        if let Some(p) = weather.pressure {
            if p < 1000.0 {
                pool.push("The air feels heavy today... low pressure, maybe?");
            }
        }

        pool.choose(&mut self.rng)
            .map(|phrase| phrase.to_string())
            .unwrap_or_default()
    }
}

impl Default for MascotEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Append-only, in the same order the vitals layers run. Duplicates are kept
// when several bands hand out the same advice.
fn build_recommendations(weather: &WeatherReading) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    match weather.category {
        WeatherCategory::Sunny => recs.push("Sunscreen wouldn't hurt today".to_string()),
        WeatherCategory::Cloudy => recs.push("A light jacket should be plenty".to_string()),
        WeatherCategory::Rainy => recs.push("Don't forget your umbrella".to_string()),
        WeatherCategory::Snowy => recs.push("Wear boots with good grip".to_string()),
        WeatherCategory::Foggy => recs.push("Allow extra time if you're driving".to_string()),
        WeatherCategory::Storm => recs.push("Stay away from open fields and tall trees".to_string()),
        WeatherCategory::ClearNight => recs.push("A great night to look at the stars".to_string()),
        WeatherCategory::CloudyNight => recs.push("A calm evening for an early night".to_string()),
        WeatherCategory::Severe => recs.push("Check the local advisories before heading out".to_string()),
        WeatherCategory::Unknown => {}
    }
    if matches!(weather.sub_band, Some(SubBand::HeavyRain) | Some(SubBand::HeavySnow)) {
        recs.push("Avoid unnecessary travel if you can".to_string());
    }

    if let Some(t) = weather.temperature {
        if t < 0.0 {
            recs.push("Bundle up: heavy coat, gloves and a scarf".to_string());
        } else if t < 10.0 {
            recs.push("A warm jacket is a good idea".to_string());
        } else if t > 35.0 {
            recs.push("Keep water with you and stay in the shade".to_string());
        } else if t > 28.0 {
            recs.push("Light, breathable clothes will help".to_string());
        }
    }

    if let Some(h) = weather.humidity {
        if h > 80.0 {
            recs.push("It's muggy, so pace yourself".to_string());
        } else if h < 30.0 {
            recs.push("Dry air today, keep lip balm handy".to_string());
        }
    }

    if let Some(p) = weather.precipitation {
        if p > 10.0 {
            recs.push("Waterproof shoes will save your socks".to_string());
        } else if p > 0.0 {
            recs.push("Don't forget your umbrella".to_string());
        }
    }

    if let Some(w) = weather.wind_speed {
        if w > 10.0 {
            recs.push("Secure loose items, it's blustery out".to_string());
        } else if w > 5.0 {
            recs.push("A pleasant breeze, nice for a walk".to_string());
        }
    }

    if let Some(p) = weather.pressure {
        if p < 1000.0 {
            recs.push("Low pressure can bring headaches, take it easy".to_string());
        } else if p > 1025.0 {
            recs.push("High pressure usually means stable skies".to_string());
        }
    }

    match weather.category {
        WeatherCategory::Sunny => recs.push("Perfect day for a picnic or a stroll".to_string()),
        WeatherCategory::Rainy | WeatherCategory::Severe => {
            recs.push("A good day for books, tea and indoor plans".to_string())
        }
        WeatherCategory::Snowy => recs.push("Build a snowman while it lasts".to_string()),
        _ => {}
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherReading;

    fn reading(category: WeatherCategory) -> WeatherReading {
        WeatherReading::bare(category)
    }

    #[test]
    fn test_sunny_mild_day() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Sunny);
        weather.temperature = Some(20.0);

        let state = engine.state(&weather);
        assert_eq!(state.mood, Mood::Happy);
        assert_eq!(state.energy, 75);
        assert_eq!(state.happiness, 85);
        assert_eq!(state.comfort, 50);
    }

    #[test]
    fn test_severe_rain_override() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Rainy);
        weather.sub_band = Some(SubBand::HeavyRain);

        let state = engine.state(&weather);
        assert_eq!(state.mood, Mood::Worried);
        assert_eq!(state.energy, 10);
        assert_eq!(state.happiness, 0); // -10 before the clamp
        assert_eq!(state.comfort, 20);
    }

    #[test]
    fn test_zero_degrees_is_not_freezing() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Unknown);
        weather.temperature = Some(0.0);

        let state = engine.state(&weather);
        // 0°C lands in the mild-cold band, which may claim a neutral mood
        assert_eq!(state.mood, Mood::Cold);
        assert_eq!(state.energy, 40);
        assert_eq!(state.comfort, 35);
    }

    #[test]
    fn test_mild_cold_does_not_steal_mood() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Rainy);
        weather.temperature = Some(5.0);

        let state = engine.state(&weather);
        assert_eq!(state.mood, Mood::Sad);
    }

    #[test]
    fn test_temperature_extremes_override_mood() {
        let mut engine = MascotEngine::with_seed(7);

        let mut weather = reading(WeatherCategory::Sunny);
        weather.temperature = Some(-5.0);
        assert_eq!(engine.state(&weather).mood, Mood::Freezing);

        let mut weather = reading(WeatherCategory::Rainy);
        weather.temperature = Some(38.0);
        assert_eq!(engine.state(&weather).mood, Mood::Hot);
    }

    #[test]
    fn test_vitals_always_clamped() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Severe);
        weather.temperature = Some(-10.0);
        weather.humidity = Some(95.0);
        weather.precipitation = Some(30.0);
        weather.wind_speed = Some(25.0);
        weather.pressure = Some(980.0);

        let state = engine.state(&weather);
        for vital in [state.energy, state.happiness, state.comfort] {
            assert!((0..=100).contains(&vital));
        }
        assert_eq!(state.energy, 0);
        assert_eq!(state.happiness, 0);
    }

    #[test]
    fn test_moderate_wind_is_a_net_positive() {
        let mut engine = MascotEngine::with_seed(7);
        let mut weather = reading(WeatherCategory::Cloudy);
        weather.wind_speed = Some(7.0);
        assert_eq!(engine.state(&weather).energy, 60);

        weather.wind_speed = Some(12.0);
        assert_eq!(engine.state(&weather).energy, 50);
    }

    #[test]
    fn test_sentinel_free_missing_metrics_add_nothing() {
        let mut engine = MascotEngine::with_seed(7);
        let state = engine.state(&reading(WeatherCategory::Cloudy));
        assert_eq!(state.energy, 55);
        assert_eq!(state.happiness, 55);
        assert_eq!(state.comfort, 50);
    }

    #[test]
    fn test_same_seed_same_reaction() {
        let mut weather = reading(WeatherCategory::Snowy);
        weather.temperature = Some(-3.0);

        let mut a = MascotEngine::with_seed(42);
        let mut b = MascotEngine::with_seed(42);
        assert_eq!(a.state(&weather).reaction, b.state(&weather).reaction);
    }

    #[test]
    fn test_duplicate_recommendations_are_kept() {
        // Rainy category and light precipitation both hand out the umbrella
        // line; the list intentionally keeps both copies.
        let mut weather = reading(WeatherCategory::Rainy);
        weather.precipitation = Some(1.0);

        let recs = build_recommendations(&weather);
        let umbrellas = recs
            .iter()
            .filter(|r| r.as_str() == "Don't forget your umbrella")
            .count();
        assert_eq!(umbrellas, 2);
    }

    #[test]
    fn test_recommendation_order_follows_layers() {
        let mut weather = reading(WeatherCategory::Rainy);
        weather.temperature = Some(5.0);
        weather.precipitation = Some(12.0);

        let recs = build_recommendations(&weather);
        assert_eq!(recs[0], "Don't forget your umbrella");
        assert_eq!(recs[1], "A warm jacket is a good idea");
        assert_eq!(recs[2], "Waterproof shoes will save your socks");
    }
}
