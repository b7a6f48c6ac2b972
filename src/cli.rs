use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;

use crate::config::Config;
use crate::conversation::{HistoryStore, Speaker};
use crate::mascot::MascotEngine;
use crate::persona::{ChatRequest, Companion};
use crate::weather::{
    normalize, RawObservation, MISSING_HUMIDITY, MISSING_METRIC, MISSING_PRESSURE,
};

#[derive(Parser)]
#[command(name = "skymood", about = "Weather-reactive virtual companion", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the companion
    Chat {
        /// Message to send
        message: String,
        #[command(flatten)]
        weather: WeatherArgs,
        /// Fixed seed for reproducible phrasing
        #[arg(long)]
        seed: Option<u64>,
        /// Generative backend used to rephrase the reply (openai, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Model override for the generative backend
        #[arg(long)]
        model: Option<String>,
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show the mascot's mood and vitals for a weather reading
    Mascot {
        #[command(flatten)]
        weather: WeatherArgs,
        /// Fixed seed for reproducible phrasing
        #[arg(long)]
        seed: Option<u64>,
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show or clear the stored conversation turns
    History {
        /// Remove all stored turns
        #[arg(long)]
        clear: bool,
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct WeatherArgs {
    /// Provider weather code (e.g. 110 for sunny)
    #[arg(long)]
    pub code: Option<i32>,
    /// Free-form weather label (e.g. "light rain")
    #[arg(long)]
    pub label: Option<String>,
    /// Temperature in °C
    #[arg(long)]
    pub temp: Option<f64>,
    /// Relative humidity in %
    #[arg(long)]
    pub humidity: Option<f64>,
    /// Precipitation in mm/h
    #[arg(long)]
    pub precip: Option<f64>,
    /// Wind speed in m/s
    #[arg(long)]
    pub wind: Option<f64>,
    /// Pressure in hPa
    #[arg(long)]
    pub pressure: Option<f64>,
}

impl WeatherArgs {
    /// None when no weather flag was given; chat then runs the no-weather
    /// path. Unset metrics go in as the provider sentinels.
    pub fn to_observation(&self) -> Option<RawObservation> {
        let any_given = self.code.is_some()
            || self.label.is_some()
            || self.temp.is_some()
            || self.humidity.is_some()
            || self.precip.is_some()
            || self.wind.is_some()
            || self.pressure.is_some();
        if !any_given {
            return None;
        }
        Some(RawObservation {
            code: self.code,
            label: self.label.clone(),
            temperature: self.temp.unwrap_or(MISSING_METRIC),
            humidity: self.humidity.unwrap_or(MISSING_HUMIDITY),
            precipitation: self.precip.unwrap_or(MISSING_METRIC),
            wind_speed: self.wind.unwrap_or(MISSING_METRIC),
            pressure: self.pressure.unwrap_or(MISSING_PRESSURE),
        })
    }
}

pub async fn handle_chat(
    message: String,
    weather: WeatherArgs,
    seed: Option<u64>,
    provider: Option<String>,
    model: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let message = message.trim().to_string();
    if message.is_empty() {
        bail!("Message must not be empty");
    }

    let config = Config::new(data_dir)?;
    let mut store = HistoryStore::open(&config)?;
    let preferences = config.load_preferences()?;

    let mut companion = match seed {
        Some(seed) => Companion::with_seed(&config, seed)?,
        None => Companion::new(&config)?,
    };

    // Snapshot the window before this exchange is recorded, so the reply
    // can reference the previous exchange rather than the current message.
    let history = store.history().clone();
    let observation = weather.to_observation();
    let request = ChatRequest {
        message: &message,
        observation: observation.as_ref(),
        preferences: preferences.as_ref(),
        history: Some(&history),
    };

    let reply = if provider.is_some() || model.is_some() {
        companion.respond_enhanced(&request, provider, model).await
    } else {
        companion.respond(&request)
    };

    store.record(Speaker::User, message.as_str())?;
    store.record(Speaker::Mascot, reply.response_text.as_str())?;

    println!("{} {}", "You:".cyan().bold(), message);
    println!(
        "{} {}",
        format!("{}:", config.mascot_name).green().bold(),
        reply.response_text
    );
    println!(
        "{}",
        format!("  └─ intent: {}, sentiment: {}, tone: {}", reply.intent, reply.sentiment, reply.tone)
            .dimmed()
    );

    if let Some(state) = &reply.mascot_state {
        println!(
            "\n{} {} {}  (energy {}, happiness {}, comfort {})",
            "Mood:".cyan(),
            state.mood.emoji(),
            state.mood,
            state.energy,
            state.happiness,
            state.comfort
        );
    }

    if !reply.suggestions.is_empty() {
        println!("\n{}", "Suggestions".cyan().bold());
        for suggestion in &reply.suggestions {
            println!("  • {}", suggestion);
        }
    }

    if let Some(advice) = &reply.weather_advice {
        println!("\n{} {}", "Advice:".yellow().bold(), advice.advice);
        if !advice.items.is_empty() {
            println!("  {} {}", "Bring:".dimmed(), advice.items.join(", "));
        }
    }

    Ok(())
}

pub fn handle_mascot(
    weather: WeatherArgs,
    seed: Option<u64>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::new(data_dir)?;

    let observation = weather.to_observation().unwrap_or_default();
    let reading = normalize(&observation);

    let mut engine = match seed {
        Some(seed) => MascotEngine::with_seed(seed),
        None => MascotEngine::new(),
    };
    let state = engine.state(&reading);

    println!("{}", format!("{} the sky mascot", config.mascot_name).cyan().bold());
    println!("Weather: {}", reading.category);
    println!("Mood: {} {}", state.mood.emoji(), state.mood);
    println!("Energy:    {}", vital_bar(state.energy));
    println!("Happiness: {}", vital_bar(state.happiness));
    println!("Comfort:   {}", vital_bar(state.comfort));
    println!("\n\"{}\"", state.reaction);

    if !state.recommendations.is_empty() {
        println!("\n{}", "Today's tips".cyan().bold());
        for recommendation in &state.recommendations {
            println!("  • {}", recommendation);
        }
    }

    Ok(())
}

pub fn handle_history(clear: bool, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut store = HistoryStore::open(&config)?;

    if clear {
        store.clear()?;
        println!("{}", "History cleared.".yellow());
        return Ok(());
    }

    let history = store.history();
    if history.is_empty() {
        println!("{}", "No conversation turns stored yet.".yellow());
        return Ok(());
    }

    println!("{}", format!("{} stored turns:", history.len()).cyan().bold());
    for turn in history.turns() {
        let speaker = match turn.speaker {
            Speaker::User => "You".cyan(),
            Speaker::Mascot => config.mascot_name.as_str().green(),
        };
        println!(
            "  {} {}: {}",
            format!("[{}]", turn.timestamp.format("%Y-%m-%d %H:%M")).dimmed(),
            speaker,
            turn.text
        );
    }

    Ok(())
}

fn vital_bar(value: i32) -> String {
    let filled = (value / 10).clamp(0, 10) as usize;
    format!("{}{} {:>3}/100", "█".repeat(filled), "░".repeat(10 - filled), value)
}
