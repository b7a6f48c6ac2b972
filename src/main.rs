// main.rs
mod ai_provider;
mod cli;
mod composer;
mod config;
mod conversation;
mod intent;
mod mascot;
mod persona;
mod preferences;
mod sentiment;
mod weather;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let result = match args.command {
        Commands::Chat {
            message,
            weather,
            seed,
            provider,
            model,
            data_dir,
        } => cli::handle_chat(message, weather, seed, provider, model, data_dir).await,
        Commands::Mascot {
            weather,
            seed,
            data_dir,
        } => cli::handle_mascot(weather, seed, data_dir),
        Commands::History { clear, data_dir } => cli::handle_history(clear, data_dir),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}
