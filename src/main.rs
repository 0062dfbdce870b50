//! Pantry Intake - turn grocery receipts and spoken purchases into a household list

mod app;
mod config;
mod error;
mod receipt;
mod summary;
mod text_utils;
mod voice;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::{Config, Platform},
    receipt::{parse_receipt, process_receipt, TesseractOcr},
    voice::{parse_spoken_item, SpeechGate, WhisperProvider},
};

#[derive(Parser, Debug)]
#[command(name = "pantry-intake")]
#[command(about = "Turn grocery receipts and spoken purchases into a household list")]
#[command(version)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform to run as; overrides the config file
    #[arg(short, long, value_enum)]
    platform: Option<Platform>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse receipt text that was already extracted (file or stdin)
    Receipt {
        /// Text file; reads stdin when omitted
        input: Option<PathBuf>,
    },
    /// OCR a receipt image and parse it
    Scan {
        /// Photo of the receipt
        image: PathBuf,
    },
    /// Parse a dictated item, e.g. `say milk 3 dollars`
    Say {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Interactive session with dictation (default)
    Listen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = Config::load(args.config.as_deref()).context("Could not load config")?;
    if let Some(platform) = args.platform {
        config.platform = platform;
    }

    match args.command.unwrap_or(Command::Listen) {
        Command::Receipt { input } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Could not read {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let receipt = parse_receipt(&text);
            emit(&receipt, args.json, || summary::render_receipt(&receipt))?;
        }
        Command::Scan { image } => {
            let ocr = TesseractOcr::new(&config.ocr);
            let receipt = process_receipt(&ocr, &image).await?;
            emit(&receipt, args.json, || summary::render_receipt(&receipt))?;
        }
        Command::Say { words } => {
            let item = parse_spoken_item(&words.join(" "));
            emit(&item, args.json, || {
                summary::render_items(std::slice::from_ref(&item))
            })?;
        }
        Command::Listen => {
            let provider = WhisperProvider::new(config.voice.clone());
            let gate = SpeechGate::new(config.platform, &provider);
            let mut app = app::App::new(gate, TesseractOcr::new(&config.ocr));
            app.run().await?;
            print!("{}", summary::render_items(app.items()));
        }
    }

    Ok(())
}

fn emit<T: Serialize>(value: &T, json: bool, render: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render());
    }
    Ok(())
}
