//! Tablewatch CLI
//!
//! Command-line interface for Tablewatch operations:
//! - Report readings the way a chip does
//! - Show current occupancy
//! - Seed the demo table
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablewatch::api::dto::{IngestRequest, StatusResponse};
use tablewatch::config::{generate_default_config, Config};
use tablewatch::store::{SensorReading, Store};

#[derive(Parser)]
#[command(name = "tablewatch-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Talk to a Tablewatch server or its database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL
    #[arg(long, default_value = "http://localhost:3000", global = true)]
    pub server: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Config file used to locate the database
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send readings for a chip, e.g. `report esp32-1 chair-1=occupied chair-2=0`
    Report {
        /// Chip identifier
        chip_id: String,
        /// Readings in sensor=status format (true/false, 1/0, occupied/available)
        readings: Vec<String>,
    },

    /// Show occupancy of every table
    Status,

    /// Insert the demo table directly into the database
    SeedDemo {
        /// Database file (default: from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Report { chip_id, readings } => {
            let sensors = readings
                .iter()
                .map(|r| parse_reading(r))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let body = IngestRequest { chip_id, sensors };

            let response = client
                .post(format!("{}/data", cli.server))
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", cli.server))?;

            if response.status().is_success() {
                println!(
                    "Reported {} reading(s) for {}",
                    body.sensors.len(),
                    body.chip_id
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Server rejected report ({}): {}", status, text);
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/api/status", cli.server))
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", cli.server))?;

            if !response.status().is_success() {
                bail!("Status request failed: {}", response.status());
            }

            let status: StatusResponse = response.json().await.context("Invalid status body")?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&status.chips)?);
            } else {
                print_status_table(&status);
            }
        }

        Commands::SeedDemo { db } => {
            let path = match db {
                Some(path) => path,
                None => PathBuf::from(load_config(cli.config.as_ref())?.store.path),
            };

            let store = Store::open(&path)
                .with_context(|| format!("Failed to open database {:?}", path))?;

            if store.seed_demo()? {
                println!("Seeded demo table into {:?}", path);
            } else {
                println!("Demo table already present in {:?}", path);
            }
            store.shutdown()?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_with_env(path).context("Failed to load config"),
        None => Ok(Config::load_default()),
    }
}

/// Parse `sensor=status`
fn parse_reading(input: &str) -> anyhow::Result<SensorReading> {
    let Some((id, status)) = input.split_once('=') else {
        bail!("Reading '{}' must look like sensor=status", input);
    };

    let status = match status.trim().to_lowercase().as_str() {
        "true" | "1" | "occupied" | "on" => true,
        "false" | "0" | "available" | "off" => false,
        other => bail!("Unknown status '{}' for sensor {}", other, id),
    };

    Ok(SensorReading::new(id.trim(), status))
}

fn print_status_table(status: &StatusResponse) {
    if status.chips.is_empty() {
        println!("No chips have reported yet.");
        return;
    }

    for chip in &status.chips {
        println!(
            "{} ({}/{} occupied)",
            chip.name,
            chip.occupied_count(),
            chip.sensors.len()
        );
        for sensor in &chip.sensors {
            let state = if sensor.status { "occupied" } else { "available" };
            println!("  {:<16} {}", sensor.id, state);
        }
    }
}
