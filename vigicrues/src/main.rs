use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vigicrues::{
    ClientConfig, ConfigError, Observation, ObservationType, StationDetails, Vigicrues,
    VigicruesError,
};

#[derive(Parser)]
#[command(
    name = "vigicrues",
    version,
    about = "Vigicrues CLI - French flood monitoring service",
    long_about = None
)]
struct Cli {
    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for stations
    Search {
        #[arg(help = "Search term (station name, city, etc.)")]
        query: String,
    },
    /// Get details and latest observations for a station
    Get {
        #[arg(help = "Station identifier (e.g. O408101001)")]
        station_id: String,
    },
    /// List all territories
    Territories,
    /// List troncons in a territory
    Troncons {
        #[arg(help = "Territory identifier")]
        territory_id: String,
    },
    /// List stations in a troncon
    Stations {
        #[arg(help = "Troncon identifier")]
        troncon_id: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] VigicruesError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Client(VigicruesError::StationNotFound { .. }) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                CliError::Client(VigicruesError::StationNotFound { station_id }) => {
                    eprintln!("Unable to find station {station_id}");
                }
                other => eprintln!("Error: {other}"),
            }
            err.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let client = Vigicrues::new(&config)?;
    let json = cli.json;

    match cli.command {
        Command::Search { query } => {
            let stations = client.search_stations(&query).await?;
            if json {
                return print_json(&stations);
            }
            if stations.is_empty() {
                println!("No stations found");
            } else {
                println!("Found {} stations:", stations.len());
                for station in &stations {
                    println!("  - {} (ID: {})", station.name, station.id);
                }
            }
        }
        Command::Get { station_id } => {
            let details = client.get_station_details(&station_id).await?;
            let height = if details.has_height_data {
                latest_or_none(&client, &details, ObservationType::Height).await?
            } else {
                None
            };
            let flow = if details.has_flow_data {
                latest_or_none(&client, &details, ObservationType::Flow).await?
            } else {
                None
            };

            if json {
                return print_json(&StationReport {
                    details: &details,
                    height: height.as_ref(),
                    flow: flow.as_ref(),
                });
            }

            println!("Station: {}", details.name);
            println!("River: {}", details.river);
            println!("City: {}", details.city);
            println!("Coordinates: ({}, {})", details.latitude, details.longitude);
            println!();
            if details.has_height_data {
                print_observation("Latest water level", height.as_ref());
            }
            if details.has_flow_data {
                print_observation("Latest flow rate", flow.as_ref());
            }
        }
        Command::Territories => {
            let territories = client.list_territories().await?;
            if json {
                return print_json(&territories);
            }
            if territories.is_empty() {
                println!("No territories found");
            } else {
                println!("Territories:");
                for territory in &territories {
                    println!("  - {} (id: {})", territory.name, territory.id);
                }
            }
        }
        Command::Troncons { territory_id } => {
            let troncons = client.list_troncons(&territory_id).await?;
            if json {
                return print_json(&troncons);
            }
            if troncons.is_empty() {
                println!("No troncons found");
            } else {
                println!("Troncons in territory {territory_id}:");
                for troncon in &troncons {
                    println!("  - {} (id: {})", troncon.name, troncon.id);
                }
            }
        }
        Command::Stations { troncon_id } => {
            let stations = client.list_stations(&troncon_id).await?;
            if json {
                return print_json(&stations);
            }
            if stations.is_empty() {
                println!("No stations found");
            } else {
                println!("Stations in troncon {troncon_id}:");
                for station in &stations {
                    println!("  - {} (id: {})", station.name, station.id);
                }
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StationReport<'a> {
    #[serde(flatten)]
    details: &'a StationDetails,
    height: Option<&'a Observation>,
    flow: Option<&'a Observation>,
}

/// Latest reading, with an empty series reported as `None`.
async fn latest_or_none(
    client: &Vigicrues,
    details: &StationDetails,
    obs_type: ObservationType,
) -> Result<Option<Observation>, VigicruesError> {
    match client.get_latest_observations(&details.id, obs_type).await {
        Ok(obs) => Ok(Some(obs)),
        Err(VigicruesError::NoObservation { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn print_observation(label: &str, observation: Option<&Observation>) {
    match observation {
        Some(obs) => println!(
            "{label}: {} {} at {}",
            obs.value,
            obs.unit,
            obs.timestamp.to_rfc3339()
        ),
        None => println!("{label}: No observations found"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
