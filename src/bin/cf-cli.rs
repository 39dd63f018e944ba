use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use cf_tracker::config::{load_client_config, TrackerConfig};
use cf_tracker::remote::ResilientClient;
use cf_tracker::stats::{build_leaderboard, BatchPolicy, SolveCounter};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "Query Codeforces through the cf-tracker client", long_about = None)]
struct Cli {
    /// Tracker config file; defaults plus environment otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Running tracker server, for `verify`
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upcoming contests, soonest first
    Contests,
    /// Profiles for the given handles
    Users { handles: Vec<String> },
    /// Solve counts for one handle
    Stats { handle: String },
    /// Ranked solve counts; the configured tracked handles if none given
    Leaderboard { handles: Vec<String> },
    /// Check a password against a running server
    Verify {
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_client_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Contests => {
            let contests = client(&config)?.upcoming_contests().await?;
            print_json(&contests)?;
        }
        Commands::Users { handles } => {
            let profiles = client(&config)?.user_profiles(handles.as_slice()).await?;
            print_json(&profiles)?;
        }
        Commands::Stats { handle } => {
            let counter = SolveCounter::new(client(&config)?, config.leaderboard.history_count);
            match counter.compute_stats(&handle).await {
                Some(stat) => print_json(&stat)?,
                None => eprintln!("Error: could not fetch history for {}", handle),
            }
        }
        Commands::Leaderboard { handles } => {
            let handles = if handles.is_empty() {
                config.tracked.clone()
            } else {
                handles
            };
            let counter = SolveCounter::new(client(&config)?, config.leaderboard.history_count);
            let policy = BatchPolicy::from(&config.leaderboard);
            let board = build_leaderboard(&counter, handles.as_slice(), policy).await;
            print_json(&board)?;
        }
        Commands::Verify { password } => {
            let res = reqwest::Client::new()
                .post(format!("{}/api/verify", cli.url.trim_end_matches('/')))
                .json(&json!({ "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn client(config: &TrackerConfig) -> Result<Arc<ResilientClient>, Box<dyn std::error::Error>> {
    Ok(Arc::new(ResilientClient::from_config(&config.remote)?))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
