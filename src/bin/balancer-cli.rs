use clap::{Parser, Subcommand};
use serde_json::Value;
use traffic_balancer::admin::{BACKENDS_PATH, STATS_PATH};

#[derive(Parser)]
#[command(name = "balancer-cli")]
#[command(about = "Inspect a running traffic-balancer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show request counts, backend status and uptime
    Stats,
    /// List backend liveness and in-flight connections
    Backends,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Stats => {
            let res = client.get(format!("{}{}", cli.url, STATS_PATH)).send().await?;
            let Some(json) = read_json(res).await? else {
                return Ok(());
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Backends => {
            let res = client.get(format!("{}{}", cli.url, BACKENDS_PATH)).send().await?;
            let Some(json) = read_json(res).await? else {
                return Ok(());
            };
            print_backends(&json);
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: balancer returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}

fn print_backends(json: &Value) {
    println!("{:<40} {:<6} {:>11}", "ADDRESS", "ALIVE", "CONNECTIONS");
    for backend in json.as_array().into_iter().flatten() {
        println!(
            "{:<40} {:<6} {:>11}",
            backend["address"].as_str().unwrap_or("?"),
            if backend["alive"].as_bool().unwrap_or(false) { "up" } else { "down" },
            backend["connections"].as_u64().unwrap_or(0),
        );
    }
}
