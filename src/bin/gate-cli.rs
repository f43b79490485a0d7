use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the client gate", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key.
    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    /// Public API base URL, for `key` and `ip`.
    #[arg(short, long, default_value = "http://localhost:8080")]
    gate: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version and registry sizes
    Status,
    /// Reload the client registries from their sources
    Reload,
    /// List registered clients
    Clients,
    /// Identify a client by API key
    Key { api_key: String },
    /// Identify a client by IP address (sent as X-Forwarded-For)
    Ip { address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Reload => {
            client.post(format!("{}/admin/reload", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Clients => {
            client.get(format!("{}/admin/clients", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Key { api_key } => {
            client.get(format!("{}/data", cli.gate))
                .header("x-api-key", api_key)
                .send()
                .await?
        }
        Commands::Ip { address } => {
            client.get(format!("{}/ip-data", cli.gate))
                .header("x-forwarded-for", address)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }

    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
