use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use dodgeball_client::checkpoint::Webhook;
use dodgeball_client::config::load_config;
use dodgeball_client::observability::logging::init_tracing;
use dodgeball_client::{
    CheckpointEvent, CheckpointOptions, CheckpointRequest, CheckpointResponse, Dodgeball, DodgeballConfig, LogLevel,
};

#[derive(Parser)]
#[command(name = "dodgeball-cli")]
#[command(about = "Submit and inspect Dodgeball checkpoints", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured API URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Override the configured log level (TRACE, INFO, ERROR).
    #[arg(long)]
    log_level: Option<String>,

    /// Secret API key.
    #[arg(short, long, env = "DODGEBALL_SECRET_KEY", hide_env_values = true, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a checkpoint and wait for its verification
    Checkpoint {
        /// Read the whole request (camelCase JSON) from a file instead of flags
        #[arg(long, conflicts_with_all = ["name", "ip", "session_id"])]
        request: Option<PathBuf>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        session_id: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        source_token: Option<String>,

        #[arg(long)]
        verification_id: Option<String>,

        /// Event data as a JSON object
        #[arg(long)]
        data: Option<String>,

        /// Timeout in milliseconds
        #[arg(long)]
        timeout: Option<i64>,

        /// Ask the API not to block until resolved
        #[arg(long = "async")]
        no_sync: bool,

        #[arg(long)]
        webhook: Option<String>,
    },
    /// Print the decision for a saved response
    Classify {
        /// Response JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DodgeballConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    init_tracing(config.log_level.parse().unwrap_or(LogLevel::Trace));

    match cli.command {
        Commands::Checkpoint {
            request,
            name,
            ip,
            session_id,
            user_id,
            source_token,
            verification_id,
            data,
            timeout,
            no_sync,
            webhook,
        } => {
            let request = match request {
                Some(path) => read_json::<CheckpointRequest>(&path)?,
                None => {
                    let mut event = CheckpointEvent::new(ip.unwrap_or_default());
                    if let Some(data) = data {
                        match serde_json::from_str::<Value>(&data)? {
                            Value::Object(map) => event.data = map,
                            _ => return Err("--data must be a JSON object".into()),
                        }
                    }
                    CheckpointRequest {
                        checkpoint_name: name.unwrap_or_default(),
                        event: Some(event),
                        source_token,
                        session_id: session_id.unwrap_or_default(),
                        user_id,
                        use_verification_id: verification_id,
                        options: CheckpointOptions {
                            sync: no_sync.then_some(false),
                            timeout,
                            webhook: webhook.map(|url| Webhook { url }),
                        },
                    }
                }
            };

            let dodgeball = Dodgeball::new(cli.key, config)?;
            let response = dodgeball.checkpoint(&request).await?;
            print_response(&response)?;
        }
        Commands::Classify { file } => {
            let response = read_json::<CheckpointResponse>(&file)?;
            print_response(&response)?;
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_response(response: &CheckpointResponse) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(response)?);
    eprintln!("decision: {}", response.decision());
    Ok(())
}
