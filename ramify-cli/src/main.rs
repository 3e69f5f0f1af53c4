use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ramify_core::{
    ArtifactStore, DeepseekClient, GenerationConfig, StorageConfig, build_mindmap_prompt,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ramify")]
#[command(about = "Mind-map generation relay CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a mind-map outline for a topic, straight from the provider
    Generate {
        /// Topic to expand
        topic: String,

        /// Persist the outline (local file, plus S3 when configured)
        #[arg(long)]
        save: bool,
    },

    /// Send a generation request to a running relay server
    Request {
        /// Topic to send
        topic: String,

        /// Base URL of the relay
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },

    /// Upload a local file to the artifact bucket
    Upload {
        /// File to upload
        file: PathBuf,

        /// Object key (defaults to the file name)
        #[arg(short, long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    // Load .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { topic, save } => generate_command(topic, save).await?,
        Commands::Request { topic, url } => request_command(topic, url).await?,
        Commands::Upload { file, key } => upload_command(file, key).await?,
    }

    Ok(())
}

async fn generate_command(topic: String, save: bool) -> Result<()> {
    let config = GenerationConfig::from_env()?;
    let client = DeepseekClient::new(config)?;

    info!("Generating mind map for \"{}\"", topic);
    let outline = client.generate(&build_mindmap_prompt(&topic)).await?;

    println!("{outline}");

    if save {
        let mut storage = StorageConfig::from_env();
        if storage.output_dir.is_none() {
            storage.output_dir = Some(PathBuf::from("outputs"));
        }

        let store = ArtifactStore::new(storage).await;
        let artifact = store.persist_outline(&topic, &outline).await?;

        info!("Outline saved to {}", artifact.local_path.display());
        if let Some(url) = artifact.url {
            info!("Uploaded to {}", url);
        }
    }

    Ok(())
}

async fn request_command(topic: String, url: String) -> Result<()> {
    let client = reqwest::Client::builder().user_agent("ramify/1.0").build()?;

    let endpoint = format!("{}/api/generate-mindmap", url.trim_end_matches('/'));
    info!("POST {} (topic: \"{}\")", endpoint, topic);

    let response = client
        .post(&endpoint)
        .json(&serde_json::json!({ "topic": topic }))
        .send()
        .await
        .context("request failed - is the relay server running?")?;

    let status = response.status();
    let payload: serde_json::Value = response.json().await.context("response was not JSON")?;

    if status.is_success() {
        info!("Request succeeded");
    } else {
        warn!("Relay answered {}", status);
    }

    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

async fn upload_command(file: PathBuf, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .context("cannot derive an object key from the file path")?,
    };

    let store = ArtifactStore::new(StorageConfig::from_env()).await;
    let url = store.upload(&file, &key).await?;

    println!("{url}");

    Ok(())
}
