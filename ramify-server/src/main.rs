use anyhow::Context;
use clap::Parser;
use ramify_core::{AgentClient, AgentConfig, ArtifactStore, DeepseekClient, GenerationConfig};
use ramify_server::state::AppState;
use ramify_server::{BUILD_TIME, GIT_HASH, VERSION, routes};
use tracing::{info, warn};

/// Default bind host
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Parser)]
#[command(
    name = "ramify-server",
    about = "HTTP relay for mind-map generation",
    version = env!("CARGO_PKG_VERSION")
)]
struct ServerArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    // Load .env
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    info!(
        "Starting ramify v{}-{} (built {})",
        VERSION, GIT_HASH, BUILD_TIME
    );

    // Provider credentials are required; refuse to start without them.
    let generation = GenerationConfig::from_env()
        .context("DEEPSEEK_API_KEY is required to start. Add it to the .env file.")?;
    info!("DeepSeek API key configured: {}", generation.masked_key());

    let agent_config = AgentConfig::from_env();
    if agent_config.endpoint.is_none() {
        warn!("BUSINESS_AGENT_URL not set - the business route will answer with errors");
    }

    let store = ArtifactStore::from_env().await;
    match &store {
        Some(_) => info!("artifact persistence enabled"),
        None => info!("artifact persistence disabled (RAMIFY_OUTPUT_DIR not set)"),
    }

    let state = AppState::new(
        DeepseekClient::new(generation)?,
        AgentClient::new(agent_config)?,
        store,
    );

    let app = routes::create_router(state);

    let bind = BindConfig::resolve(
        args.host,
        args.port,
        std::env::var("HOST").ok(),
        std::env::var("PORT").ok(),
    );
    let addr = bind.addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Listen address resolved from CLI flags, the environment, and defaults.
#[derive(Debug)]
struct BindConfig {
    host: String,
    port: u16,
}

impl BindConfig {
    /// CLI flags win, then `HOST`/`PORT` from the environment, then defaults.
    fn resolve(
        cli_host: Option<String>,
        cli_port: Option<u16>,
        env_host: Option<String>,
        env_port: Option<String>,
    ) -> Self {
        let host = cli_host
            .or(env_host)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match (cli_port, env_port) {
            (Some(port), _) => port,
            (None, Some(raw)) => match raw.trim().parse::<u16>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Invalid PORT='{}', falling back to {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            (None, None) => DEFAULT_PORT,
        };

        Self { host, port }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_override_environment() {
        let bind = BindConfig::resolve(
            Some("127.0.0.1".to_string()),
            Some(9000),
            Some("10.0.0.1".to_string()),
            Some("8088".to_string()),
        );
        assert_eq!(bind.host, "127.0.0.1");
        assert_eq!(bind.port, 9000);
    }

    #[test]
    fn test_environment_used_when_cli_missing() {
        let bind = BindConfig::resolve(
            None,
            None,
            Some("127.0.0.1".to_string()),
            Some("8088".to_string()),
        );
        assert_eq!(bind.host, "127.0.0.1");
        assert_eq!(bind.port, 8088);
    }

    #[test]
    fn test_defaults_without_cli_or_environment() {
        let bind = BindConfig::resolve(None, None, None, None);
        assert_eq!(bind.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_environment_port_falls_back() {
        let bind = BindConfig::resolve(None, None, None, Some("not-a-port".to_string()));
        assert_eq!(bind.port, DEFAULT_PORT);
    }

    #[test]
    fn test_blank_environment_host_falls_back() {
        let bind = BindConfig::resolve(None, None, Some("  ".to_string()), None);
        assert_eq!(bind.host, DEFAULT_HOST);
    }

    #[test]
    fn test_args_parse() {
        let args = ServerArgs::try_parse_from([
            "ramify-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(9000));
    }
}
