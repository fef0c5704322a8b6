use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use babel_relay::api::{self, ApiState};
use babel_relay::config::{self, Config};
use babel_relay::relay::Relay;
use babel_relay::relay::credential::CredentialStore;
use babel_relay::gateway::GatewayClient;

/// Babel - real-time chat relay with automatic translation
#[derive(Parser)]
#[command(name = "babel", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "BABEL_PORT")]
    port: Option<u16>,

    /// Gateway model identifier
    #[arg(long, env = "BABEL_MODEL")]
    model: Option<String>,

    /// Seed the shared translation credential at startup
    #[arg(long, env = "BABEL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,babel_relay=info",
        1 => "info,babel_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = config::load_config_file();
    let config = Config::resolve(&file, cli.port, cli.model, cli.api_key);

    tracing::info!(
        port = config.port,
        model = %config.model,
        seeded_credential = config.api_key.is_some(),
        "starting babel relay"
    );

    let gateway = GatewayClient::new(config.model.clone());
    let credential = CredentialStore::seeded(config.api_key.clone());
    let relay = Arc::new(Relay::new(gateway, credential));
    let state = Arc::new(ApiState { relay });

    api::serve(state, config.port).await?;

    Ok(())
}
