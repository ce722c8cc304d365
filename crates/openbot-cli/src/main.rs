use std::sync::Arc;

use clap::Parser;

use openbot_client::OpenBotClient;
use openbot_storage::MessageStore;

#[derive(Parser)]
#[command(name = "openbot", about = "Guild bot with per-module event hooks")]
struct Cli {
    /// Environment to run with (a block of env.json); defaults to the
    /// file's `env` field. With several arguments the last one wins.
    env: Vec<String>,
}

impl Cli {
    fn env(&self) -> Option<&str> {
        self.env.last().map(String::as_str)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = openbot_config::load(cli.env())?;
    tracing::info!(env = settings.env, "Starting openbot");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(MessageStore::open(&settings.database_path())?);

        let client = OpenBotClient::new(settings);
        openbot_stats::install(&client, store).await;
        openbot_censorship::install(&client).await;

        client.run().await
    })
}
