mod approval;
mod chat;
mod output;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "foreman",
    about = "AI project-manager assistant — chat with a model that scaffolds files, milestones, and presentation plans",
    version
)]
pub struct Cli {
    /// Directory new project roots are created under
    #[arg(long, env = "FOREMAN_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Plain-text file containing the API key
    #[arg(long, default_value = foreman_core::paths::KEY_FILE)]
    pub key_file: PathBuf,

    /// Session-state file (active project root + chat history)
    #[arg(long, default_value = foreman_core::paths::SESSION_FILE)]
    pub state_file: PathBuf,

    /// Model name sent to the generateContent endpoint
    #[arg(long, env = "FOREMAN_MODEL", default_value = gemini_agent::DEFAULT_MODEL)]
    pub model: String,

    /// Endpoint base URL (overridable for proxies and tests)
    #[arg(long, env = "FOREMAN_BASE_URL", default_value = gemini_agent::DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = chat::run(cli).await {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
