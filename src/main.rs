use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lyriclens::analysis::{GeminiAnalyzer, GeminiConfig};
use lyriclens::media::MediaFile;
use lyriclens::render::render_text;
use lyriclens::server::{AnalysisServer, ServerConfig};
use lyriclens::session::{AttemptOutcome, FAILURE_MESSAGE, Pipeline};
use lyriclens::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "lyriclens")]
#[command(about = "Upload a song, extract lyrics and structured musical analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a local media file and print the result
    Analyze {
        /// Path to an audio or video file
        file: PathBuf,

        /// Print the raw JSON result instead of the text card
        #[arg(long)]
        json: bool,
    },

    /// Serve the upload page and JSON API
    Serve {
        /// Bind address (overrides LYRICLENS_BIND_ADDR)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lyriclens=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    if !settings.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; analysis attempts will fail until it is");
    }

    match cli.command {
        Command::Analyze { file, json } => run_analyze(settings, file, json).await,
        Command::Serve { addr } => run_serve(settings, addr).await,
    }
}

fn build_pipeline(settings: &Settings) -> Arc<Pipeline> {
    let analyzer = GeminiAnalyzer::new(GeminiConfig::new(
        settings.api_key.clone(),
        settings.model.clone(),
    ));
    Arc::new(Pipeline::new(Arc::new(analyzer)))
}

async fn run_analyze(settings: Settings, file: PathBuf, json: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&settings);

    let media = match MediaFile::from_path(&file).await {
        Ok(media) => media,
        Err(e) => {
            tracing::warn!("intake failed: {}", e);
            anyhow::bail!(FAILURE_MESSAGE);
        }
    };

    match pipeline.run(media).await {
        Ok(AttemptOutcome::Succeeded(analysis)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", render_text(&analysis));
            }
            Ok(())
        }
        // A single CLI attempt has nothing to supersede it.
        Ok(AttemptOutcome::Superseded) => Ok(()),
        Err(_) => anyhow::bail!(FAILURE_MESSAGE),
    }
}

async fn run_serve(settings: Settings, addr: Option<SocketAddr>) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&settings);
    let config = ServerConfig {
        addr: addr.unwrap_or(settings.bind_addr),
    };

    let mut server = AnalysisServer::new(config, pipeline);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
