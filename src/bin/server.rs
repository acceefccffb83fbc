//! Conversation backend binary.
//!
//! Startup sequence: tracing init, config load, credential resolution,
//! external tool discovery, then serve. Any missing credential or binary
//! aborts startup — these are configuration faults, not per-request ones.

use solace::config::SolaceConfig;
use solace::credentials::load_credentials;
use solace::lipsync::{FfmpegConverter, RhubarbAligner, ToolPaths};
use solace::pipeline::PipelineCoordinator;
use solace::reply::ReplyGenerator;
use solace::server::ConversationServer;
use solace::tts::ElevenLabsSynthesizer;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("solace=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "solace.toml".to_owned());
    let config = SolaceConfig::load(Path::new(&config_path))?;
    let credentials = load_credentials()?;
    let tools = ToolPaths::discover(&config.lipsync)?;
    tracing::info!(
        ffmpeg = %tools.ffmpeg.display(),
        rhubarb = %tools.rhubarb.display(),
        "external tools located"
    );

    let coordinator = Arc::new(PipelineCoordinator::new(
        Box::new(ReplyGenerator::new(&config.chat, credentials.chat_api_key)),
        Box::new(ElevenLabsSynthesizer::new(
            &config.tts,
            credentials.tts_api_key,
        )),
        Box::new(FfmpegConverter::new(&tools, &config.lipsync)),
        Box::new(RhubarbAligner::new(&tools, &config.lipsync)),
        config.artifact_root(),
    ));

    let server = ConversationServer::start(&config.server.bind_addr, coordinator).await?;
    server.join().await?;
    Ok(())
}
