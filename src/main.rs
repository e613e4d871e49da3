use anyhow::{Context, Result};
use clap::Parser;
use interview_media::jobs::{JobDispatcher, NatsJobQueue};
use interview_media::media::ChannelMediaEngine;
use interview_media::registry::SessionRegistry;
use interview_media::session::{SessionContext, SessionManager};
use interview_media::stt::{DeepgramRecognizer, Recognizer};
use interview_media::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "interview-media", about = "Live interview media orchestrator")]
struct Args {
    /// Configuration file (TOML, extension omitted)
    #[arg(long, default_value = "config/interview-media")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let queue = NatsJobQueue::connect(&cfg.jobs.nats_url)
        .await
        .context("job queue connection failed")?;
    let dispatcher = JobDispatcher::new(Arc::new(queue));

    // The transcription bridge is a feature flag: without a key every audio
    // track is drained and discarded.
    let recognizer: Option<Arc<dyn Recognizer>> = match std::env::var("DEEPGRAM_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("Streaming transcription enabled");
            Some(Arc::new(DeepgramRecognizer::new(key)))
        }
        _ => {
            warn!("DEEPGRAM_API_KEY not set, streaming transcription disabled");
            None
        }
    };

    let registry = Arc::new(SessionRegistry::new());
    let context = SessionContext {
        registry: Arc::clone(&registry),
        dispatcher,
        recognizer,
        stt_params: cfg.stt.params(),
        sample_interval: Duration::from_secs(cfg.media.sample_interval_secs),
    };

    let state = AppState {
        service_name: cfg.service.name.clone(),
        engine: Arc::new(ChannelMediaEngine::new()),
        registry,
        sessions: SessionManager::new(),
        context,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
