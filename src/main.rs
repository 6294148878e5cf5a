use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icebreaker_backend::controllers::generate::GenerateController;
use icebreaker_backend::domain::generation::{CompletionRepository, GenerationService};
use icebreaker_backend::domain::moderation::{
    ModerationClassifier, ModerationService, ModerationThresholds,
};
use icebreaker_backend::domain::quota::QuotaStore;
use icebreaker_backend::infrastructure::config::{Config, LogFormat};
use icebreaker_backend::infrastructure::http::start_http_server;
use icebreaker_backend::infrastructure::repositories::{
    OpenAiCompletionRepository, OpenAiModerationClassifier,
};

const QUOTA_CLEANUP_PERIOD: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Icebreaker Backend on {}:{}",
        config.host,
        config.port
    );

    let config = Arc::new(config);

    // OpenAI client, shared by the generation and moderation adapters.
    // Without a key the server still runs: generation reports
    // SERVICE_UNAVAILABLE and the provider safety check fails open.
    let openai_client = config.openai_api_key.as_ref().map(|api_key| {
        Arc::new(Client::with_config(
            OpenAIConfig::new().with_api_key(api_key.clone()),
        ))
    });
    if openai_client.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, running without a generation provider");
    }

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate provider repositories (inject the OpenAI client)
    let completion_repo: Option<Arc<dyn CompletionRepository>> =
        openai_client.as_ref().map(|client| {
            Arc::new(OpenAiCompletionRepository::new(
                client.clone(),
                config.openai_model.clone(),
            )) as Arc<dyn CompletionRepository>
        });
    let moderation_classifier: Option<Arc<dyn ModerationClassifier>> =
        openai_client.as_ref().map(|client| {
            Arc::new(OpenAiModerationClassifier::new(client.clone()))
                as Arc<dyn ModerationClassifier>
        });

    // 2. Instantiate services (inject repositories)
    let moderation_service = Arc::new(ModerationService::new(
        moderation_classifier,
        ModerationThresholds {
            harassment: config.harassment_threshold,
            sexual: config.sexual_threshold,
            violence: config.violence_threshold,
        },
    ));
    let generation_service = Arc::new(GenerationService::new(
        moderation_service.clone(),
        completion_repo,
    ));

    // 3. Quota store with its background reclamation task
    let quota_store = Arc::new(QuotaStore::new());
    quota_store.start_cleanup(QUOTA_CLEANUP_PERIOD).await;

    // 4. Instantiate controllers (inject services)
    let generate_controller = Arc::new(GenerateController::new(generation_service));

    // Start HTTP server; returns once the shutdown signal fires
    start_http_server(config.clone(), quota_store.clone(), generate_controller).await?;

    // Orderly shutdown of the reclamation task
    let stats = quota_store.stats().await;
    tracing::info!(
        total_devices = stats.total_devices,
        total_usage_today = stats.total_usage_today,
        "Final quota store stats"
    );
    quota_store.shutdown().await;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "icebreaker_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "icebreaker_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
