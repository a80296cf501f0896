use anyhow::Context;
use legal_rag::api::{create_router, AppState};
use legal_rag::infrastructure::{AppConfig, OpenAiLlm, TextEmbedding};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "legal_rag=debug,server=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;

    // rig reads the key itself; fail here rather than on the first request.
    std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

    let embedding = Arc::new(TextEmbedding::from_config(&config.config.embedding));
    let llm = Arc::new(OpenAiLlm::from_config(&config.config.llm));
    info!(
        llm_model = %config.config.llm.model,
        embedding_model = %config.config.embedding.model,
        "providers configured"
    );

    let server = config.config.server.clone();
    let state = AppState::new(config, embedding, llm)?;
    let app = create_router(state);

    let addr = SocketAddr::new(server.host.parse()?, server.port);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
