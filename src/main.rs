//! The question-answering HTTP service.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use tokio::net::TcpListener;

use corpusmith::config::ConfigBuilder;
use corpusmith::embedding::{CohereEmbedder, EmbeddingProvider};
use corpusmith::responder::{CohereChatClient, Responder};
use corpusmith::server::{self, AppState};
use corpusmith::store::{QdrantStore, VectorStore};
use corpusmith::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let config = ConfigBuilder::new().with_env().build()?;
    if !config.is_fully_configured() {
        tracing::warn!(
            "starting without full upstream configuration; \
             /query and /ask will degrade until the missing credentials are set"
        );
    }

    let client = Client::builder()
        .user_agent(concat!("corpusmith/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        CohereEmbedder::new(client.clone(), config.cohere_api_key.clone())
            .with_base_url(config.cohere_base_url.clone())
            .with_model(config.embed_model.clone(), config.embedding_dimensions),
    );
    let store: Arc<dyn VectorStore> = Arc::new(
        QdrantStore::new(client.clone(), config.qdrant_url.clone(), config.collection.clone())
            .with_api_key(config.qdrant_api_key.clone())
            .with_dimensions(config.embedding_dimensions),
    );
    let responder = Responder::new(Arc::new(
        CohereChatClient::new(client, config.cohere_api_key.clone())
            .with_base_url(config.cohere_base_url.clone())
            .with_model(config.chat_model.clone()),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.bind_port));
    let state = Arc::new(AppState {
        config,
        store,
        embedder,
        responder,
    });

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("corpusmith listening on http://{addr}");
    axum::serve(listener, server::router(state).into_make_service()).await?;

    Ok(())
}
