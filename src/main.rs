use anyhow::Result;
use shopping_graphflow::{
    api::create_router,
    config::AppConfig,
    pipeline::{Flow, Pipeline},
    tools::{RigCompleter, SerpApiClient},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    shopping_graphflow::init_tracing();

    let config = AppConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let llm = Arc::new(RigCompleter::new(&config.openai_api_key, config.model.clone()));
    let search = Arc::new(SerpApiClient::new(config.serpapi_key.clone()));
    let pipeline = Arc::new(Pipeline::new(Flow::Search, llm, search));

    let app = create_router(pipeline);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Shopping search server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
