pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod tasks;
pub mod tools;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "shopping_graphflow=debug,graph_flow=info";

/// Install the fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
