use super::{load, record_time, SHOPPING_SEARCH};
use crate::models::{keys, FinalQuery};
use crate::tools::ShoppingSearch;
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ShoppingSearchTask {
    search: Arc<dyn ShoppingSearch>,
}

impl ShoppingSearchTask {
    pub fn new(search: Arc<dyn ShoppingSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Task for ShoppingSearchTask {
    fn id(&self) -> &str {
        SHOPPING_SEARCH
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting shopping search task");

        let query: FinalQuery = load(&context, keys::FINAL_QUERY).await?;

        let results = self
            .search
            .search(&query)
            .await
            .map_err(|e| GraphError::Other(anyhow::anyhow!("Shopping search failed: {:#}", e)))?;

        info!("Shopping search returned {} results", results.len());
        context.set(keys::SHOPPING_RESULTS, results).await;
        record_time(&context, SHOPPING_SEARCH, start_time).await;

        Ok(TaskResult::new(
            Some("Search completed successfully".to_string()),
            NextAction::ContinueAndExecute,
        ))
    }
}
