use super::{load, record_time, RESULT_SORTER};
use crate::models::{keys, ShoppingResult, SortedResults};
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use std::cmp::Ordering;
use tracing::{info, instrument};

/// Most expensive first. `sort_by` is stable, so equal prices keep their
/// provider order.
pub fn sort_by_price_desc(mut results: Vec<ShoppingResult>) -> SortedResults {
    results.sort_by(|a, b| b.price().partial_cmp(&a.price()).unwrap_or(Ordering::Equal));
    SortedResults(results)
}

/// Sorts the search results. `terminal` is set when sorting is the last
/// stage of the flow, so the run ends here instead of looking for an edge.
pub struct ResultSorterTask {
    terminal: bool,
}

impl ResultSorterTask {
    pub fn new(terminal: bool) -> Self {
        Self { terminal }
    }

    fn next_action(&self) -> NextAction {
        if self.terminal {
            NextAction::End
        } else {
            NextAction::ContinueAndExecute
        }
    }
}

#[async_trait]
impl Task for ResultSorterTask {
    fn id(&self) -> &str {
        RESULT_SORTER
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();

        let results: Vec<ShoppingResult> = load(&context, keys::SHOPPING_RESULTS).await?;
        let sorted = sort_by_price_desc(results);

        info!("Sorted {} results by price", sorted.as_slice().len());
        context.set(keys::SORTED_RESULTS, sorted).await;
        record_time(&context, RESULT_SORTER, start_time).await;

        Ok(TaskResult::new(
            Some("Results sorted by price".to_string()),
            self.next_action(),
        ))
    }
}
