mod link_validator;
mod query_refiner;
mod report_writer;
mod response_refiner;
mod result_sorter;
mod shopping_search;

pub use link_validator::LinkValidatorTask;
pub use query_refiner::QueryRefinerTask;
pub use report_writer::ReportWriterTask;
pub use response_refiner::ResponseRefinerTask;
pub use result_sorter::{sort_by_price_desc, ResultSorterTask};
pub use shopping_search::ShoppingSearchTask;

use crate::models::keys;
use graph_flow::{Context, GraphError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Instant;

pub const QUERY_REFINER: &str = "query_refiner";
pub const SHOPPING_SEARCH: &str = "shopping_search";
pub const RESULT_SORTER: &str = "result_sorter";
pub const RESPONSE_REFINER: &str = "response_refiner";
pub const LINK_VALIDATOR: &str = "link_validator";
pub const REPORT_WRITER: &str = "report_writer";

async fn load<T: DeserializeOwned>(context: &Context, key: &str) -> Result<T, GraphError> {
    context
        .get(key)
        .await
        .ok_or_else(|| GraphError::ContextError(format!("{} not found in context", key)))
}

async fn record_time(context: &Context, task_id: &str, start_time: Instant) {
    let elapsed = start_time.elapsed().as_millis() as u64;
    let mut task_times: HashMap<String, u64> =
        context.get(keys::TASK_TIMES).await.unwrap_or_default();
    task_times.insert(task_id.to_string(), elapsed);
    context.set(keys::TASK_TIMES, task_times).await;
}

fn prompt_error(stage: &str, e: anyhow::Error) -> GraphError {
    GraphError::Other(anyhow::anyhow!("{} failed: {:#}", stage, e))
}
