use super::{load, prompt_error, record_time, RESPONSE_REFINER};
use crate::models::{keys, ListingSummary, SortedResults};
use crate::tools::{AgentProfile, TaskBrief, TextCompleter};
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, instrument};

const PROFILE: AgentProfile = AgentProfile {
    role: "Response Refiner",
    goal: "Extract relevant information such as titles, prices, and links from the sorted JSON response.",
    backstory: "You are skilled at extracting the most important details from the shopping results, such as titles, prices, and links.",
};

pub struct ResponseRefinerTask {
    llm: Arc<dyn TextCompleter>,
}

impl ResponseRefinerTask {
    pub fn new(llm: Arc<dyn TextCompleter>) -> Self {
        Self { llm }
    }

    pub fn brief(sorted: &SortedResults) -> Result<TaskBrief, serde_json::Error> {
        Ok(TaskBrief {
            description: format!(
                "Extract relevant information (titles, prices, and links) from the following sorted search results:\n{}",
                serde_json::to_string_pretty(sorted)?
            ),
            expected_output: "A refined list of titles, prices, and links.",
        })
    }
}

#[async_trait]
impl Task for ResponseRefinerTask {
    fn id(&self) -> &str {
        RESPONSE_REFINER
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting response refinement task");

        let sorted: SortedResults = load(&context, keys::SORTED_RESULTS).await?;
        let brief = Self::brief(&sorted).map_err(|e| GraphError::Other(e.into()))?;

        let text = self
            .llm
            .complete(&PROFILE, &brief)
            .await
            .map_err(|e| prompt_error("Response refinement", e))?;

        info!("Refined listings with {} characters", text.len());
        context.set(keys::LISTING_SUMMARY, ListingSummary(text)).await;
        record_time(&context, RESPONSE_REFINER, start_time).await;

        Ok(TaskResult::new(
            Some("Listings refined successfully".to_string()),
            NextAction::ContinueAndExecute,
        ))
    }
}
