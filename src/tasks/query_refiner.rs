use super::{load, prompt_error, record_time, QUERY_REFINER};
use crate::models::{keys, FinalQuery, RefinedQuery, SearchRequest};
use crate::tools::{AgentProfile, TaskBrief, TextCompleter};
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const MAX_QUERY_WORDS: usize = 50;

const PROFILE: AgentProfile = AgentProfile {
    role: "Search Query Refiner",
    goal: "Refine a verbose product description to a short, concise search query while capturing the most relevant details (only first 50 words).",
    backstory: "You are an expert in refining long product descriptions into short queries that maintain detail while improving search results.",
};

pub struct QueryRefinerTask {
    llm: Arc<dyn TextCompleter>,
}

impl QueryRefinerTask {
    pub fn new(llm: Arc<dyn TextCompleter>) -> Self {
        Self { llm }
    }

    pub fn brief(request: &SearchRequest) -> TaskBrief {
        TaskBrief {
            description: format!(
                "Refine the following verbose product description to create a concise search query (limit: {} words): {}",
                MAX_QUERY_WORDS,
                request.description()
            ),
            expected_output: "A short, concise search query (max 50 words).",
        }
    }
}

#[async_trait]
impl Task for QueryRefinerTask {
    fn id(&self) -> &str {
        QUERY_REFINER
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting query refinement task");

        let request: SearchRequest = load(&context, keys::SEARCH_REQUEST).await?;

        let text = self
            .llm
            .complete(&PROFILE, &Self::brief(&request))
            .await
            .map_err(|e| prompt_error("Query refinement", e))?;

        let refined = RefinedQuery::new(text);
        if refined.word_count() > MAX_QUERY_WORDS {
            warn!(
                "Refined query has {} words, above the {} word guideline",
                refined.word_count(),
                MAX_QUERY_WORDS
            );
        }

        let final_query = FinalQuery::compose(&request, &refined);
        info!("Final search query: {}", final_query.as_str());

        context.set(keys::REFINED_QUERY, refined).await;
        context.set(keys::FINAL_QUERY, final_query).await;
        record_time(&context, QUERY_REFINER, start_time).await;

        Ok(TaskResult::new(
            Some("Query refined successfully".to_string()),
            NextAction::ContinueAndExecute,
        ))
    }
}
