use super::{load, prompt_error, record_time, REPORT_WRITER};
use crate::models::{keys, FinalQuery, FinalReport, LinkReport, ListingSummary, SearchRequest};
use crate::tools::{AgentProfile, TaskBrief, TextCompleter};
use async_trait::async_trait;
use chrono::Utc;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, instrument};

const PROFILE: AgentProfile = AgentProfile {
    role: "Write Agent",
    goal: "Generate a final report comparing the original query with the refined search results, highlighting matching and non-matching results.",
    backstory: "You are skilled at comparing search results with the original query and generating detailed reports.",
};

pub struct ReportWriterTask {
    llm: Arc<dyn TextCompleter>,
}

impl ReportWriterTask {
    pub fn new(llm: Arc<dyn TextCompleter>) -> Self {
        Self { llm }
    }

    pub fn brief(
        request: &SearchRequest,
        query: &FinalQuery,
        summary: &ListingSummary,
        links: &LinkReport,
    ) -> TaskBrief {
        TaskBrief {
            description: format!(
                r#"Compare the original product query with the refined search results. Highlight what matches and what does not.

Original product: {}
Original description: {}
Search query used: {}

Refined search results:
{}

Link check:
{}"#,
                request.product_name(),
                request.description(),
                query.as_str(),
                summary.0,
                links.verdict
            ),
            expected_output: "A detailed report on the search results.",
        }
    }
}

#[async_trait]
impl Task for ReportWriterTask {
    fn id(&self) -> &str {
        REPORT_WRITER
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting report generation task");

        let request: SearchRequest = load(&context, keys::SEARCH_REQUEST).await?;
        let query: FinalQuery = load(&context, keys::FINAL_QUERY).await?;
        let summary: ListingSummary = load(&context, keys::LISTING_SUMMARY).await?;
        let links: LinkReport = load(&context, keys::LINK_REPORT).await?;

        let text = self
            .llm
            .complete(&PROFILE, &Self::brief(&request, &query, &summary, &links))
            .await
            .map_err(|e| prompt_error("Report generation", e))?;

        info!("Generated report with {} characters", text.len());
        let report = FinalReport {
            text,
            generated_at: Utc::now(),
        };
        context.set(keys::FINAL_REPORT, report).await;
        record_time(&context, REPORT_WRITER, start_time).await;

        Ok(TaskResult::new(
            Some("Report generated successfully".to_string()),
            NextAction::End,
        ))
    }
}
