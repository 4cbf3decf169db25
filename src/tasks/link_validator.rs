use super::{load, prompt_error, record_time, LINK_VALIDATOR};
use crate::models::{keys, LinkCheck, LinkReport, ListingSummary, SortedResults};
use crate::tools::{AgentProfile, TaskBrief, TextCompleter};
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use reqwest::Url;
use std::sync::Arc;
use tracing::{info, instrument};

const PROFILE: AgentProfile = AgentProfile {
    role: "Web Checking Agent",
    goal: "Verify that the links from the search results are valid and match the product description.",
    backstory: "You are responsible for verifying that the links lead to relevant products and are accessible.",
};

/// Local syntax check; reachability is left to the agent.
pub fn check_links(sorted: &SortedResults) -> Vec<LinkCheck> {
    sorted
        .as_slice()
        .iter()
        .filter_map(|result| {
            let link = result.link()?;
            let well_formed = Url::parse(link)
                .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
                .unwrap_or(false);
            Some(LinkCheck {
                title: result.title().unwrap_or_default().to_string(),
                link: link.to_string(),
                well_formed,
            })
        })
        .collect()
}

pub struct LinkValidatorTask {
    llm: Arc<dyn TextCompleter>,
}

impl LinkValidatorTask {
    pub fn new(llm: Arc<dyn TextCompleter>) -> Self {
        Self { llm }
    }

    pub fn brief(summary: &ListingSummary, checks: &[LinkCheck]) -> TaskBrief {
        let check_lines = checks
            .iter()
            .map(|c| {
                format!(
                    "- {} ({}): {}",
                    c.title,
                    c.link,
                    if c.well_formed { "well-formed" } else { "malformed" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        TaskBrief {
            description: format!(
                "Verify the validity of the links from the following refined search results:\n{}\n\nLocal URL syntax check:\n{}",
                summary.0,
                if check_lines.is_empty() { "(no links)".to_string() } else { check_lines }
            ),
            expected_output: "A list of valid and accessible links.",
        }
    }
}

#[async_trait]
impl Task for LinkValidatorTask {
    fn id(&self) -> &str {
        LINK_VALIDATOR
    }

    #[instrument(skip(self, context))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting link validation task");

        let summary: ListingSummary = load(&context, keys::LISTING_SUMMARY).await?;
        let sorted: SortedResults = load(&context, keys::SORTED_RESULTS).await?;

        let checks = check_links(&sorted);
        let malformed = checks.iter().filter(|c| !c.well_formed).count();
        info!("Checked {} links, {} malformed", checks.len(), malformed);

        let verdict = self
            .llm
            .complete(&PROFILE, &Self::brief(&summary, &checks))
            .await
            .map_err(|e| prompt_error("Link validation", e))?;

        context.set(keys::LINK_REPORT, LinkReport { checks, verdict }).await;
        record_time(&context, LINK_VALIDATOR, start_time).await;

        Ok(TaskResult::new(
            Some("Links validated".to_string()),
            NextAction::ContinueAndExecute,
        ))
    }
}
