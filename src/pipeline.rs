use crate::models::{
    keys, FinalQuery, FinalReport, PipelineOutcome, RefinedQuery, SearchRequest, SortedResults,
};
use crate::tasks::{
    LinkValidatorTask, QueryRefinerTask, ReportWriterTask, ResponseRefinerTask, ResultSorterTask,
    ShoppingSearchTask, LINK_VALIDATOR, QUERY_REFINER, REPORT_WRITER, RESPONSE_REFINER,
    RESULT_SORTER, SHOPPING_SEARCH,
};
use crate::tools::{ShoppingSearch, TextCompleter};
use anyhow::{anyhow, Result};
use graph_flow::{
    ExecutionStatus, FlowRunner, GraphBuilder, InMemorySessionStorage, Session, SessionStorage,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Which stages a run goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Refine, search, sort.
    Search,
    /// Search, then refine listings, check links, and write a report.
    Report,
}

impl Flow {
    /// Task ids in execution order.
    pub fn stages(&self) -> &'static [&'static str] {
        match self {
            Flow::Search => &[QUERY_REFINER, SHOPPING_SEARCH, RESULT_SORTER],
            Flow::Report => &[
                QUERY_REFINER,
                SHOPPING_SEARCH,
                RESULT_SORTER,
                RESPONSE_REFINER,
                LINK_VALIDATOR,
                REPORT_WRITER,
            ],
        }
    }

    fn last_stage(&self) -> &'static str {
        self.stages()[self.stages().len() - 1]
    }
}

pub struct Pipeline {
    flow: Flow,
    runner: FlowRunner,
    storage: Arc<dyn SessionStorage>,
}

impl Pipeline {
    pub fn new(flow: Flow, llm: Arc<dyn TextCompleter>, search: Arc<dyn ShoppingSearch>) -> Self {
        Self::build(flow, llm, search, flow == Flow::Search)
    }

    fn build(
        flow: Flow,
        llm: Arc<dyn TextCompleter>,
        search: Arc<dyn ShoppingSearch>,
        sorter_is_terminal: bool,
    ) -> Self {
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());

        let builder = GraphBuilder::new(match flow {
            Flow::Search => "shopping_search_flow",
            Flow::Report => "shopping_report_flow",
        })
        .add_task(Arc::new(QueryRefinerTask::new(llm.clone())))
        .add_task(Arc::new(ShoppingSearchTask::new(search)))
        .add_task(Arc::new(ResultSorterTask::new(sorter_is_terminal)))
        .add_edge(QUERY_REFINER, SHOPPING_SEARCH)
        .add_edge(SHOPPING_SEARCH, RESULT_SORTER);

        let builder = match flow {
            Flow::Search => builder,
            Flow::Report => builder
                .add_task(Arc::new(ResponseRefinerTask::new(llm.clone())))
                .add_task(Arc::new(LinkValidatorTask::new(llm.clone())))
                .add_task(Arc::new(ReportWriterTask::new(llm)))
                .add_edge(RESULT_SORTER, RESPONSE_REFINER)
                .add_edge(RESPONSE_REFINER, LINK_VALIDATOR)
                .add_edge(LINK_VALIDATOR, REPORT_WRITER),
        };

        let runner = FlowRunner::new(Arc::new(builder.build()), storage.clone());
        Self {
            flow,
            runner,
            storage,
        }
    }

    /// Run every stage for one request. Any stage failure aborts the run.
    #[instrument(skip(self, request), fields(flow = ?self.flow))]
    pub async fn run(&self, request: SearchRequest) -> Result<PipelineOutcome> {
        let start_time = std::time::Instant::now();
        let session_id = Uuid::new_v4().to_string();
        info!("Starting pipeline for session {}", session_id);

        let session = Session::new_from_task(session_id.clone(), QUERY_REFINER);
        session.context.set(keys::SEARCH_REQUEST, request).await;
        self.storage
            .save(session)
            .await
            .map_err(|e| anyhow!("Failed to save session: {}", e))?;

        let outcome = self.drive(&session_id).await;

        if let Err(e) = self.storage.delete(&session_id).await {
            debug!("Failed to drop session {}: {}", session_id, e);
        }

        match &outcome {
            Ok(o) => info!(
                "Pipeline completed in {:?}, task times: {:?}",
                start_time.elapsed(),
                o.task_times
            ),
            Err(e) => error!("Pipeline failed after {:?}: {:#}", start_time.elapsed(), e),
        }
        outcome
    }

    async fn drive(&self, session_id: &str) -> Result<PipelineOutcome> {
        // Stages hand on with ContinueAndExecute, so a healthy run completes
        // in one call. Pausing on the last stage means it had no edge to
        // follow and did not end the run.
        let max_steps = self.flow.stages().len();
        let mut steps = 0;
        loop {
            steps += 1;
            let result = self
                .runner
                .run(session_id)
                .await
                .map_err(|e| anyhow!("{}", e))?;

            match &result.status {
                ExecutionStatus::Completed => break,
                ExecutionStatus::Error(e) => return Err(anyhow!("{}", e)),
                ExecutionStatus::Paused { next_task_id, .. } => {
                    if next_task_id.as_str() == self.flow.last_stage() {
                        return Err(anyhow!(
                            "Workflow stalled at {}: it has no next task and did not end",
                            next_task_id
                        ));
                    }
                    if steps >= max_steps {
                        return Err(anyhow!(
                            "Workflow still paused at {} after {} steps",
                            next_task_id,
                            steps
                        ));
                    }
                    debug!("Workflow paused, next task: {}", next_task_id);
                }
                _ => {
                    return Err(anyhow!(
                        "Workflow is waiting for input, which no stage asks for"
                    ))
                }
            }
        }

        let session = self
            .storage
            .get(session_id)
            .await
            .map_err(|e| anyhow!("Failed to load session: {}", e))?
            .ok_or_else(|| anyhow!("Session {} not found", session_id))?;

        let refined_query: RefinedQuery = require(&session, keys::REFINED_QUERY).await?;
        let results: SortedResults = require(&session, keys::SORTED_RESULTS).await?;
        let final_query: FinalQuery = require(&session, keys::FINAL_QUERY).await?;
        let report: Option<FinalReport> = match self.flow {
            Flow::Search => None,
            Flow::Report => Some(require(&session, keys::FINAL_REPORT).await?),
        };
        let task_times: HashMap<String, u64> =
            session.context.get(keys::TASK_TIMES).await.unwrap_or_default();

        Ok(PipelineOutcome {
            refined_query,
            final_query,
            results,
            report,
            task_times,
        })
    }
}

async fn require<T: DeserializeOwned>(session: &Session, key: &str) -> Result<T> {
    session
        .context
        .get(key)
        .await
        .ok_or_else(|| anyhow!("Pipeline finished without {}", key))
}
