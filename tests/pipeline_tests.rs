mod common;

use common::{finishes_within, FakeSearch, ScriptedCompleter};
use serde_json::json;
use shopping_graphflow::models::SearchRequest;
use shopping_graphflow::pipeline::{Flow, Pipeline};
use std::sync::Arc;
use std::time::Duration;

fn request() -> SearchRequest {
    SearchRequest::new(
        "Pot Scrubber",
        "Heavy duty stainless steel pot scrubber with ergonomic handle",
    )
    .unwrap()
}

fn listings() -> Vec<serde_json::Value> {
    vec![
        json!({"title": "Budget", "extracted_price": 5, "link": "https://shop.test/budget"}),
        json!({"title": "Deluxe", "extracted_price": 20, "link": "https://shop.test/deluxe"}),
        json!({"title": "Broken", "link": "not a url"}),
    ]
}

#[tokio::test]
async fn search_flow_stops_after_sorting() {
    let llm = Arc::new(ScriptedCompleter::default());
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Pipeline::new(Flow::Search, llm.clone(), search.clone());

    let outcome = pipeline.run(request()).await.unwrap();

    assert!(outcome.report.is_none());
    assert_eq!(
        outcome.final_query.as_str(),
        "Pot Scrubber stainless steel scrubber ergonomic handle"
    );
    let titles: Vec<_> = outcome
        .results
        .as_slice()
        .iter()
        .map(|r| r.title().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Deluxe", "Budget", "Broken"]);
    assert_eq!(llm.roles(), vec!["Search Query Refiner"]);
    for task in ["query_refiner", "shopping_search", "result_sorter"] {
        assert!(outcome.task_times.contains_key(task), "missing time for {}", task);
    }
}

#[tokio::test]
async fn report_flow_runs_every_stage_in_order() {
    let llm = Arc::new(ScriptedCompleter::default());
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Pipeline::new(Flow::Report, llm.clone(), search.clone());

    let outcome = pipeline.run(request()).await.unwrap();

    assert_eq!(
        llm.roles(),
        vec![
            "Search Query Refiner",
            "Response Refiner",
            "Web Checking Agent",
            "Write Agent"
        ]
    );

    let refiner_prompt = llm.prompt_for("Response Refiner").unwrap();
    let deluxe = refiner_prompt.find("Deluxe").unwrap();
    let budget = refiner_prompt.find("Budget").unwrap();
    assert!(deluxe < budget, "sorted results should be embedded most expensive first");

    let checker_prompt = llm.prompt_for("Web Checking Agent").unwrap();
    assert!(checker_prompt.contains("1. Deluxe Scrubber - $20"));
    assert!(checker_prompt.contains("- Broken (not a url): malformed"));

    let writer_prompt = llm.prompt_for("Write Agent").unwrap();
    assert!(writer_prompt.contains("Original product: Pot Scrubber"));
    assert!(writer_prompt.contains("https://shop.test/deluxe is valid"));

    let report = outcome.report.unwrap();
    assert!(report.text.starts_with("# Report"));
    assert_eq!(outcome.task_times.len(), 6);
}

#[tokio::test]
async fn report_flow_failure_propagates() {
    let llm = Arc::new(ScriptedCompleter::failing_on("Web Checking Agent"));
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Pipeline::new(Flow::Report, llm.clone(), search);

    let err = pipeline.run(request()).await.unwrap_err();

    assert!(format!("{:#}", err).contains("model unavailable"));
    assert!(llm.prompt_for("Write Agent").is_none());
}

#[tokio::test]
async fn runs_are_independent() {
    let llm = Arc::new(ScriptedCompleter::default());
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Arc::new(Pipeline::new(Flow::Search, llm, search.clone()));

    let other = SearchRequest::new("Sponge", "soft kitchen sponge").unwrap();
    let (a, b) = tokio::join!(pipeline.run(request()), pipeline.run(other));

    assert!(a.unwrap().final_query.as_str().starts_with("Pot Scrubber "));
    assert!(b.unwrap().final_query.as_str().starts_with("Sponge "));
    assert_eq!(search.queries().len(), 2);
}

#[test]
fn search_flow_terminates_after_one_pass() {
    let llm = Arc::new(ScriptedCompleter::default());
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Pipeline::new(Flow::Search, llm.clone(), search.clone());

    let outcome = finishes_within(Duration::from_secs(10), move || async move {
        pipeline.run(request()).await
    })
    .unwrap();

    assert_eq!(outcome.refined_query.as_str(), "stainless steel scrubber ergonomic handle");
    assert_eq!(outcome.task_times.len(), 3);
    assert!(outcome.task_times.contains_key("result_sorter"));
    assert_eq!(search.queries().len(), 1);
    assert_eq!(llm.roles().len(), 1);
}

#[test]
fn report_flow_terminates_after_one_pass() {
    let llm = Arc::new(ScriptedCompleter::default());
    let search = Arc::new(FakeSearch::returning(listings()));
    let pipeline = Pipeline::new(Flow::Report, llm.clone(), search.clone());

    let outcome = finishes_within(Duration::from_secs(10), move || async move {
        pipeline.run(request()).await
    })
    .unwrap();

    assert!(outcome.report.is_some());
    assert_eq!(search.queries().len(), 1);
    assert_eq!(llm.roles().len(), 4);
}
