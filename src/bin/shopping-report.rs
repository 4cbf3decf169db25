use anyhow::{Context, Result};
use shopping_graphflow::{
    config::AppConfig,
    models::SearchRequest,
    pipeline::{Flow, Pipeline},
    tools::{RigCompleter, SerpApiClient},
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

fn prompt_line(input: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    shopping_graphflow::init_tracing();

    let config = AppConfig::from_env()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let product_name = prompt_line(&mut input, "Enter the product name (e.g., Pot Scrubber): ")?;
    let description = prompt_line(
        &mut input,
        &format!(
            "Enter the product description and features for {}: ",
            product_name
        ),
    )?;
    drop(input);

    let request = SearchRequest::new(product_name, description).map_err(anyhow::Error::msg)?;

    let llm = Arc::new(RigCompleter::new(&config.openai_api_key, config.model.clone()));
    let search = Arc::new(SerpApiClient::new(config.serpapi_key.clone()));
    let pipeline = Pipeline::new(Flow::Report, llm, search);

    let outcome = pipeline.run(request).await?;
    info!(
        "Refined query {:?}, searched {:?}, {} results",
        outcome.refined_query.as_str(),
        outcome.final_query.as_str(),
        outcome.results.as_slice().len()
    );

    let report = outcome
        .report
        .context("Report flow finished without a report")?;
    println!("Final Report:\n");
    println!("{}", report.text);
    Ok(())
}
