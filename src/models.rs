use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Context keys, one per stage output. A stage only ever writes its own key.
pub mod keys {
    pub const SEARCH_REQUEST: &str = "search_request";
    pub const REFINED_QUERY: &str = "refined_query";
    pub const FINAL_QUERY: &str = "final_query";
    pub const SHOPPING_RESULTS: &str = "shopping_results";
    pub const SORTED_RESULTS: &str = "sorted_results";
    pub const LISTING_SUMMARY: &str = "listing_summary";
    pub const LINK_REPORT: &str = "link_report";
    pub const FINAL_REPORT: &str = "final_report";
    pub const TASK_TIMES: &str = "task_times";
}

/// A validated product search: both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    product_name: String,
    description: String,
}

impl SearchRequest {
    pub fn new(
        product_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, &'static str> {
        let product_name = product_name.into();
        let description = description.into();
        if product_name.is_empty() || description.is_empty() {
            return Err("Title and description cannot be empty");
        }
        Ok(Self {
            product_name,
            description,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Short query text produced by the refiner agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedQuery(String);

impl RefinedQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

/// The query sent to the shopping provider: product name, a space, then the
/// refined text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalQuery(String);

impl FinalQuery {
    pub fn compose(request: &SearchRequest, refined: &RefinedQuery) -> Self {
        Self(format!("{} {}", request.product_name(), refined.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One product record from the provider, kept exactly as received. Only
/// the fields the pipeline reads have accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShoppingResult(Map<String, Value>);

impl ShoppingResult {
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn extracted_price(&self) -> Option<&Value> {
        self.0.get("extracted_price")
    }

    /// Numeric price used for ordering. Missing, unparseable, or non-finite
    /// prices count as zero.
    pub fn price(&self) -> f64 {
        let parsed = match self.extracted_price() {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(p) if p.is_finite() => p + 0.0,
            _ => 0.0,
        }
    }

    /// Provider link, falling back to `product_link` which google_shopping
    /// uses for some listings.
    pub fn link(&self) -> Option<&str> {
        self.0
            .get("link")
            .and_then(Value::as_str)
            .or_else(|| self.0.get("product_link").and_then(Value::as_str))
    }
}

/// Results ordered by price, most expensive first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortedResults(pub Vec<ShoppingResult>);

impl SortedResults {
    pub fn into_inner(self) -> Vec<ShoppingResult> {
        self.0
    }

    pub fn as_slice(&self) -> &[ShoppingResult] {
        &self.0
    }
}

/// Title/price/link extraction written by the response refiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary(pub String);

/// Verdict of the link validator, plus the local parse check it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
    pub checks: Vec<LinkCheck>,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCheck {
    pub title: String,
    pub link: String,
    pub well_formed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// What a finished pipeline run hands back to its caller.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub refined_query: RefinedQuery,
    pub final_query: FinalQuery,
    pub results: SortedResults,
    pub report: Option<FinalReport>,
    pub task_times: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<ShoppingResult>,
}
