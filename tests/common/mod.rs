#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shopping_graphflow::models::{FinalQuery, ShoppingResult};
use shopping_graphflow::tools::{AgentProfile, ShoppingSearch, TaskBrief, TextCompleter};
use std::future::Future;
use std::sync::{mpsc, Mutex};
use std::time::Duration;

/// Run a future on its own runtime and thread, failing the test if it has
/// not finished in `limit`. A runaway loop cannot block the test harness.
pub fn finishes_within<F, T>(limit: Duration, make: impl FnOnce() -> F + Send + 'static) -> T
where
    F: Future<Output = T>,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _ = tx.send(runtime.block_on(make()));
    });
    rx.recv_timeout(limit)
        .unwrap_or_else(|_| panic!("did not finish within {:?}", limit))
}

/// Answers by agent role and remembers every call.
#[derive(Default)]
pub struct ScriptedCompleter {
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail_role: Option<&'static str>,
}

impl ScriptedCompleter {
    pub fn failing_on(role: &'static str) -> Self {
        Self {
            fail_role: Some(role),
            ..Default::default()
        }
    }

    pub fn roles(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn prompt_for(&self, role: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, d)| d.clone())
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, profile: &AgentProfile, task: &TaskBrief) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((profile.role.to_string(), task.description.clone()));

        if self.fail_role == Some(profile.role) {
            anyhow::bail!("model unavailable");
        }

        Ok(match profile.role {
            "Search Query Refiner" => "stainless steel scrubber ergonomic handle".to_string(),
            "Response Refiner" => "1. Deluxe Scrubber - $20 - https://shop.test/deluxe".to_string(),
            "Web Checking Agent" => "https://shop.test/deluxe is valid".to_string(),
            "Write Agent" => "# Report\nThe deluxe scrubber matches.".to_string(),
            other => format!("unexpected role {}", other),
        })
    }
}

/// Returns canned records, or fails, and remembers each query.
pub struct FakeSearch {
    pub queries: Mutex<Vec<String>>,
    pub results: Vec<ShoppingResult>,
    pub failure: Option<&'static str>,
}

impl FakeSearch {
    pub fn returning(values: Vec<Value>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            results: values
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap())
                .collect(),
            failure: None,
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            results: Vec::new(),
            failure: Some(message),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShoppingSearch for FakeSearch {
    async fn search(&self, query: &FinalQuery) -> Result<Vec<ShoppingResult>> {
        self.queries.lock().unwrap().push(query.as_str().to_string());
        match self.failure {
            Some(message) => anyhow::bail!("{}", message),
            None => Ok(self.results.clone()),
        }
    }
}
