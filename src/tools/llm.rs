use anyhow::Result;
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::openai;
use tracing::debug;

type LLMAgent = rig::agent::Agent<openai::CompletionModel>;

/// Who the model is asked to be for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentProfile {
    pub fn preamble(&self) -> String {
        format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// One unit of work handed to an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBrief {
    pub description: String,
    pub expected_output: &'static str,
}

impl TaskBrief {
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\nReturn only the final answer.",
            self.description, self.expected_output
        )
    }
}

/// Produce a text completion for a profile and a task. Pipeline stages only
/// see this trait, never a concrete provider.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, profile: &AgentProfile, task: &TaskBrief) -> Result<String>;
}

/// OpenAI-backed completer built on rig.
pub struct RigCompleter {
    client: openai::Client,
    model: String,
}

impl RigCompleter {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }

    fn agent(&self, profile: &AgentProfile) -> LLMAgent {
        self.client
            .agent(&self.model)
            .preamble(&profile.preamble())
            .build()
    }
}

#[async_trait]
impl TextCompleter for RigCompleter {
    async fn complete(&self, profile: &AgentProfile, task: &TaskBrief) -> Result<String> {
        debug!(role = profile.role, model = %self.model, "Prompting agent");
        let agent = self.agent(profile);
        let prompt = task.prompt();
        let response = agent
            .prompt(&prompt)
            .await
            .map_err(|e| anyhow::anyhow!("Prompt error: {}", e))?;
        Ok(response)
    }
}
