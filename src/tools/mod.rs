pub mod llm;
pub mod serpapi;

pub use llm::{AgentProfile, RigCompleter, TaskBrief, TextCompleter};
pub use serpapi::{SerpApiClient, ShoppingSearch};
