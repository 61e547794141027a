pub mod agentic;
pub mod builtin;
pub mod direct;
pub mod prompt;
pub mod query_log;
pub mod tools;

#[cfg(test)]
mod testing;

pub use agentic::{AgentLoop, AgentResult, AgentSettings, AgentTrace};
pub use builtin::default_registry;
pub use direct::{DirectPipeline, DirectResult, DirectTrace, DEFAULT_RESULT_LIMIT};
pub use query_log::QueryLog;
pub use tools::{Tool, ToolRegistry};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use graph::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Direct,  // one generated query per question
    Agentic, // tool loop, model picks the steps
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Mode::Direct),
            "agentic" | "agent" => Ok(Mode::Agentic),
            other => Err(Error::invalid_argument(format!("unknown mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Results(DirectResult),
    Answer(AgentResult),
}

/// Runs one question through whichever mode was configured.
pub struct Orchestrator {
    mode: Mode,
    direct: DirectPipeline,
    agent: AgentLoop,
}

impl Orchestrator {
    pub fn new(mode: Mode, direct: DirectPipeline, agent: AgentLoop) -> Self {
        Self {
            mode,
            direct,
            agent,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub async fn ask(&self, question: &str) -> Result<Outcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::invalid_argument("question is empty"));
        }

        info!(mode = ?self.mode, question, "Handling question");

        match self.mode {
            Mode::Direct => self.direct.run(question).await.map(Outcome::Results),
            Mode::Agentic => self.agent.run(question).await.map(Outcome::Answer),
        }
    }
}
