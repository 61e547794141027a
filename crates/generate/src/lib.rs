pub mod exemplars;
pub mod generator;
pub mod llm;
pub mod prompt;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use exemplars::{default_exemplars, exemplars_from_json, Exemplar};
pub use generator::{GeneratorSettings, QueryGenerator};
pub use llm::{ChatClient, CompletionClient, OPENAI_BASE_URL};
pub use prompt::PromptContext;
pub use schema::{
    ChatMessage, Completion, CompletionRequest, DecodingParams, Role, ToolCall, ToolSpec,
};
