use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::exemplars::{default_exemplars, Exemplar};
use crate::llm::CompletionClient;
use crate::prompt::PromptContext;
use crate::schema::{CompletionRequest, DecodingParams};
use graph::{Error, Result, StructuredQuery};

pub const DEFAULT_PREFIX: &str = "query ";
pub const DEFAULT_STOP: &str = "###";
pub const DEFAULT_MAX_TOKENS: u32 = 250;

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Graph schema text, embedded verbatim in the prompt
    pub schema: String,
    pub exemplars: Vec<Exemplar>,
    /// Assistant-role priming fragment the completion continues from
    pub prefix: Option<String>,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl GeneratorSettings {
    pub fn new(schema: String) -> Self {
        Self {
            schema,
            exemplars: default_exemplars(),
            prefix: Some(DEFAULT_PREFIX.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            stop: vec![DEFAULT_STOP.to_string()],
        }
    }
}

/// Few-shot query writer.
pub struct QueryGenerator {
    client: Arc<dyn CompletionClient>,
    settings: GeneratorSettings,
}

impl QueryGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn build_prompt(&self, question: &str) -> PromptContext {
        PromptContext::few_shot(
            &self.settings.schema,
            &self.settings.exemplars,
            question,
            self.settings.prefix.as_deref(),
        )
    }

    pub async fn generate(&self, question: &str) -> Result<StructuredQuery> {
        let prompt = self.build_prompt(question);
        let prefix = prompt.prefix().map(str::to_string);

        debug!(
            messages = prompt.messages().len(),
            primed = prefix.is_some(),
            "Requesting query completion"
        );

        let request = CompletionRequest {
            messages: prompt.into_messages(),
            params: DecodingParams::greedy(self.settings.max_tokens)
                .with_stop(self.settings.stop.clone()),
            tools: Vec::new(),
        };

        let completion = self.client.complete(request).await.map_err(|e| {
            warn!(error = %e, "Query completion failed");
            Error::generation(format!("completion request failed: {e}"))
        })?;

        if completion.non_empty_content().is_none() {
            return Err(Error::generation("completion returned no query text"));
        }
        let text = completion.content.as_deref().unwrap_or_default().trim_end();

        // The completion continues after the primed prefix and omits it.
        let query = match prefix {
            Some(prefix) => format!("{prefix}{text}"),
            None => text.to_string(),
        };

        info!(query = %query, "Generated structured query");
        Ok(StructuredQuery::new(query))
    }
}
