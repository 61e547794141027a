use crate::exemplars::Exemplar;
use crate::schema::ChatMessage;

pub const EXAMPLE_USER: &str = "example_user";
pub const EXAMPLE_ASSISTANT: &str = "example_assistant";

pub fn schema_instruction(schema: &str) -> String {
    format!("Here is the schema of the Open Targets Platform GraphQL endpoint: {schema}")
}

pub const QUERY_ONLY_INSTRUCTION: &str = "You are generating GraphQL queries to the Open Targets Platform endpoint. \
Only return the query itself. Do not describe the query or summarize it in any way.";

pub const REUSE_EXAMPLE_INSTRUCTION: &str = "If the user ever asks a question with the same meaning \
as one of the previous example questions, provide the corresponding example answer.";

/// Ordered few-shot transcript for a single question.
///
/// Built once per request and handed to the completion client by value.
#[derive(Debug, Clone)]
pub struct PromptContext {
    messages: Vec<ChatMessage>,
    prefix: Option<String>,
}

impl PromptContext {
    pub fn few_shot(
        schema: &str,
        exemplars: &[Exemplar],
        question: &str,
        prefix: Option<&str>,
    ) -> Self {
        let mut messages = Vec::with_capacity(exemplars.len() * 2 + 5);

        messages.push(ChatMessage::system(schema_instruction(schema)));
        messages.push(ChatMessage::system(QUERY_ONLY_INSTRUCTION));
        messages.push(ChatMessage::system(REUSE_EXAMPLE_INSTRUCTION));

        for exemplar in exemplars {
            messages.push(ChatMessage::named_system(EXAMPLE_USER, exemplar.question.as_str()));
            messages.push(ChatMessage::named_system(EXAMPLE_ASSISTANT, exemplar.query.as_str()));
        }

        messages.push(ChatMessage::user(question));

        if let Some(prefix) = prefix {
            messages.push(ChatMessage::assistant(prefix));
        }

        Self {
            messages,
            prefix: prefix.map(str::to_string),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}
