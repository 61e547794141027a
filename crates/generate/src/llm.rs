use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::schema::{ChatMessage, Completion, CompletionRequest, ToolCall, ToolSpec};
use graph::{Error, Result};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Text-generation collaborator: one request in, one completion out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

impl ChatClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let params = &request.params;
        let mut body = json!({
            "model": self.model,
            "messages": request.messages.iter().map(message_to_wire).collect::<Vec<_>>(),
            "temperature": params.temperature,
            "top_p": params.top_p,
            "max_tokens": params.max_tokens,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
        });

        if !params.stop.is_empty() {
            body["stop"] = json!(params.stop);
        }

        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools.iter().map(tool_to_wire).collect::<Vec<_>>());
        }

        body
    }
}

#[async_trait]
impl CompletionClient for ChatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion request"
        );

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Chat completion request failed");
            Error::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Chat completion returned an error status");
            return Err(Error::upstream(Some(status.as_u16()), text));
        }

        parse_response(&text)
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    let mut wire = json!({
        "role": message.role.as_str(),
        "content": message.content,
    });

    if let Some(name) = &message.name {
        wire["name"] = json!(name);
    }

    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = json!(
            message
                .tool_calls
                .iter()
                .map(|call| json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments.to_string(),
                    }
                }))
                .collect::<Vec<_>>()
        );
    }

    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }

    wire
}

fn tool_to_wire(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

/// Decode a chat-completions body into the first choice.
pub fn parse_response(body: &str) -> Result<Completion> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("invalid chat completion body: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::generation("completion returned no choices"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call
                .id
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
            name: call.function.name,
            arguments: call
                .function
                .arguments
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or(Value::Null),
        })
        .collect();

    Ok(Completion {
        content: choice.message.content,
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DecodingParams;
    use graph::testing::{closed_endpoint, http_response, serve_once};

    fn hello_request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user("hello")],
            params: DecodingParams::greedy(16),
            tools: Vec::new(),
        }
    }

    fn client_at(base_url: String) -> ChatClient {
        ChatClient::new(
            base_url,
            "gpt-3.5-turbo-16k".to_string(),
            Some("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_over_http() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "meta { name } }"}}]}"#;
        let url = serve_once(http_response("200 OK", "application/json", body)).await;

        let completion = client_at(url).complete(hello_request()).await.unwrap();
        assert_eq!(completion.content.as_deref(), Some("meta { name } }"));
    }

    #[tokio::test]
    async fn test_error_status_is_upstream() {
        let url = serve_once(http_response("502 Bad Gateway", "text/plain", "bad gateway")).await;

        let err = client_at(url).complete(hello_request()).await.unwrap_err();

        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, Some(502));
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upstream() {
        let err = client_at(closed_endpoint().await)
            .complete(hello_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { status: None, .. }));
    }

    fn client() -> ChatClient {
        ChatClient::new(
            "http://localhost:11434/v1/".to_string(),
            "llama3".to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_carries_decoding_params() {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::named_system("example_user", "q"),
                ChatMessage::assistant("query "),
            ],
            params: DecodingParams::greedy(250).with_stop(vec!["###".to_string()]),
            tools: Vec::new(),
        };

        let body = client().build_request_body(&request);

        assert_eq!(body["model"], "llama3");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["stop"], json!(["###"]));
        assert_eq!(body["messages"][0]["name"], "example_user");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"], "query ");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_tool_messages_on_the_wire() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get-disease-id".to_string(),
            arguments: json!({"name": "melanoma"}),
        };
        let assistant = message_to_wire(&ChatMessage::assistant_tool_calls(None, vec![call]));
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "get-disease-id");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"name":"melanoma"}"#
        );

        let result = message_to_wire(&ChatMessage::tool_result("call_1", "EFO_0000756"));
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_1");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_parse_text_completion() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "disease { id }"}}]}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("disease { id }"));
        assert!(completion.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_tool_calls() {
        let body = r#"{"choices": [{"message": {"content": null, "tool_calls": [
            {"id": "call_a", "type": "function", "function": {"name": "subset-list", "arguments": "{\"items\": [1,2], \"n\": 1}"}},
            {"type": "function", "function": {"name": "flatten", "arguments": "not json"}}
        ]}}]}"#;

        let completion = parse_response(body).unwrap();

        assert_eq!(completion.tool_calls.len(), 2);
        assert_eq!(completion.tool_calls[0].id, "call_a");
        assert_eq!(completion.tool_calls[0].arguments["n"], 1);
        assert!(completion.tool_calls[1].id.starts_with("call_"));
        assert_eq!(completion.tool_calls[1].arguments, Value::Null);
    }

    #[test]
    fn test_parse_null_tool_fields() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"disease { id } }","tool_calls":null}}]}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("disease { id } }"));
        assert!(completion.tool_calls.is_empty());

        let body = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"call_n","function":{"name":"flatten","arguments":null}}
        ]}}]}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.tool_calls[0].name, "flatten");
        assert_eq!(completion.tool_calls[0].arguments, Value::Null);
    }

    #[test]
    fn test_parse_no_choices() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_response("upstream proxy error").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
