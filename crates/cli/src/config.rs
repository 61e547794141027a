use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use agent::{Mode, DEFAULT_RESULT_LIMIT};
use generate::{default_exemplars, exemplars_from_json, Exemplar, OPENAI_BASE_URL};

/// Schema excerpt compiled into the binary, used when no schema file is configured.
const BUNDLED_SCHEMA: &str = include_str!("../assets/open_targets_schema.graphql");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    pub llm: LlmConfig,
    pub graph: GraphConfig,
    pub prompt: PromptConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Taken from `OPENAI_API_KEY` when not set in the file
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub agent_max_tokens: u32,
    pub max_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Bundled schema is used when unset
    pub schema_path: Option<PathBuf>,
    /// Built-in exemplars are used when unset
    pub exemplars_path: Option<PathBuf>,
    pub prefix: Option<String>,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub result_limit: i64,
    pub query_log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Direct,
            llm: LlmConfig::default(),
            graph: GraphConfig::default(),
            prompt: PromptConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: "gpt-3.5-turbo-16k".to_string(),
            api_key: None,
            request_timeout_secs: 120,
            agent_max_tokens: agent::agentic::DEFAULT_AGENT_MAX_TOKENS,
            max_steps: agent::agentic::DEFAULT_MAX_STEPS,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: graph::OPEN_TARGETS_ENDPOINT.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            exemplars_path: None,
            prefix: Some(generate::generator::DEFAULT_PREFIX.to_string()),
            max_tokens: generate::generator::DEFAULT_MAX_TOKENS,
            stop: vec![generate::generator::DEFAULT_STOP.to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
            query_log_dir: PathBuf::from("queries"),
        }
    }
}

impl AppConfig {
    /// Loads the optional JSON file named by `ASK_OT_CONFIG`, then applies env overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("ASK_OT_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(mode) = lookup("ASK_OT_MODE") {
            config.mode = mode.parse().context("ASK_OT_MODE")?;
        }
        if let Some(url) = lookup("ASK_OT_LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = lookup("ASK_OT_MODEL") {
            config.llm.model = model;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(v) = lookup("ASK_OT_LLM_TIMEOUT_SECS") {
            config.llm.request_timeout_secs = parse_num("ASK_OT_LLM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("ASK_OT_MAX_STEPS") {
            config.llm.max_steps = parse_num("ASK_OT_MAX_STEPS", &v)?;
        }
        if let Some(endpoint) = lookup("ASK_OT_GRAPH_ENDPOINT") {
            config.graph.endpoint = endpoint;
        }
        if let Some(v) = lookup("ASK_OT_GRAPH_TIMEOUT_SECS") {
            config.graph.request_timeout_secs = parse_num("ASK_OT_GRAPH_TIMEOUT_SECS", &v)?;
        }
        if let Some(path) = lookup("ASK_OT_SCHEMA_PATH") {
            config.prompt.schema_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("ASK_OT_EXEMPLARS_PATH") {
            config.prompt.exemplars_path = Some(PathBuf::from(path));
        }
        if let Some(v) = lookup("ASK_OT_RESULT_LIMIT") {
            config.output.result_limit = parse_num("ASK_OT_RESULT_LIMIT", &v)?;
        }
        if let Some(dir) = lookup("ASK_OT_QUERY_LOG_DIR") {
            config.output.query_log_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.graph.endpoint.trim().is_empty() {
            bail!("graph.endpoint must not be empty");
        }
        if self.llm.request_timeout_secs == 0 || self.graph.request_timeout_secs == 0 {
            bail!("request timeouts must be greater than zero");
        }
        if self.llm.max_steps == 0 {
            bail!("llm.max_steps must be at least 1");
        }
        if self.prompt.max_tokens == 0 || self.llm.agent_max_tokens == 0 {
            bail!("token budgets must be greater than zero");
        }
        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.request_timeout_secs)
    }

    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph.request_timeout_secs)
    }

    pub async fn load_schema(&self) -> Result<String> {
        let Some(path) = &self.prompt.schema_path else {
            return Ok(BUNDLED_SCHEMA.to_string());
        };
        let schema = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        if schema.trim().is_empty() {
            bail!("schema file {} is empty", path.display());
        }
        Ok(schema)
    }

    pub async fn load_exemplars(&self) -> Result<Vec<Exemplar>> {
        let Some(path) = &self.prompt.exemplars_path else {
            return Ok(default_exemplars());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read exemplars file {}", path.display()))?;
        exemplars_from_json(&raw)
            .with_context(|| format!("invalid exemplars in {}", path.display()))
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has invalid value '{value}'"))
}
