mod config;

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use agent::{
    default_registry, AgentLoop, AgentSettings, DirectPipeline, Orchestrator, Outcome, QueryLog,
};
use config::AppConfig;
use generate::{ChatClient, CompletionClient, GeneratorSettings, QueryGenerator};
use graph::{GraphQlClient, QueryExecutor};

const GREETING: &str = "How can I help you today?";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the answer
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let orchestrator = build_orchestrator(&config).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{GREETING}\n").as_bytes()).await?;
    stdout.flush().await?;

    let mut question = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut question)
        .await
        .context("failed to read question from stdin")?;

    let outcome = orchestrator
        .ask(&question)
        .await
        .context("failed to answer question")?;

    stdout.write_all(render_outcome(&outcome).as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}

async fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let schema = config.load_schema().await?;
    let exemplars = config.load_exemplars().await?;

    let executor: Arc<dyn QueryExecutor> = Arc::new(
        GraphQlClient::new(config.graph.endpoint.clone(), config.graph_timeout())
            .context("failed to build graph client")?,
    );
    let client: Arc<dyn CompletionClient> = Arc::new(
        ChatClient::new(
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            config.llm.api_key.clone(),
            config.llm_timeout(),
        )
        .context("failed to build completion client")?,
    );

    let generator = QueryGenerator::new(
        client.clone(),
        GeneratorSettings {
            schema: schema.clone(),
            exemplars,
            prefix: config.prompt.prefix.clone(),
            max_tokens: config.prompt.max_tokens,
            stop: config.prompt.stop.clone(),
        },
    );
    let direct = DirectPipeline::new(
        generator,
        executor.clone(),
        QueryLog::new(&config.output.query_log_dir),
        config.output.result_limit,
    );

    let agent = AgentLoop::new(
        client,
        default_registry(executor),
        AgentSettings {
            schema,
            max_tokens: config.llm.agent_max_tokens,
            max_steps: config.llm.max_steps,
        },
    );

    info!(
        mode = ?config.mode,
        model = %config.llm.model,
        endpoint = %config.graph.endpoint,
        "Pipeline ready"
    );

    Ok(Orchestrator::new(config.mode, direct, agent))
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Results(result) => {
            let mut out = String::new();
            for (i, value) in result.results.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, value);
            }
            out
        }
        Outcome::Answer(result) => format!("{}\n", result.answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::{AgentResult, AgentTrace, DirectResult, DirectTrace};
    use graph::{Scalar, StructuredQuery};
    use std::path::PathBuf;

    #[test]
    fn test_render_numbered_results() {
        let outcome = Outcome::Results(DirectResult {
            query: StructuredQuery::new("query q { x }"),
            results: vec![
                Scalar::from("Alzheimer disease"),
                Scalar::from("dementia"),
                Scalar::Null,
            ],
            trace: DirectTrace {
                leaves_found: 3,
                results_returned: 3,
                log_path: PathBuf::from("query.txt"),
            },
        });

        assert_eq!(
            render_outcome(&outcome),
            "1. Alzheimer disease\n2. dementia\n3. null\n"
        );
    }

    #[test]
    fn test_render_answer() {
        let outcome = Outcome::Answer(AgentResult {
            answer: "DABRAFENIB, TRAMETINIB".to_string(),
            trace: AgentTrace::default(),
        });
        assert_eq!(render_outcome(&outcome), "DABRAFENIB, TRAMETINIB\n");
    }

    #[tokio::test]
    async fn test_build_fails_without_schema() {
        let mut config = AppConfig::default();
        config.prompt.schema_path = Some(PathBuf::from("/nonexistent/schema.graphql"));
        assert!(build_orchestrator(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_build_from_schema_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let schema_path = dir.path().join("schema.graphql");
        std::fs::write(&schema_path, "type Query { meta: Meta }").unwrap();

        let mut config = AppConfig::default();
        config.prompt.schema_path = Some(schema_path);
        config.mode = agent::Mode::Agentic;

        let orchestrator = build_orchestrator(&config).await.unwrap();
        assert_eq!(orchestrator.mode(), agent::Mode::Agentic);
    }

    #[tokio::test]
    async fn test_build_with_bundled_schema() {
        let orchestrator = build_orchestrator(&AppConfig::default()).await.unwrap();
        assert_eq!(orchestrator.mode(), agent::Mode::Direct);
    }
}
