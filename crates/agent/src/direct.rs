use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::query_log::QueryLog;
use generate::QueryGenerator;
use graph::{flatten, truncate, QueryExecutor, Result, Scalar, StructuredQuery};

pub const DEFAULT_RESULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectResult {
    pub query: StructuredQuery,
    pub results: Vec<Scalar>,
    pub trace: DirectTrace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectTrace {
    pub leaves_found: usize,
    pub results_returned: usize,
    pub log_path: PathBuf,
}

/// Single pass: generate a query, run it, flatten and cut the response.
pub struct DirectPipeline {
    generator: QueryGenerator,
    executor: Arc<dyn QueryExecutor>,
    query_log: QueryLog,
    result_limit: i64,
}

impl DirectPipeline {
    pub fn new(
        generator: QueryGenerator,
        executor: Arc<dyn QueryExecutor>,
        query_log: QueryLog,
        result_limit: i64,
    ) -> Self {
        Self {
            generator,
            executor,
            query_log,
            result_limit,
        }
    }

    pub async fn run(&self, question: &str) -> Result<DirectResult> {
        // Step 1: Generate the query
        let query = self.generator.generate(question).await?;

        // Step 2: Submit it
        let data = self.executor.execute(&query).await?;

        // Step 3: Flatten and truncate
        let leaves = flatten(&data);
        let results = truncate(&leaves, self.result_limit);

        // Step 4: Persist the query only once everything above succeeded
        let log_path = self.query_log.record(question, &query).await?;

        info!(
            leaves = leaves.len(),
            returned = results.len(),
            "Direct query answered"
        );

        Ok(DirectResult {
            query,
            trace: DirectTrace {
                leaves_found: leaves.len(),
                results_returned: results.len(),
                log_path,
            },
            results,
        })
    }
}
