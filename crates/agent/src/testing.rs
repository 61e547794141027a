//! Test doubles for the graph executor; the completion double lives in `generate`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use generate::testing::ScriptedClient;
use graph::{Error, NestedValue, QueryExecutor, Result, StructuredQuery};

/// Executor that answers every query with the same payload and records what it was sent.
pub struct RecordingExecutor {
    response: Option<Value>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn returning(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Fails every call with a 500 upstream error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, query: &StructuredQuery) -> Result<NestedValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        match &self.response {
            Some(value) => Ok(NestedValue::from(value.clone())),
            None => Err(Error::upstream(Some(500), "internal server error")),
        }
    }
}
