//! Completion client double shared by this crate's tests and downstream crates
//! (enable the `testing` feature).

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::llm::CompletionClient;
use crate::schema::{Completion, CompletionRequest};
use graph::{Error, Result};

/// Replays a fixed script, one completion per call, and keeps every request.
///
/// Once the script runs out each call fails with an upstream error.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Completion>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Completion::text(text)])
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::upstream(None, "script exhausted"))
    }
}
