use super::WorkflowService;
use crate::models::SelectedFile;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum MockOutcome {
    Text(Option<String>),
    Failure(String),
}

/// In-memory workflow service that replays configured outcomes in order.
#[derive(Clone)]
pub struct MockWorkflowClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    call_count: Arc<Mutex<usize>>,
    submitted: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockWorkflowClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_result_text(self, text: impl Into<String>) -> Self {
        self.push(MockOutcome::Text(Some(text.into())))
    }

    /// Respond as if the body had no `result.text`.
    pub fn with_missing_text(self) -> Self {
        self.push(MockOutcome::Text(None))
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockOutcome::Failure(message.into()))
    }

    fn push(self, outcome: MockOutcome) -> Self {
        self.outcomes.lock().unwrap().push(outcome);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// File names of every submission, as `(source, translated)`.
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Default for MockWorkflowClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowService for MockWorkflowClient {
    async fn execute(
        &self,
        source: &SelectedFile,
        translated: &SelectedFile,
    ) -> Result<Option<String>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        self.submitted
            .lock()
            .unwrap()
            .push((source.name.clone(), translated.name.clone()));

        let outcomes = self.outcomes.lock().unwrap();
        let outcome = if outcomes.is_empty() {
            MockOutcome::Text(Some(format!("{} ⇄ {}", source.name, translated.name)))
        } else {
            outcomes[(*count - 1) % outcomes.len()].clone()
        };

        match outcome {
            MockOutcome::Text(text) => Ok(text),
            MockOutcome::Failure(message) => Err(Error::Workflow(message)),
        }
    }
}
