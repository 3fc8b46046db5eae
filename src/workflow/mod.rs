//! Workflow-execution API integration
//!
//! Submits the source and translated documents to the alignment workflow and
//! returns the text the workflow produced.

pub mod client;
pub mod mock;

pub use client::WorkflowClient;
pub use mock::MockWorkflowClient;

use crate::models::SelectedFile;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Run the workflow on both files, returning `result.text` when present.
    async fn execute(&self, source: &SelectedFile, translated: &SelectedFile)
        -> Result<Option<String>>;
}
