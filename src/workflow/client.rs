use super::WorkflowService;
use crate::models::{Config, SelectedFile, SOURCE_TEXT_KEY, TRANSLATED_TEXT_KEY};
use crate::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

pub struct WorkflowClient {
    client: Client,
    api_key: String,
    execute_url: String,
}

impl WorkflowClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::new_with_client(config, builder.build()?))
    }

    pub fn new_with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            execute_url: format!(
                "{}/workflows/{}/execute",
                config.api_url.trim_end_matches('/'),
                config.workflow_id
            ),
        }
    }

    pub fn execute_url(&self) -> &str {
        &self.execute_url
    }

    fn file_part(file: &SelectedFile) -> Result<Part> {
        Ok(Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime)?)
    }
}

/// Pull `result.text` out of a workflow response body.
pub(crate) fn extract_result_text(body: &Value) -> Option<String> {
    body.get("result")
        .and_then(|result| result.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl WorkflowService for WorkflowClient {
    async fn execute(
        &self,
        source: &SelectedFile,
        translated: &SelectedFile,
    ) -> Result<Option<String>> {
        tracing::info!(
            "Submitting '{}' and '{}' to {}",
            source.name,
            translated.name,
            self.execute_url
        );

        let form = Form::new()
            .part(SOURCE_TEXT_KEY, Self::file_part(source)?)
            .part(TRANSLATED_TEXT_KEY, Self::file_part(translated)?);

        let response = self
            .client
            .post(&self.execute_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to workflow API: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Workflow API responded with status {}", status);
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse workflow response: {}\nBody: {}", e, body);
            e
        })?;

        Ok(extract_result_text(&json))
    }
}
