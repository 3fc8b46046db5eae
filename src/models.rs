//! Data models and structures
//!
//! Defines the run form configuration, vision attachment types, the file
//! handles submitted to the workflow API, and environment configuration.

use crate::markup::MarkupPolicy;
use crate::mime::detect_document_mime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Workflow that performs the paragraph alignment.
pub const WORKFLOW_ID: &str = "TDRz4MRX45PyMsFk";

pub const DEFAULT_API_URL: &str = "http://localhost/v1";

/// Cap applied to `string` variables that do not declare `max_length`.
pub const DEFAULT_VALUE_MAX_LEN: usize = 48;

pub const SOURCE_TEXT_KEY: &str = "source_text";
pub const TRANSLATED_TEXT_KEY: &str = "translated_text";

/// Current form values keyed by variable key.
pub type Inputs = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Select,
    String,
    Paragraph,
    Number,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptVariable {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptConfig {
    #[serde(default)]
    pub prompt_variables: Vec<PromptVariable>,
}

impl PromptConfig {
    pub fn variable(&self, key: &str) -> Option<&PromptVariable> {
        self.prompt_variables.iter().find(|v| v.key == key)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    LocalFile,
    RemoteUrl,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisionSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_limits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub transfer_methods: Vec<TransferMethod>,
}

/// Progress value the image uploader reports for a failed upload.
pub const UPLOAD_FAILED_PROGRESS: i32 = -1;

/// An image as reported by the external uploader widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedImage {
    #[serde(rename = "type")]
    pub transfer_method: TransferMethod,
    pub url: String,
    pub file_id: String,
    pub progress: i32,
}

impl UploadedImage {
    pub fn upload_failed(&self) -> bool {
        self.progress == UPLOAD_FAILED_PROGRESS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionFile {
    #[serde(rename = "type")]
    pub file_type: String,
    pub transfer_method: TransferMethod,
    pub url: String,
    pub upload_file_id: String,
}

impl From<&UploadedImage> for VisionFile {
    fn from(image: &UploadedImage) -> Self {
        Self {
            file_type: "image".to_string(),
            transfer_method: image.transfer_method,
            url: image.url.clone(),
            upload_file_id: image.file_id.clone(),
        }
    }
}

/// A file picked by the user, held in memory until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = detect_document_mime(&name);
        Self { name, bytes, mime }
    }

    pub async fn from_path(path: &Path) -> crate::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| crate::Error::Invalid(format!("{} has no file name", path.display())))?;
        Ok(Self::new(name, bytes))
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub workflow_id: String,
    pub request_timeout: Option<Duration>,
    pub markup_policy: MarkupPolicy,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!("REQUEST_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                if secs == 0 {
                    return Err(crate::Error::Config(
                        "REQUEST_TIMEOUT_SECS must be positive".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let markup_policy = match var("TRUST_RESULT_MARKUP").as_deref().map(str::trim) {
            Some("true") | Some("1") => MarkupPolicy::Raw,
            _ => MarkupPolicy::Escaped,
        };

        Ok(Self {
            api_url: var("API_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: var("API_KEY").unwrap_or_default(),
            workflow_id: WORKFLOW_ID.to_string(),
            request_timeout,
            markup_policy,
        })
    }
}
