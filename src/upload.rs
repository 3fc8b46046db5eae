//! Alignment upload page
//!
//! Holds the two picked documents, submits them to the workflow service and
//! keeps the text to display. Every outcome of a submission ends up as a
//! displayable string.

use crate::markup::{escape_html, MarkupPolicy};
use crate::mime::{accept_attribute, is_accepted};
use crate::models::SelectedFile;
use crate::workflow::WorkflowService;
use crate::Result;
use tracing::{error, info, warn};

pub const NOT_FOUND_MESSAGE: &str = "未找到对齐结果。";
pub const REQUEST_FAILED_MESSAGE: &str = "请求失败。";

const PAGE_TITLE: &str = "双语段落对齐工具";
const SOURCE_LABEL: &str = "原文文件";
const TARGET_LABEL: &str = "译文文件";
const RESULT_HEADING: &str = "对齐结果";
const SUBMIT_LABEL: &str = "开始对齐";
const BUSY_LABEL: &str = "对齐中...";

/// Files captured at the moment a submission starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub source: SelectedFile,
    pub target: SelectedFile,
}

/// Clears the loading flag however the request future ends.
struct IdleOnDrop<'a>(&'a mut bool);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

fn result_message(outcome: Result<Option<String>>) -> String {
    match outcome {
        Ok(Some(text)) if !text.is_empty() => {
            info!("Received alignment result ({} chars)", text.chars().count());
            text
        }
        Ok(_) => {
            info!("Workflow response had no result text");
            NOT_FOUND_MESSAGE.to_string()
        }
        Err(e) => {
            error!("Alignment failed: {}", e);
            REQUEST_FAILED_MESSAGE.to_string()
        }
    }
}

fn warn_if_not_accepted(file: Option<&SelectedFile>) {
    if let Some(file) = file.filter(|f| !is_accepted(&f.name)) {
        warn!(
            "'{}' is not one of {}; submitting it anyway",
            file.name,
            accept_attribute()
        );
    }
}

pub struct UploadPage<S: WorkflowService> {
    service: S,
    markup_policy: MarkupPolicy,
    source_file: Option<SelectedFile>,
    target_file: Option<SelectedFile>,
    result_text: Option<String>,
    loading: bool,
}

impl<S: WorkflowService> UploadPage<S> {
    pub fn new(service: S, markup_policy: MarkupPolicy) -> Self {
        Self {
            service,
            markup_policy,
            source_file: None,
            target_file: None,
            result_text: None,
            loading: false,
        }
    }

    pub fn select_source(&mut self, file: Option<SelectedFile>) {
        warn_if_not_accepted(file.as_ref());
        self.source_file = file;
    }

    pub fn select_target(&mut self, file: Option<SelectedFile>) {
        warn_if_not_accepted(file.as_ref());
        self.target_file = file;
    }

    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        self.source_file.is_some() && self.target_file.is_some() && !self.loading
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            BUSY_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Enter the submitting state and hand out the files to send.
    ///
    /// Returns `None` while a file is missing or a submission is in flight.
    /// Every `Some` must be followed by [`UploadPage::finish_submit`].
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let (Some(source), Some(target)) = (&self.source_file, &self.target_file) else {
            return None;
        };

        info!("Aligning '{}' with '{}'", source.name, target.name);
        let submission = Submission {
            source: source.clone(),
            target: target.clone(),
        };
        self.loading = true;
        Some(submission)
    }

    /// Record the outcome of a submission and return to idle.
    pub fn finish_submit(&mut self, outcome: Result<Option<String>>) {
        self.result_text = Some(result_message(outcome));
        self.loading = false;
    }

    /// Submit both files. Does nothing unless both are selected.
    ///
    /// Dropping the returned future mid-request leaves the page idle with
    /// its previous result.
    pub async fn submit(&mut self) {
        let Some(submission) = self.begin_submit() else {
            return;
        };

        let outcome = {
            let _idle = IdleOnDrop(&mut self.loading);
            self.service
                .execute(&submission.source, &submission.target)
                .await
        };

        self.finish_submit(outcome);
    }

    pub fn render_html(&self) -> String {
        let accept = accept_attribute();
        let disabled = if self.can_submit() { "" } else { " disabled" };

        let mut html = String::new();
        html.push_str("<main>\n");
        html.push_str(&format!("  <h1>{}</h1>\n", PAGE_TITLE));
        for (id, label, file) in [
            ("source_text", SOURCE_LABEL, &self.source_file),
            ("translated_text", TARGET_LABEL, &self.target_file),
        ] {
            html.push_str("  <div>\n");
            html.push_str(&format!("    <label for=\"{}\">{}</label>\n", id, label));
            html.push_str(&format!(
                "    <input type=\"file\" id=\"{}\" accept=\"{}\" />\n",
                id, accept
            ));
            if let Some(file) = file {
                html.push_str(&format!("    <span>{}</span>\n", escape_html(&file.name)));
            }
            html.push_str("  </div>\n");
        }
        html.push_str(&format!(
            "  <button type=\"button\"{}>{}</button>\n",
            disabled,
            self.submit_label()
        ));

        if let Some(text) = self.result_text.as_deref().filter(|t| !t.is_empty()) {
            html.push_str("  <section>\n");
            html.push_str(&format!("    <h2>{}</h2>\n", RESULT_HEADING));
            html.push_str(&format!(
                "    <div class=\"result\">{}</div>\n",
                self.markup_policy.apply(text)
            ));
            html.push_str("  </section>\n");
        }
        html.push_str("</main>\n");
        html
    }
}
