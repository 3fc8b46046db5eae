//! Configurable run form
//!
//! The form never owns its values. It renders from the parent's [`Inputs`]
//! and reports every edit, clear, send and image change back through a
//! [`RunOnceListener`], leaving the parent to apply them.

use crate::models::{
    Inputs, PromptConfig, PromptVariable, UploadedImage, VariableType, VisionFile, VisionSettings,
    DEFAULT_VALUE_MAX_LEN, SOURCE_TEXT_KEY, TRANSLATED_TEXT_KEY,
};
use serde::Serialize;
use tracing::debug;

/// Receives the intents emitted by [`RunOnceForm`].
pub trait RunOnceListener {
    fn on_inputs_change(&mut self, inputs: Inputs);
    fn on_send(&mut self);
    fn on_vision_files_change(&mut self, files: Vec<VisionFile>);
}

/// A recorded form intent, for parents that prefer to process them later.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    InputsChange { inputs: Inputs },
    Send,
    VisionFilesChange { files: Vec<VisionFile> },
}

impl RunOnceListener for Vec<FormEvent> {
    fn on_inputs_change(&mut self, inputs: Inputs) {
        self.push(FormEvent::InputsChange { inputs });
    }

    fn on_send(&mut self) {
        self.push(FormEvent::Send);
    }

    fn on_vision_files_change(&mut self, files: Vec<VisionFile>) {
        self.push(FormEvent::VisionFilesChange { files });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextArea,
    TextInput {
        max_length: usize,
    },
    NumberInput,
    Select {
        options: Vec<String>,
        default_value: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub placeholder: String,
    pub value: String,
    #[serde(flatten)]
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedForm {
    pub static_fields: Vec<Field>,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionSettings>,
    pub show_separator: bool,
}

fn placeholder_for(variable: &PromptVariable) -> String {
    if variable.required {
        variable.name.clone()
    } else {
        format!("{}(optional)", variable.name)
    }
}

/// Accepts what a number input would: empty, or a finite decimal literal.
fn is_numeric_input(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || (trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            && trimmed.parse::<f64>().is_ok_and(f64::is_finite))
}

fn max_length_for(variable: &PromptVariable) -> usize {
    variable.max_length.unwrap_or(DEFAULT_VALUE_MAX_LEN)
}

pub struct RunOnceForm {
    prompt_config: PromptConfig,
    vision_config: VisionSettings,
}

impl RunOnceForm {
    pub fn new(prompt_config: PromptConfig, vision_config: VisionSettings) -> Self {
        Self {
            prompt_config,
            vision_config,
        }
    }

    pub fn render(&self, inputs: &Inputs) -> RenderedForm {
        let value_of = |key: &str| inputs.get(key).cloned().unwrap_or_default();

        let static_fields = vec![
            Field {
                key: SOURCE_TEXT_KEY.to_string(),
                label: "Source Text".to_string(),
                placeholder: "Enter source text...".to_string(),
                value: value_of(SOURCE_TEXT_KEY),
                widget: Widget::TextArea,
            },
            Field {
                key: TRANSLATED_TEXT_KEY.to_string(),
                label: "Translated Text".to_string(),
                placeholder: "Enter translated text...".to_string(),
                value: value_of(TRANSLATED_TEXT_KEY),
                widget: Widget::TextArea,
            },
        ];

        let fields = self
            .prompt_config
            .prompt_variables
            .iter()
            .filter_map(|variable| {
                let widget = match variable.var_type {
                    VariableType::Select => Widget::Select {
                        options: variable.options.clone().unwrap_or_default(),
                        default_value: inputs.get(&variable.key).cloned(),
                    },
                    VariableType::String => Widget::TextInput {
                        max_length: max_length_for(variable),
                    },
                    VariableType::Paragraph => Widget::TextArea,
                    VariableType::Number => Widget::NumberInput,
                    VariableType::Unknown => return None,
                };

                Some(Field {
                    key: variable.key.clone(),
                    label: variable.name.clone(),
                    placeholder: placeholder_for(variable),
                    value: value_of(&variable.key),
                    widget,
                })
            })
            .collect();

        let vision = self
            .vision_config
            .enabled
            .then(|| self.vision_config.clone());

        RenderedForm {
            static_fields,
            fields,
            vision,
            show_separator: !self.prompt_config.prompt_variables.is_empty()
                || self.vision_config.enabled,
        }
    }

    /// Report an edit of `key`, constrained the way its widget would constrain it.
    pub fn change_input(
        &self,
        inputs: &Inputs,
        key: &str,
        value: &str,
        listener: &mut dyn RunOnceListener,
    ) {
        let value = match self.prompt_config.variable(key) {
            Some(variable) if variable.var_type == VariableType::String => {
                value.chars().take(max_length_for(variable)).collect()
            }
            Some(variable) if variable.var_type == VariableType::Number => {
                if !is_numeric_input(value) {
                    debug!("Ignoring non-numeric input for '{}'", key);
                    return;
                }
                value.to_string()
            }
            _ => value.to_string(),
        };

        let mut next = inputs.clone();
        next.insert(key.to_string(), value);
        debug!("Input '{}' changed", key);
        listener.on_inputs_change(next);
    }

    pub fn select_option(
        &self,
        inputs: &Inputs,
        key: &str,
        option: &str,
        listener: &mut dyn RunOnceListener,
    ) {
        self.change_input(inputs, key, option, listener);
    }

    /// Reset the static fields and every variable to empty.
    ///
    /// Attached vision files are left as they are.
    pub fn clear(&self, listener: &mut dyn RunOnceListener) {
        let mut cleared = Inputs::new();
        cleared.insert(SOURCE_TEXT_KEY.to_string(), String::new());
        cleared.insert(TRANSLATED_TEXT_KEY.to_string(), String::new());
        for variable in &self.prompt_config.prompt_variables {
            cleared.insert(variable.key.clone(), String::new());
        }
        debug!("Clearing {} inputs", cleared.len());
        listener.on_inputs_change(cleared);
    }

    pub fn send(&self, listener: &mut dyn RunOnceListener) {
        debug!("Send requested");
        listener.on_send();
    }

    /// Forward the uploader's current images, dropping failed uploads.
    pub fn vision_files_change(
        &self,
        uploaded: &[UploadedImage],
        listener: &mut dyn RunOnceListener,
    ) {
        if !self.vision_config.enabled {
            return;
        }

        let files: Vec<VisionFile> = uploaded
            .iter()
            .filter(|image| !image.upload_failed())
            .map(VisionFile::from)
            .collect();
        listener.on_vision_files_change(files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransferMethod;
    use pretty_assertions::assert_eq;

    fn variable(key: &str, var_type: VariableType) -> PromptVariable {
        PromptVariable {
            key: key.to_string(),
            name: key.to_uppercase(),
            var_type,
            required: false,
            options: None,
            max_length: None,
        }
    }

    fn inputs(pairs: &[(&str, &str)]) -> Inputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn form(variables: Vec<PromptVariable>) -> RunOnceForm {
        RunOnceForm::new(
            PromptConfig {
                prompt_variables: variables,
            },
            VisionSettings::default(),
        )
    }

    fn last_inputs(events: &[FormEvent]) -> Inputs {
        match events.last() {
            Some(FormEvent::InputsChange { inputs }) => inputs.clone(),
            other => panic!("expected inputs change, got {:?}", other),
        }
    }

    #[test]
    fn test_clear_resets_static_and_dynamic_keys() {
        let form = form(vec![
            variable("a", VariableType::String),
            variable("b", VariableType::String),
        ]);
        let mut events = Vec::new();

        form.clear(&mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(
            last_inputs(&events),
            inputs(&[
                ("source_text", ""),
                ("translated_text", ""),
                ("a", ""),
                ("b", "")
            ])
        );
    }

    #[test]
    fn test_clear_does_not_touch_vision_files() {
        let form = RunOnceForm::new(
            PromptConfig::default(),
            VisionSettings {
                enabled: true,
                ..Default::default()
            },
        );
        let mut events = Vec::new();

        form.clear(&mut events);

        assert!(events
            .iter()
            .all(|e| !matches!(e, FormEvent::VisionFilesChange { .. })));
    }

    #[test]
    fn test_select_default_and_selection() {
        let mut tone = variable("tone", VariableType::Select);
        tone.options = Some(vec!["foo".to_string(), "bar".to_string()]);
        let form = form(vec![tone, variable("title", VariableType::String)]);
        let current = inputs(&[("tone", "bar"), ("title", "Hello"), ("source_text", "x")]);

        let rendered = form.render(&current);
        assert_eq!(
            rendered.fields[0].widget,
            Widget::Select {
                options: vec!["foo".to_string(), "bar".to_string()],
                default_value: Some("bar".to_string()),
            }
        );

        let mut events = Vec::new();
        form.select_option(&current, "tone", "foo", &mut events);
        assert_eq!(
            last_inputs(&events),
            inputs(&[("tone", "foo"), ("title", "Hello"), ("source_text", "x")])
        );
    }

    #[test]
    fn test_string_input_capped_at_max_length() {
        let mut title = variable("title", VariableType::String);
        title.max_length = Some(5);
        let form = form(vec![title]);
        let mut events = Vec::new();

        form.change_input(&Inputs::new(), "title", "abcdefgh", &mut events);

        assert_eq!(last_inputs(&events)["title"], "abcde");
        assert_eq!(
            form.render(&Inputs::new()).fields[0].widget,
            Widget::TextInput { max_length: 5 }
        );
    }

    #[test]
    fn test_string_input_uses_default_cap() {
        let form = form(vec![variable("title", VariableType::String)]);
        let mut events = Vec::new();
        let long = "字".repeat(DEFAULT_VALUE_MAX_LEN + 10);

        form.change_input(&Inputs::new(), "title", &long, &mut events);

        assert_eq!(
            last_inputs(&events)["title"].chars().count(),
            DEFAULT_VALUE_MAX_LEN
        );
    }

    #[test]
    fn test_paragraph_and_static_fields_are_uncapped() {
        let form = form(vec![variable("notes", VariableType::Paragraph)]);
        let long = "x".repeat(500);
        let mut events = Vec::new();

        form.change_input(&Inputs::new(), "notes", &long, &mut events);
        form.change_input(&Inputs::new(), "source_text", &long, &mut events);

        assert_eq!(events.len(), 2);
        for event in &events {
            match event {
                FormEvent::InputsChange { inputs } => {
                    assert!(inputs.values().all(|v| v.len() == 500))
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_number_input_rejects_non_numeric() {
        let form = form(vec![variable("count", VariableType::Number)]);
        let mut events = Vec::new();

        form.change_input(&Inputs::new(), "count", "abc", &mut events);
        assert!(events.is_empty());

        form.change_input(&Inputs::new(), "count", "12.5", &mut events);
        form.change_input(&Inputs::new(), "count", "", &mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(last_inputs(&events)["count"], "");
    }

    #[test]
    fn test_number_input_rejects_non_finite_tokens() {
        let form = form(vec![variable("count", VariableType::Number)]);
        let mut events = Vec::new();

        for token in ["NaN", "inf", "infinity", "-Infinity", "1e999", "0x10"] {
            form.change_input(&Inputs::new(), "count", token, &mut events);
        }
        assert!(events.is_empty());

        form.change_input(&Inputs::new(), "count", "-2.5e3", &mut events);
        assert_eq!(last_inputs(&events)["count"], "-2.5e3");
    }

    #[test]
    fn test_render_placeholders_and_unknown_types() {
        let mut required = variable("name", VariableType::String);
        required.required = true;
        let form = form(vec![
            required,
            variable("notes", VariableType::Paragraph),
            variable("upload", VariableType::Unknown),
        ]);

        let rendered = form.render(&inputs(&[("source_text", "原文")]));

        assert_eq!(rendered.static_fields[0].value, "原文");
        assert_eq!(rendered.static_fields[1].placeholder, "Enter translated text...");
        assert_eq!(rendered.fields.len(), 2);
        assert_eq!(rendered.fields[0].placeholder, "NAME");
        assert_eq!(rendered.fields[1].placeholder, "NOTES(optional)");
        assert!(rendered.show_separator);
        assert!(rendered.vision.is_none());
    }

    #[test]
    fn test_separator_hidden_without_variables_or_vision() {
        let rendered = form(Vec::new()).render(&Inputs::new());
        assert!(!rendered.show_separator);
        assert_eq!(rendered.static_fields.len(), 2);
    }

    #[test]
    fn test_send_only_signals() {
        let form = form(vec![variable("a", VariableType::String)]);
        let mut events = Vec::new();

        form.send(&mut events);

        assert_eq!(events, vec![FormEvent::Send]);
    }

    #[test]
    fn test_vision_files_filter_failed_uploads() {
        let form = RunOnceForm::new(
            PromptConfig::default(),
            VisionSettings {
                enabled: true,
                number_limits: Some(3),
                detail: None,
                transfer_methods: vec![TransferMethod::LocalFile],
            },
        );
        let uploaded = vec![
            UploadedImage {
                transfer_method: TransferMethod::LocalFile,
                url: "https://example.com/ok.png".to_string(),
                file_id: "ok".to_string(),
                progress: 100,
            },
            UploadedImage {
                transfer_method: TransferMethod::RemoteUrl,
                url: "https://example.com/broken.png".to_string(),
                file_id: "broken".to_string(),
                progress: -1,
            },
        ];
        let mut events = Vec::new();

        form.vision_files_change(&uploaded, &mut events);

        assert_eq!(
            events,
            vec![FormEvent::VisionFilesChange {
                files: vec![VisionFile {
                    file_type: "image".to_string(),
                    transfer_method: TransferMethod::LocalFile,
                    url: "https://example.com/ok.png".to_string(),
                    upload_file_id: "ok".to_string(),
                }]
            }]
        );
        assert!(form.render(&Inputs::new()).vision.is_some());
    }

    #[test]
    fn test_vision_files_ignored_when_disabled() {
        let form = form(Vec::new());
        let mut events = Vec::new();

        form.vision_files_change(&[], &mut events);

        assert!(events.is_empty());
    }
}
