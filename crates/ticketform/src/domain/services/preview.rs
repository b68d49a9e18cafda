//! Preview rendering
//!
//! Read-only summary of the form as an HTML fragment. Every user-supplied
//! value is escaped before it is interpolated.

use serde::Serialize;

use crate::domain::aggregates::form::Form;
use crate::domain::services::html::{escape_attr, escape_html, escape_multiline};
use crate::domain::value_objects::{format_file_size, FieldKind, FileMeta, Priority};

/// Placeholder for empty fields
pub const NOT_PROVIDED: &str = "Not provided";

/// One labelled row of the preview
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewSection {
    pub label: String,
    pub value: PreviewValue,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewValue {
    Text { text: Option<String> },
    MultiLine { text: Option<String> },
    Priority { priority: Priority },
    Attachments { files: Vec<FileMeta> },
}

/// Structured preview, before rendering
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewData {
    pub sections: Vec<PreviewSection>,
}

impl PreviewData {
    /// Collect the form state. `files` are the tracked uploads; the form's own
    /// file fields are used when none are given.
    pub fn from_form(form: &Form, files: &[FileMeta]) -> Self {
        let mut sections = Vec::new();
        let mut attachments: Vec<FileMeta> = files.to_vec();

        for field in form.fields() {
            let label = field.label().to_string();
            let text = field.display_value().trim();
            let text = (!text.is_empty()).then(|| text.to_string());

            let value = match field.kind() {
                FieldKind::File => {
                    if files.is_empty() {
                        attachments.extend(field.files().iter().cloned());
                    }
                    continue;
                }
                _ if field.name().as_str() == "priority" => PreviewValue::Priority {
                    priority: Priority::parse(field.text_value()).unwrap_or_default(),
                },
                FieldKind::TextArea => PreviewValue::MultiLine { text },
                _ => PreviewValue::Text { text },
            };
            sections.push(PreviewSection { label, value });
        }

        if !attachments.is_empty() {
            sections.push(PreviewSection {
                label: "Attachments".to_string(),
                value: PreviewValue::Attachments { files: attachments },
            });
        }

        Self { sections }
    }
}

pub struct PreviewRenderer;

impl PreviewRenderer {
    pub fn render(form: &Form, files: &[FileMeta]) -> String {
        Self::render_data(&PreviewData::from_form(form, files))
    }

    pub fn render_data(data: &PreviewData) -> String {
        let mut html = String::from(
            r#"<div class="preview-content"><h3>Ticket Preview</h3><div class="preview-grid">"#,
        );
        for section in &data.sections {
            html.push_str(&render_section(section));
        }
        html.push_str("</div></div>");
        html
    }
}

fn render_section(section: &PreviewSection) -> String {
    let value = match &section.value {
        PreviewValue::Text { text } => format!(
            r#"<div class="preview-value">{}</div>"#,
            escape_html(text.as_deref().unwrap_or(NOT_PROVIDED))
        ),
        PreviewValue::MultiLine { text } => format!(
            r#"<div class="preview-value">{}</div>"#,
            escape_multiline(text.as_deref().unwrap_or(NOT_PROVIDED))
        ),
        PreviewValue::Priority { priority } => format!(
            concat!(
                r#"<div class="preview-value priority" data-priority="{}">"#,
                r#"<span class="priority-icon">{}</span>"#,
                r#"<span class="priority-text">{}</span>"#,
                r#"<span class="priority-description">{}</span>"#,
                "</div>"
            ),
            escape_attr(priority.as_str()),
            priority.icon(),
            priority.label(),
            priority.description(),
        ),
        PreviewValue::Attachments { files } => {
            let items: String = files
                .iter()
                .map(|f| {
                    format!(
                        "<div>• {} ({})</div>",
                        escape_html(&f.name),
                        format_file_size(f.size)
                    )
                })
                .collect();
            format!(r#"<div class="preview-value">{}</div>"#, items)
        }
    };

    format!(
        r#"<div class="preview-section"><div class="preview-label">{}</div>{}</div>"#,
        escape_html(&section.label),
        value
    )
}
