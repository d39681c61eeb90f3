//! Email bodies: the built-in ones, and rendering of admin-stored templates.

use crate::database::notification_template::NotificationTemplate;
use maud::{DOCTYPE, Markup, html};
use serde_json::Value;
use std::collections::BTreeMap;

/// Subject and both bodies of an email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
    /// Set when the email came from a stored template.
    pub template_id: Option<i64>,
}

fn layout(heading: &str, content: Markup) -> String {
    html! {
        (DOCTYPE)
        html {
            body style="font-family: sans-serif" {
                h2 { (heading) }
                (content)
                p style="color: #888" { "EventVault" }
            }
        }
    }
    .into_string()
}

pub fn new_upload_email(
    owner_name: &str,
    album_title: &str,
    uploader_name: &str,
    filename: &str,
    album_url: &str,
) -> RenderedEmail {
    let subject = format!("New upload in \"{album_title}\"");
    let html = layout(
        &subject,
        html! {
            p { "Hi " (owner_name) "," }
            p { (uploader_name) " uploaded " (filename) " to your album \"" (album_title) "\"." }
            p { a href=(album_url) { "View album" } }
        },
    );
    RenderedEmail {
        text: format!(
            "Hi {owner_name},\n\n{uploader_name} uploaded {filename} to your album \
             \"{album_title}\".\n\nView album: {album_url}\n"
        ),
        html,
        subject,
        template_id: None,
    }
}

pub fn new_comment_email(
    recipient_name: &str,
    author_name: &str,
    album_title: &str,
    filename: &str,
    comment: &str,
) -> RenderedEmail {
    let subject = format!("{author_name} commented on your upload");
    let html = layout(
        &subject,
        html! {
            p { "Hi " (recipient_name) "," }
            p { (author_name) " commented on " (filename) " in \"" (album_title) "\":" }
            blockquote { (comment) }
        },
    );
    RenderedEmail {
        text: format!(
            "Hi {recipient_name},\n\n{author_name} commented on {filename} in \
             \"{album_title}\":\n\n{comment}\n"
        ),
        html,
        subject,
        template_id: None,
    }
}

/// A plain message sent along with an admin-created notification.
pub fn system_email(recipient_name: &str, title: &str, message: &str) -> RenderedEmail {
    RenderedEmail {
        subject: title.to_owned(),
        html: layout(
            title,
            html! {
                p { "Hi " (recipient_name) "," }
                p { (message) }
            },
        ),
        text: format!("Hi {recipient_name},\n\n{message}\n"),
        template_id: None,
    }
}

//================================================================================
// Stored Templates
//================================================================================

/// Values for the `{{ group.field }}` placeholders of a stored template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext(BTreeMap<String, String>);

impl TemplateContext {
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Sets `key` unless the context already has a value for it.
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        self.0.entry(key.to_owned()).or_insert_with(|| value.into());
    }

    /// Flattens a JSON object into dotted keys: `{"album": {"title": "x"}}`
    /// becomes `album.title = x`. Nulls are skipped.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut context = Self::default();
        context.flatten("", value);
        context
    }

    fn flatten(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, nested) in map {
                    let key = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    self.flatten(&key, nested);
                }
            }
            Value::String(s) if !prefix.is_empty() => {
                self.0.insert(prefix.to_owned(), s.clone());
            }
            other if !prefix.is_empty() => {
                self.0.insert(prefix.to_owned(), other.to_string());
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Replaces placeholders in `source`. Unknown placeholders render empty, and
/// an unterminated `{{` is kept as written.
fn fill(source: &str, context: &TemplateContext, escape: bool) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        if let Some(value) = context.get(after[..end].trim()) {
            if escape {
                out.push_str(&html! { (value) }.into_string());
            } else {
                out.push_str(value);
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Renders a stored template. Values are escaped in the HTML body; the
/// template's own markup is trusted.
#[must_use]
pub fn render_stored(template: &NotificationTemplate, context: &TemplateContext) -> RenderedEmail {
    let subject = fill(&template.subject, context, false)
        .replace(['\r', '\n'], " ")
        .trim()
        .to_owned();
    RenderedEmail {
        subject,
        html: fill(&template.html_content, context, true),
        text: fill(&template.text_content, context, false),
        template_id: Some(template.id),
    }
}
