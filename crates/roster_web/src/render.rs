//! Server-rendered HTML pages.
//!
//! # Responsibility
//! - Render list, form and view pages for any `Resource`.
//!
//! # Invariants
//! - Every caller-controlled value passes through `escape_html`.
//! - The edit form re-submits every text field it does not show, so a
//!   full-replace update keeps them.

use crate::form::IMAGE_FIELD;
use crate::resource::Resource;
use log::warn;
use roster_core::{Record, RecordPage};
use serde_json::Value;

/// Editable fields shown on the add/edit form, with their labels.
const FORM_FIELDS: &[(&str, &str)] = &[
    ("author", "Author"),
    ("publishedDate", "Date Published"),
    ("description", "Description"),
];

/// Which form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Add,
    Edit,
}

impl FormAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Edit => "Edit",
        }
    }
}

/// Renders one page of a resource listing.
pub fn list_page(resource: Resource, page: &RecordPage) -> String {
    let base = resource.html_base();
    let mut body = format!(
        "<h3>{plural}</h3>\n<a href=\"{base}/add\" class=\"btn\">Add {singular}</a>\n",
        plural = resource.plural,
        singular = resource.singular,
    );

    if page.items.is_empty() {
        body.push_str(&format!(
            "<p>No {} found.</p>\n",
            resource.plural.to_lowercase()
        ));
    }

    for record in &page.items {
        body.push_str(&format!(
            "<div class=\"media\">\n<a href=\"{href}\">\n{thumb}<h4>{title}</h4>\n{author}</a>\n</div>\n",
            href = escape_html(&resource.record_path(&record.id)),
            thumb = thumbnail(record),
            title = escape_html(&record.title),
            author = record
                .field_str("author")
                .map(|author| format!("<p>{}</p>\n", escape_html(author)))
                .unwrap_or_default(),
        ));
    }

    if let Some(token) = page.next_page_token.as_deref() {
        match serde_urlencoded::to_string(&[("pageToken", token)]) {
            Ok(query) => body.push_str(&format!(
                "<nav><a href=\"{base}?{}\">More</a></nav>\n",
                escape_html(&query)
            )),
            Err(err) => warn!("event=render_list module=web status=error error={err}"),
        }
    }

    layout(resource.plural, &body)
}

/// Renders the add or edit form for `record`.
pub fn form_page(resource: Resource, record: &Record, action: FormAction) -> String {
    let target = match action {
        FormAction::Add => format!("{}/add", resource.html_base()),
        FormAction::Edit => format!("{}/edit", resource.record_path(&record.id)),
    };

    let mut body = format!(
        "<h3>{} {}</h3>\n<form method=\"POST\" action=\"{}\" enctype=\"multipart/form-data\">\n",
        action.label(),
        resource.singular.to_lowercase(),
        escape_html(&target),
    );

    body.push_str(&text_input("title", "Title", &record.title));
    for (name, label) in FORM_FIELDS {
        let value = record.field_str(name).unwrap_or_default();
        if *name == "description" {
            body.push_str(&format!(
                "<div class=\"form-group\">\n<label for=\"{name}\">{label}</label>\n<textarea name=\"{name}\" id=\"{name}\">{}</textarea>\n</div>\n",
                escape_html(value)
            ));
        } else {
            body.push_str(&text_input(name, label, value));
        }
    }

    body.push_str(&format!(
        "<div class=\"form-group\">\n<label for=\"{IMAGE_FIELD}\">Cover Image</label>\n<input type=\"file\" name=\"{IMAGE_FIELD}\" id=\"{IMAGE_FIELD}\" accept=\"image/*\">\n</div>\n"
    ));

    if let Some(image_url) = record.image_url.as_deref() {
        body.push_str(&hidden_input("imageUrl", image_url));
    }
    for (name, value) in &record.fields {
        if is_form_field(name) {
            continue;
        }
        if let Value::String(value) = value {
            body.push_str(&hidden_input(name, value));
        }
    }

    body.push_str("<button type=\"submit\" class=\"btn\">Save</button>\n</form>\n");

    layout(resource.plural, &body)
}

/// Renders the detail page of one record.
pub fn view_page(resource: Resource, record: &Record) -> String {
    let path = resource.record_path(&record.id);
    let mut body = format!(
        "<h3>{singular}</h3>\n<div class=\"btn-group\">\n<a href=\"{edit}\" class=\"btn\">Edit {lower}</a>\n<a href=\"{delete}\" class=\"btn\">Delete {lower}</a>\n</div>\n<div class=\"media\">\n{image}<h4>{title}</h4>\n",
        singular = resource.singular,
        lower = resource.singular.to_lowercase(),
        edit = escape_html(&format!("{path}/edit")),
        delete = escape_html(&format!("{path}/delete")),
        image = thumbnail(record),
        title = escape_html(&record.title),
    );

    if let Some(published) = record.field_str("publishedDate") {
        body.push_str(&format!("<small>{}</small>\n", escape_html(published)));
    }
    if let Some(author) = record.field_str("author") {
        body.push_str(&format!("<h5>By {}</h5>\n", escape_html(author)));
    }
    if let Some(description) = record.field_str("description") {
        body.push_str(&format!("<p>{}</p>\n", escape_html(description)));
    }

    let extras = record
        .fields
        .iter()
        .filter(|(name, _)| !is_form_field(name))
        .map(|(name, value)| {
            let shown = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            format!(
                "<dt>{}</dt><dd>{}</dd>\n",
                escape_html(name),
                escape_html(&shown)
            )
        })
        .collect::<String>();
    if !extras.is_empty() {
        body.push_str(&format!("<dl>\n{extras}</dl>\n"));
    }

    body.push_str("</div>\n");
    layout(resource.plural, &body)
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Roster - {title}</title>\n</head>\n<body>\n<nav>\n<a href=\"/students\">Students</a>\n<a href=\"/trainees\">Trainees</a>\n</nav>\n<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn thumbnail(record: &Record) -> String {
    record
        .image_url
        .as_deref()
        .map(|url| format!("<img src=\"{}\" alt=\"\">\n", escape_html(url)))
        .unwrap_or_default()
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"form-group\">\n<label for=\"{name}\">{label}</label>\n<input type=\"text\" name=\"{name}\" id=\"{name}\" value=\"{}\">\n</div>\n",
        escape_html(value)
    )
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
        escape_html(name),
        escape_html(value)
    )
}

/// Fields rendered by dedicated markup rather than the generic extras.
///
/// `title` and `imageUrl` only show up in `Record::fields` when they were sent
/// as non-string JSON.
fn is_form_field(name: &str) -> bool {
    matches!(name, "title" | "imageUrl") || FORM_FIELDS.iter().any(|(field, _)| *field == name)
}
