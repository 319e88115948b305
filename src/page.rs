//! Server-side rendering of the three-tab form.

use crate::config::BackendKind;
use crate::notice::{Notice, NoticeLevel};
use crate::readiness::Readiness;
use std::fmt::Write as _;

/// Tab shown when the page loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Resource creation and archive upload.
    #[default]
    Upload,
    /// Question box.
    Ask,
    /// Resource deletion.
    Delete,
}

impl Tab {
    fn id(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Ask => "ask",
            Self::Delete => "delete",
        }
    }
}

/// Everything needed to render the page once.
#[derive(Debug, Clone)]
pub struct PageView {
    /// Backend driving the form.
    pub kind: BackendKind,
    /// Remote resource name.
    pub resource_name: String,
    /// Tab selected on load.
    pub active_tab: Tab,
    /// Current state of the readiness gate.
    pub readiness: Readiness,
    /// Banners for the upload tab.
    pub upload_notices: Vec<Notice>,
    /// Per-document status lines from the last ingestion.
    pub upload_lines: Vec<String>,
    /// Banners for the ask tab.
    pub ask_notices: Vec<Notice>,
    /// Answer text from the last question.
    pub answer: Option<String>,
    /// Last question, echoed back into the input.
    pub question: String,
    /// Banners for the delete tab.
    pub delete_notices: Vec<Notice>,
}

impl PageView {
    /// Page with no action results.
    pub fn new(kind: BackendKind, resource_name: impl Into<String>, readiness: Readiness) -> Self {
        Self {
            kind,
            resource_name: resource_name.into(),
            active_tab: Tab::default(),
            readiness,
            upload_notices: Vec::new(),
            upload_lines: Vec::new(),
            ask_notices: Vec::new(),
            answer: None,
            question: String::new(),
            delete_notices: Vec::new(),
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
h1 { margin-bottom: 0.25rem; }
.tabs > input[type="radio"] { display: none; }
.tabs > label { display: inline-block; padding: 0.5rem 1rem; border-bottom: 2px solid transparent; cursor: pointer; }
.tabs > input:checked + label { border-bottom-color: #e0245e; font-weight: 600; }
.panel { display: none; padding: 1rem 0; }
#tab-upload:checked ~ #panel-upload,
#tab-ask:checked ~ #panel-ask,
#tab-delete:checked ~ #panel-delete { display: block; }
.notice { padding: 0.6rem 0.9rem; border-radius: 6px; margin: 0.5rem 0; }
.notice.success { background: #e3f9e5; }
.notice.warning { background: #fffbea; }
.notice.error { background: #ffe3e3; }
.notice.info { background: #e6f6ff; }
.status-lines { font-family: ui-monospace, monospace; white-space: pre-wrap; }
.answer { white-space: pre-wrap; padding: 0.5rem 0; }
form { margin: 0.75rem 0; }
button[disabled] { opacity: 0.5; cursor: not-allowed; }
"#;

/// Render the full HTML document.
pub fn render_page(view: &PageView) -> String {
    let label = view.kind.label();
    let name = escape_html(&view.resource_name);
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>PDF Desk</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>📄 PDF Desk</h1>\n\
         <p>Upload a ZIP of PDFs, ask questions, or delete your {lower} <code>{name}</code>.</p>\n\
         <div class=\"tabs\">\n",
        lower = label.to_lowercase(),
    );

    for (tab, caption) in [
        (Tab::Upload, "➕ Upload ZIP".to_string()),
        (Tab::Ask, "❓ Ask Question".to_string()),
        (Tab::Delete, format!("🗑️ Delete {label}")),
    ] {
        let checked = if tab == view.active_tab { " checked" } else { "" };
        let id = tab.id();
        let _ = write!(
            html,
            "<input type=\"radio\" name=\"tab\" id=\"tab-{id}\"{checked}>\
             <label for=\"tab-{id}\">{caption}</label>\n"
        );
    }

    render_upload_panel(&mut html, view, label);
    render_ask_panel(&mut html, view, label);
    render_delete_panel(&mut html, view, label);

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_upload_panel(html: &mut String, view: &PageView, label: &str) {
    let _ = write!(
        html,
        "<section class=\"panel\" id=\"panel-upload\">\n<h2>Upload PDFs</h2>\n\
         <form method=\"post\" action=\"/resource\"><button type=\"submit\">Create {label}</button></form>\n\
         <form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <label>Upload a ZIP file of PDFs \
         <input type=\"file\" name=\"archive\" accept=\".zip,application/zip\" required></label>\n\
         <button type=\"submit\">Upload and Index PDFs</button>\n</form>\n"
    );
    render_notices(html, &view.upload_notices);
    if !view.upload_lines.is_empty() {
        html.push_str("<div class=\"status-lines\">");
        for line in &view.upload_lines {
            html.push_str(&escape_html(line));
            html.push('\n');
        }
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n");
}

fn render_ask_panel(html: &mut String, view: &PageView, label: &str) {
    let _ = write!(
        html,
        "<section class=\"panel\" id=\"panel-ask\">\n<h2>Ask your {label}</h2>\n"
    );
    let gate = if view.readiness.ready {
        Notice::success(view.readiness.message.clone())
    } else {
        Notice::warning(view.readiness.message.clone())
    };
    render_notices(html, std::slice::from_ref(&gate));

    let disabled = if view.readiness.ready { "" } else { " disabled" };
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/ask\">\n\
         <label>Enter your question \
         <input type=\"text\" name=\"question\" value=\"{question}\" required></label>\n\
         <button type=\"submit\"{disabled}>Get Answer</button>\n</form>\n",
        question = escape_html(&view.question),
    );
    render_notices(html, &view.ask_notices);
    if let Some(answer) = &view.answer {
        let _ = write!(html, "<div class=\"answer\">{}</div>\n", escape_html(answer));
    }
    html.push_str("</section>\n");
}

fn render_delete_panel(html: &mut String, view: &PageView, label: &str) {
    let _ = write!(
        html,
        "<section class=\"panel\" id=\"panel-delete\">\n<h2>Delete {label}</h2>\n\
         <form method=\"post\" action=\"/delete\"><button type=\"submit\">Delete {label}</button></form>\n"
    );
    render_notices(html, &view.delete_notices);
    html.push_str("</section>\n");
}

fn render_notices(html: &mut String, notices: &[Notice]) {
    for notice in notices {
        let class = match notice.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        };
        let _ = write!(
            html,
            "<div class=\"notice {class}\">{}</div>\n",
            escape_html(&notice.text)
        );
    }
}

/// Escape text for inclusion in HTML content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn view(ready: bool) -> PageView {
        PageView::new(
            BackendKind::Assistant,
            "project-summary-assistant",
            Readiness {
                ready,
                message: if ready {
                    "Files should be ready for querying.".into()
                } else {
                    "No files have been uploaded yet.".into()
                },
            },
        )
    }

    #[test]
    fn ask_button_disabled_until_ready() {
        let closed = render_page(&view(false));
        assert!(closed.contains("<button type=\"submit\" disabled>Get Answer</button>"));
        assert!(closed.contains("No files have been uploaded yet."));

        let open = render_page(&view(true));
        assert!(open.contains("<button type=\"submit\">Get Answer</button>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut page = view(true);
        page.question = "\"><script>alert(1)</script>".into();
        page.answer = Some("1 < 2 & 3 > 2".into());
        page.active_tab = Tab::Ask;

        let html = render_page(&page);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains("1 &lt; 2 &amp; 3 &gt; 2"));
        assert!(html.contains("id=\"tab-ask\" checked"));
    }

    #[test]
    fn tabs_and_actions_follow_backend_label() {
        let mut page = view(false);
        page.kind = BackendKind::Index;
        let html = render_page(&page);
        assert!(html.contains("Create Index"));
        assert!(html.contains("Delete Index"));
        assert!(html.contains("action=\"/upload\""));
        assert!(html.contains("id=\"tab-upload\" checked"));
    }
}
