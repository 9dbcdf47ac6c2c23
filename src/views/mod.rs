//! Server-rendered HTML pages

pub mod admin;
pub mod home;
pub mod oauth;

use std::fmt::Write;

pub use admin::{render_job_cards, render_job_table};
pub use home::render_home;
pub use oauth::render_token_summary;

const STYLE: &str = "\
body{font-family:system-ui,-apple-system,sans-serif;background:#f9fafb;color:#111827;margin:0}\
main{max-width:72rem;margin:0 auto;padding:2rem}\
.panel{background:#fff;border-radius:1rem;box-shadow:0 1px 3px rgba(0,0,0,.1);padding:1.5rem}\
table{width:100%;border-collapse:collapse;font-size:.875rem}\
th,td{padding:.75rem;text-align:left;border-bottom:1px solid #e5e7eb}\
th{background:#f3f4f6}\
.badge{display:inline-block;padding:.25rem .5rem;border-radius:9999px;font-size:.75rem;font-weight:600}\
.muted{color:#6b7280}\
.card{background:#fff;border:1px solid #e5e7eb;border-radius:.75rem;padding:1.25rem;margin-bottom:1rem}\
.error{color:#ef4444}\
a{color:#4f46e5}";

/// Escape text for HTML element content and double-quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a page body in the shared document shell. `title` is escaped, `body` is not.
pub fn layout(title: &str, body: &str) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape(title)
    );
    page
}

/// Page shown when jobs cannot be loaded
pub fn render_error(message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<main><p class=\"error\">Failed to load jobs: {}</p></main>",
            escape(message)
        ),
    )
}
