//! Admin dashboard pages: the recent-jobs table and the full card list

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::{escape, layout};
use crate::jobs::{JobStatus, PrintJob};

const CREATED_FORMAT: &str = "%b %-d, %Y %-I:%M %p";
const PLACEHOLDER: &str = "—";

/// Background and text colour of a status badge
fn badge_colors(status: JobStatus) -> (&'static str, &'static str) {
    match status {
        JobStatus::Completed => ("#dcfce7", "#15803d"),
        JobStatus::Processing => ("#fef9c3", "#a16207"),
        JobStatus::AssetReceived => ("#dbeafe", "#1d4ed8"),
        JobStatus::Cancelled => ("#e5e7eb", "#4b5563"),
        JobStatus::Pending => ("#ffedd5", "#c2410c"),
    }
}

fn status_badge(status: JobStatus) -> String {
    let (background, color) = badge_colors(status);
    format!(
        "<span class=\"badge\" style=\"background:{background};color:{color}\">{}</span>",
        status.as_str()
    )
}

pub fn format_created(created_at: &DateTime<Utc>) -> String {
    created_at.format(CREATED_FORMAT).to_string()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Only absolute http(s) URLs become links
fn is_web_url(url: &str) -> bool {
    url::Url::parse(url.trim())
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn external_link(url: &str, label: &str) -> String {
    if !is_web_url(url) {
        return PLACEHOLDER.to_string();
    }
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>",
        escape(url.trim())
    )
}

/// Table of the most recent jobs
pub fn render_job_table(title: &str, jobs: &[PrintJob]) -> String {
    let mut rows = String::new();

    if jobs.is_empty() {
        rows.push_str("<tr><td colspan=\"6\" class=\"muted\" style=\"text-align:center\">No jobs found</td></tr>");
    }

    for job in jobs {
        let customer_name = present(&job.customer_name).unwrap_or(PLACEHOLDER);
        let customer_email = job.customer_email.as_deref().unwrap_or_default();
        let job_title = present(&job.job_title)
            .or_else(|| present(&job.subject))
            .unwrap_or(PLACEHOLDER);
        let export = match present(&job.export_url) {
            Some(url) => external_link(url, "Open PDF"),
            None => PLACEHOLDER.to_string(),
        };

        let _ = write!(
            rows,
            "<tr><td><strong>{source}</strong></td>\
             <td>{name}<br><small class=\"muted\">{email}</small></td>\
             <td>{job_title}</td><td>{badge}</td><td>{created}</td><td>{export}</td></tr>",
            source = job.source.as_str(),
            name = escape(customer_name),
            email = escape(customer_email),
            job_title = escape(job_title),
            badge = status_badge(job.status),
            created = format_created(&job.created_at),
        );
    }

    let body = format!(
        "<main><div class=\"panel\"><h1>{title}</h1>\
         <table><thead><tr><th>Source</th><th>Customer</th><th>Job Title</th>\
         <th>Status</th><th>Created</th><th>Export URL</th></tr></thead>\
         <tbody>{rows}</tbody></table>\
         <p class=\"muted\"><small>Showing {count} recent jobs.</small></p></div></main>",
        title = escape(title),
        count = jobs.len(),
    );
    layout(title, &body)
}

fn job_card(job: &PrintJob) -> String {
    let mut details = String::new();

    if let Some(name) = present(&job.customer_name) {
        let email = present(&job.customer_email)
            .map(|e| format!(" ({})", escape(e)))
            .unwrap_or_default();
        let _ = write!(details, "<div><strong>Customer:</strong> {}{email}</div>", escape(name));
    }
    if let Some(description) = present(&job.description) {
        let _ = write!(details, "<div><strong>Description:</strong> {}</div>", escape(description));
    }
    if job.quantity != 0 {
        let _ = write!(details, "<div><strong>Quantity:</strong> {}</div>", job.quantity);
    }
    for (label, value) in [
        ("Paper Size", &job.paper_size),
        ("Color Mode", &job.color_mode),
        ("Urgency", &job.urgency),
    ] {
        if let Some(value) = present(value) {
            let _ = write!(details, "<div><strong>{label}:</strong> {}</div>", escape(value));
        }
    }
    if let Some(url) = present(&job.export_url) {
        let _ = write!(details, "<div><strong>File:</strong> {}</div>", external_link(url, "View Design"));
    }
    if !job.file_urls.is_empty() {
        let links: Vec<String> = job
            .file_urls
            .iter()
            .enumerate()
            .map(|(idx, url)| external_link(url, &format!("File {}", idx + 1)))
            .collect();
        let _ = write!(details, "<div><strong>Files:</strong> {}</div>", links.join(" "));
    }

    format!(
        "<div class=\"card\"><div style=\"display:flex;justify-content:space-between\">\
         <div><h3>{title}</h3><div class=\"muted\">{created}</div></div>\
         <div><span class=\"badge\" style=\"border:1px solid #d1d5db\">{source}</span> {badge}</div>\
         </div>{details}</div>",
        title = escape(job.display_title()),
        created = job.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        source = job.source.as_str(),
        badge = status_badge(job.status),
    )
}

/// Card list of every job with its total count
pub fn render_job_cards(jobs: &[PrintJob]) -> String {
    let content = if jobs.is_empty() {
        "<div class=\"card\"><p class=\"muted\" style=\"text-align:center\">No jobs found in the database.</p></div>"
            .to_string()
    } else {
        jobs.iter().map(job_card).collect()
    };

    layout(
        "Print Jobs",
        &format!(
            "<main><h1>Print Jobs</h1>\
             <p class=\"muted\">Total jobs in database: <strong>{}</strong></p>{content}</main>",
            jobs.len()
        ),
    )
}
