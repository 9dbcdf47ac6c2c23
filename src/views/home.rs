use super::layout;

const INTAKE_ROUTES: [(&str, &str); 3] = [
    ("Email Jobs", "POST /api/jobs/email"),
    ("Web Form Jobs", "POST /api/jobs/form"),
    ("Canva Webhook", "POST /api/webhooks/canva"),
];

/// Landing page listing the intake endpoints
pub fn render_home() -> String {
    let routes: String = INTAKE_ROUTES
        .iter()
        .map(|(name, route)| {
            format!("<div class=\"card\"><h2>{name}</h2><code class=\"muted\">{route}</code></div>")
        })
        .collect();

    layout(
        "Printssistant Backend",
        &format!(
            "<main><h1>Printssistant Backend</h1>\
             <p class=\"muted\">API backend for handling print job submissions from multiple sources</p>\
             {routes}\
             <p><a href=\"/admin/jobs\">View All Jobs</a></p></main>"
        ),
    )
}
