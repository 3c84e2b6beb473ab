use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use crate::{
    attempts::repo_types::Attempt,
    auth::session::Flash,
    dashboard::stats::DashboardStats,
};

pub fn login_page(flash: Option<&Flash>) -> String {
    layout(
        "Log in",
        flash,
        r#"<h1>Log in</h1>
<form method="post" action="/login">
  <label>Username <input name="username" autocomplete="username" required></label>
  <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
  <button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
    )
}

pub fn register_page(flash: Option<&Flash>) -> String {
    layout(
        "Register",
        flash,
        r#"<h1>Register</h1>
<form method="post" action="/register">
  <label>Username <input name="username" autocomplete="username" required></label>
  <label>Password <input name="password" type="password" autocomplete="new-password" required></label>
  <button type="submit">Create account</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

pub fn block_page(site_name: &str, roast: &str, flash: Option<&Flash>) -> String {
    let body = format!(
        r#"<h1>{site} is blocked</h1>
<p class="roast">{roast}</p>
<form method="post">
  <label>What will you do instead? <input name="task" required></label>
  <button type="submit">Back to work</button>
</form>"#,
        site = encode_text(site_name),
        roast = encode_text(roast),
    );
    layout("Blocked", flash, &body)
}

pub fn dashboard_page(
    username: &str,
    flash: Option<&Flash>,
    stats: &DashboardStats,
    attempts: &[Attempt],
) -> String {
    let labels: Vec<&str> = stats.site_counts.iter().map(|c| c.site.as_str()).collect();
    let values: Vec<u64> = stats.site_counts.iter().map(|c| c.count).collect();
    // `<` is escaped so site names cannot close the script element
    let chart = json!({ "labels": labels, "values": values, "has_data": stats.has_data })
        .to_string()
        .replace('<', "\\u003c");

    let rows = if attempts.is_empty() {
        "<tr><td colspan=\"3\">No interruptions yet.</td></tr>".to_string()
    } else {
        attempts
            .iter()
            .map(|a| {
                let when = a.timestamp.format(&Rfc3339).unwrap_or_default();
                format!(
                    "<tr><td><time datetime=\"{when}\">{when}</time></td><td>{}</td><td>{}</td></tr>",
                    encode_text(&a.site_name),
                    encode_text(&a.task_entered),
                    when = encode_double_quoted_attribute(&when),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        r#"<h1>Welcome, {username}</h1>
<p><a href="/logout">Log out</a></p>
<section class="stats">
  <p>Streak: <strong id="streak">{streak}</strong> day(s)</p>
  <p>Focused for <strong id="focus" data-seconds="{focus}">{focus}</strong> seconds</p>
</section>
<script type="application/json" id="chart-data">{chart}</script>
<table>
  <thead><tr><th>When</th><th>Site</th><th>Task</th></tr></thead>
  <tbody>
{rows}
  </tbody>
</table>"#,
        username = encode_text(username),
        streak = stats.streak,
        focus = stats.focus_seconds,
    );
    layout("Dashboard", flash, &body)
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let flash = flash
        .map(|f| {
            format!(
                "<div class=\"flash flash-{}\">{}</div>\n",
                f.level.as_str(),
                encode_text(&f.message)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
</head>
<body>
{flash}{body}
</body>
</html>
"#
    )
}
