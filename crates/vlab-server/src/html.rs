//! Server-rendered pages: the documentation/status page and the protocol
//! authoring view. Everything interpolated is escaped.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use vlab_core::protocol::ProtocolConfig;
use vlab_core::service::DeployStatus;

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}\
td,th{border:1px solid #ccc;padding:.4rem;text-align:left;vertical-align:top}\
code,pre{background:#f4f4f4}";

/// Endpoints listed on the documentation page.
const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/json_params_url", "Configurable parameters of the activity"),
    ("GET", "/configuracao", "Protocol configuration (JSON, or this editor in a browser)"),
    ("PUT", "/configuracao", "Replace the protocol configuration"),
    ("GET", "/analytics_list_url", "Analytics this provider reports"),
    ("POST", "/analytics_url", "Submit student activity and receive analytics"),
    ("GET", "/deploy_url", "Deployment status"),
];

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{STYLE}</style></head><body>{body}</body></html>",
        encode_text(title)
    )
}

pub struct DocsView<'a> {
    pub deploy: &'a DeployStatus,
    pub activity_title: &'a str,
    pub loaded_steps: &'a [String],
    pub started_at: DateTime<Utc>,
}

pub fn render_docs(view: &DocsView<'_>) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<h1>{}</h1><p>Status: <strong>{}</strong> &middot; API {} &middot; \
         up since {}</p><p>Access URL: <a href=\"{}\">{}</a></p>",
        encode_text(&view.deploy.module_name),
        encode_text(&view.deploy.status),
        encode_text(&view.deploy.api_version),
        view.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        encode_double_quoted_attribute(&view.deploy.access_url),
        encode_text(&view.deploy.access_url),
    ));

    body.push_str("<h2>Endpoints</h2><table><tr><th>Method</th><th>Path</th><th>Purpose</th></tr>");
    for (method, path, purpose) in ENDPOINTS {
        body.push_str(&format!(
            "<tr><td>{method}</td><td><code>{path}</code></td><td>{purpose}</td></tr>"
        ));
    }
    body.push_str("</table>");

    body.push_str(&format!(
        "<h2>Protocol</h2><p>{}</p>",
        encode_text(view.activity_title)
    ));
    if view.loaded_steps.is_empty() {
        body.push_str("<p><em>No validation rules loaded.</em></p>");
    } else {
        body.push_str("<ul>");
        for id in view.loaded_steps {
            body.push_str(&format!("<li><code>{}</code></li>", encode_text(id)));
        }
        body.push_str("</ul>");
    }

    page(&view.deploy.module_name, &body)
}

pub fn render_config(protocol: &ProtocolConfig) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<h1>{}</h1>",
        encode_text(&protocol.activity_title)
    ));

    if !protocol.virtual_equipment.is_empty() {
        body.push_str("<h2>Equipment</h2><ul>");
        for item in &protocol.virtual_equipment {
            body.push_str(&format!("<li>{}</li>", encode_text(item)));
        }
        body.push_str("</ul>");
    }

    body.push_str("<h2>Steps</h2><table><tr><th>Id</th><th>Description</th><th>Rule</th></tr>");
    for step in &protocol.protocol_steps {
        body.push_str(&format!(
            "<tr><td><code>{}</code></td><td>{}</td><td><pre>{}</pre></td></tr>",
            encode_text(&step.id),
            encode_text(&step.description),
            encode_text(&step.validation_rule.to_string()),
        ));
    }
    body.push_str("</table>");

    if let Some(eval) = &protocol.final_evaluation {
        body.push_str(&format!(
            "<h2>Final evaluation</h2><p><code>{}</code> expected {} &plusmn; {}%</p>",
            encode_text(&eval.target_analytic),
            eval.expected_value,
            eval.tolerance_percent
        ));
    }

    let json = serde_json::to_string_pretty(protocol).unwrap_or_default();
    body.push_str(&format!(
        "<h2>Edit</h2><textarea id=\"protocol\" rows=\"24\" cols=\"90\">{}</textarea>\
         <p><button onclick=\"save()\">Save</button> <span id=\"result\"></span></p>\
         <script>function save(){{fetch('/configuracao',{{method:'PUT',\
         headers:{{'Content-Type':'application/json'}},\
         body:document.getElementById('protocol').value}})\
         .then(r=>r.text()).then(t=>{{document.getElementById('result').textContent=t}})}}</script>",
        encode_text(&json)
    ));

    page(&protocol.activity_title, &body)
}
