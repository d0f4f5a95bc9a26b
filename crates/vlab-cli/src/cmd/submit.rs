use crate::output::print_json;
use anyhow::{Context, Result};

/// POST one analytics submission to a running provider and print the reply.
pub fn run(
    url: &str,
    activity: &str,
    student: &str,
    params: Option<&str>,
    json: bool,
) -> Result<()> {
    let json_params: serde_json::Value = match params {
        Some(p) => serde_json::from_str(p).context("--params is not valid JSON")?,
        None => serde_json::json!({}),
    };
    let payload = serde_json::json!({
        "activityID": activity,
        "Inven!RAstdID": student,
        "json_params": json_params,
    });

    tracing::info!(%url, "submitting analytics request");
    let response = match ureq::post(url).send_json(payload) {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(e) => return Err(e).with_context(|| format!("could not reach {url}")),
    };

    let status = response.status();
    let text = response.into_string().context("failed to read response body")?;
    let body: serde_json::Value =
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

    if json {
        print_json(&serde_json::json!({ "status": status, "body": body }))?;
    } else {
        println!("HTTP {status}");
        println!("{}", serde_json::to_string_pretty(&body)?);
    }

    match status {
        200..=299 => Ok(()),
        404 => anyhow::bail!("endpoint not found; check the URL"),
        405 => anyhow::bail!("method not allowed; the endpoint expects POST"),
        _ => anyhow::bail!("provider answered with status {status}"),
    }
}
