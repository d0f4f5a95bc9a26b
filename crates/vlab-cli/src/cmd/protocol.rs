use crate::output::{print_json, print_table};
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use vlab_core::config::ProviderConfig;
use vlab_core::engine::ProtocolEngine;
use vlab_core::protocol::ProtocolConfig;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ProtocolSubcommand {
    /// Compile a protocol and report which steps loaded
    Check {
        /// Protocol file (default: the configured protocol)
        file: Option<PathBuf>,
    },
    /// Validate one student action against a protocol step
    Evaluate {
        /// Step id, e.g. step2
        #[arg(long)]
        step: String,
        /// Action document, e.g. '{"action":"rinse","with":"titrant_solution"}'
        #[arg(long)]
        action: String,
        /// Protocol file (default: the configured protocol)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write the active protocol to a JSON file
    Export { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(config: &ProviderConfig, subcommand: ProtocolSubcommand, json: bool) -> Result<()> {
    match subcommand {
        ProtocolSubcommand::Check { file } => check(config, file.as_deref(), json),
        ProtocolSubcommand::Evaluate { step, action, file } => {
            evaluate(config, file.as_deref(), &step, &action, json)
        }
        ProtocolSubcommand::Export { path } => export(config, &path),
    }
}

fn load(config: &ProviderConfig, file: Option<&Path>) -> Result<ProtocolConfig> {
    match file {
        Some(path) => ProtocolConfig::load(path)
            .with_context(|| format!("failed to load protocol {}", path.display())),
        None => config.load_protocol().context("failed to load protocol"),
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn check(config: &ProviderConfig, file: Option<&Path>, json: bool) -> Result<()> {
    let protocol = load(config, file)?;
    let engine = ProtocolEngine::new();
    let report = engine.load_protocol(&protocol);

    if json {
        print_json(&report)?;
    } else {
        println!("{}", protocol.activity_title);
        let rows: Vec<Vec<String>> = protocol
            .protocol_steps
            .iter()
            .map(|step| {
                let (rule, status) = match report.skipped.iter().find(|s| s.id == step.id) {
                    Some(skipped) => ("-".to_string(), format!("skipped: {}", skipped.reason)),
                    None => (
                        engine
                            .rule(&step.id)
                            .map(|r| r.kind().to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        "ok".to_string(),
                    ),
                };
                vec![step.id.clone(), rule, status]
            })
            .collect();
        print_table(&["STEP", "RULE", "STATUS"], &rows);
    }

    if !report.is_clean() {
        return Err(anyhow!(
            "{} step(s) could not be compiled",
            report.skipped.len()
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

fn evaluate(
    config: &ProviderConfig,
    file: Option<&Path>,
    step: &str,
    action: &str,
    json: bool,
) -> Result<()> {
    let protocol = load(config, file)?;
    let action: serde_json::Value =
        serde_json::from_str(action).context("--action is not valid JSON")?;

    let engine = ProtocolEngine::new();
    engine.load_protocol(&protocol);
    let passed = engine.evaluate(step, &action);

    if json {
        print_json(&serde_json::json!({ "step": step, "passed": passed }))?;
    } else if passed {
        println!("{step}: pass");
    } else {
        println!("{step}: fail");
    }

    if !passed {
        return Err(anyhow!("action does not satisfy step '{step}'"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

fn export(config: &ProviderConfig, path: &Path) -> Result<()> {
    let protocol = load(config, None)?;
    protocol
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "Wrote '{}' ({} steps) to {}",
        protocol.activity_title,
        protocol.protocol_steps.len(),
        path.display()
    );
    Ok(())
}
