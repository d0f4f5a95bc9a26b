use crate::protocol::ProtocolConfig;
use crate::rule::{create_rule, Rule};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

/// Outcome of compiling a protocol: which steps made it into the engine and
/// which were skipped, with the reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub compiled: Vec<String>,
    pub skipped: Vec<SkippedStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedStep {
    pub id: String,
    pub reason: String,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProtocolEngine
// ---------------------------------------------------------------------------

type RuleMap = HashMap<String, Rule>;

/// Holds one compiled [`Rule`] per protocol step.
///
/// The map is never mutated in place. `load_protocol` builds a complete
/// replacement and swaps it in, so a concurrent `evaluate` sees either the
/// previous protocol or the new one.
#[derive(Debug, Default)]
pub struct ProtocolEngine {
    rules: RwLock<Arc<RuleMap>>,
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every step of `config` and replace the current rules.
    ///
    /// A step whose rule cannot be built is skipped and logged; the remaining
    /// steps still load.
    pub fn load_protocol(&self, config: &ProtocolConfig) -> LoadReport {
        tracing::info!(
            steps = config.protocol_steps.len(),
            title = %config.activity_title,
            "loading protocol"
        );

        let mut rules = RuleMap::with_capacity(config.protocol_steps.len());
        let mut report = LoadReport::default();

        for step in &config.protocol_steps {
            if step.id.is_empty() {
                tracing::warn!("skipping step without an id");
                report.skipped.push(SkippedStep {
                    id: String::new(),
                    reason: "missing step id".to_string(),
                });
                continue;
            }
            match create_rule(&step.validation_rule) {
                Ok(rule) => {
                    tracing::debug!(step = %step.id, rule = rule.kind(), "rule compiled");
                    if rules.insert(step.id.clone(), rule).is_some() {
                        tracing::warn!(step = %step.id, "duplicate step id, later definition wins");
                        report.compiled.retain(|id| id != &step.id);
                    }
                    report.compiled.push(step.id.clone());
                }
                Err(e) => {
                    tracing::warn!(step = %step.id, error = %e, "skipping step with invalid rule");
                    report.skipped.push(SkippedStep {
                        id: step.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        *self.rules.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(rules);
        report
    }

    /// Validate `action` against the rule for `step_id`. Unknown or
    /// uncompiled steps evaluate to `false`.
    pub fn evaluate(&self, step_id: &str, action: &Value) -> bool {
        let rules = self.snapshot();
        match rules.get(step_id) {
            Some(rule) => rule.validate(action),
            None => {
                tracing::debug!(step = step_id, "no rule for step");
                false
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn step_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshot().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn rule(&self, step_id: &str) -> Option<Rule> {
        self.snapshot().get(step_id).cloned()
    }

    fn snapshot(&self) -> Arc<RuleMap> {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
