use crate::error::{ProviderError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// ProtocolStep
// ---------------------------------------------------------------------------

/// One step of a lab protocol. `validation_rule` stays untyped until the
/// engine compiles it.
///
/// Every field is optional on input. A step with no id or no usable rule
/// still deserializes and is rejected by the engine on its own, so the rest
/// of the protocol loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStep {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default)]
    pub validation_rule: Value,
}

impl ProtocolStep {
    /// A step entry that is not even an object becomes an empty step.
    fn from_raw(raw: Value) -> Self {
        serde_json::from_value(raw).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// FinalEvaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluation {
    pub target_analytic: String,
    pub expected_value: f64,
    #[serde(default)]
    pub tolerance_percent: f64,
}

// ---------------------------------------------------------------------------
// ProtocolConfig
// ---------------------------------------------------------------------------

/// The unit of activity configuration, authored externally and loaded whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity_title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_equipment: Vec<String>,
    #[serde(default, deserialize_with = "lenient_steps")]
    pub protocol_steps: Vec<ProtocolStep>,
    #[serde(
        default,
        deserialize_with = "lenient_final",
        skip_serializing_if = "Option::is_none"
    )]
    pub final_evaluation: Option<FinalEvaluation>,
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_steps<'de, D>(deserializer: D) -> std::result::Result<Vec<ProtocolStep>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().map(ProtocolStep::from_raw).collect())
}

fn lenient_final<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<FinalEvaluation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| {
        serde_json::from_value(v)
            .map_err(|e| tracing::warn!(error = %e, "ignoring malformed final_evaluation"))
            .ok()
    }))
}

impl ProtocolConfig {
    /// Read a protocol document. `.json` files parse as JSON, anything else
    /// as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProviderError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let config = if is_json {
            serde_json::from_str(&data)?
        } else {
            serde_yaml::from_str(&data)?
        };
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn step(&self, id: &str) -> Option<&ProtocolStep> {
        self.protocol_steps.iter().find(|s| s.id == id)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        titration_protocol()
    }
}

/// The built-in NaOH/HCl titration exercise.
pub fn titration_protocol() -> ProtocolConfig {
    ProtocolConfig {
        activity_title: "Titulacao de NaOH com HCl".to_string(),
        virtual_equipment: vec![
            "pipette_25ml".to_string(),
            "burette_50ml".to_string(),
            "erlenmeyer_flask".to_string(),
        ],
        protocol_steps: vec![
            ProtocolStep {
                id: "step1".to_string(),
                description: "Lavar a bureta com a solucao titulante.".to_string(),
                validation_rule: json!({
                    "action": "rinse",
                    "with": "titrant_solution"
                }),
            },
            ProtocolStep {
                id: "step2".to_string(),
                description: "Pipetar 25ml da solucao titulada.".to_string(),
                validation_rule: json!({
                    "action": "transfer_volume",
                    "equipment": "pipette_25ml",
                    "volume_ml": 25.0,
                    "tolerance": 0.5
                }),
            },
        ],
        final_evaluation: Some(FinalEvaluation {
            target_analytic: "final_measurement_value".to_string(),
            expected_value: 22.5,
            tolerance_percent: 2.0,
        }),
    }
}
