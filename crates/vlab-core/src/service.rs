use crate::catalog::{self, AnalyticsCatalog, ParamDescriptor};
use crate::config::ProviderConfig;
use crate::engine::{LoadReport, ProtocolEngine};
use crate::protocol::ProtocolConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// Placeholder measurement reported when neither the submission nor the
/// protocol provides one.
const DEFAULT_FINAL_MEASUREMENT: f64 = 22.5;

/// Keys accepted as the student identifier, canonical name first.
pub const STUDENT_ID_KEYS: &[&str] = &["Inven!RAstdID", "studentId"];

const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployStatus {
    pub status: String,
    pub access_url: String,
    pub module_name: String,
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualAnalytic {
    pub student_activity_profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantAnalytic {
    pub name: String,
    pub value: Value,
}

/// Per-submission analytics returned to the LMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(rename = "inveniraStdID")]
    pub student_id: String,
    #[serde(rename = "qualAnalytics")]
    pub qual: Vec<QualAnalytic>,
    #[serde(rename = "quantAnalytics")]
    pub quant: Vec<QuantAnalytic>,
}

// ---------------------------------------------------------------------------
// Request field helpers
// ---------------------------------------------------------------------------

/// The student identifier value of a submission, under whichever accepted
/// key is present.
pub fn student_id_value(request: &Value) -> Option<&Value> {
    STUDENT_ID_KEYS.iter().find_map(|k| request.get(*k))
}

fn text_or_unknown(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => UNKNOWN.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ResponseBuilder
// ---------------------------------------------------------------------------

/// Assembles the analytics document so the reporting shape stays fixed no
/// matter where the numbers come from.
pub struct ResponseBuilder<'a> {
    report_base_url: &'a str,
}

impl<'a> ResponseBuilder<'a> {
    pub fn new(report_base_url: &'a str) -> Self {
        Self { report_base_url }
    }

    pub fn profile_url(&self, student_id: &str, activity_id: &str) -> String {
        format!(
            "{}?user={}&act={}",
            self.report_base_url,
            urlencoding::encode(student_id),
            urlencoding::encode(activity_id)
        )
    }

    pub fn build(
        &self,
        activity_id: &str,
        student_id: &str,
        errors: u64,
        final_measurement: f64,
    ) -> AnalyticsResponse {
        AnalyticsResponse {
            student_id: student_id.to_string(),
            qual: vec![QualAnalytic {
                student_activity_profile: self.profile_url(student_id, activity_id),
            }],
            quant: vec![
                QuantAnalytic {
                    name: catalog::PROTOCOL_ERRORS_COUNT.to_string(),
                    value: Value::from(errors),
                },
                QuantAnalytic {
                    name: catalog::FINAL_MEASUREMENT_VALUE.to_string(),
                    value: Value::from(final_measurement),
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityService
// ---------------------------------------------------------------------------

/// Single entry point the HTTP layer and the request pipeline talk to.
///
/// Constructed once at startup and shared behind an `Arc`. The protocol is
/// replaced wholesale on reconfiguration; the engine is reloaded to match.
pub struct ActivityService {
    config: ProviderConfig,
    protocol: RwLock<Arc<ProtocolConfig>>,
    engine: ProtocolEngine,
}

impl ActivityService {
    pub fn new(config: ProviderConfig, protocol: ProtocolConfig) -> Self {
        Self {
            config,
            protocol: RwLock::new(Arc::new(protocol)),
            engine: ProtocolEngine::new(),
        }
    }

    /// Build the service and compile its protocol into the engine.
    pub fn initialized(config: ProviderConfig, protocol: ProtocolConfig) -> Self {
        let service = Self::new(config, protocol);
        service.initialize();
        service
    }

    /// Load the current protocol into the engine.
    pub fn initialize(&self) -> LoadReport {
        let protocol = self.protocol.write().unwrap_or_else(|e| e.into_inner());
        let report = self.engine.load_protocol(&protocol);
        drop(protocol);
        tracing::info!(
            compiled = report.compiled.len(),
            skipped = report.skipped.len(),
            "activity service initialized"
        );
        report
    }

    /// Swap in a new protocol and recompile the engine from it.
    ///
    /// The protocol write lock is held across the engine reload, so a
    /// submission being graded never pairs rules of one protocol with the
    /// final evaluation of another.
    pub fn replace_protocol(&self, protocol: ProtocolConfig) -> LoadReport {
        let mut current = self.protocol.write().unwrap_or_else(|e| e.into_inner());
        let report = self.engine.load_protocol(&protocol);
        *current = Arc::new(protocol);
        report
    }

    pub fn engine(&self) -> &ProtocolEngine {
        &self.engine
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn get_config(&self) -> Arc<ProtocolConfig> {
        self.protocol
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn get_json_params(&self) -> Vec<ParamDescriptor> {
        catalog::json_params()
    }

    pub fn get_analytics_list(&self) -> AnalyticsCatalog {
        catalog::analytics_catalog()
    }

    pub fn get_deploy_status(&self) -> DeployStatus {
        let deploy = &self.config.deploy;
        DeployStatus {
            status: deploy.status.clone(),
            access_url: deploy.access_url.clone(),
            module_name: deploy.module_name.clone(),
            api_version: deploy.api_version.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Business logic
    // -----------------------------------------------------------------------

    /// Produce the analytics for one validated submission.
    ///
    /// When `json_params.actions` lists student actions (each tagged with a
    /// `step_id`), they are graded through the engine and the failures counted.
    pub fn process_activity(&self, request: &Value) -> AnalyticsResponse {
        let activity_id = text_or_unknown(request.get("activityID"));
        let student_id = text_or_unknown(student_id_value(request));
        let params = request.get("json_params");

        // Held for the whole computation; see `replace_protocol`.
        let protocol = self.protocol.read().unwrap_or_else(|e| e.into_inner());

        let errors = params
            .and_then(|p| p.get("actions"))
            .and_then(Value::as_array)
            .map(|actions| self.count_errors(actions))
            .unwrap_or(0);

        let final_measurement = params
            .and_then(|p| p.get("final_measurement"))
            .and_then(Value::as_f64)
            .or_else(|| protocol.final_evaluation.as_ref().map(|f| f.expected_value))
            .unwrap_or(DEFAULT_FINAL_MEASUREMENT);
        drop(protocol);

        tracing::debug!(
            activity = %activity_id,
            student = %student_id,
            errors,
            "analytics computed"
        );

        ResponseBuilder::new(&self.config.report_base_url).build(
            &activity_id,
            &student_id,
            errors,
            final_measurement,
        )
    }

    fn count_errors(&self, actions: &[Value]) -> u64 {
        actions
            .iter()
            .filter(|action| {
                let step = action.get("step_id").and_then(Value::as_str).unwrap_or("");
                !self.engine.evaluate(step, action)
            })
            .count() as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
