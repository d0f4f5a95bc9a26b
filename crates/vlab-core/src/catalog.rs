//! Static discovery documents served to the LMS: the configurable parameters
//! of the activity and the analytics this provider reports.

use serde::{Deserialize, Serialize};

/// A configurable parameter, as listed at `/json_params_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An analytic the provider can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsCatalog {
    #[serde(rename = "quantAnalytics")]
    pub quant: Vec<AnalyticDescriptor>,
    #[serde(rename = "qualAnalytics")]
    pub qual: Vec<AnalyticDescriptor>,
}

pub const PROTOCOL_ERRORS_COUNT: &str = "protocol_errors_count";
pub const FINAL_MEASUREMENT_VALUE: &str = "final_measurement_value";
pub const STUDENT_ACTIVITY_PROFILE: &str = "student_activity_profile";

fn entry(name: &str, kind: &str) -> AnalyticDescriptor {
    AnalyticDescriptor {
        name: name.to_string(),
        kind: kind.to_string(),
    }
}

pub fn json_params() -> Vec<ParamDescriptor> {
    vec![ParamDescriptor {
        name: "protocolo_config_json".to_string(),
        kind: "application/json".to_string(),
    }]
}

pub fn analytics_catalog() -> AnalyticsCatalog {
    AnalyticsCatalog {
        quant: vec![
            entry(PROTOCOL_ERRORS_COUNT, "integer"),
            entry(FINAL_MEASUREMENT_VALUE, "number"),
        ],
        qual: vec![entry(STUDENT_ACTIVITY_PROFILE, "link")],
    }
}
