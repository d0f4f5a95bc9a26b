//! Gatekeeping chain for analytics submissions.
//!
//! A submission walks an ordered list of [`Stage`]s. Each stage either
//! answers (success body or error) or hands the request to the next one. The
//! driver owns the "nobody answered" case and reports it as a 500.

use crate::error::{ProviderError, Result};
use crate::service::{student_id_value, ActivityService, STUDENT_ID_KEYS};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const MIN_STUDENT_ID_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Flow / PipelineResponse
// ---------------------------------------------------------------------------

/// What a stage decided to do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Terminate the chain with a successful body.
    Respond(Value),
    /// Delegate to the next stage.
    Next,
}

/// Terminal `(body, status)` pair produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResponse {
    pub status: u16,
    pub body: Value,
}

impl PipelineResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn from_error(err: &ProviderError) -> Self {
        Self {
            status: err.status_code(),
            body: err.to_body(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, request: &Value) -> Result<Flow>;
}

/// Requires `activityID`, a student identifier and `json_params`, checked in
/// that order. Presence of the key is what counts, not its value.
pub struct SchemaStage;

impl Stage for SchemaStage {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn handle(&self, request: &Value) -> Result<Flow> {
        if request.get("activityID").is_none() {
            return Err(ProviderError::MissingField("activityID".to_string()));
        }
        if student_id_value(request).is_none() {
            return Err(ProviderError::MissingField(STUDENT_ID_KEYS[0].to_string()));
        }
        if request.get("json_params").is_none() {
            return Err(ProviderError::MissingField("json_params".to_string()));
        }
        Ok(Flow::Next)
    }
}

/// Rejects student identifiers that are not strings of at least three
/// characters.
pub struct AuthStage;

impl Stage for AuthStage {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn handle(&self, request: &Value) -> Result<Flow> {
        let valid = student_id_value(request)
            .and_then(Value::as_str)
            .map(|id| id.chars().count() >= MIN_STUDENT_ID_CHARS)
            .unwrap_or(false);
        if valid {
            Ok(Flow::Next)
        } else {
            Err(ProviderError::Unauthorized)
        }
    }
}

/// Terminal stage: hands the request to the activity service.
pub struct LogicStage {
    service: Arc<ActivityService>,
}

impl LogicStage {
    pub fn new(service: Arc<ActivityService>) -> Self {
        Self { service }
    }
}

impl Stage for LogicStage {
    fn name(&self) -> &'static str {
        "logic"
    }

    fn handle(&self, request: &Value) -> Result<Flow> {
        let analytics = self.service.process_activity(request);
        respond_with(&analytics)
    }
}

/// Serialize a terminal body. Failing here is a server fault, never the
/// client's.
fn respond_with<T: Serialize>(body: &T) -> Result<Flow> {
    serde_json::to_value(body)
        .map(Flow::Respond)
        .map_err(|e| ProviderError::Internal(format!("could not encode response: {e}")))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// schema → auth → logic.
    pub fn standard(service: Arc<ActivityService>) -> Self {
        Self::new()
            .with_stage(SchemaStage)
            .with_stage(AuthStage)
            .with_stage(LogicStage::new(service))
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Splice `stage` in front of the stage called `before`. Appends when no
    /// such stage exists.
    pub fn insert_before(mut self, before: &str, stage: impl Stage + 'static) -> Self {
        let idx = self
            .stages
            .iter()
            .position(|s| s.name() == before)
            .unwrap_or(self.stages.len());
        self.stages.insert(idx, Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `request` through the stages until one answers.
    pub fn handle(&self, request: &Value) -> PipelineResponse {
        for stage in &self.stages {
            match stage.handle(request) {
                Ok(Flow::Next) => {
                    tracing::debug!(stage = stage.name(), "stage passed");
                }
                Ok(Flow::Respond(body)) => {
                    tracing::debug!(stage = stage.name(), "stage responded");
                    return PipelineResponse::ok(body);
                }
                Err(e) => {
                    tracing::warn!(stage = stage.name(), error = %e, "request rejected");
                    return PipelineResponse::from_error(&e);
                }
            }
        }

        tracing::error!(stages = ?self.stage_names(), "request fell off the chain");
        PipelineResponse::from_error(&ProviderError::PipelineMisconfigured)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
