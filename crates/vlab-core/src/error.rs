use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown rule type: {0}")]
    UnknownRuleType(String),

    #[error("Bad Request: Missing field '{0}'")]
    MissingField(String),

    #[error("Unauthorized: Invalid Student ID")]
    Unauthorized,

    #[error("Server Configuration Error: Request fell off the chain.")]
    PipelineMisconfigured,

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// HTTP status this error surfaces as when it escapes a request.
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderError::MissingField(_) => 400,
            ProviderError::Json(_) | ProviderError::Yaml(_) => 400,
            ProviderError::Unauthorized => 401,
            ProviderError::ConfigNotFound(_) => 404,
            ProviderError::UnknownRuleType(_) => 422,
            ProviderError::PipelineMisconfigured
            | ProviderError::Internal(_)
            | ProviderError::Io(_) => 500,
        }
    }

    /// Error document in the shape the LMS expects from every gate.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
