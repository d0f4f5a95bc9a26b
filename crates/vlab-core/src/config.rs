use crate::error::{ProviderError, Result};
use crate::protocol::ProtocolConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeployConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_access_url")]
    pub access_url: String,
    #[serde(default = "default_module_name")]
    pub module_name: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_status() -> String {
    "ready".to_string()
}

fn default_access_url() -> String {
    "https://activityprovider-vlab.onrender.com/lab".to_string()
}

fn default_module_name() -> String {
    "Virtual Lab Assistant".to_string()
}

fn default_api_version() -> String {
    "1.0".to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            access_url: default_access_url(),
            module_name: default_module_name(),
            api_version: default_api_version(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default = "default_report_base_url")]
    pub report_base_url: String,
    /// Protocol document to serve. The built-in titration protocol is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_path: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_report_base_url() -> String {
    "https://meu-ap.com/report".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            deploy: DeployConfig::default(),
            report_base_url: default_report_base_url(),
            protocol_path: None,
        }
    }
}

impl ProviderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProviderError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let mut cfg: ProviderConfig = serde_yaml::from_str(&data)?;
        // Relative protocol paths are resolved against the config file.
        if let (Some(protocol), Some(parent)) = (cfg.protocol_path.as_ref(), path.parent()) {
            if protocol.is_relative() {
                cfg.protocol_path = Some(parent.join(protocol));
            }
        }
        Ok(cfg)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// The protocol this provider serves: the configured file, or the
    /// built-in titration exercise.
    pub fn load_protocol(&self) -> Result<ProtocolConfig> {
        match &self.protocol_path {
            Some(path) => ProtocolConfig::load(path),
            None => Ok(ProtocolConfig::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (key, url) in [
            ("deploy.access_url", &self.deploy.access_url),
            ("report_base_url", &self.report_base_url),
        ] {
            if url.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} is empty"),
                });
            } else if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} '{url}' is not an http(s) URL"),
                });
            }
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; the OS will pick a random port".to_string(),
            });
        }

        if let Some(path) = &self.protocol_path {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("protocol_path '{}' does not exist", path.display()),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
