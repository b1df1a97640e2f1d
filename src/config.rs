//! TOML configuration.
//!
//! Every section is optional; an empty file (or no file at all, via
//! [`load_config_or_default`]) yields the built-in defaults.
//!
//! ```toml
//! [controller]
//! timeout_secs = 30
//! default_model = "ChatGPT"
//!
//! [generation]
//! use_web_search = true
//!
//! [mock]
//! search_latency_ms = 1500
//! fail_uploads = ["broken.pdf"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use querywise_core::catalog::ModelChoice;
use querywise_core::models::GenerationOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Option toggles applied when the CLI does not override them.
    #[serde(default)]
    pub generation: GenerationOptions,
    #[serde(default)]
    pub mock: MockConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Upper bound on every collaborator call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub default_model: ModelChoice,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            default_model: ModelChoice::default(),
        }
    }
}

impl ControllerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Simulated latency and failure injection for the mock collaborators.
#[derive(Debug, Deserialize, Clone)]
pub struct MockConfig {
    #[serde(default = "default_search_latency_ms")]
    pub search_latency_ms: u64,
    #[serde(default = "default_generate_latency_ms")]
    pub generate_latency_ms: u64,
    #[serde(default = "default_list_latency_ms")]
    pub list_latency_ms: u64,
    #[serde(default = "default_upload_latency_ms")]
    pub upload_latency_ms: u64,
    #[serde(default)]
    pub fail_search: bool,
    #[serde(default)]
    pub fail_generate: bool,
    #[serde(default)]
    pub fail_list: bool,
    /// File names whose upload is rejected.
    #[serde(default)]
    pub fail_uploads: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            search_latency_ms: default_search_latency_ms(),
            generate_latency_ms: default_generate_latency_ms(),
            list_latency_ms: default_list_latency_ms(),
            upload_latency_ms: default_upload_latency_ms(),
            fail_search: false,
            fail_generate: false,
            fail_list: false,
            fail_uploads: Vec::new(),
        }
    }
}

fn default_search_latency_ms() -> u64 {
    1500
}
fn default_generate_latency_ms() -> u64 {
    2000
}
fn default_list_latency_ms() -> u64 {
    1000
}
fn default_upload_latency_ms() -> u64 {
    2000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::default`].
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.controller.timeout_secs == 0 {
        anyhow::bail!("controller.timeout_secs must be > 0");
    }

    if config
        .mock
        .fail_uploads
        .iter()
        .any(|name| name.trim().is_empty())
    {
        anyhow::bail!("mock.fail_uploads must not contain empty names");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.controller.timeout_secs, 30);
        assert_eq!(cfg.controller.default_model, ModelChoice::ChatGpt);
        assert_eq!(cfg.generation, GenerationOptions::default());
        assert_eq!(cfg.mock.search_latency_ms, 1500);
        assert_eq!(cfg.mock.generate_latency_ms, 2000);
        assert_eq!(cfg.mock.list_latency_ms, 1000);
        assert_eq!(cfg.mock.upload_latency_ms, 2000);
    }

    #[test]
    fn parses_all_sections() {
        let file = write_config(
            r#"
[controller]
timeout_secs = 5
default_model = "Google Gemini"

[generation]
use_web_search = true
use_detailed_explanation = true

[mock]
search_latency_ms = 0
fail_generate = true
fail_uploads = ["b.pdf"]
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.controller.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.controller.default_model, ModelChoice::Gemini);
        assert!(cfg.generation.use_web_search);
        assert!(cfg.generation.use_detailed_explanation);
        assert!(!cfg.generation.use_external_knowledge);
        assert_eq!(cfg.mock.search_latency_ms, 0);
        assert_eq!(cfg.mock.generate_latency_ms, 2000);
        assert!(cfg.mock.fail_generate);
        assert_eq!(cfg.mock.fail_uploads, vec!["b.pdf".to_string()]);
    }

    #[test]
    fn unknown_default_model_is_kept() {
        let file = write_config("[controller]\ndefault_model = \"Llama\"\n");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(
            cfg.controller.default_model,
            ModelChoice::Other("Llama".into())
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let file = write_config("[controller]\ntimeout_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn blank_fail_upload_name_is_rejected() {
        let file = write_config("[mock]\nfail_uploads = [\" \"]\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = load_config_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.controller.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("[controller\n");
        assert!(load_config(file.path()).is_err());
    }
}
