//! CLI configuration.
//!
//! Layered: built-in defaults, then an optional YAML file
//! (`~/.uitrail/config.yaml` or `--config <path>`), then `UITRAIL_*`
//! environment overrides. Command-line flags are applied on top by the
//! command handlers.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use agent_loop::FlowLoopConfig;
use decision_policy::LlmPolicyConfig;
use page_adapter::PageConfig;
use state_diff::DiffPolicy;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub browser: BrowserSettings,
    pub capture: CaptureSettings,
    pub llm: LlmSettings,
    pub flow: FlowSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub user_data_dir: Option<PathBuf>,
    pub chrome_binary: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            chrome_binary: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Root directory for flow artifacts. Defaults to
    /// `~/.uitrail/captures`.
    pub output_dir: Option<PathBuf>,
}

impl CaptureSettings {
    pub fn resolve_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".uitrail")
            .join("captures")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// When false the deterministic fallback selector runs alone.
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let defaults = LlmPolicyConfig::default();
        Self {
            enabled: true,
            endpoint: defaults.endpoint,
            api_key: None,
            model: defaults.model,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub max_steps: u32,
    pub max_actions: usize,
    pub settle_ms: u64,
    /// Change-score cutoffs for the per-transition diff.
    pub diff: DiffPolicy,
}

impl Default for FlowSettings {
    fn default() -> Self {
        let defaults = FlowLoopConfig::default();
        Self {
            max_steps: defaults.max_steps,
            max_actions: defaults.max_actions,
            settle_ms: defaults.settle_ms,
            diff: DiffPolicy::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration: defaults, optional YAML file, env overrides.
    ///
    /// An explicitly given path must exist; the default path is used only
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("reading config file {}", path.display()))?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    Self::from_file(&default)
                        .with_context(|| format!("reading config file {}", default.display()))?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".uitrail")
            .join("config.yaml")
    }

    /// Apply `UITRAIL_*` environment overrides (plus `OPENAI_API_KEY` as
    /// the conventional key source).
    pub fn apply_env(&mut self) {
        if let Ok(value) = env::var("UITRAIL_HEADLESS") {
            self.browser.headless = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Ok(dir) = env::var("UITRAIL_OUTPUT_DIR") {
            self.capture.output_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = env::var("UITRAIL_PROFILE_DIR") {
            self.browser.user_data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(model) = env::var("UITRAIL_MODEL") {
            self.llm.model = model;
        }
        if let Ok(endpoint) = env::var("UITRAIL_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Ok(key) = env::var("UITRAIL_API_KEY") {
            self.llm.api_key = Some(key);
        } else if self.llm.api_key.is_none() {
            if let Ok(key) = env::var("OPENAI_API_KEY") {
                self.llm.api_key = Some(key);
            }
        }
    }

    pub fn page_config(&self) -> PageConfig {
        let mut page = PageConfig::default().headless(self.browser.headless);
        if let Some(dir) = &self.browser.user_data_dir {
            page = page.user_data_dir(dir.clone());
        }
        if let Some(binary) = &self.browser.chrome_binary {
            page = page.chrome_binary(binary.clone());
        }
        page
    }

    pub fn flow_loop_config(&self) -> FlowLoopConfig {
        let mut config = FlowLoopConfig::new()
            .max_steps(self.flow.max_steps)
            .max_actions(self.flow.max_actions)
            .settle_ms(self.flow.settle_ms);
        config.diff = self.flow.diff;
        config
    }

    pub fn llm_policy_config(&self) -> LlmPolicyConfig {
        LlmPolicyConfig {
            endpoint: self.llm.endpoint.clone(),
            api_key: self.llm.api_key.clone(),
            model: self.llm.model.clone(),
            ..LlmPolicyConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = CliConfig::default();
        assert!(config.browser.headless);
        assert!(config.llm.enabled);
        assert_eq!(config.flow.max_steps, 15);
        assert!(config
            .capture
            .resolve_output_dir()
            .ends_with(".uitrail/captures"));
    }

    #[test]
    fn partial_yaml_overlays_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "browser:\n  headless: false\nflow:\n  max_steps: 5\nllm:\n  model: local-model"
        )
        .unwrap();

        let config = CliConfig::from_file(file.path()).unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.flow.max_steps, 5);
        assert_eq!(config.llm.model, "local-model");
        // Untouched sections keep their defaults.
        assert_eq!(config.flow.max_actions, 20);
        assert!(config.llm.enabled);
    }

    #[test]
    fn diff_cutoffs_load_from_file_into_loop_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "flow:\n  diff:\n    change_threshold: 0.2\n    notable_cutoff: 0.5"
        )
        .unwrap();

        let config = CliConfig::from_file(file.path()).unwrap();
        let loop_config = config.flow_loop_config();
        assert_eq!(loop_config.diff.change_threshold, 0.2);
        assert_eq!(loop_config.diff.notable_cutoff, 0.5);
        // Unset cutoffs keep the tuned default.
        assert_eq!(loop_config.diff.minor_cutoff, 0.1);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(CliConfig::load(Some(Path::new("/nonexistent/uitrail.yaml"))).is_err());
    }
}
