use crate::{error::PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// When text changes are reconciled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Reconcile synchronously inside the text-change handler.
    #[default]
    Immediate,
    /// Queue the latest text per node and reconcile on
    /// [crate::editor::PipelineEditor::flush]. Used to debounce rapid keystrokes.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Template text given to newly created template nodes.
    pub default_text: String,
    pub reconcile: ReconcileMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            default_text: "{{input_1}}".to_string(),
            reconcile: ReconcileMode::Immediate,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(content: &str) -> Result<EditorConfig> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn is_deferred(&self) -> bool {
        self.reconcile == ReconcileMode::Deferred
    }
}

pub trait ConfigProvider: Send + Sync {
    fn get_config(&self) -> Result<EditorConfig>;
    fn set_config(&self, config: &EditorConfig) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        TomlConfigProvider {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<EditorConfig> {
        tracing::debug!("Attempting to read editor config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(EditorConfig::default());
        }
        let content = read_to_string(&self.path)?;
        EditorConfig::from_toml_str(&content).map_err(|e| match e {
            PipelineError::Config(msg) => {
                PipelineError::Config(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }

    fn set_config(&self, config: &EditorConfig) -> Result<()> {
        tracing::debug!("Attempting to write editor config to: {:?}", &self.path);
        write(&self.path, config.to_toml_string()?)?;
        Ok(())
    }
}
