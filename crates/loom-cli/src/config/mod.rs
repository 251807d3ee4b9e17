//! Configuration management

use anyhow::{Context, Result};
use loom_adapters::Endpoints;
use loom_core::{ProviderSelection, ResolvedProvider, RoundOptions, DEFAULT_TIER};
use loom_types::{CloudConfig, DesignConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted CLI settings (`~/.loom/settings.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model tier for the built-in provider
    pub tier: String,
    pub cloud: CloudConfig,
    pub design: DesignConfig,
    /// Ask for a plan narrative before the operations
    pub plan_mode: bool,
    pub extended_thinking: bool,
    /// Preferred planning model for the built-in provider
    pub selected_model: Option<String>,
    /// Publish collaborator endpoint
    pub publish_url: Option<String>,
    pub endpoints: Endpoints,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tier: DEFAULT_TIER.to_string(),
            cloud: CloudConfig::default(),
            design: DesignConfig::default(),
            plan_mode: false,
            extended_thinking: false,
            selected_model: None,
            publish_url: None,
            endpoints: Endpoints::default(),
            request_timeout_secs: 180,
        }
    }
}

impl Settings {
    pub fn selection(&self) -> ProviderSelection {
        ProviderSelection {
            tier: self.tier.clone(),
            cloud: Some(self.cloud.clone()),
            selected_model: self.selected_model.clone(),
        }
    }

    /// Round options for a resolved provider
    pub fn round_options(&self, provider: ResolvedProvider) -> RoundOptions {
        RoundOptions {
            provider,
            plan_mode: self.plan_mode,
            extended_thinking: self.extended_thinking,
            selected_model: self.selected_model.clone(),
            design: Some(self.design.clone()),
            cloud: Some(self.cloud.clone()),
        }
    }
}

pub struct SettingsManager;

impl SettingsManager {
    /// Get the loom home directory (~/.loom)
    pub fn loom_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("LOOM_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".loom"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::loom_home()?.join("settings.json"))
    }

    /// Load settings from disk, creating the file on first use
    pub fn load() -> Result<Settings> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Save settings to disk
    pub fn save(settings: &Settings) -> Result<()> {
        Self::save_to(&Self::settings_path()?, settings)
    }

    pub fn load_from(path: &Path) -> Result<Settings> {
        if !path.exists() {
            let settings = Settings::default();
            Self::save_to(path, &settings)?;
            return Ok(settings);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        // Holds API keys, owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }
}
