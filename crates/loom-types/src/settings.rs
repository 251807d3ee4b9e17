//! User-facing configuration records that feed prompts and publishing

use serde::{Deserialize, Serialize};

/// Upstream provider selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Builtin,
    Grok,
    OpenAI,
    Claude,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[
            ProviderKind::Builtin,
            ProviderKind::Grok,
            ProviderKind::OpenAI,
            ProviderKind::Claude,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Builtin => "builtin",
            ProviderKind::Grok => "grok",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Claude => "claude",
        }
    }

    /// Human name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Builtin | ProviderKind::Grok => "xAI",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Claude => "Anthropic",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "builtin" => Ok(ProviderKind::Builtin),
            "grok" | "xai" => Ok(ProviderKind::Grok),
            "openai" => Ok(ProviderKind::OpenAI),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            other => Err(format!("Unsupported provider: {}", other)),
        }
    }
}

/// Provider credentials, model override and optional backend wiring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentLibrary {
    #[default]
    None,
    Shadcn,
    Mui,
    Chakra,
    Mantine,
    Ant,
}

impl ComponentLibrary {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentLibrary::None => "none",
            ComponentLibrary::Shadcn => "shadcn",
            ComponentLibrary::Mui => "mui",
            ComponentLibrary::Chakra => "chakra",
            ComponentLibrary::Mantine => "mantine",
            ComponentLibrary::Ant => "ant",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonTheme {
    #[default]
    Rounded,
    Pill,
    Sharp,
    Soft,
}

impl ButtonTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonTheme::Rounded => "rounded",
            ButtonTheme::Pill => "pill",
            ButtonTheme::Sharp => "sharp",
            ButtonTheme::Soft => "soft",
        }
    }
}

/// Visual preferences passed to every generation prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignConfig {
    #[serde(default)]
    pub component_library: ComponentLibrary,
    pub main_color: String,
    pub accent_color: String,
    #[serde(default)]
    pub button_theme: ButtonTheme,
    #[serde(default)]
    pub compact_spacing: bool,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default = "default_true")]
    pub enable_animations: bool,
    #[serde(default)]
    pub strong_shadows: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            component_library: ComponentLibrary::None,
            main_color: "#0f172a".to_string(),
            accent_color: "#6366f1".to_string(),
            button_theme: ButtonTheme::Rounded,
            compact_spacing: false,
            high_contrast: false,
            enable_animations: true,
            strong_shadows: false,
        }
    }
}

/// Metadata handed to the publish collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMetadata {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
