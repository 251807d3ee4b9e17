//! Config command - Manage CLI configuration

use crate::config::{Settings, SettingsManager};
use anyhow::{Context, Result};
use colored::Colorize;
use loom_core::{credential_env_var, TIERS};
use loom_types::ProviderKind;

/// Show current configuration
pub async fn show() -> Result<()> {
    let settings = SettingsManager::load().context("Failed to load settings")?;

    println!("{}", "Loom Configuration".bold().underline());
    println!();

    println!("{}", "Provider:".cyan().bold());
    let provider = settings.cloud.provider;
    println!("  Provider:   {} ({})", provider.as_str().cyan(), provider.display_name());
    if provider == ProviderKind::Builtin {
        for tier in TIERS {
            let marker = if tier.id == settings.tier {
                " (active)".green()
            } else {
                "".normal()
            };
            println!(
                "  {} {}{}",
                tier.id.cyan(),
                format!("- {}", tier.description).dimmed(),
                marker
            );
        }
    }
    match &settings.cloud.model {
        Some(model) => println!("  Model:      {}", model),
        None => println!("  Model:      {}", "provider default".dimmed()),
    }
    if let Some(model) = &settings.selected_model {
        println!("  Planner:    {}", model);
    }
    let key_source = if settings.cloud.api_key.is_some() {
        "saved in settings".green()
    } else if std::env::var(credential_env_var(provider)).is_ok() {
        format!("from ${}", credential_env_var(provider)).green()
    } else {
        "not set".yellow()
    };
    println!("  API key:    {}", key_source);
    println!();

    println!("{}", "Generation:".cyan().bold());
    println!("  Plan mode:          {}", on_off(settings.plan_mode));
    println!("  Extended thinking:  {}", on_off(settings.extended_thinking));
    println!("  Request timeout:    {}s", settings.request_timeout_secs);
    println!();

    println!("{}", "Design:".cyan().bold());
    let design = &settings.design;
    println!("  Components: {}", design.component_library.as_str());
    println!("  Colors:     {} / {}", design.main_color, design.accent_color);
    println!("  Buttons:    {}", design.button_theme.as_str());
    println!();

    println!("{}", "Publishing:".cyan().bold());
    match &settings.publish_url {
        Some(url) => println!("  Endpoint: {}", url),
        None => println!("  {}", "No publish endpoint configured".dimmed()),
    }
    println!();

    println!("{}", "Config Files:".cyan().bold());
    println!(
        "  Settings: {}",
        SettingsManager::settings_path()?.display().to_string().dimmed()
    );

    Ok(())
}

fn on_off(value: bool) -> colored::ColoredString {
    if value {
        "on".green()
    } else {
        "off".dimmed()
    }
}

/// Select the built-in model tier
pub async fn set_tier(id: &str) -> Result<()> {
    let Some(tier) = TIERS.iter().find(|t| t.id == id) else {
        let known: Vec<_> = TIERS.iter().map(|t| t.id).collect();
        anyhow::bail!("Unknown tier: {}. Available: {}", id, known.join(", "));
    };

    update(|settings| settings.tier = tier.id.to_string())?;
    println!("{} Tier set to: {} ({})", "✓".green(), tier.name.cyan(), tier.description);
    Ok(())
}

/// Select the upstream provider
pub async fn set_provider(name: &str) -> Result<()> {
    let provider: ProviderKind = name.parse().map_err(anyhow::Error::msg)?;

    let settings = update(|settings| {
        if settings.cloud.provider != provider {
            // a model or key for one provider means nothing to another
            settings.cloud.model = None;
            settings.cloud.api_key = None;
        }
        settings.cloud.provider = provider;
    })?;

    println!("{} Provider set to: {}", "✓".green(), provider.as_str().cyan());
    if settings.cloud.api_key.is_none() && std::env::var(credential_env_var(provider)).is_err() {
        println!(
            "  {}",
            format!(
                "Set ${} or run `loom config set-key` before generating.",
                credential_env_var(provider)
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Override the model used for the selected provider
pub async fn set_model(model: Option<&str>, planner: bool) -> Result<()> {
    let model = model.map(str::trim).filter(|m| !m.is_empty()).map(String::from);
    update(|settings| {
        if planner {
            settings.selected_model = model.clone();
        } else {
            settings.cloud.model = model.clone();
        }
    })?;

    let target = if planner { "Planning model" } else { "Model" };
    match model {
        Some(model) => println!("{} {} set to: {}", "✓".green(), target, model.cyan()),
        None => println!("{} {} cleared", "✓".green(), target),
    }
    Ok(())
}

/// Store an API key for the selected provider
pub async fn set_key() -> Result<()> {
    use dialoguer::Password;

    let settings = SettingsManager::load().context("Failed to load settings")?;
    let key = Password::new()
        .with_prompt(format!(
            "API key for {}",
            settings.cloud.provider.display_name()
        ))
        .allow_empty_password(true)
        .interact()?;

    let key = key.trim().to_string();
    update(|settings| {
        settings.cloud.api_key = (!key.is_empty()).then(|| key.clone());
    })?;

    if key.is_empty() {
        println!("{} API key cleared", "✓".green());
    } else {
        println!("{} API key saved", "✓".green());
    }
    Ok(())
}

/// Set the publish collaborator endpoint
pub async fn set_publish_url(url: &str) -> Result<()> {
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!(
            "Invalid URL: {}. URL must start with http:// or https://",
            url
        );
    }

    update(|settings| settings.publish_url = Some(url.to_string()))?;
    println!("{} Publish endpoint set to: {}", "✓".green(), url.cyan());
    Ok(())
}

/// Toggle plan mode and extended thinking
pub async fn set_mode(plan: Option<bool>, thinking: Option<bool>) -> Result<()> {
    let settings = update(|settings| {
        if let Some(plan) = plan {
            settings.plan_mode = plan;
        }
        if let Some(thinking) = thinking {
            settings.extended_thinking = thinking;
        }
    })?;

    println!(
        "{} Plan mode {}, extended thinking {}",
        "✓".green(),
        on_off(settings.plan_mode),
        on_off(settings.extended_thinking)
    );
    Ok(())
}

/// Reset configuration to defaults
pub async fn reset() -> Result<()> {
    use dialoguer::Confirm;

    let confirm = Confirm::new()
        .with_prompt("Are you sure you want to reset all configuration? Saved API keys are removed.")
        .default(false)
        .interact()?;

    if !confirm {
        println!("{}", "Reset cancelled.".yellow());
        return Ok(());
    }

    SettingsManager::save(&Settings::default()).context("Failed to save default settings")?;
    println!("{} Configuration reset to defaults.", "✓".green());
    Ok(())
}

fn update(apply: impl FnOnce(&mut Settings)) -> Result<Settings> {
    let mut settings = SettingsManager::load().context("Failed to load settings")?;
    apply(&mut settings);
    SettingsManager::save(&settings).context("Failed to save settings")?;
    Ok(settings)
}
