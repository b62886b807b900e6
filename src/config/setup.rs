//! Interactive setup wizard for first-time configuration
//!
//! Prompts for the backend location and an optional session token when
//! storedesk is run for the first time.

use super::StoredeskConfig;
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::Path;

/// Interactive first-time setup - prompts for backend URL and session token
///
/// 1. Prompts for the backend URL (default: `http://localhost:3000`)
/// 2. Prompts for a session token (empty for none)
/// 3. Saves the configuration to `path`
///
/// # Errors
///
/// Returns `ConfigError` if user input cannot be read or the configuration
/// cannot be saved.
pub fn first_time_setup(path: &Path) -> Result<StoredeskConfig, ConfigError> {
    println!("Welcome to storedesk! Let's point it at your storefront backend.\n");

    let mut config = StoredeskConfig::default();

    let base_url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Backend URL")
        .default(config.base_url.clone())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let token: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Session token (leave empty for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    config.set("base_url", &base_url)?;
    config.set("session_token", &token)?;
    config.save_to(path)?;

    println!("\nConfiguration saved to {}", path.display());
    Ok(config)
}
