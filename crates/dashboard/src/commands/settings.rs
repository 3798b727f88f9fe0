use std::path::Path;
use tracing::warn;

use super::CommandError;
use crate::config::{reset_api_url, save_api_url, DashboardConfig};
use crate::views::settings::render_settings;

pub fn show(config: &DashboardConfig) -> Result<(), CommandError> {
    println!("{}", render_settings(config));
    Ok(())
}

pub fn set_url(config_path: &Path, url: &str) -> Result<(), CommandError> {
    let saved = save_api_url(config_path, url)?;
    println!("Saved API URL: {saved}");

    let effective = DashboardConfig::load(config_path)?;
    if effective.api_url_source.is_fixed() {
        warn!(current = %effective.api_url, "Saved API URL is shadowed by the environment.");
        println!(
            "Note: FARMVIBES_API_URL is set, so {} stays in effect.",
            effective.api_url
        );
    }
    Ok(())
}

pub fn reset(config_path: &Path) -> Result<(), CommandError> {
    reset_api_url(config_path)?;
    println!("API URL preference reset to the default.");
    Ok(())
}
