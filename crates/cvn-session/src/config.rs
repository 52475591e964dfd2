//! Session configuration.
//!
//! Small, flat, and fully defaulted — a session built with
//! `SessionConfig::default()` behaves like the shipped product. YAML loading
//! exists for embedders that keep a config file next to the process.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Trial window granted to newly provisioned executors, in hours.
    pub trial_window_hours: i64,
    /// Phone used for profiles provisioned before onboarding finished.
    pub phone_placeholder: String,
    /// Identity attached to moderation decisions.
    pub moderator_name: String,
    /// Install the two sample orders into a fresh session.
    pub seed_demo_orders: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_window_hours: 48,
            phone_placeholder: "+7".to_string(),
            moderator_name: "Aigerim".to_string(),
            seed_demo_orders: true,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("invalid session config yaml")
    }

    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        Self::from_yaml_str(&raw)
    }
}
