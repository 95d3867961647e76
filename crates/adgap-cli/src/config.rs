//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the per-provider result tables are written to.
    pub output_dir: PathBuf,

    /// Providers analyzed when none are given on the command line.
    pub services: Vec<String>,

    /// Name of the column holding the provider name.
    pub application_column: String,

    /// Minimum absolute count of ad-like gaps.
    pub ad_threshold: u64,

    /// Minimum proportion of ad-like gaps.
    pub ad_frequency_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            output_dir: data_dir.join("output"),
            services: vec!["Netflix".to_string(), "Hulu".to_string()],
            application_column: "application".to_string(),
            ad_threshold: 3,
            ad_frequency_threshold: 0.6,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ADGAP_*)
        figment = figment.merge(Env::prefixed("ADGAP_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for adgap.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("adgap"))
}

/// Returns the platform-specific data directory for adgap.
///
/// On Linux: `~/.local/share/adgap`
fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("adgap"))
}
