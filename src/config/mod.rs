mod types;

pub use types::*;

use anyhow::{Context, Result};
use codecmedia_probe::STRICT_MAX_BYTES;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./codecmedia.toml",
        "./config.toml",
        "~/.config/codecmedia/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.conversion.preset.trim().is_empty() {
        anyhow::bail!("Conversion preset cannot be empty");
    }

    if config.metadata.sidecar_suffix.is_empty() {
        anyhow::bail!("Metadata sidecar suffix cannot be empty");
    }

    if config.validation.strict_max_bytes > STRICT_MAX_BYTES {
        anyhow::bail!(
            "validation.strict_max_bytes {} exceeds the {} byte ceiling",
            config.validation.strict_max_bytes,
            STRICT_MAX_BYTES
        );
    }

    Ok(())
}
