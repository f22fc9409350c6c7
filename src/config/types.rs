use serde::{Deserialize, Serialize};

use codecmedia_probe::STRICT_MAX_BYTES;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Run the format parser during validation (default: false)
    #[serde(default)]
    pub strict: bool,

    /// Largest file accepted by validation, 0 for unlimited (default: 500 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Largest file strict validation will read (default and ceiling: 32 MiB)
    #[serde(default = "default_strict_max_bytes")]
    pub strict_max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    500 * 1024 * 1024
}

fn default_strict_max_bytes() -> u64 {
    STRICT_MAX_BYTES
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_bytes: default_max_bytes(),
            strict_max_bytes: default_strict_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Encoder preset name (default: "balanced")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Replace existing output files (default: false)
    #[serde(default)]
    pub overwrite: bool,
}

fn default_preset() -> String {
    "balanced".to_string()
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Appended to a media file's name to form its sidecar path
    #[serde(default = "default_sidecar_suffix")]
    pub sidecar_suffix: String,
}

fn default_sidecar_suffix() -> String {
    ".codecmedia.toml".to_string()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            sidecar_suffix: default_sidecar_suffix(),
        }
    }
}
