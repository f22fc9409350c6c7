//! Engine facade over probing, validation, conversion and sidecar metadata.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use codecmedia_convert::{
    normalize_extension, ConversionHub, ConversionOptions, ConversionRequest, ConversionResult,
};
use codecmedia_probe::{parse_strict, probe_file, MediaType, ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

use crate::config::{Config, ValidationConfig};
use crate::error::{Error, Result};

/// Key/value metadata for a media file.
pub type Metadata = BTreeMap<String, String>;

/// Options for [`Engine::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Run the extension's parser over the whole file.
    pub strict: bool,
    /// Reject files larger than this; 0 disables the check.
    pub max_bytes: u64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationConfig::default().into()
    }
}

impl From<&ValidationConfig> for ValidationOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            strict: config.strict,
            max_bytes: config.max_bytes,
        }
    }
}

impl From<ValidationConfig> for ValidationOptions {
    fn from(config: ValidationConfig) -> Self {
        Self::from(&config)
    }
}

/// Outcome of [`Engine::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok(warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            warnings,
            errors: Vec::new(),
        }
    }

    fn failed(error: String) -> Self {
        Self {
            valid: false,
            warnings: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Options for [`Engine::extract_audio`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioExtractOptions {
    /// Output format; defaults to the source extension.
    pub target_format: Option<String>,
}

/// What [`Engine::extract_audio`] wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub output_file: PathBuf,
    pub format: String,
}

/// Entry point for every media operation.
pub struct Engine {
    config: Config,
    hub: ConversionHub,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self::with_hub(config, ConversionHub::default())
    }

    /// Use a custom conversion hub, e.g. one with another image codec.
    pub fn with_hub(config: Config, hub: ConversionHub) -> Self {
        Self { config, hub }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Probe a file. Only a missing or unreadable file is an error.
    pub fn probe(&self, path: &Path) -> Result<ProbeResult> {
        Ok(probe_file(path)?)
    }

    /// Validation options taken from the loaded configuration.
    pub fn validation_defaults(&self) -> ValidationOptions {
        (&self.config.validation).into()
    }

    /// Conversion options taken from the loaded configuration.
    pub fn conversion_defaults(&self) -> ConversionOptions {
        ConversionOptions {
            target_format: None,
            preset: self.config.conversion.preset.clone(),
            overwrite: self.config.conversion.overwrite,
        }
    }

    /// Check a file's size and, in strict mode, its structure.
    ///
    /// Never fails: every problem is reported in the returned report.
    pub fn validate(&self, path: &Path, options: &ValidationOptions) -> ValidationReport {
        if !path.exists() {
            return ValidationReport::failed(format!("File does not exist: {}", path.display()));
        }

        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => return ValidationReport::failed(format!("Failed to validate file: {e}")),
        };
        if options.max_bytes > 0 && size > options.max_bytes {
            return ValidationReport::failed(format!(
                "File exceeds maxBytes: {size} > {}",
                options.max_bytes
            ));
        }

        if !options.strict {
            return ValidationReport::ok(Vec::new());
        }

        let ext = codecmedia_probe::extension_of(path);
        match parse_strict(path, self.config.validation.strict_max_bytes) {
            Ok(Some(_)) => ValidationReport::ok(Vec::new()),
            Ok(None) => ValidationReport::ok(vec![format!(
                "No structural parser for extension '{ext}'; only size was checked"
            )]),
            Err(ProbeError::TooLarge { limit, .. }) => ValidationReport::failed(format!(
                "Strict validation is limited to files <= {limit} bytes"
            )),
            Err(e) if e.is_parse_failure() => {
                tracing::warn!(path = %path.display(), error = %e, "strict validation failed");
                ValidationReport::failed(format!("Strict validation failed for {ext}: {e}"))
            }
            Err(e) => ValidationReport::failed(format!("Failed to validate file: {e}")),
        }
    }

    /// Convert `input` into `output`.
    ///
    /// The source media type is probed; the target comes from
    /// `options.target_format` or the output extension.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: ConversionOptions,
    ) -> Result<ConversionResult> {
        let source = self.probe(input)?;
        let request = ConversionRequest::new(input, output, source.media_type, options)?;
        Ok(self.hub.convert(&request)?)
    }

    /// Copy the audio of `input` into `output_dir` as `<stem>_audio.<ext>`.
    ///
    /// Only audio inputs are accepted and the format cannot change.
    pub fn extract_audio(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &AudioExtractOptions,
    ) -> Result<ExtractionResult> {
        let probe = self.probe(input)?;
        if probe.media_type != MediaType::Audio {
            return Err(Error::Extraction(format!(
                "Input is not an audio file: {}",
                input.display()
            )));
        }

        let source_ext = normalize_extension(&probe.extension);
        let requested = match options.target_format.as_deref() {
            Some(fmt) if !fmt.trim().is_empty() => normalize_extension(fmt),
            _ => source_ext.clone(),
        };
        if requested != source_ext {
            return Err(Error::Extraction(format!(
                "Audio extraction does not transcode. Requested format '{requested}' must match source format '{source_ext}'"
            )));
        }

        fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_file = output_dir.join(format!("{stem}_audio.{source_ext}"));
        fs::copy(input, &output_file).map_err(|e| Error::io(input, e))?;

        tracing::info!(output = %output_file.display(), format = %source_ext, "audio extracted");
        Ok(ExtractionResult {
            output_file,
            format: source_ext,
        })
    }

    /// Sidecar path holding metadata for `path`.
    pub fn sidecar_path(&self, path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(&self.config.metadata.sidecar_suffix);
        path.with_file_name(name)
    }

    /// Probe-derived `mimeType`, `extension` and `mediaType`, plus any
    /// sidecar entries that do not collide with them.
    pub fn read_metadata(&self, path: &Path) -> Result<Metadata> {
        let probe = self.probe(path)?;
        let mut entries = Metadata::new();
        entries.insert("mimeType".to_string(), probe.mime_type);
        entries.insert("extension".to_string(), probe.extension);
        entries.insert("mediaType".to_string(), probe.media_type.to_string());

        for (key, value) in self.read_sidecar(path)? {
            entries.entry(key).or_insert(value);
        }
        Ok(entries)
    }

    /// Entries stored in the sidecar alone; empty when there is none.
    pub fn read_sidecar(&self, path: &Path) -> Result<Metadata> {
        let sidecar = self.sidecar_path(path);
        if !sidecar.exists() {
            return Ok(Metadata::new());
        }
        let content = fs::read_to_string(&sidecar).map_err(|e| Error::io(&sidecar, e))?;
        toml::from_str(&content).map_err(|e| {
            Error::Metadata(format!(
                "Failed to read metadata sidecar: {}: {e}",
                sidecar.display()
            ))
        })
    }

    /// Replace the sidecar for `path` with `entries`.
    pub fn write_metadata(&self, path: &Path, entries: &Metadata) -> Result<()> {
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()).into());
        }
        if entries.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::Metadata(
                "Metadata key must not be blank".to_string(),
            ));
        }

        let sidecar = self.sidecar_path(path);
        let content = toml::to_string(entries).map_err(|e| {
            Error::Metadata(format!(
                "Failed to write metadata sidecar: {}: {e}",
                sidecar.display()
            ))
        })?;
        fs::write(&sidecar, content).map_err(|e| Error::io(&sidecar, e))?;
        tracing::debug!(sidecar = %sidecar.display(), entries = entries.len(), "metadata written");
        Ok(())
    }
}
