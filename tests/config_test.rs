//! Integration tests for configuration loading.

use std::fs;

use codecmedia::config::{load_config, load_config_or_default, Config};
use codecmedia_probe::STRICT_MAX_BYTES;
use tempfile::tempdir;

#[test]
fn load_full_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codecmedia.toml");
    fs::write(
        &path,
        r#"
[validation]
strict = true
max_bytes = 1048576
strict_max_bytes = 4096

[conversion]
preset = "quality"
overwrite = true

[metadata]
sidecar_suffix = ".meta.toml"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert!(config.validation.strict);
    assert_eq!(config.validation.max_bytes, 1_048_576);
    assert_eq!(config.validation.strict_max_bytes, 4096);
    assert_eq!(config.conversion.preset, "quality");
    assert!(config.conversion.overwrite);
    assert_eq!(config.metadata.sidecar_suffix, ".meta.toml");
}

#[test]
fn explicit_path_wins_over_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[conversion]\npreset = \"fast\"\n").unwrap();

    let config = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.conversion.preset, "fast");
    assert_eq!(config.validation, Config::default().validation);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_config_or_default(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn syntax_error_names_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[validation\nstrict = true").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn wrong_value_type_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typed.toml");
    fs::write(&path, "[validation]\nmax_bytes = \"lots\"\n").unwrap();

    assert!(load_config(&path).is_err());
}

#[test]
fn strict_limit_above_ceiling_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("limit.toml");
    fs::write(
        &path,
        format!("[validation]\nstrict_max_bytes = {}\n", STRICT_MAX_BYTES * 2),
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("ceiling"));
}

#[test]
fn empty_sidecar_suffix_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta.toml");
    fs::write(&path, "[metadata]\nsidecar_suffix = \"\"\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("sidecar suffix"));
}
