//! Output path preparation and byte copies.

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Make `output` writable for a conversion from `input`.
///
/// Creates missing parent directories. Fails when the output exists and
/// `overwrite` is off, or when input and output are the same file.
pub fn prepare_output(input: &Path, output: &Path, overwrite: bool) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }

    if output.exists() {
        if !overwrite {
            return Err(ConvertError::OutputExists(output.to_path_buf()));
        }
        let same = match (fs::canonicalize(input), fs::canonicalize(output)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same {
            return Err(ConvertError::InvalidRequest(format!(
                "Input and output are the same file: {}",
                output.display()
            )));
        }
    }
    Ok(())
}

/// Copy `input` to `output` byte for byte.
pub fn copy_bytes(input: &Path, output: &Path) -> Result<u64> {
    fs::copy(input, output).map_err(|e| ConvertError::io(input, e))
}
