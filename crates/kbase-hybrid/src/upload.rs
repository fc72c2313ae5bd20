use std::borrow::Cow;

use kbase_core::error::{Error, Result};
use kbase_core::settings::UploadConfig;

/// Lowercased text after the final dot, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn validate_upload(filename: &str, size: usize, config: &UploadConfig) -> Result<()> {
    let allowed = extension_of(filename)
        .is_some_and(|ext| config.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)));
    if !allowed {
        return Err(Error::InvalidInput(format!(
            "unsupported file type for '{filename}', allowed: {}",
            config.allowed_extensions.join(", ")
        )));
    }
    if size > config.max_bytes {
        return Err(Error::InvalidInput(format!(
            "file is {size} bytes, limit is {} bytes ({:.1} MB)",
            config.max_bytes,
            config.max_bytes as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// UTF-8, with invalid sequences replaced.
pub fn decode_upload(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
