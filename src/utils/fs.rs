//! File system utilities.

use crate::Result;
use std::path::Path;

/// Write a file through a sibling temp file and a rename, creating parent
/// directories as needed. Readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    let tmp = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp, contents)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Turn an identifier into a single safe path component.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`; leading dots are replaced so
/// the result can never be `.` or `..`.
pub fn sanitize_component(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    let leading = cleaned.len() - trimmed.len();
    let result = format!("{}{}", "_".repeat(leading), trimmed);

    if result.is_empty() {
        "_".to_string()
    } else {
        result
    }
}
