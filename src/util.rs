use crate::error::{RenameError, Result};
use std::fs;
use std::path::Path;

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RenameError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Strips the quotes of an interpreted (`"..."`) or raw (`` `...` ``) Go
/// string literal. Escapes are left as written.
pub fn unquote_go_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() < 2 {
        return None;
    }
    let quoted = (trimmed.starts_with('"') && trimmed.ends_with('"'))
        || (trimmed.starts_with('`') && trimmed.ends_with('`'));
    quoted.then(|| trimmed[1..trimmed.len() - 1].to_string())
}

/// Trimmed lines of `raw` with blank lines removed.
pub fn non_blank_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn truncate_str_bytes(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes.min(value.len());
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
