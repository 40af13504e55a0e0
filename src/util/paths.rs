use std::path::Path;

use crate::error::JobError;

/// Concatenates `parts` into a freshly reserved string. Reports allocation
/// failure instead of aborting.
pub fn concat(parts: &[&str], what: &'static str) -> Result<String, JobError> {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|_| JobError::ResourceExhausted(what))?;
    for part in parts {
        out.push_str(part);
    }
    Ok(out)
}

/// `--flag=value` style option.
pub fn prefixed(prefix: &str, value: &str, what: &'static str) -> Result<String, JobError> {
    concat(&[prefix, value], what)
}

pub fn utf8(path: &Path) -> Result<&str, JobError> {
    path.to_str()
        .ok_or_else(|| JobError::NonUtf8Path(path.to_path_buf()))
}

pub fn owned_utf8(path: &Path, what: &'static str) -> Result<String, JobError> {
    concat(&[utf8(path)?], what)
}

/// True when `rel` names an entry directly inside its base directory.
pub fn is_single_component(rel: &Path) -> bool {
    rel.components().count() == 1
        && matches!(rel.components().next(), Some(std::path::Component::Normal(_)))
}
