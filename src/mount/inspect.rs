use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InkError, Result};

const MOUNTS_FILE: &str = "/proc/self/mounts";

fn read_mounts() -> Result<String> {
    fs::read_to_string(MOUNTS_FILE)
        .map_err(|e| InkError::message(format!("read {}: {}", MOUNTS_FILE, e)))
}

pub fn mountpoint_is_mounted(mountpoint: &Path) -> Result<bool> {
    Ok(mounts_contain(&read_mounts()?, mountpoint))
}

/// Whether any entry of a mounts table (fstab syntax) is mounted at
/// `mountpoint`.
pub fn mounts_contain(contents: &str, mountpoint: &Path) -> bool {
    let wanted = normalize(mountpoint);
    contents
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|dir| normalize(&unescape(dir)) == wanted)
}

/// Octal escapes the kernel uses for whitespace and backslashes in paths.
fn unescape(field: &str) -> PathBuf {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let code = rest
            .as_bytes()
            .get(pos + 1..pos + 4)
            .filter(|digits| digits.iter().all(|d| (b'0'..=b'7').contains(d)))
            .and_then(|digits| {
                digits
                    .iter()
                    .try_fold(0u8, |acc, d| acc.checked_mul(8)?.checked_add(d - b'0'))
            });
        match code {
            Some(byte) => {
                out.push(char::from(byte));
                rest = &rest[pos + 4..];
            }
            None => {
                out.push('\\');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    PathBuf::from(out)
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
