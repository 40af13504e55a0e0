#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Dated folder, hardlinked against the "current" link by path.
    Incremental,
    /// Dated folder, `--backup-dir` set to the resolved target of the link.
    IncrementalNoLinks,
    /// Always the backup folder itself.
    Snapshot,
    /// Dated folder, no reference.
    Full,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}

impl BackupMode {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "incremental" => Ok(BackupMode::Incremental),
            "incremental-no-links" | "incremental-nolinks" => Ok(BackupMode::IncrementalNoLinks),
            "snapshot" => Ok(BackupMode::Snapshot),
            "full" => Ok(BackupMode::Full),
            _ => Err(format!(
                "invalid backup mode {}; expected incremental, incremental-no-links, snapshot, or full",
                value
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupMode::Incremental => "incremental",
            BackupMode::IncrementalNoLinks => "incremental-no-links",
            BackupMode::Snapshot => "snapshot",
            BackupMode::Full => "full",
        }
    }

    pub fn is_incremental(&self) -> bool {
        matches!(self, BackupMode::Incremental | BackupMode::IncrementalNoLinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_config_spellings() {
        assert_eq!(BackupMode::parse("Full").unwrap(), BackupMode::Full);
        assert_eq!(
            BackupMode::parse("incremental_no_links").unwrap(),
            BackupMode::IncrementalNoLinks
        );
        assert_eq!(
            BackupMode::parse(" incremental-nolinks ").unwrap(),
            BackupMode::IncrementalNoLinks
        );
        assert!(BackupMode::parse("mirror").is_err());
    }
}
