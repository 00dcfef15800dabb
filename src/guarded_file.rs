//! Backup-then-restore protection for system files that piprov appends to.
//!
//! # Protocol
//!
//! - First run: the live file is copied to its backup path, then the stanza is appended.
//! - Every later run: the backup is copied back over the live file, discarding what
//!   the previous run appended, then the stanza is appended again.
//!
//! After any number of runs the live file is the pristine original followed by exactly
//! one stanza, the one from the latest run. The boot config, the WPA supplicant file
//! and the interfaces file all go through [`GuardedFile::apply`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{IoResultExt, Result};

/// What `apply` did to bring the live file back to its pristine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No backup existed; the live file was copied to the backup path.
    BackedUp,
    /// A backup existed and was restored over the live file.
    Restored,
}

/// A live system file paired with the path of its pristine backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedFile {
    live: PathBuf,
    backup: PathBuf,
}

impl GuardedFile {
    pub fn new(live: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            live: live.into(),
            backup: backup.into(),
        }
    }

    pub fn live(&self) -> &Path {
        &self.live
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Make sure a pristine backup exists.
    ///
    /// Returns `true` if the backup was already there, `false` if it was just taken
    /// from the live file.
    pub fn ensure_backup(&self) -> Result<bool> {
        if self.backup.is_file() {
            return Ok(true);
        }
        fs::copy(&self.live, &self.backup).at_path(&self.live)?;
        debug!("Backed up {} to {}", self.live.display(), self.backup.display());
        Ok(false)
    }

    /// Copy the backup over the live file.
    pub fn restore(&self) -> Result<()> {
        fs::copy(&self.backup, &self.live).at_path(&self.backup)?;
        debug!("Restored {} from {}", self.live.display(), self.backup.display());
        Ok(())
    }

    /// Return the live file to pristine state and append `stanza` to it.
    pub fn apply(&self, stanza: &str) -> Result<ApplyOutcome> {
        let outcome = if self.ensure_backup()? {
            self.restore()?;
            ApplyOutcome::Restored
        } else {
            ApplyOutcome::BackedUp
        };

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.live)
            .at_path(&self.live)?;
        file.write_all(stanza.as_bytes()).at_path(&self.live)?;

        info!(
            "Applied {} byte stanza to {} ({:?})",
            stanza.len(),
            self.live.display(),
            outcome
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;

    fn guarded(dir: &Path, original: &str) -> GuardedFile {
        let live = dir.join("config.txt");
        fs::write(&live, original).unwrap();
        GuardedFile::new(live, dir.join("config_backup.txt"))
    }

    #[test]
    fn test_first_apply_takes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = guarded(dir.path(), "dtparam=audio=on\n");

        assert_eq!(file.apply("\ngpu_mem=16\n").unwrap(), ApplyOutcome::BackedUp);
        assert_eq!(fs::read_to_string(file.backup()).unwrap(), "dtparam=audio=on\n");
        assert_eq!(
            fs::read_to_string(file.live()).unwrap(),
            "dtparam=audio=on\n\ngpu_mem=16\n"
        );
    }

    #[test]
    fn test_repeated_apply_never_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = guarded(dir.path(), "original\n");

        file.apply("\nfirst\n").unwrap();
        assert_eq!(file.apply("\nsecond\n").unwrap(), ApplyOutcome::Restored);
        file.apply("\nthird\n").unwrap();

        assert_eq!(fs::read_to_string(file.live()).unwrap(), "original\n\nthird\n");
    }

    #[test]
    fn test_ensure_backup_reports_existing_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = guarded(dir.path(), "x");

        assert!(!file.ensure_backup().unwrap());
        assert!(file.ensure_backup().unwrap());
    }

    #[test]
    fn test_backup_is_not_refreshed_from_modified_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = guarded(dir.path(), "pristine\n");

        file.apply("stanza\n").unwrap();
        fs::write(file.live(), "edited by hand\n").unwrap();
        file.apply("stanza\n").unwrap();

        assert_eq!(fs::read_to_string(file.live()).unwrap(), "pristine\nstanza\n");
    }

    #[test]
    fn test_missing_live_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = GuardedFile::new(dir.path().join("absent"), dir.path().join("absent_backup"));

        let err = file.apply("stanza").unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));
        assert!(err.to_string().contains("absent"));
    }
}
