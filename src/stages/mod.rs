//! Provisioning stages.
//!
//! Each submodule implements one stage of the pipeline as plain functions taking a
//! [`ProvisionContext`]. Stages share the helpers below for staging payload scripts.

pub mod dns;
pub mod firewall;
pub mod network;
pub mod reboot;
pub mod system;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::info;

use crate::command_runner::{CommandRunner, run_checked};
use crate::config::Settings;
use crate::error::{IoResultExt, ProvisionError, Result};
use crate::paths::{Payload, SystemPaths};
use crate::tool_traits::ChownArgs;

/// Mode for staged scripts: owner read/write/execute only.
pub const SCRIPT_MODE: u32 = 0o700;

/// Everything a stage needs, borrowed for the duration of the run.
#[derive(Clone, Copy)]
pub struct ProvisionContext<'a> {
    pub settings: &'a Settings,
    pub paths: &'a SystemPaths,
    pub payload: &'a Payload,
    pub runner: &'a dyn CommandRunner,
}

/// User-facing progress line.
pub(crate) fn announce(message: &str) {
    info!("{}", message);
    println!("{}", message);
}

/// Whether `ensure_dir` had to create the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    AlreadyExists,
}

/// Create `dir` (and parents). An existing directory is reported, not an error.
pub fn ensure_dir(dir: &Path) -> Result<DirStatus> {
    if dir.is_dir() {
        announce(&format!("{} directory already exists", dir.display()));
        return Ok(DirStatus::AlreadyExists);
    }
    fs::create_dir_all(dir).at_path(dir)?;
    Ok(DirStatus::Created)
}

/// Copy a payload script into place, restrict it to its owner and hand it to root.
///
/// Overwrites whatever was staged by a previous run.
pub fn stage_script(runner: &dyn CommandRunner, source: &Path, dest: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(ProvisionError::config(format!(
            "payload script not found: {}",
            source.display()
        )));
    }

    fs::copy(source, dest).at_path(dest)?;
    fs::set_permissions(dest, fs::Permissions::from_mode(SCRIPT_MODE)).at_path(dest)?;
    run_checked(runner, &ChownArgs::root(dest))?;

    info!("Staged {} at {}", source.display(), dest.display());
    Ok(())
}
