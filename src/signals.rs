//! Termination signal handling
//!
//! An interrupted run can leave the boot config, supplicant file or interfaces file
//! with a partial stanza. The pristine copies are already on disk at that point, so
//! the handler only needs to put the terminal back and tell the user where they are.

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::thread;
use tracing::info;

use crate::paths::SystemPaths;

/// Name of a handled signal, for logs.
pub fn signal_name(sig: i32) -> &'static str {
    match sig {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "UNKNOWN",
    }
}

/// Conventional shell exit status for death by `sig`.
pub fn exit_code_for(sig: i32) -> i32 {
    128 + sig
}

/// Where to find the untouched originals after an interrupted run.
pub fn backups_note(paths: &SystemPaths) -> String {
    format!(
        "Interrupted. Original files are kept at:\n  {}\n  {}\n  {}\n\
         Running piprov again restores them before reapplying.",
        paths.boot_config_backup.display(),
        paths.wpa_supplicant_backup.display(),
        paths.interfaces_backup.display()
    )
}

/// Install handlers for SIGINT, SIGTERM and SIGHUP on a watcher thread.
///
/// On delivery the terminal leaves raw mode, the backups note is printed and the
/// process exits with `128 + signal`.
pub fn init_signal_handlers(paths: &SystemPaths) -> Result<(), std::io::Error> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    let note = backups_note(paths);

    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received {}, exiting", signal_name(sig));
            let _ = crossterm::terminal::disable_raw_mode();
            eprintln!();
            eprintln!("{}", note);
            std::process::exit(exit_code_for(sig));
        }
    });

    Ok(())
}
