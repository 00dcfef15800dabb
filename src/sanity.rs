//! Pre-flight sanity checks for runtime environment
//!
//! Verifies before anything on the system is touched that:
//! - the tools piprov shells out to are on `PATH`
//! - the process runs with root privileges (EUID 0)

use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }
}

/// Tools invoked during provisioning
pub const REQUIRED_BINARIES: &[&str] = &[
    "passwd", // Password rotation
    "sed",    // Keyboard layout and DNS script edits
    "chown",  // Staged script ownership
    "reboot", // Final reboot
];

/// Check if a binary is available in PATH
pub fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdin(Stdio::null())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Perform all sanity checks and return the result
pub fn verify_environment() -> SanityCheckResult {
    let missing_binaries = REQUIRED_BINARIES
        .iter()
        .filter(|binary| !binary_exists(binary))
        .map(|binary| binary.to_string())
        .collect();

    SanityCheckResult {
        missing_binaries,
        is_root: is_running_as_root(),
    }
}

/// Human-readable report of what failed.
pub fn failure_report(result: &SanityCheckResult) -> String {
    let mut lines = vec![
        String::new(),
        "╔══════════════════════════════════════════════════════════════════╗".to_string(),
        "║                piprov - Pre-flight Check Failed                  ║".to_string(),
        "╚══════════════════════════════════════════════════════════════════╝".to_string(),
        String::new(),
    ];

    if !result.is_root {
        lines.push("[ERROR] Root privileges required".to_string());
        lines.push("   piprov edits /boot and /etc and must run as superuser:".to_string());
        lines.push("     sudo piprov".to_string());
        lines.push(String::new());
    }

    if !result.missing_binaries.is_empty() {
        lines.push("[ERROR] Missing required binaries".to_string());
        for binary in &result.missing_binaries {
            lines.push(format!("   • {}", binary));
        }
        lines.push(String::new());
    }

    lines.push("Fix the above issues and try again.".to_string());
    lines.join("\n")
}

/// Print the failure report to stderr and exit
pub fn print_error_and_exit(result: &SanityCheckResult) -> ! {
    eprintln!("{}", failure_report(result));
    std::process::exit(1);
}

/// Skip root check (for development/testing)
/// Set PIPROV_SKIP_ROOT_CHECK=1 to skip
pub fn should_skip_root_check() -> bool {
    skip_requested(std::env::var("PIPROV_SKIP_ROOT_CHECK").ok().as_deref())
}

fn skip_requested(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Verify the environment and exit if checks fail
pub fn run_preflight_checks() {
    debug!("Running pre-flight sanity checks...");

    let mut result = verify_environment();

    if !result.is_root && should_skip_root_check() {
        warn!("Root check skipped (PIPROV_SKIP_ROOT_CHECK=1)");
        result.is_root = true;
    }

    if !result.is_ok() {
        print_error_and_exit(&result);
    }

    info!("Pre-flight checks passed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exists_sed() {
        assert!(binary_exists("sed"), "sed should be available");
    }

    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_sanity_result_is_ok() {
        let ok_result = SanityCheckResult {
            missing_binaries: vec![],
            is_root: true,
        };
        assert!(ok_result.is_ok());

        let missing_binary = SanityCheckResult {
            missing_binaries: vec!["passwd".to_string()],
            is_root: true,
        };
        assert!(!missing_binary.is_ok());

        let not_root = SanityCheckResult {
            missing_binaries: vec![],
            is_root: false,
        };
        assert!(!not_root.is_ok());
    }

    #[test]
    fn test_failure_report_mentions_each_problem() {
        let report = failure_report(&SanityCheckResult {
            missing_binaries: vec!["reboot".to_string()],
            is_root: false,
        });
        assert!(report.contains("sudo piprov"));
        assert!(report.contains("• reboot"));
    }

    #[test]
    fn test_skip_requested_values() {
        assert!(skip_requested(Some("1")));
        assert!(skip_requested(Some("TRUE")));
        assert!(!skip_requested(Some("0")));
        assert!(!skip_requested(None));
    }
}
