//! Filesystem locations touched by the provisioner.
//!
//! The paths are fixed on a real Pi. `SystemPaths::under_root` re-roots every one
//! of them under a directory so the whole pipeline can run against a scratch tree.

use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};
use crate::guarded_file::GuardedFile;

/// Firewall rules script name, both in the payload and when staged
pub const FIREWALL_SCRIPT_NAME: &str = "iptables.sh";
/// Dynamic DNS update script name, both in the payload and when staged
pub const DNS_SCRIPT_NAME: &str = "dynv6.sh";
/// Token file shipped next to the DNS script in the payload
pub const DNS_TOKEN_FILE_NAME: &str = "dynv6_token.txt";

/// Every system path piprov reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPaths {
    pub boot_config: PathBuf,
    pub boot_config_backup: PathBuf,
    /// Empty marker that enables sshd on next boot
    pub ssh_marker: PathBuf,
    pub keyboard: PathBuf,
    pub firewall_dir: PathBuf,
    pub dns_dir: PathBuf,
    pub wpa_supplicant: PathBuf,
    pub wpa_supplicant_backup: PathBuf,
    pub interfaces: PathBuf,
    pub interfaces_backup: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self::under_root("/")
    }
}

impl SystemPaths {
    /// Build the path set with `root` standing in for `/`.
    pub fn under_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let at = |p: &str| root.join(p);
        Self {
            boot_config: at("boot/config.txt"),
            boot_config_backup: at("boot/config_backup.txt"),
            ssh_marker: at("boot/ssh"),
            keyboard: at("etc/default/keyboard"),
            firewall_dir: at("etc/firewall"),
            dns_dir: at("etc/dns"),
            wpa_supplicant: at("etc/wpa_supplicant/wpa_supplicant.conf"),
            wpa_supplicant_backup: at("etc/wpa_supplicant/wpa_supplicant_backup.conf"),
            interfaces: at("etc/network/interfaces"),
            interfaces_backup: at("etc/network/interfaces_backup"),
        }
    }

    /// Staged firewall script, referenced by the interface `pre-up` hooks
    pub fn firewall_script(&self) -> PathBuf {
        self.firewall_dir.join(FIREWALL_SCRIPT_NAME)
    }

    /// Staged DNS script, referenced by the interface `post-up` hooks
    pub fn dns_script(&self) -> PathBuf {
        self.dns_dir.join(DNS_SCRIPT_NAME)
    }

    pub fn boot_config_file(&self) -> GuardedFile {
        GuardedFile::new(&self.boot_config, &self.boot_config_backup)
    }

    pub fn wpa_supplicant_file(&self) -> GuardedFile {
        GuardedFile::new(&self.wpa_supplicant, &self.wpa_supplicant_backup)
    }

    pub fn interfaces_file(&self) -> GuardedFile {
        GuardedFile::new(&self.interfaces, &self.interfaces_backup)
    }
}

/// Directory holding the opaque scripts that get staged onto the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    dir: PathBuf,
}

impl Payload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Payload next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| ProvisionError::config(format!("cannot locate executable: {e}")))?;
        let dir = exe
            .parent()
            .ok_or_else(|| ProvisionError::config("executable has no parent directory"))?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn firewall_script(&self) -> PathBuf {
        self.dir.join(FIREWALL_SCRIPT_NAME)
    }

    pub fn dns_script(&self) -> PathBuf {
        self.dir.join(DNS_SCRIPT_NAME)
    }

    pub fn token_file(&self) -> PathBuf {
        self.dir.join(DNS_TOKEN_FILE_NAME)
    }

    /// Check all payload files are present before anything on the system changes.
    pub fn verify(&self) -> Result<()> {
        let missing: Vec<String> = [self.firewall_script(), self.dns_script(), self.token_file()]
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| p.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::config(format!(
                "payload directory {} is missing: {}",
                self.dir.display(),
                missing.join(", ")
            )))
        }
    }
}
