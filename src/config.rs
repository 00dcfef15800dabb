//! Provisioning settings.
//!
//! Settings are loaded once from a JSON file, checked by [`Settings::test_values`]
//! and then passed by reference into every stage. Nothing reads settings from
//! global state.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, ProvisionError, Result};

/// Domain value shipped in the sample settings file.
pub const DOMAIN_PLACEHOLDER: &str = "YOUR_DOMAIN_NAME_HERE";

/// Smallest GPU memory split the firmware accepts, in MB.
pub const MIN_GPU_MEM_MB: u32 = 16;

/// Settings for one provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Dynamic DNS hostname registered for this Pi (e.g. `mypi.dynv6.net`)
    pub domain_name: String,

    /// Account whose default password must be changed
    #[serde(default = "default_account")]
    pub account: String,

    /// Memory reserved for the GPU
    #[serde(default = "default_gpu_mem_mb")]
    pub gpu_mem_mb: u32,

    #[serde(default = "default_reboot_delay_secs")]
    pub reboot_delay_secs: u64,

    /// Upper bound on every reprompt/retry loop. `None` keeps asking forever.
    #[serde(default)]
    pub max_prompt_attempts: Option<u32>,

    /// Static interface that faces the local instrument network
    #[serde(default)]
    pub instrument: InstrumentInterface,
}

/// Static address of the instrument-facing ethernet port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentInterface {
    pub device: String,
    pub address: String,
    pub netmask: String,
    pub network: String,
}

impl Default for InstrumentInterface {
    fn default() -> Self {
        Self {
            device: "eth0".to_string(),
            address: "192.168.7.1".to_string(),
            netmask: "255.255.255.0".to_string(),
            network: "192.168.7.0".to_string(),
        }
    }
}

impl Settings {
    /// Settings with the given domain and every other field at its default.
    pub fn with_domain(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            account: default_account(),
            gpu_mem_mb: default_gpu_mem_mb(),
            reboot_delay_secs: default_reboot_delay_secs(),
            max_prompt_attempts: None,
            instrument: InstrumentInterface::default(),
        }
    }

    /// Load settings from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ProvisionError::config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).at_path(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ProvisionError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Startup self-check. Must pass before any stage touches the system.
    pub fn test_values(&self) -> Result<()> {
        // Checked as written: the value is substituted into the DNS script verbatim
        let domain = self.domain_name.as_str();
        if domain.is_empty() {
            return Err(ProvisionError::config("domain_name must be set"));
        }
        if domain == DOMAIN_PLACEHOLDER {
            return Err(ProvisionError::config(
                "domain_name still holds the placeholder value; set it to your dynv6 hostname",
            ));
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ProvisionError::config(format!(
                "domain_name '{}' may only contain letters, digits, '.' and '-'",
                domain
            )));
        }

        if self.account.is_empty() {
            return Err(ProvisionError::config("account must be set"));
        }
        if self.account.chars().any(char::is_whitespace) {
            return Err(ProvisionError::config(format!(
                "account '{}' must not contain whitespace",
                self.account
            )));
        }

        if self.gpu_mem_mb < MIN_GPU_MEM_MB {
            return Err(ProvisionError::config(format!(
                "gpu_mem_mb must be at least {} (got {})",
                MIN_GPU_MEM_MB, self.gpu_mem_mb
            )));
        }

        if self.max_prompt_attempts == Some(0) {
            return Err(ProvisionError::config(
                "max_prompt_attempts must be at least 1 (or null for no limit)",
            ));
        }

        let device = &self.instrument.device;
        if device.is_empty() || device.chars().any(char::is_whitespace) {
            return Err(ProvisionError::config(format!(
                "instrument.device '{}' must be a single interface name",
                device
            )));
        }
        for (field, value) in [
            ("address", &self.instrument.address),
            ("netmask", &self.instrument.netmask),
            ("network", &self.instrument.network),
        ] {
            value.parse::<Ipv4Addr>().map_err(|_| {
                ProvisionError::config(format!(
                    "instrument.{} '{}' is not an IPv4 address",
                    field, value
                ))
            })?;
        }

        Ok(())
    }
}

// Default value functions

fn default_account() -> String {
    "pi".to_string()
}

fn default_gpu_mem_mb() -> u32 {
    MIN_GPU_MEM_MB
}

fn default_reboot_delay_secs() -> u64 {
    5
}
