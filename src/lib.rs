//! piprov Library
//!
//! Provisions a Raspberry Pi as a firewalled network gateway with dynamic DNS: boot
//! config, password, SSH, keyboard, firewall and DNS scripts, network interfaces.

pub mod cli;
pub mod command_runner;
pub mod config;
pub mod error;
pub mod guarded_file;
pub mod paths;
pub mod prompt;
pub mod provision_state;
pub mod provisioner;
pub mod sanity;
pub mod signals;
pub mod stages;
pub mod token;
pub mod tool_traits;
pub mod types;

// Re-export main types for convenience
pub use command_runner::{CommandRunner, SystemRunner, ToolOutput, run_checked};
pub use config::{InstrumentInterface, Settings};
pub use error::{ProvisionError, Result};
pub use guarded_file::{ApplyOutcome, GuardedFile};
pub use paths::{Payload, SystemPaths};
pub use prompt::{
    AttemptBudget, ConfirmationState, ParameterCollector, PasswordConfirmation, Prompter,
    ScriptedPrompter, TerminalPrompter,
};
pub use provision_state::{ProvisionProgress, ProvisionStage, StageTransitionError};
pub use provisioner::Provisioner;
pub use stages::ProvisionContext;
pub use token::{DnsToken, TokenError};
pub use tool_traits::{ChownArgs, PasswdArgs, RebootArgs, SubstituteArgs, ToolArgs};
pub use types::{NetworkDevice, Uplink, WifiSecurity, WirelessCredentials, device_for};
