//! Provisioning State Machine
//!
//! Tracks which stage of the pipeline is running and enforces that stages run in
//! order, each exactly once.
//!
//! # Stage Flow
//!
//! ```text
//! NotStarted
//!     ↓
//! CollectingParameters
//!     ↓
//! ConfiguringSystem
//!     ↓
//! InstallingFirewall
//!     ↓
//! ConfiguringNetwork
//!     ↓
//! InstallingDns
//!     ↓
//! Rebooting
//!     ↓
//! Completed
//!
//! (Any stage can transition to Failed)
//! ```

use std::fmt;

use thiserror::Error;
use tracing::info;

/// Provisioning stages in sequential order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProvisionStage {
    NotStarted = 0,
    CollectingParameters = 1,
    /// GPU split, password rotation, SSH marker, keyboard layout
    ConfiguringSystem = 2,
    InstallingFirewall = 3,
    /// Writes the supplicant and interfaces files
    ConfiguringNetwork = 4,
    InstallingDns = 5,
    Rebooting = 6,
    Completed = 7,
    Failed = 255,
}

impl ProvisionStage {
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true for stages that modify files on the system
    #[inline]
    pub const fn modifies_system(self) -> bool {
        matches!(
            self,
            Self::ConfiguringSystem
                | Self::InstallingFirewall
                | Self::ConfiguringNetwork
                | Self::InstallingDns
        )
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::CollectingParameters),
            Self::CollectingParameters => Some(Self::ConfiguringSystem),
            Self::ConfiguringSystem => Some(Self::InstallingFirewall),
            Self::InstallingFirewall => Some(Self::ConfiguringNetwork),
            Self::ConfiguringNetwork => Some(Self::InstallingDns),
            Self::InstallingDns => Some(Self::Rebooting),
            Self::Rebooting => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::CollectingParameters => "Collecting network parameters",
            Self::ConfiguringSystem => "Configuring system",
            Self::InstallingFirewall => "Setting up the firewall configuration",
            Self::ConfiguringNetwork => "Setting up the network configuration",
            Self::InstallingDns => "Setting up the dynamic DNS configuration",
            Self::Rebooting => "Rebooting",
            Self::Completed => "Provisioning complete",
            Self::Failed => "Provisioning failed",
        }
    }

    /// Returns all stages in order (excluding Failed)
    pub const fn all_stages() -> &'static [Self] {
        &[
            Self::NotStarted,
            Self::CollectingParameters,
            Self::ConfiguringSystem,
            Self::InstallingFirewall,
            Self::ConfiguringNetwork,
            Self::InstallingDns,
            Self::Rebooting,
            Self::Completed,
        ]
    }
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageTransitionError {
    #[error("Cannot skip from {from} to {to}")]
    SkippedStage {
        from: ProvisionStage,
        to: ProvisionStage,
    },

    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition {
        from: ProvisionStage,
        to: ProvisionStage,
    },

    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: ProvisionStage },

    #[error("Already at stage {stage}")]
    AlreadyAtStage { stage: ProvisionStage },
}

/// Owns the current stage and validates every transition.
///
/// # Example
///
/// ```
/// use piprov::provision_state::{ProvisionProgress, ProvisionStage};
///
/// let mut progress = ProvisionProgress::new();
/// progress.transition_to(ProvisionStage::CollectingParameters).unwrap();
///
/// // Cannot skip stages
/// assert!(progress.transition_to(ProvisionStage::InstallingDns).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ProvisionProgress {
    current: ProvisionStage,
    failed_at: Option<ProvisionStage>,
    /// Stages entered so far, in order
    history: Vec<ProvisionStage>,
}

impl Default for ProvisionProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisionProgress {
    pub fn new() -> Self {
        Self {
            current: ProvisionStage::NotStarted,
            failed_at: None,
            history: Vec::with_capacity(ProvisionStage::all_stages().len()),
        }
    }

    #[inline]
    pub fn current_stage(&self) -> ProvisionStage {
        self.current
    }

    #[inline]
    pub fn failed_at(&self) -> Option<ProvisionStage> {
        self.failed_at
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current == ProvisionStage::Completed
    }

    pub fn history(&self) -> &[ProvisionStage] {
        &self.history
    }

    /// Move to `target`, which must be the stage right after the current one.
    pub fn transition_to(
        &mut self,
        target: ProvisionStage,
    ) -> Result<ProvisionStage, StageTransitionError> {
        if self.current.is_terminal() {
            return Err(StageTransitionError::FromTerminalState { from: self.current });
        }
        if target == self.current {
            return Err(StageTransitionError::AlreadyAtStage { stage: target });
        }
        // Failed is only reachable through fail()
        if target == ProvisionStage::Failed {
            return Err(StageTransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }
        if target.order() < self.current.order() {
            return Err(StageTransitionError::BackwardTransition {
                from: self.current,
                to: target,
            });
        }
        if self.current.next() != Some(target) {
            return Err(StageTransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }

        info!("Stage: {}", target);
        self.history.push(target);
        self.current = target;
        Ok(target)
    }

    /// Mark the run as failed at the current stage.
    pub fn fail(&mut self) -> Result<(), StageTransitionError> {
        if self.current.is_terminal() {
            return Err(StageTransitionError::FromTerminalState { from: self.current });
        }
        self.failed_at = Some(self.current);
        self.history.push(ProvisionStage::Failed);
        self.current = ProvisionStage::Failed;
        Ok(())
    }
}
