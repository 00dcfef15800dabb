//! Provisioner
//!
//! Drives the stages in order and tracks progress through [`ProvisionProgress`].
//! A failing stage stops the run; files already modified stay modified, and the
//! backups make the next run start from the pristine originals again.

use tracing::error;

use crate::error::Result;
use crate::prompt::{ParameterCollector, Prompter};
use crate::provision_state::{ProvisionProgress, ProvisionStage};
use crate::stages::{ProvisionContext, announce, dns, firewall, network, reboot, system};
use crate::types::Uplink;

pub struct Provisioner<'a> {
    ctx: ProvisionContext<'a>,
    progress: ProvisionProgress,
}

impl<'a> Provisioner<'a> {
    pub fn new(ctx: ProvisionContext<'a>) -> Self {
        Self {
            ctx,
            progress: ProvisionProgress::new(),
        }
    }

    pub fn progress(&self) -> &ProvisionProgress {
        &self.progress
    }

    /// Ask for the uplink parameters, then apply every stage.
    ///
    /// Settings are self-checked before the first question.
    pub fn run(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        self.ctx.settings.test_values()?;
        let max_attempts = self.ctx.settings.max_prompt_attempts;
        let uplink = self.stage(ProvisionStage::CollectingParameters, |_| {
            ParameterCollector::new(prompter, max_attempts).collect_uplink()
        })?;
        self.apply(&uplink)
    }

    /// Apply every stage after parameter collection.
    ///
    /// Can be called directly with parameters gathered elsewhere, in which case the
    /// settings are self-checked and the collection stage is recorded as done.
    pub fn apply(&mut self, uplink: &Uplink) -> Result<()> {
        if self.progress.current_stage() == ProvisionStage::NotStarted {
            self.ctx.settings.test_values()?;
            self.progress
                .transition_to(ProvisionStage::CollectingParameters)?;
        }

        self.stage(ProvisionStage::ConfiguringSystem, system::configure_system)?;
        self.stage(ProvisionStage::InstallingFirewall, firewall::install_firewall)?;
        self.stage(ProvisionStage::ConfiguringNetwork, |ctx| {
            network::configure_network(ctx, uplink)
        })?;
        self.stage(ProvisionStage::InstallingDns, |ctx| dns::install_dns(ctx, uplink))?;
        self.stage(ProvisionStage::Rebooting, reboot::reboot)?;

        self.progress.transition_to(ProvisionStage::Completed)?;
        Ok(())
    }

    /// Enter `stage` and run `body`; a failure marks the run as failed.
    fn stage<T>(
        &mut self,
        stage: ProvisionStage,
        body: impl FnOnce(&ProvisionContext<'a>) -> Result<T>,
    ) -> Result<T> {
        self.progress.transition_to(stage)?;
        if stage.modifies_system() {
            announce(stage.description());
        }
        match body(&self.ctx) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("{} failed: {}", stage, e);
                // Already checked non-terminal by the transition above
                let _ = self.progress.fail();
                Err(e)
            }
        }
    }
}
