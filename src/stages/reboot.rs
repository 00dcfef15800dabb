//! Final reboot so the new boot config and interfaces take effect.

use std::thread;
use std::time::Duration;

use super::{ProvisionContext, announce};
use crate::command_runner::run_checked;
use crate::error::Result;
use crate::tool_traits::RebootArgs;

pub fn reboot(ctx: &ProvisionContext<'_>) -> Result<()> {
    let delay = ctx.settings.reboot_delay_secs;
    announce(&format!("Rebooting the system in {} seconds...", delay));
    thread::sleep(Duration::from_secs(delay));
    run_checked(ctx.runner, &RebootArgs)?;
    Ok(())
}
