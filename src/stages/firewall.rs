//! Firewall script staging.

use super::{ProvisionContext, ensure_dir, stage_script};
use crate::error::Result;

/// Stage the iptables rules script where the interface `pre-up` hooks expect it.
pub fn install_firewall(ctx: &ProvisionContext<'_>) -> Result<()> {
    ensure_dir(&ctx.paths.firewall_dir)?;
    stage_script(
        ctx.runner,
        &ctx.payload.firewall_script(),
        &ctx.paths.firewall_script(),
    )
}
