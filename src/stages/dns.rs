//! Dynamic DNS (dynv6) script staging and parameterisation.

use std::path::Path;

use tracing::info;

use super::{ProvisionContext, ensure_dir, stage_script};
use crate::command_runner::run_checked;
use crate::error::Result;
use crate::token::{DnsToken, read_token_file};
use crate::tool_traits::SubstituteArgs;
use crate::types::{NetworkDevice, Uplink};

/// Placeholder assignments shipped in the payload `dynv6.sh`.
pub const TOKEN_ASSIGNMENT: &str = r#"token="YOUR_DYNV6_TOKEN_HERE""#;
pub const HOSTNAME_ASSIGNMENT: &str = r#"hostname="YOUR_DOMAIN_NAME_HERE""#;
pub const DEVICE_ASSIGNMENT: &str = r#"device="YOUR_NETWORK_DEVICE_NAME_HERE""#;

/// The three in-place edits that turn the payload script into a working one.
pub fn placeholder_substitutions(
    script: &Path,
    token: &DnsToken,
    domain_name: &str,
    device: NetworkDevice,
) -> [SubstituteArgs; 3] {
    [
        SubstituteArgs::new(
            script,
            TOKEN_ASSIGNMENT,
            format!(r#"token="{}""#, token.as_str()),
        ),
        SubstituteArgs::new(
            script,
            HOSTNAME_ASSIGNMENT,
            format!(r#"hostname="{}""#, domain_name),
        ),
        SubstituteArgs::new(script, DEVICE_ASSIGNMENT, format!(r#"device="{}""#, device)),
    ]
}

/// Stage `dynv6.sh` and fill in token, hostname and device.
pub fn install_dns(ctx: &ProvisionContext<'_>, uplink: &Uplink) -> Result<()> {
    let script = ctx.paths.dns_script();

    ensure_dir(&ctx.paths.dns_dir)?;
    stage_script(ctx.runner, &ctx.payload.dns_script(), &script)?;

    let token = read_token_file(&ctx.payload.token_file())?;
    let device = uplink.device();
    info!("Configuring {} for {} on {}", script.display(), ctx.settings.domain_name, device);

    for substitution in placeholder_substitutions(&script, &token, &ctx.settings.domain_name, device) {
        run_checked(ctx.runner, &substitution)?;
    }
    Ok(())
}
