//! System configuration: GPU split, password rotation, SSH and keyboard layout.

use std::fs::File;

use tracing::warn;

use super::{ProvisionContext, announce};
use crate::command_runner::run_checked;
use crate::error::{IoResultExt, Result};
use crate::guarded_file::ApplyOutcome;
use crate::prompt::AttemptBudget;
use crate::tool_traits::{PasswdArgs, SubstituteArgs};

/// Keyboard model and layout rewrites: UK pc105 to US pc104.
pub const KEYBOARD_SUBSTITUTIONS: [(&str, &str); 2] = [("pc105", "pc104"), ("gb", "us")];

/// Line appended to the boot config.
pub fn gpu_mem_stanza(mb: u32) -> String {
    format!("\ngpu_mem={}\n", mb)
}

/// A headless Pi needs little GPU memory; give the rest to the system.
pub fn set_gpu_memory(ctx: &ProvisionContext<'_>) -> Result<ApplyOutcome> {
    announce(&format!(
        "Setting GPU memory to {}mb",
        ctx.settings.gpu_mem_mb
    ));
    ctx.paths
        .boot_config_file()
        .apply(&gpu_mem_stanza(ctx.settings.gpu_mem_mb))
}

/// Run `passwd` until the user gets it right. Returns the number of attempts.
pub fn rotate_password(ctx: &ProvisionContext<'_>) -> Result<u32> {
    announce("Please change the default Raspberry Pi password");

    let args = PasswdArgs {
        account: ctx.settings.account.clone(),
    };
    let mut budget = AttemptBudget::new(
        format!("changing the password of '{}'", ctx.settings.account),
        ctx.settings.max_prompt_attempts,
    );

    loop {
        budget.spend()?;
        let output = ctx.runner.run(&args)?;
        if output.success {
            return Ok(budget.used());
        }
        warn!(
            "passwd exited with {:?} on attempt {}",
            output.exit_code,
            budget.used()
        );
        println!("[ERROR] Please try again!");
    }
}

/// Drop the empty marker that makes the OS enable sshd on next boot.
pub fn enable_ssh(ctx: &ProvisionContext<'_>) -> Result<()> {
    let marker = &ctx.paths.ssh_marker;
    File::create(marker).at_path(marker)?;
    Ok(())
}

/// Switch the console keyboard from the UK to the US layout.
///
/// Not backup-guarded: once applied the patterns no longer match, so a second run
/// changes nothing.
pub fn fix_keyboard_layout(ctx: &ProvisionContext<'_>) -> Result<()> {
    for (from, to) in KEYBOARD_SUBSTITUTIONS {
        run_checked(ctx.runner, &SubstituteArgs::new(&ctx.paths.keyboard, from, to))?;
    }
    Ok(())
}

/// All system steps, in order.
pub fn configure_system(ctx: &ProvisionContext<'_>) -> Result<()> {
    set_gpu_memory(ctx)?;
    rotate_password(ctx)?;
    enable_ssh(ctx)?;
    fix_keyboard_layout(ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_mem_stanza() {
        assert_eq!(gpu_mem_stanza(16), "\ngpu_mem=16\n");
    }

    #[test]
    fn test_keyboard_substitutions_target_us_layout() {
        assert_eq!(KEYBOARD_SUBSTITUTIONS[0], ("pc105", "pc104"));
        assert_eq!(KEYBOARD_SUBSTITUTIONS[1], ("gb", "us"));
    }
}
