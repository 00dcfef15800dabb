use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::paths::Payload;

/// Settings file looked up in the payload directory when `--config` is not given
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// piprov - one-shot Raspberry Pi network gateway provisioner
#[derive(Parser)]
#[command(name = "piprov")]
#[command(about = "Provision a Raspberry Pi as a firewalled gateway with dynamic DNS")]
#[command(version)]
pub struct Cli {
    /// Log progress at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Configure the system and reboot (the default)
    Provision(RunOptions),
    /// Check settings and payload without touching the system
    Validate(RunOptions),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Settings file [default: <payload-dir>/settings.json]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding iptables.sh, dynv6.sh and dynv6_token.txt
    /// [default: directory of the executable]
    #[arg(long)]
    pub payload_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn payload(&self) -> Result<Payload> {
        match &self.payload_dir {
            Some(dir) => Ok(Payload::new(dir)),
            None => Payload::beside_executable(),
        }
    }

    pub fn settings_path(&self, payload: &Payload) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| payload.dir().join(DEFAULT_SETTINGS_FILE))
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Subcommand to run; provisioning when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Provision(RunOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["piprov"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command_or_default(), Commands::Provision(_)));
    }

    #[test]
    fn test_cli_provision_with_options() {
        let cli = Cli::try_parse_from([
            "piprov",
            "provision",
            "--config",
            "/path/to/settings.json",
            "--payload-dir",
            "/opt/payload",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Provision(opts)) => {
                assert_eq!(opts.config.unwrap().to_str().unwrap(), "/path/to/settings.json");
                assert_eq!(opts.payload_dir.unwrap().to_str().unwrap(), "/opt/payload");
            }
            _ => panic!("Expected Provision command"),
        }
    }

    #[test]
    fn test_cli_validate_with_global_flags() {
        let cli = Cli::try_parse_from(["piprov", "validate", "-v", "--debug"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Validate(_))));
    }

    #[test]
    fn test_settings_path_defaults_into_payload() {
        let opts = RunOptions {
            config: None,
            payload_dir: Some(PathBuf::from("/opt/payload")),
        };
        let payload = opts.payload().unwrap();
        assert_eq!(
            opts.settings_path(&payload),
            PathBuf::from("/opt/payload/settings.json")
        );
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["piprov", "install"]).is_err());
    }
}
