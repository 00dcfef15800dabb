//! piprov - Main entry point

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use piprov::cli::{Cli, Commands, RunOptions};
use piprov::sanity;
use piprov::signals;
use piprov::{
    Payload, ProvisionContext, Provisioner, Settings, SystemPaths, SystemRunner,
    TerminalPrompter,
};

/// Initialize tracing; `RUST_LOG` wins over the command-line flags
fn init_logger(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load settings and payload and run every check that needs no privileges.
fn self_check(opts: &RunOptions) -> anyhow::Result<(Settings, Payload)> {
    let payload = opts.payload()?;
    let settings_path = opts.settings_path(&payload);

    let settings = Settings::load_from_file(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    settings.test_values()?;
    payload.verify()?;

    debug!("Settings: {:?}", settings);
    Ok((settings, payload))
}

fn validate(opts: &RunOptions) -> anyhow::Result<()> {
    let (settings, payload) = self_check(opts)?;
    println!(
        "Settings for {} are valid; payload found in {}",
        settings.domain_name,
        payload.dir().display()
    );
    Ok(())
}

fn provision(opts: &RunOptions) -> anyhow::Result<()> {
    sanity::run_preflight_checks();
    let (settings, payload) = self_check(opts)?;

    let paths = SystemPaths::default();
    if let Err(e) = signals::init_signal_handlers(&paths) {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let runner = SystemRunner;
    let ctx = ProvisionContext {
        settings: &settings,
        paths: &paths,
        payload: &payload,
        runner: &runner,
    };

    let mut prompter = TerminalPrompter::new();
    let mut provisioner = Provisioner::new(ctx);
    provisioner.run(&mut prompter)?;

    info!("Provisioning complete");
    Ok(())
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(&cli);
    info!("piprov starting up");

    let result = match cli.command_or_default() {
        Commands::Provision(opts) => provision(&opts),
        Commands::Validate(opts) => validate(&opts),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}
