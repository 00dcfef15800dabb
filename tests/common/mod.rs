//! Shared fixtures: a scratch system root, a payload directory and a recording runner.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use piprov::{
    CommandRunner, Payload, ProvisionContext, Result, Settings, SystemPaths, SystemRunner,
    ToolArgs, ToolOutput,
};
use tempfile::TempDir;

pub const BOOT_CONFIG: &str = "# boot config\narm_64bit=0\n";
pub const KEYBOARD: &str = "XKBMODEL=\"pc105\"\nXKBLAYOUT=\"gb\"\nXKBVARIANT=\"\"\n";
pub const WPA_SUPPLICANT: &str =
    "ctrl_interface=DIR=/var/run/wpa_supplicant GROUP=netdev\nupdate_config=1\n";
pub const INTERFACES: &str = "# interfaces(5) file used by ifup(8) and ifdown(8)\n";
pub const DNS_SCRIPT: &str = "#!/bin/bash\n\
    token=\"YOUR_DYNV6_TOKEN_HERE\"\n\
    hostname=\"YOUR_DOMAIN_NAME_HERE\"\n\
    device=\"YOUR_NETWORK_DEVICE_NAME_HERE\"\n\
    curl -s \"https://dynv6.com/api/update?hostname=$hostname&token=$token\"\n";
pub const FIREWALL_SCRIPT: &str = "#!/bin/bash\niptables -F\n";

/// Scratch root populated like a fresh Raspberry Pi image, plus a payload directory.
pub struct Fixture {
    pub root: TempDir,
    pub paths: SystemPaths,
    pub payload: Payload,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_token("# dynv6 token\ntoken = abc123\n")
    }

    pub fn with_token(token_file: &str) -> Self {
        let root = TempDir::new().unwrap();
        let paths = SystemPaths::under_root(root.path().join("sys"));

        write(&paths.boot_config, BOOT_CONFIG);
        write(&paths.keyboard, KEYBOARD);
        write(&paths.wpa_supplicant, WPA_SUPPLICANT);
        write(&paths.interfaces, INTERFACES);

        let payload = Payload::new(root.path().join("payload"));
        write(&payload.firewall_script(), FIREWALL_SCRIPT);
        write(&payload.dns_script(), DNS_SCRIPT);
        write(&payload.token_file(), token_file);

        let mut settings = Settings::with_domain("mypi.dynv6.net");
        settings.reboot_delay_secs = 0;
        settings.max_prompt_attempts = Some(5);

        Self {
            root,
            paths,
            payload,
            settings,
        }
    }

    pub fn ctx<'a>(&'a self, runner: &'a dyn CommandRunner) -> ProvisionContext<'a> {
        ProvisionContext {
            settings: &self.settings,
            paths: &self.paths,
            payload: &self.payload,
            runner,
        }
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Records every invocation. `sed` runs for real against the scratch files; `passwd`
/// answers from a queue of exit codes (success once the queue is empty); `chown` and
/// `reboot` always succeed.
#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<String>>,
    passwd_exits: RefCell<VecDeque<i32>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `passwd` exits with these codes, in order.
    pub fn with_passwd_exits(codes: &[i32]) -> Self {
        Self {
            calls: RefCell::default(),
            passwd_exits: RefCell::new(codes.iter().copied().collect()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<String> {
        let prefix = format!("{} ", program);
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, tool: &dyn ToolArgs) -> Result<ToolOutput> {
        self.calls.borrow_mut().push(tool.display_command());
        match tool.program() {
            "sed" => SystemRunner.run(tool),
            "passwd" => match self.passwd_exits.borrow_mut().pop_front() {
                Some(0) | None => Ok(ToolOutput::ok()),
                Some(code) => Ok(ToolOutput::failed(code, "")),
            },
            _ => Ok(ToolOutput::ok()),
        }
    }
}
