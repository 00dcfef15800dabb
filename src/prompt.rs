//! Interactive parameter collection.
//!
//! Asks whether the Pi joins a wireless network and, if so, for the SSID, an
//! optional enterprise username and a confirmed password. Terminal I/O sits behind
//! the [`Prompter`] trait so the collection logic can be driven from a script.
//!
//! Every reprompt loop is bounded by an [`AttemptBudget`]. With no limit configured
//! the loops behave like a plain interactive prompt and only end on valid input,
//! closed stdin or Ctrl-C.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::debug;

use crate::error::{ProvisionError, Result};
use crate::types::{Uplink, WirelessCredentials};

const YES_NO_HELP: &str = "Please respond with 'yes' or 'no' (or 'y' or 'n').";
const PASSWORD_MISMATCH: &str = "[ERROR] The passwords do not match. Please enter again.";

/// Terminal I/O used by the collector.
///
/// `ask` and `ask_secret` return `Ok(None)` once input is closed.
pub trait Prompter {
    fn say(&mut self, message: &str);

    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Like `ask`, without echoing what is typed.
    fn ask_secret(&mut self, prompt: &str) -> Result<Option<String>>;
}

// ============================================================================
// Terminal prompter
// ============================================================================

/// Reads answers from stdin; secrets are read in raw mode without echo.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// Leaves raw mode when dropped, on every exit path.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn stdin_error(e: io::Error) -> ProvisionError {
    ProvisionError::io("/dev/stdin", e)
}

impl Prompter for TerminalPrompter {
    fn say(&mut self, message: &str) {
        println!("{}", message);
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush().map_err(stdin_error)?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(stdin_error)?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        // Piped input has no echo to hide
        if !io::stdin().is_terminal() {
            return self.ask(prompt);
        }

        print!("{}", prompt);
        io::stdout().flush().map_err(stdin_error)?;

        let mut secret = String::new();
        let outcome = {
            let _raw = RawModeGuard::enable().map_err(stdin_error)?;
            loop {
                let Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                }) = event::read().map_err(stdin_error)?
                else {
                    continue;
                };
                if kind != KeyEventKind::Press {
                    continue;
                }
                let ctrl = modifiers.contains(KeyModifiers::CONTROL);
                match code {
                    KeyCode::Enter => break Ok(Some(())),
                    KeyCode::Char('c') if ctrl => break Err(ProvisionError::Cancelled),
                    KeyCode::Char('d') if ctrl && secret.is_empty() => break Ok(None),
                    KeyCode::Backspace => {
                        secret.pop();
                    }
                    KeyCode::Char(c) if !ctrl => secret.push(c),
                    _ => {}
                }
            }
        };
        println!();

        Ok(outcome?.map(|()| secret))
    }
}

// ============================================================================
// Scripted prompter
// ============================================================================

/// Replays a fixed list of answers and records everything shown to the user.
///
/// Once the answers run out every further question sees closed input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts and messages in the order they were shown
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        self.ask(prompt)
    }
}

// ============================================================================
// Attempt budget
// ============================================================================

/// Counts tries of one reprompt or retry loop against an optional limit.
#[derive(Debug, Clone)]
pub struct AttemptBudget {
    what: String,
    limit: Option<u32>,
    used: u32,
}

impl AttemptBudget {
    pub fn new(what: impl Into<String>, limit: Option<u32>) -> Self {
        Self {
            what: what.into(),
            limit,
            used: 0,
        }
    }

    /// Take one attempt, failing once the limit is used up.
    pub fn spend(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(ProvisionError::TooManyAttempts {
                    what: self.what.clone(),
                    attempts: self.used,
                });
            }
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

// ============================================================================
// Password confirmation
// ============================================================================

/// State of the enter-twice password loop.
#[derive(Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Prompting { mismatches: u32 },
    Confirmed(String),
}

impl fmt::Debug for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompting { mismatches } => f
                .debug_struct("Prompting")
                .field("mismatches", mismatches)
                .finish(),
            Self::Confirmed(_) => f.write_str("Confirmed(***)"),
        }
    }
}

/// Password entered twice; confirmed once both entries match.
#[derive(Debug, Clone)]
pub struct PasswordConfirmation {
    state: ConfirmationState,
}

impl Default for PasswordConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordConfirmation {
    pub fn new() -> Self {
        Self {
            state: ConfirmationState::Prompting { mismatches: 0 },
        }
    }

    /// Feed one (password, confirmation) pair. A confirmed password is final.
    pub fn submit(&mut self, password: String, confirmation: String) -> &ConfirmationState {
        if let ConfirmationState::Prompting { mismatches } = self.state {
            self.state = if password == confirmation {
                ConfirmationState::Confirmed(password)
            } else {
                ConfirmationState::Prompting {
                    mismatches: mismatches + 1,
                }
            };
        }
        &self.state
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, ConfirmationState::Confirmed(_))
    }

    pub fn into_password(self) -> Option<String> {
        match self.state {
            ConfirmationState::Confirmed(password) => Some(password),
            ConfirmationState::Prompting { .. } => None,
        }
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Gathers the uplink parameters from the user.
pub struct ParameterCollector<'a> {
    prompter: &'a mut dyn Prompter,
    max_attempts: Option<u32>,
}

impl<'a> ParameterCollector<'a> {
    pub fn new(prompter: &'a mut dyn Prompter, max_attempts: Option<u32>) -> Self {
        Self {
            prompter,
            max_attempts,
        }
    }

    /// Ask a yes/no question until a recognised answer is given.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        let mut budget = AttemptBudget::new("a yes/no answer", self.max_attempts);
        let prompt = format!("{}? [Y/n] ", question);
        loop {
            budget.spend()?;
            let answer = self
                .prompter
                .ask(&prompt)?
                .ok_or(ProvisionError::InputClosed)?;
            match answer.to_lowercase().as_str() {
                "yes" | "y" | "ye" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => self.prompter.say(YES_NO_HELP),
            }
        }
    }

    fn ask_non_empty(&mut self, what: &str, prompt: &str, error: &str) -> Result<String> {
        let mut budget = AttemptBudget::new(what, self.max_attempts);
        loop {
            budget.spend()?;
            let answer = self
                .prompter
                .ask(prompt)?
                .ok_or(ProvisionError::InputClosed)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.prompter.say(error);
        }
    }

    /// Ask for the password twice until both entries match.
    pub fn collect_password(&mut self) -> Result<String> {
        let mut confirmation = PasswordConfirmation::new();
        self.collect_password_into(&mut confirmation)
    }

    /// `collect_password` driving a caller-owned state machine.
    pub fn collect_password_into(
        &mut self,
        confirmation: &mut PasswordConfirmation,
    ) -> Result<String> {
        let mut budget = AttemptBudget::new("the Wifi password", self.max_attempts);
        loop {
            if let ConfirmationState::Confirmed(password) = confirmation.state() {
                return Ok(password.clone());
            }
            budget.spend()?;

            let password = self
                .prompter
                .ask_secret("Enter Wifi Password : ")?
                .ok_or(ProvisionError::InputClosed)?;
            let again = self
                .prompter
                .ask_secret("Re-enter Wifi Password : ")?
                .ok_or(ProvisionError::InputClosed)?;

            if let ConfirmationState::Prompting { mismatches } =
                confirmation.submit(password, again)
            {
                debug!("Password mismatch #{}", mismatches);
                self.prompter.say(PASSWORD_MISMATCH);
            }
        }
    }

    /// Full interactive flow: wired, or wireless with its credentials.
    pub fn collect_uplink(&mut self) -> Result<Uplink> {
        if !self.ask_yes_no("Are you connecting the Raspberry Pi to a wireless network")? {
            return Ok(Uplink::Wired);
        }

        let ssid = self.ask_non_empty(
            "the wireless SSID",
            "Enter the Wireless network SSID : ",
            "[ERROR] Please enter a Wireless network SSID",
        )?;

        // WPA-EAP needs a username and password, WPA-PSK only a pre-shared key
        let username = if self.ask_yes_no(
            "Are you connecting to a WPA-Enterprise network which requires a username",
        )? {
            Some(self.ask_non_empty(
                "the wireless username",
                "Enter the Username required for connecting to the Wireless network : ",
                "[ERROR] Please enter a Username for authenticating with the Wireless network",
            )?)
        } else {
            None
        };

        let password = self.collect_password()?;

        Ok(Uplink::Wireless(WirelessCredentials {
            ssid,
            username,
            password,
        }))
    }
}
