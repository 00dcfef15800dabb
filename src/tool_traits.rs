//! Type-safe external tool invocations.
//!
//! Every OS tool piprov shells out to (`passwd`, `sed`, `chown`, `reboot`) is
//! described by a struct implementing [`ToolArgs`]. The struct is the contract: the
//! compiler catches a missing argument, and the runner never sees raw string vectors
//! assembled at the call site.

use std::path::PathBuf;

/// Trait for typed tool arguments.
///
/// # Contract
///
/// - `program()`: executable name, resolved through `PATH` by the runner.
/// - `to_cli_args()`: arguments exactly as the tool expects them.
/// - `is_interactive()`: the tool talks to the user's terminal, so the runner must
///   hand it the inherited stdin/stdout/stderr instead of capturing output.
pub trait ToolArgs {
    fn program(&self) -> &'static str;

    fn to_cli_args(&self) -> Vec<String>;

    fn is_interactive(&self) -> bool {
        false
    }

    /// Human-readable command line, for logs and error messages.
    fn display_command(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}

// ============================================================================
// passwd
// ============================================================================

/// `passwd <account>`, run interactively so the user can type the new password.
#[derive(Debug, Clone)]
pub struct PasswdArgs {
    pub account: String,
}

impl ToolArgs for PasswdArgs {
    fn program(&self) -> &'static str {
        "passwd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.account.clone()]
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

// ============================================================================
// sed -i
// ============================================================================

/// In-place literal substitution: `sed -i -- s|<find>|<replace>|g <file>`.
///
/// Both sides are escaped for a `|`-delimited basic regular expression, so values
/// such as tokens or passwords are substituted literally.
#[derive(Debug, Clone)]
pub struct SubstituteArgs {
    pub file: PathBuf,
    pub find: String,
    pub replace: String,
}

impl SubstituteArgs {
    pub fn new(file: impl Into<PathBuf>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// The `s|..|..|g` expression handed to sed.
    pub fn expression(&self) -> String {
        format!(
            "s|{}|{}|g",
            escape_pattern(&self.find),
            escape_replacement(&self.replace)
        )
    }
}

impl ToolArgs for SubstituteArgs {
    fn program(&self) -> &'static str {
        "sed"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            "--".to_string(),
            self.expression(),
            self.file.display().to_string(),
        ]
    }
}

/// Escape BRE metacharacters and the `|` delimiter.
fn escape_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '|' | '.' | '*' | '[' | ']' | '^' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape the characters sed treats specially in a replacement.
fn escape_replacement(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '|' | '&') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// chown
// ============================================================================

/// `chown <owner> <path>`
#[derive(Debug, Clone)]
pub struct ChownArgs {
    pub owner: String,
    pub path: PathBuf,
}

impl ChownArgs {
    /// Hand `path` to the superuser.
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self {
            owner: "root".to_string(),
            path: path.into(),
        }
    }
}

impl ToolArgs for ChownArgs {
    fn program(&self) -> &'static str {
        "chown"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.owner.clone(), self.path.display().to_string()]
    }
}

// ============================================================================
// reboot
// ============================================================================

/// `reboot now`
#[derive(Debug, Clone, Default)]
pub struct RebootArgs;

impl ToolArgs for RebootArgs {
    fn program(&self) -> &'static str {
        "reboot"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["now".to_string()]
    }
}
