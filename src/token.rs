//! dynv6 token file parsing.
//!
//! The token file is plain text. Lines whose stripped form starts with `#` are
//! comments. A line of the form `token = VALUE` sets the token; when several such
//! lines exist the last one wins.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::error::{IoResultExt, Result};

/// Value shipped in the sample token file; never a real token.
pub const TOKEN_PLACEHOLDER: &str = "TOKEN_WILL_REPLACE_THIS";

/// Why the token file could not provide a usable token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error(
        "The file {file} does not have a dynv6 token.\n\
         Check out https://dynv6.com/docs/apis for a token.\n\
         The token must be present in the file in the form \"token = YOUR TOKEN\""
    )]
    Missing { file: String },

    #[error(
        "The file {file} still holds the placeholder dynv6 token.\n\
         Check out https://dynv6.com/docs/apis for a token.\n\
         The token must be present in the file in the form \"token = YOUR TOKEN\""
    )]
    Placeholder { file: String },
}

/// A dynv6 HTTP API token.
#[derive(Clone, PartialEq, Eq)]
pub struct DnsToken(String);

impl DnsToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the token out of logs.
impl fmt::Debug for DnsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DnsToken(***)")
    }
}

/// Find the token in the file contents. `file` is only used for error messages.
pub fn parse_token(contents: &str, file: &str) -> std::result::Result<DnsToken, TokenError> {
    let mut token = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "token" {
            token = Some(value.trim().to_string());
        }
    }

    match token {
        Some(value) if value == TOKEN_PLACEHOLDER => Err(TokenError::Placeholder {
            file: file.to_string(),
        }),
        Some(value) if !value.is_empty() => Ok(DnsToken(value)),
        _ => Err(TokenError::Missing {
            file: file.to_string(),
        }),
    }
}

/// Read and parse the token file at `path`.
pub fn read_token_file(path: &Path) -> Result<DnsToken> {
    let contents = std::fs::read_to_string(path).at_path(path)?;
    Ok(parse_token(&contents, &path.display().to_string())?)
}
