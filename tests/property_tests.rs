//! Property-based tests for piprov
//!
//! These tests verify:
//! - Guarded files never accumulate stanzas across runs
//! - Token parsing picks the last assignment and ignores comments
//! - Stage transitions only ever move one step forward

use std::fs;

use piprov::GuardedFile;
use piprov::provision_state::{ProvisionProgress, ProvisionStage};
use piprov::token::{TOKEN_PLACEHOLDER, parse_token};
use proptest::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Guarded file
// =============================================================================

fn stanza_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_= \t\n]{0,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After N applies the live file is the pristine original plus the last stanza only
    #[test]
    fn guarded_apply_keeps_only_last_stanza(
        pristine in "[ -~\n]{0,80}",
        stanzas in prop::collection::vec(stanza_strategy(), 1..6),
    ) {
        let dir = TempDir::new().unwrap();
        let live = dir.path().join("config.txt");
        let backup = dir.path().join("config_backup.txt");
        fs::write(&live, &pristine).unwrap();

        let file = GuardedFile::new(&live, &backup);
        for stanza in &stanzas {
            file.apply(stanza).unwrap();
        }

        let last = stanzas.last().unwrap();
        prop_assert_eq!(fs::read_to_string(&live).unwrap(), format!("{}{}", pristine, last));
        prop_assert_eq!(fs::read_to_string(&backup).unwrap(), pristine);
    }
}

// =============================================================================
// Token parsing
// =============================================================================

fn token_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,32}".prop_filter("not the placeholder", |v| v != TOKEN_PLACEHOLDER)
}

proptest! {
    /// The last `token = ...` line wins, wherever comments and blanks sit
    #[test]
    fn last_token_line_wins(
        values in prop::collection::vec(token_value_strategy(), 1..5),
        comment in "[ -~]{0,30}",
    ) {
        let mut contents = String::new();
        for value in &values {
            contents.push_str(&format!("# {}\n\ntoken = {}\n", comment, value));
        }
        contents.push_str("#token = not-this-one\n");

        let token = parse_token(&contents, "dynv6_token.txt").unwrap();
        prop_assert_eq!(token.as_str(), values.last().unwrap().as_str());
    }

    /// Comment-only files never yield a token
    #[test]
    fn comments_never_yield_token(lines in prop::collection::vec("[ -~]{0,30}", 0..6)) {
        let contents: String = lines.iter().map(|l| format!("  #{}\n", l)).collect();
        prop_assert!(parse_token(&contents, "dynv6_token.txt").is_err());
    }
}

// =============================================================================
// Stage machine
// =============================================================================

fn stage_strategy() -> impl Strategy<Value = ProvisionStage> {
    prop::sample::select(ProvisionStage::all_stages().to_vec())
}

proptest! {
    /// Any accepted transition is exactly one step forward
    #[test]
    fn transitions_only_step_forward(targets in prop::collection::vec(stage_strategy(), 0..20)) {
        let mut progress = ProvisionProgress::new();
        for target in targets {
            let before = progress.current_stage();
            if progress.transition_to(target).is_ok() {
                prop_assert_eq!(before.next(), Some(target));
                prop_assert_eq!(progress.current_stage(), target);
            } else {
                prop_assert_eq!(progress.current_stage(), before);
            }
        }
    }
}
