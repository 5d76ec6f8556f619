//! Learning against a real validator process.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use erepair_lstar::{learn, Membership, Samples, ValidatorMembership};
use tempfile::TempDir;

fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Accepts files containing an even number of `a`s.
const PARITY_VALIDATOR: &str = r#"#!/bin/sh
count=$(tr -cd a < "$1" | wc -c)
if [ $((count % 2)) -eq 0 ]; then
  exit 0
else
  exit 1
fi
"#;

#[test]
fn validator_answers_membership_queries() {
    let dir = TempDir::new().unwrap();
    let validator = script(&dir, "parity", PARITY_VALIDATOR);

    let mut membership = ValidatorMembership::new(&validator);
    assert!(membership.is_member(""));
    assert!(membership.is_member("aa"));
    assert!(!membership.is_member("a"));

    // Memoized: re-asking does not re-run the validator.
    let runs = membership.queries();
    assert!(membership.is_member("aa"));
    assert_eq!(membership.queries(), runs);
}

#[test]
fn learns_parity_from_a_validator() {
    let dir = TempDir::new().unwrap();
    let validator = script(&dir, "parity", PARITY_VALIDATOR);

    let samples = Samples::from_words(["", "aa", "aaaa"], ["a", "aaa"]);
    let mut membership = ValidatorMembership::new(&validator);

    let dfa = learn(vec!['a'], &mut membership, &samples);

    assert_eq!(dfa.states().len(), 2);
    assert!(dfa.accepts("aaaaaa"));
    assert!(!dfa.accepts("aaaaa"));
    assert!(membership.queries() > 0);
}
