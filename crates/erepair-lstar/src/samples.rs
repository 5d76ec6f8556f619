//! Labeled example sets and membership sources.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use erepair_oracle::{CommandOracle, Oracle, OracleConfig, Verdict};

use crate::dfa::Dfa;

/// Errors from loading example files.
#[derive(Debug, Error)]
pub enum LearnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Answers membership queries for the target language.
pub trait Membership {
    fn is_member(&mut self, word: &str) -> bool;
}

/// Labeled positive and negative examples of the target language.
///
/// Sets are ordered so equivalence checks visit examples in a
/// reproducible order.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub positives: BTreeSet<String>,
    pub negatives: BTreeSet<String>,
}

impl Samples {
    pub fn from_words<P, N>(positives: P, negatives: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            positives: positives.into_iter().map(Into::into).collect(),
            negatives: negatives.into_iter().map(Into::into).collect(),
        }
    }

    /// Load examples from two files holding one word per line.  An
    /// empty line denotes the empty string; trailing `\r` is stripped.
    pub fn from_files(positives: &Path, negatives: &Path) -> Result<Self, LearnError> {
        Ok(Self {
            positives: read_lines(positives)?,
            negatives: read_lines(negatives)?,
        })
    }

    /// The characters occurring in any example, sorted and deduplicated;
    /// `{'a', 'b'}` when both sets are empty of characters.
    pub fn infer_alphabet(&self) -> Vec<char> {
        let mut alphabet: BTreeSet<char> = BTreeSet::new();
        for word in self.positives.iter().chain(self.negatives.iter()) {
            alphabet.extend(word.chars());
        }
        if alphabet.is_empty() {
            return vec!['a', 'b'];
        }
        alphabet.into_iter().collect()
    }

    /// The first labeled example the hypothesis misclassifies, if any.
    pub fn counterexample(&self, hypothesis: &Dfa) -> Option<&str> {
        for word in &self.positives {
            if !hypothesis.accepts(word) {
                return Some(word);
            }
        }
        for word in &self.negatives {
            if hypothesis.accepts(word) {
                return Some(word);
            }
        }
        None
    }
}

fn read_lines(path: &Path) -> Result<BTreeSet<String>, std::io::Error> {
    let file = File::open(path)?;
    let mut words = BTreeSet::new();
    for line in BufReader::new(file).lines() {
        let mut line = line?;
        if line.ends_with('\r') {
            line.pop();
        }
        words.insert(line);
    }
    Ok(words)
}

/// Membership backed by the labeled sets: positives are members,
/// everything else is not.
#[derive(Debug, Clone)]
pub struct DatasetMembership {
    positives: BTreeSet<String>,
    negatives: BTreeSet<String>,
    /// Classification of words in neither set.
    default_member: bool,
}

impl DatasetMembership {
    pub fn new(samples: &Samples) -> Self {
        Self {
            positives: samples.positives.clone(),
            negatives: samples.negatives.clone(),
            default_member: false,
        }
    }
}

impl Membership for DatasetMembership {
    fn is_member(&mut self, word: &str) -> bool {
        if self.positives.contains(word) {
            return true;
        }
        if self.negatives.contains(word) {
            return false;
        }
        self.default_member
    }
}

/// Membership backed by a real validator process, with memoized
/// queries.
pub struct ValidatorMembership {
    oracle: CommandOracle,
    memo: BTreeMap<String, bool>,
}

impl ValidatorMembership {
    pub fn new(validator: impl Into<PathBuf>) -> Self {
        Self::with_config(validator, OracleConfig::from_env())
    }

    pub fn with_config(validator: impl Into<PathBuf>, config: OracleConfig) -> Self {
        Self {
            oracle: CommandOracle::with_config(validator, config),
            memo: BTreeMap::new(),
        }
    }

    /// Validator runs issued so far (memo hits excluded).
    pub fn queries(&self) -> u64 {
        self.oracle.stats().total
    }
}

impl Membership for ValidatorMembership {
    fn is_member(&mut self, word: &str) -> bool {
        if let Some(&known) = self.memo.get(word) {
            return known;
        }
        let member = self.oracle.ask(word.as_bytes()) == Verdict::Ok;
        debug!(
            "membership {:?}: {}",
            word,
            if member { "accepted" } else { "rejected" }
        );
        self.memo.insert(word.to_string(), member);
        member
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn alphabet_is_sorted_and_deduplicated() {
        let samples = Samples::from_words(["ba", "ab"], ["cc"]);
        assert_eq!(samples.infer_alphabet(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn alphabet_falls_back_when_empty() {
        let samples = Samples::from_words([""], Vec::<String>::new());
        assert_eq!(samples.infer_alphabet(), vec!['a', 'b']);
    }

    #[test]
    fn dataset_membership_defaults_to_negative() {
        let samples = Samples::from_words(["in"], ["out"]);
        let mut membership = DatasetMembership::new(&samples);

        assert!(membership.is_member("in"));
        assert!(!membership.is_member("out"));
        assert!(!membership.is_member("unknown"));
    }

    #[test]
    fn files_keep_empty_lines_and_strip_cr() {
        let mut pos = tempfile::NamedTempFile::new().unwrap();
        write!(pos, "aa\r\n\nab\n").unwrap();
        let mut neg = tempfile::NamedTempFile::new().unwrap();
        write!(neg, "b\n").unwrap();

        let samples = Samples::from_files(pos.path(), neg.path()).unwrap();
        assert!(samples.positives.contains("aa"));
        assert!(samples.positives.contains("ab"));
        assert!(samples.positives.contains(""));
        assert_eq!(samples.positives.len(), 3);
        assert_eq!(samples.negatives.len(), 1);
    }

    #[test]
    fn counterexample_prefers_missed_positives() {
        let samples = Samples::from_words(["aa"], ["a"]);
        let empty = Dfa::default();
        // An empty hypothesis rejects everything, so the positive is
        // the counterexample.
        assert_eq!(samples.counterexample(&empty), Some("aa"));
    }
}
