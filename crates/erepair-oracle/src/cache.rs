//! Candidate deduplication in front of any oracle.

use std::collections::HashSet;

use crate::verdict::{Oracle, OracleStats, Verdict};

/// Wraps an oracle with a seen-set of submitted candidates.
///
/// A candidate that was already submitted is reported as
/// [`Verdict::Err`] without a validator run: the engine only stops on
/// `Ok`, and a repeat of an accepted candidate cannot occur (the first
/// acceptance ends the search), so dropping repeats loses nothing.
pub struct CachedOracle<O> {
    inner: O,
    seen: HashSet<Vec<u8>>,
    hits: u64,
}

impl<O: Oracle> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            hits: 0,
        }
    }

    /// Queries answered from the seen-set instead of the validator.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Oracle> Oracle for CachedOracle<O> {
    fn ask(&mut self, candidate: &[u8]) -> Verdict {
        if !self.seen.insert(candidate.to_vec()) {
            self.hits += 1;
            return Verdict::Err;
        }
        self.inner.ask(candidate)
    }

    fn stats(&self) -> OracleStats {
        self.inner.stats()
    }
}
