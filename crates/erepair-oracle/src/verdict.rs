//! Verdicts, call counters and the oracle trait.

/// Classification of one candidate by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted (exit 0).
    Ok,
    /// Rejected, or any failure on the way to a verdict.
    Err,
    /// Parsed up to a truncation point (exit 255).
    Inc,
}

/// Call counters maintained by every oracle.
///
/// `total` is incremented before each validator run is issued, so a
/// call cap holds even when the run itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleStats {
    /// Validator runs issued.
    pub total: u64,
    /// Runs that accepted.
    pub ok: u64,
    /// Runs that rejected or failed.
    pub err: u64,
    /// Runs that reported incomplete input.
    pub inc: u64,
}

impl OracleStats {
    /// Record a verdict in the outcome counters.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Ok => self.ok += 1,
            Verdict::Err => self.err += 1,
            Verdict::Inc => self.inc += 1,
        }
    }

    /// The observability summary line printed at the end of a repair.
    pub fn summary(&self) -> String {
        format!(
            "*** Number of required oracle runs: {} correct: {} incorrect: {} incomplete: {} ***",
            self.total, self.ok, self.err, self.inc
        )
    }
}

/// A black-box accept/reject/incomplete classifier for byte strings.
pub trait Oracle {
    /// Classify one candidate.
    fn ask(&mut self, candidate: &[u8]) -> Verdict;

    /// Current call counters.
    fn stats(&self) -> OracleStats;
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn ask(&mut self, candidate: &[u8]) -> Verdict {
        (**self).ask(candidate)
    }

    fn stats(&self) -> OracleStats {
        (**self).stats()
    }
}

/// An in-process oracle backed by a closure.  Counts calls like the
/// process-backed oracles; useful for tests and for embedding the
/// search against a native validator.
pub struct FnOracle<F> {
    classify: F,
    stats: OracleStats,
}

impl<F: FnMut(&[u8]) -> Verdict> FnOracle<F> {
    pub fn new(classify: F) -> Self {
        Self {
            classify,
            stats: OracleStats::default(),
        }
    }
}

/// Build an [`FnOracle`] from a plain accept/reject predicate.
pub fn predicate_oracle(
    mut accept: impl FnMut(&[u8]) -> bool,
) -> FnOracle<impl FnMut(&[u8]) -> Verdict> {
    FnOracle::new(move |candidate: &[u8]| {
        if accept(candidate) {
            Verdict::Ok
        } else {
            Verdict::Err
        }
    })
}

impl<F: FnMut(&[u8]) -> Verdict> Oracle for FnOracle<F> {
    fn ask(&mut self, candidate: &[u8]) -> Verdict {
        self.stats.total += 1;
        let verdict = (self.classify)(candidate);
        self.stats.record(verdict);
        verdict
    }

    fn stats(&self) -> OracleStats {
        self.stats
    }
}
