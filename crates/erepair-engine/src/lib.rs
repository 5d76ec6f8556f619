//! Black-box string repair by bounded edit search.
//!
//! Given an input string and an external validator that answers
//! accept / reject / incomplete, this crate finds a minimally edited
//! variant of the input that the validator accepts:
//!
//! 1. Build the covering grammar for the input
//!    ([`erepair_grammar`]) — every single-character insert, delete and
//!    substitute becomes an alternative production.
//! 2. Enumerate selections of 1..=K edits, smallest count first, with
//!    character assignments drawn from a fixed [`Alphabet`].
//! 3. Materialize each selection into a candidate string
//!    ([`generate`]) and submit it through a deduplicating cache to the
//!    oracle ([`erepair_oracle`]).
//! 4. Return the first accepted candidate.
//!
//! # Example
//!
//! ```
//! use erepair_engine::Repairer;
//! use erepair_oracle::{FnOracle, Verdict};
//!
//! // A toy validator accepting only "ab".
//! let oracle = FnOracle::new(|c: &[u8]| {
//!     if c == b"ab" { Verdict::Ok } else { Verdict::Err }
//! });
//!
//! let mut repairer = Repairer::new(oracle);
//! let outcome = repairer.repair(b"aXb");
//! assert_eq!(outcome.repaired.as_deref(), Some(&b"ab"[..]));
//! ```
//!
//! # Determinism
//!
//! Edit enumeration, combination order and alphabet order are all
//! fixed, so repeated runs on the same input return the same candidate
//! after the same number of oracle calls.
//!
//! # Module structure
//!
//! - [`generator`] — covering-grammar walk that materializes candidates
//! - [`alphabet`] — the character pool for insert/substitute edits
//! - [`search`] — the bounded combination search
//! - [`report`] — candidate previews and repair summaries

pub mod alphabet;
pub mod generator;
pub mod report;
pub mod search;

pub use alphabet::Alphabet;
pub use generator::{all_applied, generate};
pub use report::{preview, write_summary, RepairSummary, ReportError};
pub use search::{
    RepairOutcome, Repairer, SearchConfig, MAX_CHAR_EDITS_ENV, MAX_EDITS_ENV,
};
