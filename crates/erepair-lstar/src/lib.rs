//! DFA inference from membership queries — Angluin's L\*.
//!
//! Learns a right-linear approximation of a validator's language from
//! labeled positive/negative example sets:
//!
//! - **Membership** queries go to a [`Membership`] source — either the
//!   labeled datasets themselves ([`DatasetMembership`]) or a real
//!   validator process ([`ValidatorMembership`], built on the
//!   [`erepair_oracle`] driver).
//! - **Equivalence** queries iterate the labeled sets: the first
//!   positive the hypothesis rejects, or negative it accepts, is the
//!   counterexample.
//!
//! The learner maintains an observation table `(P, S, T)` that is kept
//! closed and consistent; the extracted [`Dfa`] has one state per
//! distinct row signature and can be emitted as Graphviz DOT or as a
//! right-linear grammar in JSON.
//!
//! # Example
//!
//! ```
//! use erepair_lstar::{learn, DatasetMembership, Samples};
//!
//! // Even number of a's.
//! let samples = Samples::from_words(
//!     ["", "aa", "aaaa"],
//!     ["a", "aaa", "aaaaa"],
//! );
//! let mut membership = DatasetMembership::new(&samples);
//!
//! let dfa = learn(samples.infer_alphabet(), &mut membership, &samples);
//! assert!(dfa.accepts("aaaaaa"));
//! assert!(!dfa.accepts("aaaaaaa"));
//! ```

mod dfa;
mod learner;
mod samples;
mod table;

pub use dfa::{Dfa, RightLinearGrammar};
pub use learner::learn;
pub use samples::{
    DatasetMembership, LearnError, Membership, Samples, ValidatorMembership,
};
pub use table::ObservationTable;
