//! Covering grammars for black-box string repair.
//!
//! Given an input string, this crate builds two immutable grammars:
//!
//! 1. **Base grammar** — derives exactly the input: one nonterminal per
//!    character slot plus an end sentinel.
//! 2. **Covering grammar** — the base grammar with every character rule
//!    expanded into four alternatives (match, delete, insert-before,
//!    substitute), so that every single-character edit of the input is a
//!    derivation of the grammar.
//!
//! The search engine selects up to K non-match alternatives ("edits"),
//! materializes the corresponding variant string, and submits it to an
//! external validator.  This crate owns the vocabulary shared by both
//! sides: [`Symbol`], [`Grammar`], [`Edit`] and [`EditApplication`].
//!
//! # Example
//!
//! ```
//! use erepair_grammar::{collect_edits, CoveringConfig, Grammar};
//!
//! let base = Grammar::for_input(b"ab");
//! let covering = base.covering(&CoveringConfig::default());
//!
//! // Two character slots, each with delete/insert/substitute alternatives,
//! // plus the insert-at-end alternative.
//! let edits = collect_edits(&covering);
//! assert_eq!(edits.len(), 3 + 2 + 2);
//! ```
//!
//! # Determinism
//!
//! Rule order, alternative order and edit enumeration order are all
//! insertion-ordered and reproducible; repeated runs on the same input
//! visit candidates in the same sequence.

mod edit;
mod grammar;
mod symbol;

pub use edit::{collect_edits, Edit, EditApplication, EditKind};
pub use grammar::{CoveringConfig, Grammar, Production, START};
pub use symbol::Symbol;
