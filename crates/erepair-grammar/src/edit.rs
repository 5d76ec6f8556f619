//! Edit primitives: the non-identity alternatives of a covering grammar
//! and the per-candidate application records the generator consumes.

use crate::grammar::{Grammar, Production};
use crate::symbol::Symbol;

/// The three single-character edit families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EditKind {
    /// Insert one byte before the slot's character (or before the end).
    InsertBefore,
    /// Drop the slot's character.
    Delete,
    /// Replace the slot's character with one byte.
    Substitute,
}

impl EditKind {
    /// Whether applying this edit consumes a byte from the search
    /// alphabet.
    pub fn needs_char(self) -> bool {
        !matches!(self, EditKind::Delete)
    }
}

/// One selectable edit: a non-identity alternative of a covering-grammar
/// rule.
///
/// `tag` is the character-slot position; the search never selects two
/// edits with the same tag in one derivation (the generator would leave
/// the second unapplied, and such derivations are discarded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The nonterminal this edit targets.
    pub target: String,
    /// Position tag of the targeted slot.
    pub tag: usize,
    pub kind: EditKind,
    /// The alternative to expand when the edit is applied.
    pub production: Production,
}

/// Runtime record for one selected edit during a single generation.
///
/// Built fresh per candidate, used once, then discarded.
#[derive(Debug, Clone)]
pub struct EditApplication {
    pub edit: Edit,
    /// Set when the generator expands this edit's production.
    pub applied: bool,
    /// Byte supplied by the search for insert/substitute edits.
    pub ch: Option<u8>,
    /// Set once the byte has been emitted; insert and substitute
    /// wildcards consume exactly one byte each.
    pub char_used: bool,
}

impl EditApplication {
    /// Application for an edit that needs no byte.
    pub fn new(edit: Edit) -> Self {
        Self {
            edit,
            applied: false,
            ch: None,
            char_used: false,
        }
    }

    /// Application carrying the byte an insert/substitute edit emits.
    pub fn with_char(edit: Edit, ch: u8) -> Self {
        Self {
            edit,
            applied: false,
            ch: Some(ch),
            char_used: false,
        }
    }
}

/// Collect every edit-carrying alternative of a covering grammar, in the
/// engine's canonical order: all insert-before edits, then all deletes,
/// then all substitutes, each group in rule (position) order.
pub fn collect_edits(covering: &Grammar) -> Vec<Edit> {
    let mut inserts = Vec::new();
    let mut deletes = Vec::new();
    let mut substitutes = Vec::new();
    let mut next_tag = 0usize;

    for (lhs, alts) in covering.iter() {
        // Slot rules carry their tag in the delete/substitute markers;
        // the end-sentinel rule has neither and takes the next free tag.
        let slot_tag = alts.iter().find_map(|rhs| match rhs.as_slice() {
            [Symbol::Delete(t)] | [Symbol::SubstituteAny(t)] => Some(*t),
            _ => None,
        });
        let tag = match slot_tag {
            Some(t) => {
                next_tag = t + 1;
                t
            }
            None => next_tag,
        };

        for rhs in alts {
            match rhs.as_slice() {
                [Symbol::InsertAny, ..] => inserts.push(Edit {
                    target: lhs.to_string(),
                    tag,
                    kind: EditKind::InsertBefore,
                    production: rhs.clone(),
                }),
                [Symbol::Delete(t)] => deletes.push(Edit {
                    target: lhs.to_string(),
                    tag: *t,
                    kind: EditKind::Delete,
                    production: rhs.clone(),
                }),
                [Symbol::SubstituteAny(t)] => substitutes.push(Edit {
                    target: lhs.to_string(),
                    tag: *t,
                    kind: EditKind::Substitute,
                    production: rhs.clone(),
                }),
                _ => {}
            }
        }
    }

    inserts.append(&mut deletes);
    inserts.append(&mut substitutes);
    inserts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CoveringConfig;

    fn edits_for(input: &[u8]) -> Vec<Edit> {
        let base = Grammar::for_input(input);
        collect_edits(&base.covering(&CoveringConfig::default()))
    }

    #[test]
    fn enumeration_order_is_inserts_deletes_substitutes() {
        let edits = edits_for(b"ab");

        let kinds: Vec<EditKind> = edits.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EditKind::InsertBefore,
                EditKind::InsertBefore,
                EditKind::InsertBefore,
                EditKind::Delete,
                EditKind::Delete,
                EditKind::Substitute,
                EditKind::Substitute,
            ]
        );

        // Each group is in position order.
        assert_eq!(edits[0].target, "<c0>");
        assert_eq!(edits[1].target, "<c1>");
        assert_eq!(edits[2].target, "<c2>"); // insert at end
        assert_eq!(edits[3].target, "<c0>");
        assert_eq!(edits[5].target, "<c0>");
    }

    #[test]
    fn end_insert_gets_the_next_free_tag() {
        let edits = edits_for(b"ab");
        let end_insert = &edits[2];
        assert_eq!(end_insert.kind, EditKind::InsertBefore);
        assert_eq!(end_insert.tag, 2);
    }

    #[test]
    fn no_end_insert_when_disabled() {
        let base = Grammar::for_input(b"ab");
        let cov = base.covering(&CoveringConfig {
            insert_at_end: false,
        });
        let edits = collect_edits(&cov);
        assert_eq!(edits.len(), 6);
        assert!(edits.iter().all(|e| e.target != "<c2>"));
    }

    #[test]
    fn needs_char() {
        assert!(EditKind::InsertBefore.needs_char());
        assert!(EditKind::Substitute.needs_char());
        assert!(!EditKind::Delete.needs_char());
    }

    #[test]
    fn empty_input_offers_only_the_end_insert() {
        let edits = edits_for(b"");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].kind, EditKind::InsertBefore);
        assert_eq!(edits[0].target, "<c0>");
        assert_eq!(edits[0].tag, 0);
    }

    #[test]
    fn application_records_start_clean() {
        let edits = edits_for(b"a");
        let app = EditApplication::with_char(edits[0].clone(), b'z');
        assert!(!app.applied);
        assert!(!app.char_used);
        assert_eq!(app.ch, Some(b'z'));
    }
}
