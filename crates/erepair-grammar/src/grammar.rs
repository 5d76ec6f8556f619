//! Ordered rule storage, base-grammar construction and the covering
//! derivation.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::debug;

use crate::symbol::{slot_name, Symbol};

/// One right-hand side: an ordered sequence of symbols.
pub type Production = Vec<Symbol>;

/// Name of the start nonterminal.
pub const START: &str = "<start>";

/// Options for the covering derivation.
#[derive(Debug, Clone)]
pub struct CoveringConfig {
    /// Add an insert alternative to the end-sentinel rule, so truncated
    /// inputs can be repaired by appending.
    pub insert_at_end: bool,
}

impl Default for CoveringConfig {
    fn default() -> Self {
        Self {
            insert_at_end: true,
        }
    }
}

/// An ordered mapping from nonterminal name to its alternatives.
///
/// Alternative order is significant: the first alternative of every rule
/// is the identity ("match") branch, and the generator falls back to it
/// whenever no edit targets the rule.  Rule order is insertion order, so
/// walking the grammar visits character slots in position order.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    order: Vec<String>,
    rules: BTreeMap<String, Vec<Production>>,
}

impl Grammar {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alternative to `lhs`, creating the rule on first use.
    pub fn add(&mut self, lhs: impl Into<String>, rhs: Production) {
        let lhs = lhs.into();
        match self.rules.get_mut(&lhs) {
            Some(alts) => alts.push(rhs),
            None => {
                self.order.push(lhs.clone());
                self.rules.insert(lhs, vec![rhs]);
            }
        }
    }

    /// The alternatives of `lhs`, in canonical order.
    pub fn alternatives(&self, lhs: &str) -> Option<&[Production]> {
        self.rules.get(lhs).map(Vec::as_slice)
    }

    /// Whether `lhs` names a rule of this grammar.
    pub fn contains(&self, lhs: &str) -> bool {
        self.rules.contains_key(lhs)
    }

    /// Iterate rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Production])> {
        self.order
            .iter()
            .map(|lhs| (lhs.as_str(), self.rules[lhs].as_slice()))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the grammar has no rules.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build the base grammar for `input`:
    ///
    /// ```text
    /// <start> -> <c0> <c1> ... <c_{n-1}> <c_n>
    /// <c_k>   -> input[k]        for k in 0..n
    /// <c_n>   -> ⊥               (end sentinel)
    /// ```
    pub fn for_input(input: &[u8]) -> Self {
        let mut g = Grammar::new();
        let mut start_rhs = Vec::with_capacity(input.len() + 1);

        for (k, &byte) in input.iter().enumerate() {
            let nt = slot_name(k);
            start_rhs.push(Symbol::Nonterminal(nt.clone()));
            g.add(nt, vec![Symbol::Terminal(byte)]);
        }

        let end = slot_name(input.len());
        start_rhs.push(Symbol::Nonterminal(end.clone()));
        g.add(end, vec![Symbol::End]);

        g.add(START, start_rhs);
        g
    }

    /// Derive the covering grammar.
    ///
    /// Every single-terminal rule `<c_k> -> t` is expanded into four
    /// alternatives, in this order:
    ///
    /// 1. match:         `<c_k> -> t`
    /// 2. delete:        `<c_k> -> <$del[k]>`
    /// 3. insert-before: `<c_k> -> $. t`
    /// 4. substitute:    `<c_k> -> <$![k]>`
    ///
    /// The end-sentinel rule is copied (optionally gaining an insert
    /// alternative `$. ⊥`), and structural rules such as the `<start>`
    /// sequence are copied verbatim.  Tags are assigned from a running
    /// counter over single-terminal rules in insertion order, so each
    /// character slot gets its position as its tag.
    pub fn covering(&self, config: &CoveringConfig) -> Self {
        let mut cg = Grammar::new();
        let mut tag = 0usize;

        for (lhs, alts) in self.iter() {
            for rhs in alts {
                match rhs.as_slice() {
                    [Symbol::Terminal(t)] => {
                        cg.add(lhs, vec![Symbol::Terminal(*t)]);
                        cg.add(lhs, vec![Symbol::Delete(tag)]);
                        cg.add(lhs, vec![Symbol::InsertAny, Symbol::Terminal(*t)]);
                        cg.add(lhs, vec![Symbol::SubstituteAny(tag)]);
                        tag += 1;
                    }
                    [Symbol::End] => {
                        cg.add(lhs, vec![Symbol::End]);
                        if config.insert_at_end {
                            cg.add(lhs, vec![Symbol::InsertAny, Symbol::End]);
                        }
                    }
                    _ => cg.add(lhs, rhs.clone()),
                }
            }
        }

        debug!(
            "covering grammar: {} rules over {} character slots",
            cg.len(),
            tag
        );
        cg
    }

    /// Render the grammar as one rule per line, alternatives joined by
    /// `|`, with `ε` for empty productions.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (lhs, alts) in self.iter() {
            let _ = write!(out, "{lhs} → ");
            for (i, rhs) in alts.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if rhs.is_empty() {
                    out.push('ε');
                } else {
                    for (j, sym) in rhs.iter().enumerate() {
                        if j > 0 {
                            out.push(' ');
                        }
                        let _ = write!(out, "{sym}");
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_grammar_shape() {
        let g = Grammar::for_input(b"ab");

        // Two character slots, the end sentinel and <start>.
        assert_eq!(g.len(), 4);
        assert_eq!(
            g.alternatives("<c0>"),
            Some(&[vec![Symbol::Terminal(b'a')]][..])
        );
        assert_eq!(
            g.alternatives("<c1>"),
            Some(&[vec![Symbol::Terminal(b'b')]][..])
        );
        assert_eq!(g.alternatives("<c2>"), Some(&[vec![Symbol::End]][..]));

        let start = &g.alternatives(START).unwrap()[0];
        assert_eq!(
            start.as_slice(),
            &[Symbol::slot(0), Symbol::slot(1), Symbol::slot(2)]
        );
    }

    #[test]
    fn base_grammar_empty_input() {
        let g = Grammar::for_input(b"");
        assert_eq!(g.len(), 2);
        assert_eq!(g.alternatives("<c0>"), Some(&[vec![Symbol::End]][..]));
        assert_eq!(
            g.alternatives(START).unwrap()[0].as_slice(),
            &[Symbol::slot(0)]
        );
    }

    #[test]
    fn covering_alternative_order() {
        let base = Grammar::for_input(b"x");
        let cov = base.covering(&CoveringConfig::default());

        let alts = cov.alternatives("<c0>").unwrap();
        assert_eq!(alts.len(), 4);
        assert_eq!(alts[0], vec![Symbol::Terminal(b'x')]);
        assert_eq!(alts[1], vec![Symbol::Delete(0)]);
        assert_eq!(alts[2], vec![Symbol::InsertAny, Symbol::Terminal(b'x')]);
        assert_eq!(alts[3], vec![Symbol::SubstituteAny(0)]);
    }

    #[test]
    fn covering_tags_are_position_unique() {
        // Three identical characters get three distinct tags.
        let base = Grammar::for_input(b"aaa");
        let cov = base.covering(&CoveringConfig::default());

        for k in 0..3 {
            let alts = cov.alternatives(&format!("<c{k}>")).unwrap();
            assert_eq!(alts[1], vec![Symbol::Delete(k)]);
            assert_eq!(alts[3], vec![Symbol::SubstituteAny(k)]);
        }
    }

    #[test]
    fn covering_end_sentinel() {
        let base = Grammar::for_input(b"a");

        let with_end = base.covering(&CoveringConfig::default());
        let alts = with_end.alternatives("<c1>").unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0], vec![Symbol::End]);
        assert_eq!(alts[1], vec![Symbol::InsertAny, Symbol::End]);

        let without = base.covering(&CoveringConfig {
            insert_at_end: false,
        });
        assert_eq!(without.alternatives("<c1>").unwrap().len(), 1);
    }

    #[test]
    fn covering_copies_start_verbatim() {
        let base = Grammar::for_input(b"ab");
        let cov = base.covering(&CoveringConfig::default());
        assert_eq!(cov.alternatives(START), base.alternatives(START));
    }

    #[test]
    fn dump_is_readable() {
        let base = Grammar::for_input(b"a");
        let cov = base.covering(&CoveringConfig::default());
        let text = cov.dump();

        assert!(text.contains("<c0> → 'a' | <$del[0]> | $. 'a' | <$![0]>"));
        assert!(text.contains("<start> → <c0> <c1>"));
    }
}
