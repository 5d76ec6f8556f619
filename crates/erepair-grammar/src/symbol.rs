//! Grammar symbols — the shared vocabulary of base and covering grammars.

use std::fmt;

/// A grammar symbol.
///
/// Edit markers are modeled as dedicated variants rather than encoded
/// token strings, so the generator dispatches on the tag instead of
/// parsing names.  The `tag` of [`Symbol::Delete`] and
/// [`Symbol::SubstituteAny`] is the character-slot position; it keeps
/// edits at different occurrences of the same byte distinct (deleting
/// the 3rd `a` of `"aaa"` is not the same edit as deleting the 1st).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A named category, e.g. the slot for the k-th input byte.
    Nonterminal(String),
    /// A single input byte.
    Terminal(u8),
    /// Logical end of input.  Generates nothing.
    End,
    /// Insertion wildcard: emits one byte supplied by the active edit.
    InsertAny,
    /// Deletion marker for the slot tagged `tag`.  Generates nothing.
    Delete(usize),
    /// Substitution wildcard for the slot tagged `tag`: emits one byte
    /// supplied by the active edit.
    SubstituteAny(usize),
}

impl Symbol {
    /// The nonterminal for the k-th character slot.
    pub fn slot(k: usize) -> Self {
        Symbol::Nonterminal(slot_name(k))
    }

    /// Whether this symbol is a nonterminal.
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }
}

/// Name of the k-th character-slot nonterminal.
pub fn slot_name(k: usize) -> String {
    format!("<c{k}>")
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Nonterminal(name) => write!(f, "{name}"),
            Symbol::Terminal(b) => {
                if b.is_ascii_graphic() || *b == b' ' {
                    write!(f, "'{}'", *b as char)
                } else {
                    write!(f, "'\\x{b:02X}'")
                }
            }
            Symbol::End => write!(f, "⊥"),
            Symbol::InsertAny => write!(f, "$."),
            Symbol::Delete(tag) => write!(f, "<$del[{tag}]>"),
            Symbol::SubstituteAny(tag) => write!(f, "<$![{tag}]>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_are_position_unique() {
        assert_eq!(Symbol::slot(0), Symbol::Nonterminal("<c0>".to_string()));
        assert_ne!(Symbol::slot(1), Symbol::slot(11));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Symbol::Terminal(b'a').to_string(), "'a'");
        assert_eq!(Symbol::Terminal(b'\n').to_string(), "'\\x0A'");
        assert_eq!(Symbol::InsertAny.to_string(), "$.");
        assert_eq!(Symbol::Delete(3).to_string(), "<$del[3]>");
        assert_eq!(Symbol::SubstituteAny(7).to_string(), "<$![7]>");
    }

    #[test]
    fn markers_with_different_tags_differ() {
        assert_ne!(Symbol::Delete(0), Symbol::Delete(1));
        assert_ne!(Symbol::SubstituteAny(0), Symbol::SubstituteAny(1));
    }
}
