//! The observation table `(P, S, T)`.
//!
//! Rows are access prefixes `P` (plus their one-symbol extensions
//! `P·A`), columns are distinguishing suffixes `S`, and each cell holds
//! the membership bit of `row + column`.  A row's *signature* — its 0/1
//! pattern across `S` — identifies a hypothesis state.

use std::collections::BTreeMap;

use crate::dfa::Dfa;
use crate::samples::Membership;

pub struct ObservationTable {
    alphabet: Vec<char>,
    /// Access prefixes, in insertion order.
    prefixes: Vec<String>,
    /// Distinguishing suffixes, in insertion order.
    suffixes: Vec<String>,
    /// `row -> suffix -> membership(row + suffix)`.
    cells: BTreeMap<String, BTreeMap<String, bool>>,
}

impl ObservationTable {
    /// A fresh table over `alphabet`, with `P = S = {ε}`.  Call
    /// [`init`](Self::init) before anything else.
    pub fn new(alphabet: Vec<char>) -> Self {
        Self {
            alphabet,
            prefixes: vec![String::new()],
            suffixes: vec![String::new()],
            cells: BTreeMap::new(),
        }
    }

    /// Populate the initial cells.
    pub fn init<M: Membership>(&mut self, membership: &mut M) {
        self.fill(membership);
    }

    /// Query every missing cell of `P ∪ P·A` against `S`.
    fn fill<M: Membership>(&mut self, membership: &mut M) {
        let mut rows = self.prefixes.clone();
        for p in &self.prefixes {
            for &a in &self.alphabet {
                let mut row = p.clone();
                row.push(a);
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
        }

        for row in rows {
            let cells = self.cells.entry(row.clone()).or_default();
            for s in &self.suffixes {
                if !cells.contains_key(s) {
                    let word = format!("{row}{s}");
                    cells.insert(s.clone(), membership.is_member(&word));
                }
            }
        }
    }

    /// Add an access prefix and refresh the table.
    pub fn add_prefix<M: Membership>(&mut self, prefix: &str, membership: &mut M) {
        if self.prefixes.iter().any(|p| p == prefix) {
            return;
        }
        self.prefixes.push(prefix.to_string());
        self.fill(membership);
    }

    /// Add a distinguishing suffix and refresh the table.
    pub fn add_suffix<M: Membership>(&mut self, suffix: &str, membership: &mut M) {
        if self.suffixes.iter().any(|s| s == suffix) {
            return;
        }
        self.suffixes.push(suffix.to_string());
        self.fill(membership);
    }

    /// A row of `P·A` whose signature matches no row of `P`, if any.
    /// The table is *closed* when there is none.
    pub fn unclosed_row(&self) -> Option<String> {
        let known: Vec<String> = self.prefixes.iter().map(|p| self.signature(p)).collect();

        for p in &self.prefixes {
            for &a in &self.alphabet {
                let t = format!("{p}{a}");
                if !known.contains(&self.signature(&t)) {
                    return Some(t);
                }
            }
        }
        None
    }

    /// A suffix `a·s` separating two same-signature prefixes whose
    /// successors differ, if any.  The table is *consistent* when there
    /// is none.
    pub fn inconsistency(&self) -> Option<String> {
        for (i, p1) in self.prefixes.iter().enumerate() {
            for p2 in self.prefixes.iter().skip(i + 1) {
                if self.signature(p1) != self.signature(p2) {
                    continue;
                }
                for &a in &self.alphabet {
                    let r1 = format!("{p1}{a}");
                    let r2 = format!("{p2}{a}");
                    for s in &self.suffixes {
                        if self.cell(&r1, s) != self.cell(&r2, s) {
                            return Some(format!("{a}{s}"));
                        }
                    }
                }
            }
        }
        None
    }

    /// The 0/1 membership pattern of `row` across `S`, e.g. `"<0101>"`.
    pub fn signature(&self, row: &str) -> String {
        let mut id = String::with_capacity(self.suffixes.len() + 2);
        id.push('<');
        for s in &self.suffixes {
            id.push(if self.cell(row, s) { '1' } else { '0' });
        }
        id.push('>');
        id
    }

    fn cell(&self, row: &str, suffix: &str) -> bool {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(suffix))
            .copied()
            .unwrap_or(false)
    }

    /// Extract the hypothesis DFA: one state per distinct signature of
    /// `P`, represented by the first prefix carrying it.
    pub fn to_dfa(&self) -> Dfa {
        let mut representative: BTreeMap<String, &str> = BTreeMap::new();
        for p in &self.prefixes {
            representative.entry(self.signature(p)).or_insert(p);
        }

        let mut dfa = Dfa::default();
        dfa.set_start(self.signature(""));
        for (state, &p) in &representative {
            dfa.add_state(state.clone(), self.cell(p, ""));
        }
        for (state, &p) in &representative {
            for &a in &self.alphabet {
                let to = self.signature(&format!("{p}{a}"));
                dfa.add_transition(state.clone(), a, to);
            }
        }
        dfa
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}
