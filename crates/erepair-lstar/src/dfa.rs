//! The hypothesis automaton and its exported forms.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;

/// A DFA whose states are observation-table row signatures such as
/// `"<0101>"`.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    start: String,
    states: BTreeSet<String>,
    accepting: BTreeSet<String>,
    transitions: BTreeMap<String, BTreeMap<char, String>>,
}

impl Dfa {
    pub fn set_start(&mut self, state: impl Into<String>) {
        let state = state.into();
        self.states.insert(state.clone());
        self.start = state;
    }

    pub fn add_state(&mut self, state: impl Into<String>, accepting: bool) {
        let state = state.into();
        if accepting {
            self.accepting.insert(state.clone());
        }
        self.states.insert(state);
    }

    pub fn add_transition(
        &mut self,
        from: impl Into<String>,
        symbol: char,
        to: impl Into<String>,
    ) {
        let from = from.into();
        let to = to.into();
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.transitions.entry(from).or_default().insert(symbol, to);
    }

    /// Run the automaton over `word`.  Missing transitions reject.
    pub fn accepts(&self, word: &str) -> bool {
        if self.start.is_empty() {
            return false;
        }
        let mut current = &self.start;
        for c in word.chars() {
            match self.transitions.get(current).and_then(|m| m.get(&c)) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.accepting.contains(current)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn accepting(&self) -> &BTreeSet<String> {
        &self.accepting
    }

    /// Render as a Graphviz digraph, accepting states double-circled.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph DFA {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=circle];\n");
        out.push_str("  __start [shape=point];\n");
        if !self.start.is_empty() {
            let _ = writeln!(out, "  __start -> \"{}\";", escape(&self.start));
        }

        for state in &self.states {
            let shape = if self.accepting.contains(state) {
                "doublecircle"
            } else {
                "circle"
            };
            let _ = writeln!(out, "  \"{}\" [shape={shape}];", escape(state));
        }
        for (from, edges) in &self.transitions {
            for (symbol, to) in edges {
                let _ = writeln!(
                    out,
                    "  \"{}\" -> \"{}\" [label=\"{}\"];",
                    escape(from),
                    escape(to),
                    escape_label(*symbol)
                );
            }
        }
        out.push_str("}\n");
        out
    }

    /// Export as a right-linear grammar: per state one rule, with a
    /// `[symbol, next_state]` production per transition and `[]`
    /// (epsilon) at accepting states.
    pub fn to_right_linear(&self, alphabet: &[char]) -> RightLinearGrammar {
        let mut grammar = BTreeMap::new();
        for state in &self.states {
            let mut productions: Vec<Vec<String>> = Vec::new();
            if let Some(edges) = self.transitions.get(state) {
                for (symbol, to) in edges {
                    productions.push(vec![symbol.to_string(), to.clone()]);
                }
            }
            if self.accepting.contains(state) {
                productions.push(Vec::new());
            }
            grammar.insert(state.clone(), productions);
        }

        RightLinearGrammar {
            start_sym: self.start.clone(),
            alphabet: alphabet.iter().map(|c| c.to_string()).collect(),
            grammar,
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_label(c: char) -> String {
    match c {
        '"' => "\\\"".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

/// The JSON form of a learned automaton.
#[derive(Debug, Clone, Serialize)]
pub struct RightLinearGrammar {
    pub start_sym: String,
    pub alphabet: Vec<String>,
    pub grammar: BTreeMap<String, Vec<Vec<String>>>,
}

impl RightLinearGrammar {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Even number of a's: two states, "<1>" accepting.
    fn parity_dfa() -> Dfa {
        let mut dfa = Dfa::default();
        dfa.set_start("<1>");
        dfa.add_state("<1>", true);
        dfa.add_state("<0>", false);
        dfa.add_transition("<1>", 'a', "<0>");
        dfa.add_transition("<0>", 'a', "<1>");
        dfa
    }

    #[test]
    fn accepts_follows_transitions() {
        let dfa = parity_dfa();
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("aa"));
        assert!(dfa.accepts("aaaa"));
        assert!(!dfa.accepts("a"));
        assert!(!dfa.accepts("aaa"));
    }

    #[test]
    fn missing_transitions_reject() {
        let dfa = parity_dfa();
        assert!(!dfa.accepts("b"));
        assert!(!dfa.accepts("ab"));
    }

    #[test]
    fn empty_dfa_rejects_everything() {
        let dfa = Dfa::default();
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("a"));
    }

    #[test]
    fn dot_marks_start_and_accepting() {
        let dot = parity_dfa().to_dot();
        assert!(dot.starts_with("digraph DFA {"));
        assert!(dot.contains("__start -> \"<1>\";"));
        assert!(dot.contains("\"<1>\" [shape=doublecircle];"));
        assert!(dot.contains("\"<0>\" [shape=circle];"));
        assert!(dot.contains("\"<1>\" -> \"<0>\" [label=\"a\"];"));
    }

    #[test]
    fn right_linear_grammar_shape() {
        let grammar = parity_dfa().to_right_linear(&['a']);
        assert_eq!(grammar.start_sym, "<1>");
        assert_eq!(grammar.alphabet, vec!["a".to_string()]);

        // Accepting state: transition plus epsilon.
        let start_rules = &grammar.grammar["<1>"];
        assert!(start_rules.contains(&vec!["a".to_string(), "<0>".to_string()]));
        assert!(start_rules.contains(&Vec::new()));

        // Non-accepting state: transition only.
        let other_rules = &grammar.grammar["<0>"];
        assert_eq!(other_rules.len(), 1);
    }

    #[test]
    fn json_is_well_formed() {
        let json = parity_dfa().to_right_linear(&['a']).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["start_sym"], "<1>");
        assert_eq!(value["alphabet"][0], "a");
        assert!(value["grammar"]["<1>"].is_array());
    }
}
