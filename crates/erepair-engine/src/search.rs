//! The bounded multi-edit search loop.
//!
//! Candidates are enumerated smallest-edit-count first: the outer loop
//! grows the number of simultaneous edits `k`, and within each `k` the
//! edit subsets are visited in lexicographic index order.  The first
//! candidate the oracle accepts wins, which approximates Levenshtein
//! minimality under the character-edit bound.

use erepair_grammar::{
    collect_edits, CoveringConfig, Edit, EditApplication, Grammar, START,
};
use erepair_oracle::{CachedOracle, Oracle, OracleStats, Verdict};
use log::{debug, info};

use crate::alphabet::Alphabet;
use crate::generator::{all_applied, generate};
use crate::report::preview;

/// Environment variable overriding the maximum simultaneous edit count.
/// Accepted range `1..=10`; anything else keeps the default of 5.
pub const MAX_EDITS_ENV: &str = "REPAIR_MAX_EDITS";

/// Environment variable overriding the per-selection budget of
/// character-consuming edits.  Accepted range `0..=10`; default 1.
pub const MAX_CHAR_EDITS_ENV: &str = "REPAIR_MAX_CHAR_EDITS";

const MAX_EDITS_DEFAULT: usize = 5;
const MAX_CHAR_EDITS_DEFAULT: usize = 1;

/// Search budgets and the covering-grammar options.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Largest number of edits applied to one candidate.
    pub max_edits: usize,
    /// Largest number of character-consuming edits (insert/substitute)
    /// per selection.  This is the dominant pruning rule: it bounds the
    /// character assignments per combination to `|Σ|^max_char_edits`.
    pub max_char_edits: usize,
    /// Character pool for insert and substitute edits.
    pub alphabet: Alphabet,
    pub covering: CoveringConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_edits: MAX_EDITS_DEFAULT,
            max_char_edits: MAX_CHAR_EDITS_DEFAULT,
            alphabet: Alphabet::printable(),
            covering: CoveringConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Default configuration with the edit budgets taken from the
    /// environment.
    pub fn from_env() -> Self {
        Self {
            max_edits: bounded_from(
                std::env::var(MAX_EDITS_ENV).ok().as_deref(),
                MAX_EDITS_DEFAULT,
                1,
                10,
            ),
            max_char_edits: bounded_from(
                std::env::var(MAX_CHAR_EDITS_ENV).ok().as_deref(),
                MAX_CHAR_EDITS_DEFAULT,
                0,
                10,
            ),
            ..Self::default()
        }
    }
}

fn bounded_from(raw: Option<&str>, default: usize, lo: usize, hi: usize) -> usize {
    match raw {
        None => default,
        Some(text) => match text.parse::<usize>() {
            Ok(v) if (lo..=hi).contains(&v) => v,
            _ => {
                log::warn!("ignoring override {text:?}: expected {lo}..={hi}");
                default
            }
        },
    }
}

/// Result of one repair run.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The first accepted candidate, if any.
    pub repaired: Option<Vec<u8>>,
    /// How many edits the accepted candidate used (0 when the input was
    /// accepted unmodified).
    pub edits_used: usize,
    /// Validator call counters.
    pub stats: OracleStats,
    /// Candidates answered from the query cache.
    pub cache_hits: u64,
}

impl RepairOutcome {
    pub fn is_repaired(&self) -> bool {
        self.repaired.is_some()
    }
}

/// Repairs one input string against a black-box oracle.
pub struct Repairer<O: Oracle> {
    oracle: CachedOracle<O>,
    config: SearchConfig,
}

impl<O: Oracle> Repairer<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, SearchConfig::default())
    }

    pub fn with_config(oracle: O, config: SearchConfig) -> Self {
        Self {
            oracle: CachedOracle::new(oracle),
            config,
        }
    }

    /// Find the first oracle-accepted variant of `input` within the
    /// configured budgets, or report failure.
    pub fn repair(&mut self, input: &[u8]) -> RepairOutcome {
        if self.oracle.ask(input) == Verdict::Ok {
            info!("input accepted unmodified");
            return self.outcome(Some(input.to_vec()), 0);
        }

        let base = Grammar::for_input(input);
        let covering = base.covering(&self.config.covering);
        let edits = collect_edits(&covering);
        let alphabet: Vec<u8> = self.config.alphabet.iter().collect();

        for k in 1..=self.config.max_edits {
            info!(
                "trying {k}-edit repairs over {} edit primitives",
                edits.len()
            );
            if let Some(candidate) = self.search_k(&covering, &edits, &alphabet, k) {
                info!(
                    "repaired with {k} edits after {} oracle runs",
                    self.oracle.stats().total
                );
                return self.outcome(Some(candidate), k);
            }
        }

        info!("no repair within {} edits", self.config.max_edits);
        self.outcome(None, 0)
    }

    /// Enumerate all `k`-subsets of the edit primitives in
    /// lexicographic index order.
    fn search_k(
        &mut self,
        covering: &Grammar,
        edits: &[Edit],
        alphabet: &[u8],
        k: usize,
    ) -> Option<Vec<u8>> {
        let n = edits.len();
        if k > n {
            return None;
        }

        let mut sel: Vec<usize> = (0..k).collect();
        loop {
            if let Some(found) = self.try_selection(covering, edits, alphabet, &sel) {
                return Some(found);
            }
            if !next_combination(&mut sel, n) {
                return None;
            }
        }
    }

    fn try_selection(
        &mut self,
        covering: &Grammar,
        edits: &[Edit],
        alphabet: &[u8],
        sel: &[usize],
    ) -> Option<Vec<u8>> {
        let need = sel
            .iter()
            .filter(|&&i| edits[i].kind.needs_char())
            .count();
        if need > self.config.max_char_edits {
            return None;
        }
        if need == 0 {
            return self.build_and_test(covering, edits, sel, &[]);
        }

        let mut chars = Vec::with_capacity(need);
        self.assign_chars(covering, edits, alphabet, sel, need, &mut chars)
    }

    /// Assign one alphabet byte to each character slot of the
    /// selection, depth-first in alphabet order.
    fn assign_chars(
        &mut self,
        covering: &Grammar,
        edits: &[Edit],
        alphabet: &[u8],
        sel: &[usize],
        need: usize,
        chars: &mut Vec<u8>,
    ) -> Option<Vec<u8>> {
        if chars.len() == need {
            return self.build_and_test(covering, edits, sel, chars);
        }
        for &c in alphabet {
            chars.push(c);
            if let Some(found) =
                self.assign_chars(covering, edits, alphabet, sel, need, chars)
            {
                return Some(found);
            }
            chars.pop();
        }
        None
    }

    fn build_and_test(
        &mut self,
        covering: &Grammar,
        edits: &[Edit],
        sel: &[usize],
        chars: &[u8],
    ) -> Option<Vec<u8>> {
        let mut apps = Vec::with_capacity(sel.len());
        let mut next_char = 0;
        for &i in sel {
            let edit = edits[i].clone();
            if edit.kind.needs_char() {
                apps.push(EditApplication::with_char(edit, chars[next_char]));
                next_char += 1;
            } else {
                apps.push(EditApplication::new(edit));
            }
        }

        let candidate = generate(START, covering, &mut apps);
        // A derivation that leaves a selected edit unused is invalid.
        if !all_applied(&apps) {
            return None;
        }

        match self.oracle.ask(&candidate) {
            Verdict::Ok => Some(candidate),
            verdict => {
                debug!("{verdict:?}: {}", preview(&candidate));
                None
            }
        }
    }

    fn outcome(&self, repaired: Option<Vec<u8>>, edits_used: usize) -> RepairOutcome {
        RepairOutcome {
            repaired,
            edits_used,
            stats: self.oracle.stats(),
            cache_hits: self.oracle.hits(),
        }
    }
}

/// Advance `sel` to the next `k`-combination of `0..n` in lexicographic
/// order.  Returns `false` after the last combination.
fn next_combination(sel: &mut [usize], n: usize) -> bool {
    let k = sel.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if sel[i] != i + n - k {
            sel[i] += 1;
            for j in i + 1..k {
                sel[j] = sel[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use erepair_oracle::FnOracle;
    use std::collections::HashSet;

    /// In-process stand-in for a `^[0-9]{4}-[0-9]{2}-[0-9]{2}$`
    /// validator.
    fn is_date(c: &[u8]) -> bool {
        c.len() == 10
            && c.iter().enumerate().all(|(i, &b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            })
    }

    fn date_oracle() -> FnOracle<impl FnMut(&[u8]) -> Verdict> {
        FnOracle::new(|c: &[u8]| if is_date(c) { Verdict::Ok } else { Verdict::Err })
    }

    #[test]
    fn next_combination_enumerates_all_subsets() {
        let mut sel = vec![0, 1];
        let mut seen = vec![sel.clone()];
        while next_combination(&mut sel, 4) {
            seen.push(sel.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn accepted_input_needs_no_edits() {
        let mut repairer = Repairer::new(date_oracle());
        let outcome = repairer.repair(b"2024-01-15");

        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-15"[..]));
        assert_eq!(outcome.edits_used, 0);
        assert_eq!(outcome.stats.total, 1);
    }

    #[test]
    fn missing_separator_is_inserted() {
        let mut repairer = Repairer::new(date_oracle());
        let outcome = repairer.repair(b"2024-0115");

        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-15"[..]));
        assert_eq!(outcome.edits_used, 1);
    }

    #[test]
    fn doubled_separator_is_deleted() {
        let mut repairer = Repairer::new(date_oracle());
        let outcome = repairer.repair(b"2024--01-15");

        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-15"[..]));
        assert_eq!(outcome.edits_used, 1);
    }

    #[test]
    fn bad_digit_is_substituted() {
        let mut repairer = Repairer::new(date_oracle());
        let outcome = repairer.repair(b"2024-01-1X");

        // '0' is the first digit in alphabet order.
        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-10"[..]));
        assert_eq!(outcome.edits_used, 1);
    }

    #[test]
    fn truncated_input_is_extended_at_the_end() {
        let mut repairer = Repairer::new(date_oracle());
        let outcome = repairer.repair(b"2024-01-1");

        // Insert before the final digit wins over insert-at-end: both
        // yield a date, the former is enumerated first.
        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-01"[..]));
        assert_eq!(outcome.edits_used, 1);
    }

    #[test]
    fn two_inserts_are_pruned_under_the_default_char_budget() {
        let config = SearchConfig {
            max_edits: 2,
            ..SearchConfig::default()
        };
        let mut repairer = Repairer::with_config(date_oracle(), config);
        let outcome = repairer.repair(b"20240115");

        assert!(outcome.repaired.is_none());
    }

    #[test]
    fn two_inserts_succeed_with_a_wider_char_budget() {
        let config = SearchConfig {
            max_edits: 2,
            max_char_edits: 2,
            // Domain knowledge keeps the |Σ|² assignment space small.
            alphabet: Alphabet::restricted(*b"0123456789-"),
            ..SearchConfig::default()
        };
        let mut repairer = Repairer::with_config(date_oracle(), config);
        let outcome = repairer.repair(b"20240115");

        assert_eq!(outcome.repaired.as_deref(), Some(&b"2024-01-15"[..]));
        assert_eq!(outcome.edits_used, 2);
    }

    #[test]
    fn insert_at_end_is_the_only_way_to_append() {
        let accepts_ab_bang = FnOracle::new(|c: &[u8]| {
            if c == b"ab!" {
                Verdict::Ok
            } else {
                Verdict::Err
            }
        });
        let mut repairer = Repairer::new(accepts_ab_bang);
        let outcome = repairer.repair(b"ab");
        assert_eq!(outcome.repaired.as_deref(), Some(&b"ab!"[..]));

        // With the end-insert alternative disabled the target is
        // unreachable at any edit count.
        let accepts_ab_bang = FnOracle::new(|c: &[u8]| {
            if c == b"ab!" {
                Verdict::Ok
            } else {
                Verdict::Err
            }
        });
        let config = SearchConfig {
            covering: CoveringConfig {
                insert_at_end: false,
            },
            ..SearchConfig::default()
        };
        let mut repairer = Repairer::with_config(accepts_ab_bang, config);
        assert!(repairer.repair(b"ab").repaired.is_none());
    }

    #[test]
    fn smaller_edit_counts_win() {
        // Both "a" (one delete) and "" (two deletes) are accepted; the
        // one-edit repair must be returned.
        let oracle = FnOracle::new(|c: &[u8]| {
            if c == b"a" || c == b"" {
                Verdict::Ok
            } else {
                Verdict::Err
            }
        });
        let mut repairer = Repairer::new(oracle);
        let outcome = repairer.repair(b"ab");

        assert_eq!(outcome.repaired.as_deref(), Some(&b"a"[..]));
        assert_eq!(outcome.edits_used, 1);
    }

    #[test]
    fn duplicate_candidates_reach_the_oracle_once() {
        let mut seen = HashSet::new();
        let oracle = FnOracle::new(move |c: &[u8]| {
            assert!(
                seen.insert(c.to_vec()),
                "candidate submitted twice: {:?}",
                String::from_utf8_lossy(c)
            );
            Verdict::Err
        });

        // "aaa" produces many colliding variants (deleting any of the
        // three a's yields "aa").
        let config = SearchConfig {
            max_edits: 2,
            alphabet: Alphabet::restricted(*b"ab"),
            ..SearchConfig::default()
        };
        let mut repairer = Repairer::with_config(oracle, config);
        let outcome = repairer.repair(b"aaa");

        assert!(outcome.repaired.is_none());
        assert!(outcome.cache_hits > 0);
    }

    #[test]
    fn repeated_runs_return_the_same_candidate() {
        let run = || {
            let mut repairer = Repairer::new(date_oracle());
            repairer.repair(b"2024-01-1X").repaired
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn env_override_parsing() {
        assert_eq!(bounded_from(None, 5, 1, 10), 5);
        assert_eq!(bounded_from(Some("3"), 5, 1, 10), 3);
        assert_eq!(bounded_from(Some("10"), 5, 1, 10), 10);
        assert_eq!(bounded_from(Some("0"), 5, 1, 10), 5);
        assert_eq!(bounded_from(Some("11"), 5, 1, 10), 5);
        assert_eq!(bounded_from(Some("many"), 5, 1, 10), 5);
        assert_eq!(bounded_from(Some("0"), 1, 0, 10), 0);
    }

    #[test]
    fn empty_input_can_grow() {
        let oracle = FnOracle::new(|c: &[u8]| {
            if c == b"x" {
                Verdict::Ok
            } else {
                Verdict::Err
            }
        });
        let mut repairer = Repairer::new(oracle);
        let outcome = repairer.repair(b"");
        assert_eq!(outcome.repaired.as_deref(), Some(&b"x"[..]));
        assert_eq!(outcome.edits_used, 1);
    }
}
