//! The L\* loop: keep the table closed and consistent, extract a
//! hypothesis, refine on counterexamples until the labeled sets agree.

use log::{debug, info};

use crate::dfa::Dfa;
use crate::samples::{Membership, Samples};
use crate::table::ObservationTable;

/// Learn a DFA for the language described by `samples`, asking
/// `membership` for labels.
///
/// The table is seeded with every prefix of every positive example,
/// biasing early hypotheses toward the accepted words.  Equivalence is
/// approximate: the loop stops when the hypothesis classifies every
/// labeled example correctly.
pub fn learn<M: Membership>(
    alphabet: Vec<char>,
    membership: &mut M,
    samples: &Samples,
) -> Dfa {
    let mut table = ObservationTable::new(alphabet);
    table.init(membership);

    for word in &samples.positives {
        for prefix in prefixes_of(word) {
            table.add_prefix(&prefix, membership);
        }
    }

    loop {
        repair_table(&mut table, membership);

        let hypothesis = table.to_dfa();
        debug!(
            "hypothesis: {} states over |P|={} |S|={}",
            hypothesis.states().len(),
            table.prefixes().len(),
            table.suffixes().len()
        );

        match samples.counterexample(&hypothesis) {
            None => {
                info!(
                    "learned {}-state DFA ({} prefixes, {} suffixes)",
                    hypothesis.states().len(),
                    table.prefixes().len(),
                    table.suffixes().len()
                );
                return hypothesis;
            }
            Some(cex) => {
                debug!("counterexample: {cex:?}");
                let cex = cex.to_string();
                for prefix in prefixes_of(&cex) {
                    table.add_prefix(&prefix, membership);
                }
            }
        }
    }
}

/// Restore closedness and consistency, re-checking after every
/// mutation.
fn repair_table<M: Membership>(table: &mut ObservationTable, membership: &mut M) {
    loop {
        if let Some(row) = table.unclosed_row() {
            table.add_prefix(&row, membership);
            continue;
        }
        if let Some(suffix) = table.inconsistency() {
            table.add_suffix(&suffix, membership);
            continue;
        }
        return;
    }
}

/// All nonempty prefixes of `word`, shortest first.
fn prefixes_of(word: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut prefix = String::new();
    for c in word.chars() {
        prefix.push(c);
        out.push(prefix.clone());
    }
    out
}
