//! Candidate materialization: derive one variant string from the
//! covering grammar under a set of edit applications.

use erepair_grammar::{EditApplication, Grammar, Symbol};

/// Generate the byte string derived from `start` under `apps`.
///
/// The walk carries an *active edit*: while `None`, the first unapplied
/// edit targeting the visited nonterminal is activated and its
/// production expanded; inside an active edit subtree only the first
/// (match) alternative is ever taken, so edits cannot nest.  Insert and
/// substitute wildcards emit the active edit's byte exactly once and
/// are inert everywhere else.
///
/// Deterministic given `(covering, apps)`.  Callers must discard the
/// result if any application is left unapplied — see [`all_applied`].
pub fn generate(start: &str, covering: &Grammar, apps: &mut [EditApplication]) -> Vec<u8> {
    let mut out = Vec::new();
    expand(start, covering, apps, None, &mut out);
    out
}

/// Whether every selected edit was consumed by the derivation.
pub fn all_applied(apps: &[EditApplication]) -> bool {
    apps.iter().all(|a| a.applied)
}

fn expand(
    name: &str,
    covering: &Grammar,
    apps: &mut [EditApplication],
    active: Option<usize>,
    out: &mut Vec<u8>,
) {
    if active.is_none() {
        if let Some(i) = apps
            .iter()
            .position(|a| !a.applied && a.edit.target == name)
        {
            apps[i].applied = true;
            let production = apps[i].edit.production.clone();
            for sym in &production {
                walk(sym, covering, apps, Some(i), out);
            }
            return;
        }
    }

    // Default expansion: the first alternative is the match branch.
    if let Some(alts) = covering.alternatives(name) {
        let first = alts[0].clone();
        for sym in &first {
            walk(sym, covering, apps, active, out);
        }
    }
}

fn walk(
    sym: &Symbol,
    covering: &Grammar,
    apps: &mut [EditApplication],
    active: Option<usize>,
    out: &mut Vec<u8>,
) {
    match sym {
        Symbol::End | Symbol::Delete(_) => {}
        Symbol::Terminal(b) => out.push(*b),
        Symbol::InsertAny | Symbol::SubstituteAny(_) => {
            if let Some(i) = active {
                let app = &mut apps[i];
                if let (Some(ch), false) = (app.ch, app.char_used) {
                    app.char_used = true;
                    out.push(ch);
                }
            }
        }
        Symbol::Nonterminal(name) => expand(name, covering, apps, active, out),
    }
}
