//! CLI binary for the L\* learner.
//!
//! Infers a DFA for a target language from labeled example files and
//! emits it as a right-linear grammar (JSON) and optionally as
//! Graphviz DOT.
//!
//! # Usage
//!
//! ```bash
//! # Learn from the labeled sets alone
//! erepair-lstar --positives pos.txt --negatives neg.txt --category Date
//!
//! # Answer membership queries with a real validator
//! erepair-lstar --positives pos.txt --negatives neg.txt --category Date \
//!     --oracle-validator ./validate_date --output-grammar date.json
//! ```

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use erepair_lstar::{learn, DatasetMembership, Samples, ValidatorMembership};

#[derive(Parser)]
#[command(name = "erepair-lstar")]
#[command(about = "Learn a DFA for a validator's language from labeled examples")]
#[command(version)]
struct Cli {
    /// File of accepted examples, one per line (an empty line denotes
    /// the empty string).
    #[arg(long)]
    positives: PathBuf,

    /// File of rejected examples, one per line.
    #[arg(long)]
    negatives: PathBuf,

    /// Name of the target language, for logs.
    #[arg(long)]
    category: String,

    /// Write the right-linear grammar JSON here instead of stdout.
    #[arg(long)]
    output_grammar: Option<PathBuf>,

    /// Also write a Graphviz DOT rendering of the DFA.
    #[arg(long)]
    output_dot: Option<PathBuf>,

    /// Answer membership queries with this validator executable instead
    /// of the labeled sets.
    #[arg(long)]
    oracle_validator: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let samples = match Samples::from_files(&cli.positives, &cli.negatives) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error: failed to load examples: {e}");
            return 2;
        }
    };
    let alphabet = samples.infer_alphabet();

    info!(
        "learning {}: {} positives, {} negatives, alphabet of {}",
        cli.category,
        samples.positives.len(),
        samples.negatives.len(),
        alphabet.len()
    );

    let dfa = match &cli.oracle_validator {
        Some(validator) => {
            let mut membership = ValidatorMembership::new(validator);
            let dfa = learn(alphabet.clone(), &mut membership, &samples);
            info!("{} validator runs", membership.queries());
            dfa
        }
        None => {
            let mut membership = DatasetMembership::new(&samples);
            learn(alphabet.clone(), &mut membership, &samples)
        }
    };

    if let Some(path) = &cli.output_dot {
        if let Err(e) = fs::write(path, dfa.to_dot()) {
            eprintln!("Error: failed to write {}: {e}", path.display());
            return 2;
        }
        eprintln!("Saved DOT to: {}", path.display());
    }

    let json = match dfa.to_right_linear(&alphabet).to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize grammar: {e}");
            return 2;
        }
    };
    match &cli.output_grammar {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error: failed to write {}: {e}", path.display());
                return 2;
            }
            eprintln!("Saved grammar to: {}", path.display());
        }
        None => println!("{json}"),
    }

    0
}
