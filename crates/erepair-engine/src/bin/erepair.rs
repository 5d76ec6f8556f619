//! CLI binary for the repair engine.
//!
//! Repairs one input string so that an external validator accepts it,
//! by bounded single-character edit search.
//!
//! # Usage
//!
//! ```bash
//! # Repair a literal string
//! erepair ./validate_date 2024-0115 repaired.txt
//!
//! # Repair a file's contents
//! erepair ./validate_ini broken.ini repaired.ini
//!
//! # Use a persistent validator server for the "Date" category
//! erepair re2-server:Date 2024-0115 repaired.txt
//! ```
//!
//! Exit code 0 on successful repair, 1 when the search exhausts its
//! edit budget, 2 on usage errors.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use erepair_engine::{
    write_summary, Alphabet, RepairOutcome, RepairSummary, Repairer, SearchConfig,
};
use erepair_grammar::Grammar;
use erepair_oracle::{
    CommandOracle, Delivery, Oracle, OracleConfig, ServerOracle,
};

/// Program looked up on `PATH` for `re2-server:<Category>` validator
/// specs.
const SERVER_PROGRAM: &str = "re2-server";

#[derive(Parser)]
#[command(name = "erepair")]
#[command(about = "Repair a string against a black-box accept/reject validator")]
#[command(version)]
struct Cli {
    /// Validator executable, or `re2-server:<Category>` to query a
    /// persistent validator server.
    validator: String,

    /// Input string, or path to a file whose bytes are loaded.
    input: String,

    /// File the repaired bytes are written to.
    output: PathBuf,

    /// Print the covering grammar before searching.
    #[arg(long)]
    dump_grammar: bool,

    /// Restrict insert/substitute characters to this set.
    #[arg(long)]
    alphabet: Option<String>,

    /// Pipe candidates to the validator's stdin instead of passing a
    /// temp-file path.
    #[arg(long)]
    stdin_delivery: bool,

    /// Disable the insert-at-end alternative (truncated inputs can then
    /// no longer be repaired by appending).
    #[arg(long)]
    no_end_insert: bool,

    /// Also write a JSON summary of the run to this file.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let oracle: Box<dyn Oracle> = match build_oracle(&cli) {
        Ok(oracle) => oracle,
        Err(message) => {
            eprintln!("Error: {message}");
            return 2;
        }
    };

    let input = load_input(&cli.input);

    let mut config = SearchConfig::from_env();
    if let Some(chars) = &cli.alphabet {
        config.alphabet = Alphabet::restricted(chars.bytes());
    }
    if cli.no_end_insert {
        config.covering.insert_at_end = false;
    }
    let max_edits = config.max_edits;

    if cli.dump_grammar {
        let covering = Grammar::for_input(&input).covering(&config.covering);
        eprintln!("Covering Grammar:");
        eprint!("{}", covering.dump());
    }

    let mut repairer = Repairer::with_config(oracle, config);
    let outcome = repairer.repair(&input);

    let code = match &outcome.repaired {
        Some(candidate) => {
            if let Err(e) = fs::write(&cli.output, candidate) {
                eprintln!("Error: failed to write {}: {e}", cli.output.display());
                return 2;
            }
            println!("Repaired string: {}", String::from_utf8_lossy(candidate));
            0
        }
        None => {
            println!("No fix with up to {max_edits} edits found.");
            1
        }
    };
    println!("{}", outcome.stats.summary());

    if let Some(path) = &cli.summary {
        save_summary(&outcome, path);
    }

    code
}

fn build_oracle(cli: &Cli) -> Result<Box<dyn Oracle>, String> {
    if let Some(category) = cli.validator.strip_prefix("re2-server:") {
        if category.is_empty() {
            return Err("empty category in re2-server spec".to_string());
        }
        let oracle = ServerOracle::spawn(
            SERVER_PROGRAM,
            &[category],
            OracleConfig::server_from_env(),
        )
        .map_err(|e| e.to_string())?;
        return Ok(Box::new(oracle));
    }

    let path = Path::new(&cli.validator);
    if !is_executable(path) {
        return Err(format!(
            "validator not found or not executable: {}",
            cli.validator
        ));
    }

    let mut config = OracleConfig::from_env();
    if cli.stdin_delivery {
        config.delivery = Delivery::Stdin;
    }
    Ok(Box::new(CommandOracle::with_config(path, config)))
}

/// The input argument is a file path when it names a readable file,
/// a literal string otherwise.
fn load_input(arg: &str) -> Vec<u8> {
    fs::read(arg).unwrap_or_else(|_| arg.as_bytes().to_vec())
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn save_summary(outcome: &RepairOutcome, path: &Path) {
    let summary = RepairSummary::from_outcome(outcome);
    if let Err(e) = write_summary(&summary, path) {
        eprintln!("Warning: failed to save summary: {e}");
    } else {
        eprintln!("Saved summary to: {}", path.display());
    }
}
