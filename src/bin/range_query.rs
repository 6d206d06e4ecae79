use std::io;
use std::process::ExitCode;

use clap::Parser;

use rank_tree::runner::{self, Backend, Mode};

/// Stream range-count tool.
///
/// Reads whitespace-separated commands from stdin: `k <key>` inserts a key,
/// `q <lower> <upper>` writes the count of stored keys in (lower, upper].
/// Unrecognized tokens are ignored.
#[derive(Parser)]
#[command(name = "range-query", version, about)]
struct Args {
    /// Accumulate per-operation wall-clock time and print one total duration
    /// instead of per-query counts.
    #[arg(long)]
    benchmark: bool,

    /// Answer the stream from a standard-library BTreeSet baseline instead
    /// of the order-statistic tree.
    #[arg(long)]
    reference: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let backend = if args.reference { Backend::Reference } else { Backend::Tree };
    let mode = if args.benchmark { Mode::Benchmark } else { Mode::Report };

    match runner::run(io::stdin().lock(), io::stdout().lock(), backend, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("range-query: {err}");
            ExitCode::FAILURE
        }
    }
}
