//! Stream interpreter for the `k`/`q` command protocol.
//!
//! The interpreter reads whitespace-separated tokens from an input stream:
//! `k <key>` inserts a key, `q <lower> <upper>` counts the stored keys in
//! `(lower, upper]` and, in [`Mode::Report`], writes the count followed by a
//! single space. Unrecognized tokens are skipped. End of input ends the loop
//! and a final newline is written.
//!
//! [`Mode::Benchmark`] accumulates per-operation wall-clock time instead and
//! writes one total duration in milliseconds. [`Backend::Reference`] answers
//! the same protocol from a standard-library [`BTreeSet`] with a linear range
//! scan, as a correctness and performance baseline.
//!
//! The tree itself never inspects the stream: a malformed operand is the
//! interpreter's failure, surfaced as a [`RunnerError`].

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::io::{self, Read, Write};
use std::num::ParseIntError;
use std::ops::Bound;
use std::time::{Duration, Instant};

use crate::RankSet;

/// Which structure answers the stream's operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Backend {
    /// The crate's order-statistic tree.
    Tree,
    /// A `std::collections::BTreeSet` baseline that scans the range.
    Reference,
}

/// How results leave the interpreter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Write each query's count, followed by a space.
    Report,
    /// Accumulate per-operation wall-clock time and write one total.
    Benchmark,
}

/// A failure surfaced by the interpreter.
#[derive(Debug)]
pub enum RunnerError {
    /// The input or output stream failed.
    Io(io::Error),
    /// An operation code arrived without its operand.
    MissingOperand {
        /// The operation code that was cut short.
        op: char,
    },
    /// An operand token did not parse as an integer.
    BadOperand {
        /// The operation code the operand belongs to.
        op: char,
        /// The offending token.
        token: String,
        /// The parse failure.
        source: ParseIntError,
    },
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(source) => write!(f, "stream failure: {source}"),
            Self::MissingOperand { op } => write!(f, "missing operand after `{op}`"),
            Self::BadOperand { op, token, .. } => {
                write!(f, "bad operand `{token}` after `{op}`")
            }
        }
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            Self::BadOperand { source, .. } => Some(source),
            Self::MissingOperand { .. } => None,
        }
    }
}

impl From<io::Error> for RunnerError {
    fn from(source: io::Error) -> Self {
        Self::Io(source)
    }
}

/// The two operations a backend must answer. Both backends count the same
/// half-open interval `(lower, upper]` so their outputs are interchangeable.
trait RangeStore {
    fn insert(&mut self, key: i64);
    fn range_count(&self, lower: i64, upper: i64) -> usize;
}

impl RangeStore for RankSet<i64> {
    fn insert(&mut self, key: i64) {
        RankSet::insert(self, key);
    }

    fn range_count(&self, lower: i64, upper: i64) -> usize {
        RankSet::range_count(self, &lower, &upper)
    }
}

impl RangeStore for BTreeSet<i64> {
    fn insert(&mut self, key: i64) {
        BTreeSet::insert(self, key);
    }

    fn range_count(&self, lower: i64, upper: i64) -> usize {
        if lower >= upper {
            return 0;
        }
        self.range((Bound::Excluded(lower), Bound::Included(upper))).count()
    }
}

/// Drives the command stream from `input` against the chosen backend,
/// writing results to `output` per `mode`.
///
/// # Errors
///
/// Returns a [`RunnerError`] when a stream fails or an operand is missing or
/// malformed. Keys inserted before the failure stay applied; the error
/// carries enough context for the caller to report and exit non-zero.
///
/// # Examples
///
/// ```
/// use rank_tree::runner::{run, Backend, Mode};
///
/// let input = "k 10 k 20 k 30 q 10 30";
/// let mut output = Vec::new();
/// run(input.as_bytes(), &mut output, Backend::Tree, Mode::Report).unwrap();
/// assert_eq!(output, b"2 \n");
/// ```
pub fn run<R: Read, W: Write>(input: R, output: W, backend: Backend, mode: Mode) -> Result<(), RunnerError> {
    match backend {
        Backend::Tree => drive(RankSet::new(), input, output, mode),
        Backend::Reference => drive(BTreeSet::new(), input, output, mode),
    }
}

fn drive<S: RangeStore, R: Read, W: Write>(
    mut store: S,
    mut input: R,
    mut output: W,
    mode: Mode,
) -> Result<(), RunnerError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let mut elapsed = Duration::ZERO;
    let mut tokens = text.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "k" => {
                let key = operand('k', tokens.next())?;
                match mode {
                    Mode::Report => store.insert(key),
                    Mode::Benchmark => {
                        let start = Instant::now();
                        store.insert(key);
                        elapsed += start.elapsed();
                    }
                }
            }
            "q" => {
                let lower = operand('q', tokens.next())?;
                let upper = operand('q', tokens.next())?;
                match mode {
                    Mode::Report => {
                        let count = store.range_count(lower, upper);
                        write!(output, "{count} ")?;
                    }
                    Mode::Benchmark => {
                        let start = Instant::now();
                        std::hint::black_box(store.range_count(lower, upper));
                        elapsed += start.elapsed();
                    }
                }
            }
            _ => {}
        }
    }

    match mode {
        Mode::Report => writeln!(output)?,
        Mode::Benchmark => writeln!(output, "{} ms", elapsed.as_millis())?,
    }
    Ok(())
}

fn operand(op: char, token: Option<&str>) -> Result<i64, RunnerError> {
    let token = token.ok_or(RunnerError::MissingOperand { op })?;
    token.parse().map_err(|source| RunnerError::BadOperand {
        op,
        token: token.to_owned(),
        source,
    })
}
