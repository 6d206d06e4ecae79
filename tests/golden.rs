//! File-based golden tests: every `tests/data/*.in` stream is replayed
//! through the interpreter and compared, whitespace-normalized, against its
//! `.out` twin.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rank_tree::runner::{Backend, Mode, run};

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn replay(input: &str, backend: Backend) -> String {
    let mut output = Vec::new();
    run(input.as_bytes(), &mut output, backend, Mode::Report).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn golden_fixtures() {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data");

    let mut cases: Vec<_> = fs::read_dir(&data)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "in"))
        .collect();
    cases.sort();
    assert!(!cases.is_empty(), "no golden fixtures under {}", data.display());

    for input_path in cases {
        let expected_path = input_path.with_extension("out");
        let input = fs::read_to_string(&input_path).unwrap();
        let expected = fs::read_to_string(&expected_path).unwrap();

        let got = replay(&input, Backend::Tree);
        assert_eq!(normalize(&got), normalize(&expected), "golden mismatch for {}", input_path.display());

        // The baseline backend must produce the same stream byte for byte.
        let reference = replay(&input, Backend::Reference);
        assert_eq!(reference, got, "backend divergence for {}", input_path.display());
    }
}
