//! Integration tests: run the coproduct test vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: tree notation, symmetry mode, semiring name
//! - expect.json: canonical info, cut count, and every merged term with its
//!   rendered coefficient (or the expected error kind)

use cotree_kernel::{
    CotreeError, Delta, DeltaMode, DeltaOptions, Integer, Natural, Rationals, Semiring, Tree,
    canonicalize, cut_count, delta,
};
use serde_json::{Map, Value, json};
use std::fmt::Display;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn error_kind(e: &CotreeError) -> &'static str {
    match e {
        CotreeError::ZeroDenominator { .. } => "zero_denominator",
        CotreeError::DivisionByZero { .. } => "division_by_zero",
        CotreeError::MissingSymmetryContext => "missing_symmetry_context",
        CotreeError::InexactDivision { .. } => "inexact_division",
        CotreeError::Parse { .. } => "parse",
    }
}

fn run_case<S>(tree: &Tree<String>, semiring: &S, mode: DeltaMode) -> Result<Value, CotreeError>
where
    S: Semiring,
    S::Elem: Display,
{
    let result: Delta<S::Elem, String> = delta(tree, semiring, mode, &DeltaOptions::default())?;
    let terms: Map<String, Value> = result
        .iter()
        .map(|(key, term)| (key.to_string(), Value::String(term.coefficient.to_string())))
        .collect();
    Ok(json!({
        "canonical": canonicalize(tree),
        "cut_count": cut_count(tree).to_string(),
        "cuts_seen": result.cuts_seen(),
        "terms": terms,
    }))
}

fn evaluate(case: &Value) -> Result<Value, CotreeError> {
    let tree: Tree<String> = case["tree"].as_str().expect("missing tree field").parse()?;
    let mode: DeltaMode = case["mode"]
        .as_str()
        .expect("missing mode field")
        .parse()
        .unwrap_or_else(|e| panic!("{e}"));
    match case["semiring"].as_str().expect("missing semiring field") {
        "nat" => run_case(&tree, &Natural, mode),
        "int" => run_case(&tree, &Integer, mode),
        "rat" => run_case(&tree, &Rationals, mode),
        other => panic!("unknown semiring: {other}"),
    }
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case_str = std::fs::read_to_string(&case_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", case_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let case: Value = serde_json::from_str(&case_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", case_path.display()));
    let expected: Value = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let result_json = match evaluate(&case) {
        Ok(value) => value,
        Err(e) => json!({ "error": error_kind(&e) }),
    };

    assert_eq!(
        result_json,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&result_json).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn golden_planar_two_level() {
    run_fixture("golden_planar_two_level");
}

#[test]
fn golden_symmetric_agg_two_level() {
    run_fixture("golden_symmetric_agg_two_level");
}

#[test]
fn golden_symmetric_agg_cherry() {
    run_fixture("golden_symmetric_agg_cherry");
}

#[test]
fn golden_symmetric_orbit_star() {
    run_fixture("golden_symmetric_orbit_star");
}

#[test]
fn golden_symmetric_orbit_leaf() {
    run_fixture("golden_symmetric_orbit_leaf");
}

#[test]
fn adversarial_orbit_over_naturals() {
    run_fixture("adversarial_orbit_over_naturals");
}

#[test]
fn adversarial_malformed_tree() {
    run_fixture("adversarial_malformed_tree");
}
