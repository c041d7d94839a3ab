//! CLI tests for `explain`, `validate`, `list`, `schema` and global flag parsing.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;

#[allow(deprecated)]
fn aare_cmd() -> Command {
    let mut cmd = Command::cargo_bin("aare").expect("aare binary not found - run `cargo build` first");
    cmd.env_remove("AARE_ONTOLOGY_DIR").env_remove("AARE_LOG");
    cmd
}

fn ontologies_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("ontologies")
}

#[test]
fn explain_known_constraint() {
    aare_cmd()
        .args(["explain", "ATR_QM_DTI"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ATR_QM_DTI\n=========="))
        .stdout(predicate::str::contains("dti (real): float pattern"))
        .stdout(predicate::str::contains("Citation: 12 CFR § 1026.43(c)"));
}

#[test]
fn explain_unknown_constraint_lists_ids() {
    aare_cmd()
        .args(["explain", "NOT_A_RULE"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown constraint id: NOT_A_RULE"))
        .stderr(predicate::str::contains("  - HPML_ESCROW"));
}

#[test]
fn explain_in_custom_ontology_shows_constants() {
    aare_cmd()
        .arg("--ontology-dir")
        .arg(ontologies_dir())
        .args(["explain", "MAX_LTV", "--ontology", "lending-lite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ltv_limit (real): constant 80"));
}

#[test]
fn validate_accepts_good_document() {
    aare_cmd()
        .arg("validate")
        .arg(ontologies_dir().join("lending-lite.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "lending-lite v0.2.0 is valid: 2 constraints, 2 extractors, 0 derived, 1 constants",
        ));
}

#[test]
fn validate_rejects_broken_document() {
    aare_cmd()
        .arg("validate")
        .arg(ontologies_dir().join("broken.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid ontology: missing extractors"));
}

#[test]
fn validate_missing_file_is_an_error() {
    aare_cmd()
        .args(["validate", "does/not/exist.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read ontology"));
}

#[test]
fn list_shows_builtin_and_directory() {
    aare_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout("mortgage-compliance-v1\n");

    aare_cmd()
        .arg("--ontology-dir")
        .arg(ontologies_dir())
        .arg("list")
        .assert()
        .success()
        .stdout("broken\nlending-lite\nmortgage-compliance-v1\n");
}

#[test]
fn schema_prints_json_schema() {
    let output = aare_cmd().arg("schema").output().expect("run aare schema");
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout).expect("schema is JSON");
    let props = schema["properties"].as_object().expect("properties");
    for field in ["name", "version", "constraints", "extractors"] {
        assert!(props.contains_key(field), "schema missing {field}");
    }

    let output = aare_cmd()
        .args(["schema", "--config-schema"])
        .output()
        .expect("run aare schema --config-schema");
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout).expect("schema is JSON");
    assert!(schema["properties"]["cache_capacity"].is_object());
}

#[test]
fn schema_respects_global_config_flag() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let cfg = tmp.path().join("aare.toml");
    aare_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["schema", "--config-schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache_capacity"));
}

#[test]
fn fallback_flag_rejects_unknown_policy() {
    aare_cmd()
        .args(["--fallback", "sometimes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'sometimes'"))
        .stderr(predicate::str::contains("default"))
        .stderr(predicate::str::contains("error"));

    aare_cmd()
        .args(["--fallback", "default", "list"])
        .assert()
        .success()
        .stdout("mortgage-compliance-v1\n");
}
