use predicates::prelude::*;
use serde_json::Value;

use crate::common::{SpecFixture, TestProject, bound, project_with, run_bound};

#[test]
fn test_validate_valid_spec() {
    let project = TestProject::with_basic_spec().unwrap();

    bound(project.path())
        .args(["validate", "spec.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("is valid (3 components, 2 edges)"));

    assert!(!project.file_exists("generated"));
}

#[test]
fn test_validate_json_success() {
    let project = TestProject::with_basic_spec().unwrap();

    let output = run_bound(&project, &["validate", "spec.yaml", "--format", "json"]).unwrap();
    assert!(output.success);

    let results: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(results["valid"], true);
    assert_eq!(results["components"], 3);
    assert_eq!(results["stage"], Value::Null);
    assert_eq!(results["errors"], serde_json::json!([]));
}

#[test]
fn test_validate_json_failure() {
    let project = project_with(&SpecFixture::missing_auth_database()).unwrap();

    let output = run_bound(&project, &["validate", "spec.yaml", "--format", "json"]).unwrap();
    assert!(!output.success);
    assert_eq!(output.code, Some(1));

    let results: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(results["valid"], false);
    assert_eq!(results["stage"], "validate-ir");

    let errors = results["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["category"], "cross_component_requirement");
    assert_eq!(errors[0]["component"], "middleware.authn");
    assert!(errors[0]["message"].as_str().unwrap().contains("drizzle"));
}

#[test]
fn test_validate_text_failure_lists_errors() {
    let project = project_with(&SpecFixture::with_cycle()).unwrap();

    bound(project.path())
        .args(["validate", "spec.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("validate-ir"))
        .stdout(predicate::str::contains("middleware.a -> middleware.b -> middleware.a"));
}

#[test]
fn test_validate_missing_file() {
    let project = TestProject::new().unwrap();

    bound(project.path())
        .args(["validate", "absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specification file not found"))
        .stderr(predicate::str::contains("bound init"));
}
