//! Invalid specifications, one failing layer at a time.

use predicates::prelude::*;
use serde_json::Value;

use crate::common::{SpecFixture, TestProject, bound, project_with, run_bound};

fn validate_json(project: &TestProject) -> Value {
    let output = run_bound(project, &["validate", "spec.yaml", "--format", "json"]).unwrap();
    assert!(!output.success, "expected failure, got: {}", output.stdout);
    serde_json::from_str(&output.stdout).unwrap()
}

fn spec(components: &str) -> String {
    format!("version: 1.0.0\nname: scenario\ncomponents:\n{components}")
}

#[test]
fn test_schema_violations_reported_together() {
    let project = project_with(&SpecFixture::invalid_schema()).unwrap();
    let results = validate_json(&project);

    assert_eq!(results["stage"], "validate-schema");
    let errors = results["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e["category"] == "schema_violation"));

    let messages: Vec<&str> = errors.iter().map(|e| e["message"].as_str().unwrap()).collect();
    assert!(messages.iter().any(|m| m.contains("/components/0/spec/port")));
    assert!(messages.iter().any(|m| m.contains("additional property 'host'")));
    assert!(messages.iter().any(|m| m.contains("api-get-x")));
}

#[test]
fn test_unknown_kind_fails_schema() {
    let project = TestProject::new().unwrap();
    project
        .write_file("spec.yaml", &spec("  - id: queue.jobs\n    kind: kafka\n    spec: {}\n"))
        .unwrap();

    let results = validate_json(&project);
    assert_eq!(results["stage"], "validate-schema");
    assert!(results["errors"][0]["message"].as_str().unwrap().contains("kafka"));
}

#[test]
fn test_duplicate_ids() {
    let project = TestProject::new().unwrap();
    let component = "  - id: db.main\n    kind: postgres\n    spec:\n      provider: drizzle\n      schema: ./s.ts\n";
    project.write_file("spec.yaml", &spec(&component.repeat(2))).unwrap();

    let results = validate_json(&project);
    assert_eq!(results["stage"], "validate-semantic");
    assert_eq!(results["errors"][0]["category"], "duplicate_symbol");
    assert_eq!(results["errors"][0]["component"], "db.main");
    assert_eq!(results["errors"][0]["position"]["line"], 9);
}

#[test]
fn test_unresolved_binding_server() {
    let project = project_with(&SpecFixture::unresolved_reference()).unwrap();
    let results = validate_json(&project);

    assert_eq!(results["stage"], "build-ir");
    assert_eq!(results["errors"][0]["category"], "unresolved_reference");
    assert!(results["errors"][0]["message"].as_str().unwrap().contains("server.missing"));
}

#[test]
fn test_binding_to_missing_operation() {
    let project = TestProject::with_basic_spec().unwrap();
    let original = project.read_file("spec.yaml").unwrap();
    project
        .write_file("spec.yaml", &original.replace("server.api:GET:/users/{id}", "server.api:DELETE:/users/{id}"))
        .unwrap();

    let results = validate_json(&project);
    assert_eq!(results["stage"], "build-ir");
    let errors = results["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["category"], "contract");
    assert_eq!(errors[0]["component"], "usecase.get-user");
}

#[test]
fn test_missing_contract_file() {
    let project = TestProject::new().unwrap();
    project.write_spec(&SpecFixture::basic()).unwrap();

    let results = validate_json(&project);
    assert_eq!(results["stage"], "build-ir");
    assert!(results["errors"].as_array().unwrap().iter().any(|e| e["category"] == "contract"));
}

#[test]
fn test_malformed_yaml() {
    let project = TestProject::new().unwrap();
    project.write_file("spec.yaml", "version: [1.0\nname: x\n").unwrap();

    bound(project.path())
        .args(["validate", "spec.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed at stage load"))
        .stderr(predicate::str::contains("Failed to parse specification"));
}

#[test]
fn test_casbin_requirements() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "spec.yaml",
            &spec("  - id: middleware.authz\n    kind: middleware\n    spec:\n      provider: casbin\n"),
        )
        .unwrap();

    let results = validate_json(&project);
    assert_eq!(results["stage"], "validate-ir");
    let errors = results["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e["category"] == "missing_field"));
    assert!(
        errors[0]["message"]
            .as_str()
            .unwrap()
            .starts_with("middleware.authz: missing required field: model (required by casbin provider)")
    );
    assert_eq!(errors[1]["position"]["line"], 4);
}
