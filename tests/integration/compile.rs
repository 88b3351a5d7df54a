use predicates::prelude::*;
use serde_json::Value;
use std::fs;

use crate::common::{SpecFixture, TestProject, bound, project_with, run_bound};

#[test]
fn test_compile_basic_project() {
    let project = TestProject::with_basic_spec().unwrap();

    bound(project.path())
        .args(["compile", "spec.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 3 files (3 written, 0 preserved)"));

    let snapshot: Value = serde_json::from_str(&project.read_file("generated/.bound/ir.json").unwrap()).unwrap();
    assert_eq!(snapshot["metadata"]["name"], "users-service");
    assert_eq!(snapshot["components"].as_array().unwrap().len(), 3);

    let doc = project.read_file("generated/docs/usecases/usecase.create-user.md").unwrap();
    assert!(doc.contains("`POST /users` on `server.api`"));
    assert!(doc.contains("createUser"));
}

#[test]
fn test_second_compile_preserves_write_once_files() {
    let project = TestProject::with_basic_spec().unwrap();
    let doc = "generated/docs/usecases/usecase.get-user.md";

    run_bound(&project, &["compile", "spec.yaml"]).unwrap();
    project.write_file(doc, "# edited by hand\n").unwrap();

    bound(project.path())
        .args(["compile", "spec.yaml", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 written, 2 preserved)"));

    assert_eq!(project.read_file(doc).unwrap(), "# edited by hand\n");
}

#[test]
fn test_cache_records_hashes_and_owned_artifacts() {
    let project = TestProject::with_basic_spec().unwrap();
    run_bound(&project, &["compile", "spec.yaml"]).unwrap();

    let cache: Value = serde_json::from_str(&project.read_file("generated/.bound/cache.json").unwrap()).unwrap();
    assert_eq!(cache["cache_version"], "1.0");
    assert_eq!(cache["specHash"].as_str().unwrap().len(), 64);

    let components = cache["components"].as_object().unwrap();
    assert_eq!(components.len(), 3);
    assert_eq!(
        components["usecase.create-user"]["artifacts"],
        serde_json::json!(["docs/usecases/usecase.create-user.md"])
    );
    assert_eq!(components["server.api"]["artifacts"], serde_json::json!([]));
}

#[test]
fn test_spec_hash_ignores_formatting() {
    let project = TestProject::with_basic_spec().unwrap();
    run_bound(&project, &["compile", "spec.yaml"]).unwrap();
    let before: Value = serde_json::from_str(&project.read_file("generated/.bound/cache.json").unwrap()).unwrap();

    let original = project.read_file("spec.yaml").unwrap();
    project.write_file("spec.yaml", &format!("# a comment\n{original}\n\n")).unwrap();
    run_bound(&project, &["compile", "spec.yaml"]).unwrap();
    let after: Value = serde_json::from_str(&project.read_file("generated/.bound/cache.json").unwrap()).unwrap();

    assert_eq!(before["specHash"], after["specHash"]);
}

#[test]
fn test_compile_to_explicit_output_without_cache() {
    let project = TestProject::with_basic_spec().unwrap();

    bound(project.path()).args(["compile", "spec.yaml", "-o", "out", "--no-cache"]).assert().success();

    assert!(project.file_exists("out/.bound/ir.json"));
    assert!(!project.file_exists("out/.bound/cache.json"));
    assert!(!project.file_exists("generated"));
}

#[test]
fn test_compile_spec_from_another_directory() {
    let project = TestProject::with_basic_spec().unwrap();
    let spec = project.spec_path();

    bound(project.temp_dir.path())
        .args(["compile", spec.to_str().unwrap()])
        .assert()
        .success();

    // Default output sits next to the spec, not the working directory.
    assert!(project.file_exists("generated/.bound/ir.json"));
    assert!(!project.temp_dir.path().join("generated").exists());
}

#[test]
fn test_compile_with_auth_stack() {
    let project = project_with(&SpecFixture::with_auth()).unwrap();

    bound(project.path()).args(["compile", "spec.yaml"]).assert().success();

    let snapshot = project.read_file("generated/.bound/ir.json").unwrap();
    let snapshot: Value = serde_json::from_str(&snapshot).unwrap();
    let edges = snapshot["edges"].as_array().unwrap();
    assert!(edges.iter().any(|e| e["from"] == "server.api" && e["to"] == "middleware.authn"));
    assert!(edges.iter().any(|e| e["from"] == "middleware.authn" && e["to"] == "db.main"));

    let doc = fs::read_to_string(project.path().join("generated/docs/usecases/usecase.profile.md")).unwrap();
    assert!(doc.contains("middleware.authn"));
}

#[test]
fn test_compile_writes_nothing_on_failure() {
    let project = project_with(&SpecFixture::missing_auth_database()).unwrap();

    bound(project.path())
        .args(["compile", "spec.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("validate-ir"));

    assert!(!project.file_exists("generated"));
}
