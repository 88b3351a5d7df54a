use predicates::prelude::*;

use crate::common::{TestProject, bound};

#[test]
fn test_config_file_sets_output_and_cache() {
    let project = TestProject::with_basic_spec().unwrap();
    project
        .write_file(
            "bound.toml",
            r#"
output_dir = "build"
cache_file = "state/cache.json"
"#,
        )
        .unwrap();

    bound(project.path()).args(["compile", "spec.yaml"]).assert().success();

    assert!(project.file_exists("build/.bound/ir.json"));
    assert!(project.file_exists("build/state/cache.json"));
    assert!(!project.file_exists("generated"));
}

#[test]
fn test_config_cache_disabled() {
    let project = TestProject::with_basic_spec().unwrap();
    project.write_file("bound.toml", "cache = false\n").unwrap();

    bound(project.path()).args(["compile", "spec.yaml"]).assert().success();

    assert!(project.file_exists("generated/.bound/ir.json"));
    assert!(!project.file_exists("generated/.bound/cache.json"));
}

#[test]
fn test_cli_output_overrides_config() {
    let project = TestProject::with_basic_spec().unwrap();
    project.write_file("bound.toml", "output_dir = \"build\"\n").unwrap();

    bound(project.path()).args(["compile", "spec.yaml", "--output", "cli-out"]).assert().success();

    assert!(project.file_exists("cli-out/.bound/ir.json"));
    assert!(!project.file_exists("build"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let project = TestProject::with_basic_spec().unwrap();
    project.write_file("bound.toml", "output = \"build\"\n").unwrap();

    bound(project.path())
        .args(["compile", "spec.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output"));
}

#[test]
fn test_absolute_cache_file_is_rejected() {
    let project = TestProject::with_basic_spec().unwrap();
    project.write_file("bound.toml", "cache_file = \"/tmp/cache.json\"\n").unwrap();

    bound(project.path()).args(["compile", "spec.yaml"]).assert().failure();
}
