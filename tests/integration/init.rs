use predicates::prelude::*;

use crate::common::{TestProject, bound};

#[test]
fn test_init_then_compile() {
    let project = TestProject::new().unwrap();

    bound(project.path())
        .args(["init", "inventory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized inventory"))
        .stdout(predicate::str::contains("Next steps:"));

    assert!(project.read_file("inventory/spec.yaml").unwrap().contains("name: inventory"));

    bound(project.path()).args(["validate", "inventory/spec.yaml"]).assert().success();
    bound(project.path()).args(["compile", "inventory/spec.yaml"]).assert().success();

    assert!(project.file_exists("inventory/generated/docs/usecases/usecase.health.md"));
}

#[test]
fn test_init_into_directory() {
    let project = TestProject::new().unwrap();

    bound(project.path()).args(["init", "svc", "--dir", "projects"]).assert().success();

    assert!(project.file_exists("projects/svc/spec.yaml"));
    assert!(project.file_exists("projects/svc/api/openapi.yaml"));
}

#[test]
fn test_init_existing_requires_force() {
    let project = TestProject::new().unwrap();
    bound(project.path()).args(["init", "svc"]).assert().success();

    bound(project.path())
        .args(["init", "svc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    bound(project.path()).args(["init", "svc", "--force"]).assert().success();
}

#[test]
fn test_init_rejects_path_names() {
    let project = TestProject::new().unwrap();

    bound(project.path())
        .args(["init", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("simple directory name"));

    assert!(!project.temp_dir.path().join("escape").exists());
}
