use predicates::prelude::*;

use crate::common::{SpecFixture, bound, project_with, run_bound};

#[test]
fn test_graph_prints_dependency_order() {
    let project = project_with(&SpecFixture::with_auth()).unwrap();

    let output = run_bound(&project, &["graph", "spec.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    let index = |id: &str| lines.iter().position(|l| l.contains(id)).unwrap();
    assert!(index("db.main") < index("middleware.authn"));
    assert!(index("middleware.authz") < index("server.api"));
    assert!(index("server.api") < index("usecase.profile"));
    assert!(output.stdout.contains("(postgres)"));
}

#[test]
fn test_graph_tree() {
    let project = project_with(&SpecFixture::with_auth()).unwrap();

    bound(project.path())
        .args(["graph", "spec.yaml", "--tree", "usecase.profile"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("usecase.profile (usecase)"))
        .stdout(predicate::str::contains("server.api (http.server) [binding]"))
        .stdout(predicate::str::contains("db.main (postgres) [dependency]"));
}

#[test]
fn test_graph_tree_shows_cycles() {
    let project = project_with(&SpecFixture::with_cycle()).unwrap();

    bound(project.path())
        .args(["graph", "spec.yaml", "--tree", "middleware.a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(circular reference)"));

    bound(project.path())
        .args(["graph", "spec.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dependency cycle detected"));
}

#[test]
fn test_graph_unknown_component() {
    let project = project_with(&SpecFixture::with_auth()).unwrap();

    bound(project.path())
        .args(["graph", "spec.yaml", "--tree", "server.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.nope"));
}

#[test]
fn test_graph_transitive() {
    let project = project_with(&SpecFixture::with_auth()).unwrap();

    let output = run_bound(&project, &["graph", "spec.yaml", "--transitive", "usecase.profile"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(output.stdout, "db.main\nmiddleware.authn\nmiddleware.authz\nserver.api\n");

    bound(project.path())
        .args(["graph", "spec.yaml", "--transitive", "server.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.nope"));
}
