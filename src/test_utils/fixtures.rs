//! Sample specifications and contracts.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A specification document as YAML text.
#[derive(Clone, Debug)]
pub struct SpecFixture {
    pub name: String,
    pub content: String,
}

impl SpecFixture {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.trim_start().to_string(),
        }
    }

    /// A server with a contract and two bound use-cases.
    ///
    /// Expects [`ContractFixture::users`] at `api/openapi.yaml`.
    pub fn basic() -> Self {
        Self::new(
            "basic",
            r"
version: 1.0.0
name: users-service
description: Manages user accounts
components:
  - id: server.api
    kind: http.server
    spec:
      framework: hono
      port: 3000
      openapi: ./api/openapi.yaml
  - id: usecase.create-user
    kind: usecase
    spec:
      binds_to: server.api:POST:/users
      goal: Register a new account
      actor: visitor
      acceptance_criteria:
        - returns 201 with the new user
  - id: usecase.get-user
    kind: usecase
    spec:
      binds_to: server.api:GET:/users/{id}
      goal: Look up one account
",
        )
    }

    /// Authentication and authorization middleware with a drizzle database.
    pub fn with_auth() -> Self {
        Self::new(
            "with_auth",
            r"
version: 1.0.0
name: secured
components:
  - id: db.main
    kind: postgres
    spec:
      provider: drizzle
      schema: ./db/schema.ts
  - id: middleware.authn
    kind: middleware
    spec:
      provider: better-auth
      config: ./auth.ts
      depends_on: [db.main]
  - id: middleware.authz
    kind: middleware
    spec:
      provider: casbin
      model: ./model.conf
      policy: ./policy.csv
  - id: server.api
    kind: http.server
    spec:
      framework: hono
      port: 8080
      middleware: [middleware.authn, middleware.authz]
  - id: usecase.profile
    kind: usecase
    spec:
      binds_to: server.api:GET:/me
      goal: Show the signed-in user
",
        )
    }

    /// Two middleware depending on each other.
    pub fn with_cycle() -> Self {
        Self::new(
            "with_cycle",
            r"
version: 1.0.0
name: cyclic
components:
  - id: middleware.a
    kind: middleware
    spec:
      provider: custom
      depends_on: [middleware.b]
  - id: middleware.b
    kind: middleware
    spec:
      provider: custom
      depends_on: [middleware.a]
",
        )
    }

    /// A use-case bound to a server that does not exist.
    pub fn unresolved_reference() -> Self {
        Self::new(
            "unresolved_reference",
            r"
version: 1.0.0
name: broken
components:
  - id: usecase.orphan
    kind: usecase
    spec:
      binds_to: server.missing:GET:/x
      goal: Nothing to bind to
",
        )
    }

    /// Structurally invalid: bad port, unknown field, malformed binding.
    pub fn invalid_schema() -> Self {
        Self::new(
            "invalid_schema",
            r"
version: 1.0.0
name: invalid
components:
  - id: server.api
    kind: http.server
    spec:
      framework: hono
      port: 70000
      host: localhost
  - id: usecase.x
    kind: usecase
    spec:
      binds_to: api-get-x
      goal: g
",
        )
    }

    /// better-auth in use with no database to back it.
    pub fn missing_auth_database() -> Self {
        Self::new(
            "missing_auth_database",
            r"
version: 1.0.0
name: incomplete
components:
  - id: middleware.authn
    kind: middleware
    spec:
      provider: better-auth
      config: ./auth.ts
  - id: server.api
    kind: http.server
    spec:
      framework: hono
      port: 3000
      middleware: [middleware.authn]
",
        )
    }

    /// Write as `spec.yaml` in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("spec.yaml");
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// An OpenAPI document as YAML text.
#[derive(Clone, Debug)]
pub struct ContractFixture {
    pub content: String,
}

impl ContractFixture {
    /// `GET /users`, `POST /users`, and `GET /users/{id}`.
    pub fn users() -> Self {
        Self {
            content: r#"openapi: "3.0.3"
info:
  title: Users API
  version: 1.0.0
paths:
  /users:
    get:
      operationId: listUsers
      summary: List users
      responses:
        "200":
          description: OK
    post:
      operationId: createUser
      summary: Create a user
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                email:
                  type: string
      responses:
        "201":
          description: Created
  /users/{id}:
    get:
      operationId: getUser
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: OK
"#
            .to_string(),
        }
    }

    /// Write to `relative` under `dir`, creating parent directories.
    pub fn write_to(&self, dir: &Path, relative: &str) -> Result<PathBuf> {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}
