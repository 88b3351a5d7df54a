//! Route bindings.
//!
//! A use-case declares the route it implements with `binds_to`:
//!
//! ```text
//! server-id:METHOD:/path
//! ```
//!
//! The value is split on the first two colons only, so anything after the
//! method segment (including further colons) is the path.

use serde::Serialize;

use crate::contract::{HttpMethod, Operation};

/// A resolved `binds_to` declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub server_id: String,
    pub method: HttpMethod,
    pub path: String,
    /// The matching contract operation, when the server declares a contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

impl Binding {
    /// `METHOD:/path`, the key used to look the route up in a contract.
    #[must_use]
    pub fn operation_key(&self) -> String {
        crate::contract::operation_key(self.method, &self.path)
    }
}

/// Parse a `binds_to` value. The error is a human-readable reason.
///
/// ```rust
/// use bound_cli::contract::HttpMethod;
/// use bound_cli::ir::parse_binding;
///
/// let binding = parse_binding("server.api:GET:/users/{id}").unwrap();
/// assert_eq!(binding.server_id, "server.api");
/// assert_eq!(binding.method, HttpMethod::Get);
/// assert_eq!(binding.path, "/users/{id}");
///
/// assert!(parse_binding("server.api:FETCH:/users").is_err());
/// ```
pub fn parse_binding(value: &str) -> Result<Binding, String> {
    if value.is_empty() {
        return Err("empty binds_to value".to_string());
    }

    let format_error = || format!("invalid binds_to format: {value} (expected server:METHOD:/path)");

    let (server_id, rest) = value.split_once(':').ok_or_else(format_error)?;
    let (method, path) = rest.split_once(':').ok_or_else(format_error)?;

    if server_id.is_empty() {
        return Err(format!("missing server id in binds_to: {value}"));
    }

    let method = method
        .parse::<HttpMethod>()
        .map_err(|_| format!("invalid HTTP method: {method}"))?;

    if !path.starts_with('/') {
        return Err(format!("path must start with /: {path}"));
    }

    Ok(Binding {
        server_id: server_id.to_string(),
        method,
        path: path.to_string(),
        operation: None,
    })
}

/// The server segment of a `binds_to` value, without validating the rest.
#[must_use]
pub fn binding_server(value: &str) -> Option<&str> {
    value.split_once(':').map(|(server, _)| server).filter(|s| !s.is_empty())
}
