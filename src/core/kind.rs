//! Component kinds.
//!
//! A specification is made of components, and every component has exactly one
//! [`Kind`]. The set is closed: anything the compiler does not recognise is
//! rejected during typing with an unknown-kind diagnostic.
//!
//! # Spellings
//!
//! Documents use the canonical spellings below. The abstract names `server`
//! and `database` are accepted as aliases when parsing.
//!
//! | Kind | Canonical | Alias |
//! |---|---|---|
//! | [`Kind::Server`] | `http.server` | `server` |
//! | [`Kind::Middleware`] | `middleware` | |
//! | [`Kind::Database`] | `postgres` | `database` |
//! | [`Kind::Usecase`] | `usecase` | |
//!
//! ```rust
//! use bound_cli::core::Kind;
//!
//! let kind: Kind = "http.server".parse().unwrap();
//! assert_eq!(kind, Kind::Server);
//! assert_eq!("database".parse::<Kind>().unwrap(), Kind::Database);
//! assert_eq!(Kind::Database.to_string(), "postgres");
//! ```

use serde::{Deserialize, Serialize};

/// The closed enumeration of component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    /// An HTTP server hosting routes.
    #[serde(rename = "http.server", alias = "server")]
    Server,

    /// Request middleware (authentication, authorization, ...).
    #[serde(rename = "middleware")]
    Middleware,

    /// A relational database accessed through an ORM provider.
    #[serde(rename = "postgres", alias = "database")]
    Database,

    /// A business use-case bound to a server route.
    #[serde(rename = "usecase")]
    Usecase,
}

impl Kind {
    /// All kinds, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Kind] {
        &[Kind::Server, Kind::Middleware, Kind::Database, Kind::Usecase]
    }

    /// Canonical document spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Kind::Server => "http.server",
            Kind::Middleware => "middleware",
            Kind::Database => "postgres",
            Kind::Usecase => "usecase",
        }
    }

    /// Every spelling accepted by [`str::parse`], canonical first.
    #[must_use]
    pub const fn accepted_spellings() -> &'static [&'static str] {
        &["http.server", "middleware", "postgres", "usecase", "server", "database"]
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http.server" | "server" => Ok(Kind::Server),
            "middleware" => Ok(Kind::Middleware),
            "postgres" | "database" => Ok(Kind::Database),
            "usecase" => Ok(Kind::Usecase),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Returned by [`Kind`]'s `FromStr` for a spelling outside the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind: {0}")]
pub struct UnknownKind(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_uses_canonical_spelling() {
        assert_eq!(Kind::Server.to_string(), "http.server");
        assert_eq!(Kind::Middleware.to_string(), "middleware");
        assert_eq!(Kind::Database.to_string(), "postgres");
        assert_eq!(Kind::Usecase.to_string(), "usecase");
    }

    #[test]
    fn test_kind_from_str_accepts_aliases() {
        assert_eq!("server".parse::<Kind>().unwrap(), Kind::Server);
        assert_eq!("database".parse::<Kind>().unwrap(), Kind::Database);
        for spelling in Kind::accepted_spellings() {
            assert!(spelling.parse::<Kind>().is_ok(), "{spelling} should parse");
        }
    }

    #[test]
    fn test_kind_from_str_rejects_unknown() {
        let err = "queue".parse::<Kind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown kind: queue");
        // Case matters: kinds are identifiers, not prose.
        assert!("HTTP.SERVER".parse::<Kind>().is_err());
    }

    #[test]
    fn test_kind_serde_round_trip() {
        let json = serde_json::to_string(&Kind::Server).unwrap();
        assert_eq!(json, "\"http.server\"");
        let alias: Kind = serde_json::from_str("\"database\"").unwrap();
        assert_eq!(alias, Kind::Database);
    }
}
