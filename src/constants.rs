//! Constants shared across the compiler.
//!
//! Provider names, numeric limits and default file locations that more than
//! one module needs to agree on.

/// Authentication middleware provider. Requires a `config` file and pulls in
/// the cross-component requirements checked by the IR validator.
pub const PROVIDER_BETTER_AUTH: &str = "better-auth";

/// Authorization middleware provider. Requires `model` and `policy`.
pub const PROVIDER_CASBIN: &str = "casbin";

/// ORM provider the authentication middleware stores its tables with.
pub const PROVIDER_DRIZZLE: &str = "drizzle";

/// Inclusive bounds for a server port.
pub const MIN_PORT: i64 = 1;
pub const MAX_PORT: i64 = 65535;

/// Version written to, and required in, the cache file.
pub const CACHE_VERSION: &str = "1.0";

/// Project configuration file looked up next to the specification.
pub const CONFIG_FILE_NAME: &str = "bound.toml";

/// Default output directory, relative to the specification.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Default cache location, relative to the output directory.
pub const DEFAULT_CACHE_FILE: &str = ".bound/cache.json";
