//! System-wide constants and default values.

/// Default directory holding requirement files.
pub const DEFAULT_DIRECTORY: &str = "requirements";

/// Default extension of input (constraint) files.
pub const DEFAULT_IN_EXT: &str = "in";

/// Default extension of compiled output (lock) files.
pub const DEFAULT_OUT_EXT: &str = "txt";

/// Default external resolver program.
pub const DEFAULT_RESOLVER: &str = "pip-compile";

/// Delimiter between a package name and its pinned version.
pub const PIN_DELIMITER: &str = "==";

/// Compatible-release operator written for relaxed pins.
pub const COMPATIBLE_DELIMITER: &str = "~=";

/// Prefix of the header line carrying the input file digest.
pub const HASH_HEADER_PREFIX: &str = "# SHA256:";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "pinmulti";
