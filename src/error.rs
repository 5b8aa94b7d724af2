/// Crate-level error types for revlink diagnostics.
use std::path::PathBuf;

/// All errors in revlink carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, command, or role involved.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An external command ran but exited unsuccessfully.
    #[error("command failed: `{command}` ({status}): {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status description.
        status: String,
        /// Trimmed standard error of the command.
        stderr: String,
    },

    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Revision lookup succeeded but printed nothing.
    #[error("revision lookup produced no output")]
    EmptyRevision,

    /// A role path template cannot be used as a link pattern.
    #[error("invalid link pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Underlying I/O error from the filesystem or process spawning.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of command output failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// No base URL was configured or passed on the command line.
    #[error("no base URL configured")]
    MissingBaseUrl,

    /// A config document could not be parsed for editing.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No role with this name is registered or configured.
    #[error("unknown role: `{name}`")]
    UnknownRole {
        /// Role name that was not found.
        name: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watcher setup failed: {reason}")]
    Watch {
        /// Description from the watcher backend.
        reason: String,
    },
}
