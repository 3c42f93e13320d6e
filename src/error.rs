/// Crate-level error types for sourcefile-url diagnostics.
use std::path::PathBuf;

/// Every configuration and loading failure carries enough context to explain
/// to the user why source links were not rewritten. Load-phase errors are
/// logged and turn the rewrite pass off; they never abort a documentation build.
#[allow(clippy::error_impl_error, reason = "single crate-wide error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Both the prefix shortcut and the rule file were supplied.
    #[error("use either --sourcefile-url-prefix or --sourcefile-url-map option")]
    ConfigConflict,

    /// The project config file exists but cannot be parsed.
    #[error("config {}: {source}", path.display())]
    ConfigParse {
        /// Path to the malformed config file.
        path: PathBuf,
        /// The wrapped TOML deserialization error.
        source: toml::de::Error,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Rule file parsed as JSON but does not have the required shape.
    #[error(
        "--sourcefile-url-map json file {reason}; syntax has to be: \
         [{{\"pattern\": \"REGEX PATTERN STRING WITHOUT ENCLOSING SLASHES\", \"replace\": \"STRING\", \"onlyTitle\": false}}, ETC.]"
    )]
    JsonShape {
        /// What was wrong with the document.
        reason: String,
    },

    /// A rule's pattern is not a valid regular expression.
    #[error("error reading --sourcefile-url-map: invalid pattern `{pattern}`: {source}")]
    PatternCompile {
        /// The offending pattern text.
        pattern: String,
        /// The wrapped regex compilation error.
        source: regex::Error,
    },

    /// A project dump could not be parsed or serialized.
    #[error("project {}: {source}", path.display())]
    ProjectJson {
        /// Path to the project dump.
        path: PathBuf,
        /// The wrapped JSON error.
        source: serde_json::Error,
    },

    /// The rule file is missing or unreadable.
    #[error("error reading --sourcefile-url-map json file {}: {source}", path.display())]
    RuleFileRead {
        /// Absolute path that was read.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// The rule file is not valid JSON.
    #[error("error reading --sourcefile-url-map json file {}: {source}", path.display())]
    RuleFileSyntax {
        /// Absolute path that was read.
        path: PathBuf,
        /// The wrapped JSON syntax error.
        source: serde_json::Error,
    },
}
