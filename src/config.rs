use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Name of the optional project config file, looked up in the working directory.
pub const CONFIG_FILE: &str = ".sourcefile-url.toml";

/// The two mutually exclusive ways to configure the rewrite pass.
/// Both `None` disables rewriting; both `Some` is a configuration conflict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RewriteOptions {
    /// Path to a JSON rule file, relative to the working directory.
    #[serde(default, rename = "sourcefile-url-map")]
    pub map_file: Option<String>,
    /// URL prepended to every source path.
    #[serde(default, rename = "sourcefile-url-prefix")]
    pub url_prefix: Option<String>,
}

impl RewriteOptions {
    /// Load options from `.sourcefile-url.toml` in the given root directory.
    /// Returns empty options if the file doesn't exist. Returns an error if the
    /// file exists but is malformed, never silently falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::ConfigParse` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        return toml::from_str(&content).map_err(|source| return Error::ConfigParse { path, source });
    }

    /// Per-key override: values set in `overrides` win over values in `self`.
    #[must_use]
    pub fn overridden_by(self, overrides: Self) -> Self {
        return Self {
            map_file: overrides.map_file.or(self.map_file),
            url_prefix: overrides.url_prefix.or(self.url_prefix),
        };
    }
}
