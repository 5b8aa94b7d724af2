use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the project config file at the documentation root.
pub const CONFIG_FILE: &str = ".revlink.toml";

/// Project configuration loaded from `.revlink.toml`.
/// Include/exclude patterns are path prefixes applied to document files.
#[derive(Debug)]
pub struct Config {
    /// Source-hosting address links are built under.
    pub base_url: Option<String>,
    /// Path prefixes that must not be scanned.
    exclude: Vec<String>,
    /// Path prefixes to scan; empty means everything.
    include: Vec<String>,
    /// Pass `--tags` to `git describe` so lightweight tags count.
    pub lightweight_tags: bool,
    /// Fixed revision that bypasses git entirely.
    pub revision: Option<String>,
    /// Role name to path template below `tree/<revision>/`.
    pub roles: BTreeMap<String, String>,
}

/// Raw TOML structure for `.revlink.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RevlinkTomlConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    lightweight_tags: bool,
    #[serde(default)]
    revision: Option<String>,
    #[serde(default = "default_roles")]
    roles: BTreeMap<String, String>,
}

impl Config {
    /// Load config from `.revlink.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed, never silently
    /// falling back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::scan_everything_by_default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        tracing::debug!(path = %path.display(), "loaded config");
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: RevlinkTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            base_url: raw.base_url,
            exclude: raw.exclude,
            include: raw.include,
            lightweight_tags: raw.lightweight_tags,
            revision: raw.revision,
            roles: raw.roles,
        });
    }

    /// Path of the config file under `root`.
    pub fn path_in(root: &Path) -> PathBuf {
        return root.join(CONFIG_FILE);
    }

    /// Default config: no base URL, the `component` role, scan everything.
    fn scan_everything_by_default() -> Self {
        return Self {
            base_url: None,
            exclude: Vec::new(),
            include: Vec::new(),
            lightweight_tags: false,
            revision: None,
            roles: default_roles(),
        };
    }

    /// Check whether a document path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// The single role a fresh project gets: `component` → `components/%s`.
pub fn default_roles() -> BTreeMap<String, String> {
    let mut roles = BTreeMap::new();
    roles.insert("component".to_string(), "components/%s".to_string());
    return roles;
}
