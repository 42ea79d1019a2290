//! Printer configuration.
//!
//! A config file is optional. When present it is YAML:
//!
//! ```yaml
//! namespace: Eigen
//! max_children: 200
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root namespace of the matrix library.
pub const DEFAULT_NAMESPACE: &str = "Eigen";

/// Default cap on rendered children per value.
pub const DEFAULT_MAX_CHILDREN: usize = 200;

/// Config file names searched for in a directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["eigenprint.yaml", ".eigenprint.yaml"];

/// Settings shared by the dispatch table and the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrinterConfig {
    /// Namespace the recognized type names live in.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Children rendered per value; 0 renders all of them.
    #[serde(default = "default_max_children")]
    pub max_children: usize,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_max_children() -> usize {
    DEFAULT_MAX_CHILDREN
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            max_children: default_max_children(),
        }
    }
}

impl PrinterConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: PrinterConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else the first config found in `dir`, else
    /// defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::parse_file(path),
            None => match discover(dir) {
                Some(path) => {
                    log::debug!("using config {}", path.display());
                    Self::parse_file(path)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Cap on rendered children, `None` when unlimited.
    pub fn child_limit(&self) -> Option<usize> {
        if self.max_children == 0 {
            None
        } else {
            Some(self.max_children)
        }
    }

    /// Reject namespaces that are not `::`-separated identifiers.
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid = !self.namespace.is_empty()
            && self.namespace.split("::").all(|part| {
                let mut chars = part.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !valid {
            anyhow::bail!("invalid namespace {:?}", self.namespace);
        }
        Ok(())
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}
