//! Generator configuration.
//!
//! Defaults apply unless the project overrides them in `mapforge.toml`. The
//! resulting value is immutable and passed explicitly to every phase.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Default bound for unrolling recursive mappings in projection output.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 3;

/// Upper bound accepted for any recursion depth setting.
pub const MAX_RECURSION_DEPTH_LIMIT: u32 = 16;

/// Conventional config file name looked up next to the schema snapshot.
pub const CONFIG_FILE_NAME: &str = "mapforge.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// MapperConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Emit a runtime error when a required property value is null.
    pub throw_on_null_property: bool,

    /// Emit a runtime error when a required collection element is null;
    /// otherwise such elements are filtered out.
    pub throw_on_null_element: bool,

    /// Emit the `map_many_*` routine lifting the primary routine over a sequence.
    pub generate_sequence_variant: bool,

    /// Emit the single-expression `project_*` routine.
    pub generate_expression_variant: bool,

    /// Call `AfterMap::after_map` on every freshly built destination.
    pub generate_after_hook: bool,

    /// Emit `register_mappers` for the runtime registry.
    pub generate_registration: bool,

    /// Emit `map_dyn`, the runtime type-switch dispatcher.
    pub generate_dispatch: bool,

    /// Paths imported by every generated artifact.
    pub extra_imports: Vec<String>,

    /// Default bound for unrolling recursive mappings.
    pub max_recursion_depth: u32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            throw_on_null_property: true,
            throw_on_null_element: true,
            generate_sequence_variant: true,
            generate_expression_variant: false,
            generate_after_hook: true,
            generate_registration: false,
            generate_dispatch: false,
            extra_imports: Vec::new(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl MapperConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recursion_depth == 0 || self.max_recursion_depth > MAX_RECURSION_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_recursion_depth must be within 1..={MAX_RECURSION_DEPTH_LIMIT}, got {}",
                self.max_recursion_depth
            )));
        }

        if let Some(import) = self.extra_imports.iter().find(|i| i.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "extra_imports contains an empty path: {import:?}"
            )));
        }

        Ok(())
    }
}
