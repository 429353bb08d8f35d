//! Dialect files for `razor-syntax`.
//!
//! A dialect is a small TOML file that adjusts the parser: which words are
//! reserved after `@`, how deep nesting may go, and whether constructs left
//! open at end of input are fatal.
//!
//! ```toml
//! max_nesting_depth = 128
//! strict_unterminated = false
//!
//! [keywords]
//! remove = ["layout"]
//!
//! [keywords.directives]
//! helper = "functions"
//!
//! [keywords.controls]
//! unless = "if"
//! ```

use razor_syntax::{ControlKind, DirectiveKind, Keyword, ParseOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read dialect file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse dialect file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("`{word}` maps to unknown directive `{name}`")]
    UnknownDirective { word: String, name: String },

    #[error("`{word}` maps to unknown control keyword `{name}`")]
    UnknownControl { word: String, name: String },
}

/// Parser settings read from a dialect file. Anything left out keeps the
/// parser's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nesting_depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_unterminated: Option<bool>,
    pub keywords: KeywordEdits,
}

/// Changes to the standard reserved-word table, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordEdits {
    /// Words that stop being reserved
    pub remove: Vec<String>,
    /// Word → standard directive name (`helper = "functions"`)
    pub directives: BTreeMap<String, String>,
    /// Word → standard control keyword (`unless = "if"`)
    pub controls: BTreeMap<String, String>,
}

impl Dialect {
    /// Load a dialect file. A missing file is `Ok(None)`; `~` and
    /// environment variables in the path are expanded.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let config_path = Self::expand_path(config_path).unwrap_or_else(|| config_path.to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let dialect: Dialect =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(dialect))
    }

    /// Load the user's dialect from the default location.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/razor-syntax");
        PathBuf::from(config_dir.as_ref()).join("dialect.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Parser options with this dialect applied over the defaults.
    ///
    /// Removals happen first, so a word can be removed and then remapped.
    pub fn to_options(&self) -> Result<ParseOptions, ConfigError> {
        let mut options = ParseOptions::default();
        if let Some(depth) = self.max_nesting_depth {
            options.max_nesting_depth = depth;
        }
        if let Some(strict) = self.strict_unterminated {
            options.strict_unterminated = strict;
        }

        let table = &mut options.reserved_keywords;
        for word in &self.keywords.remove {
            table.remove(word);
        }
        for (word, name) in &self.keywords.directives {
            let kind = DirectiveKind::from_name(name).ok_or_else(|| {
                ConfigError::UnknownDirective {
                    word: word.clone(),
                    name: name.clone(),
                }
            })?;
            table.insert(word.as_str(), Keyword::Directive(kind));
        }
        for (word, name) in &self.keywords.controls {
            let kind = ControlKind::from_name(name).ok_or_else(|| ConfigError::UnknownControl {
                word: word.clone(),
                name: name.clone(),
            })?;
            table.insert(word.as_str(), Keyword::Control(kind));
        }
        Ok(options)
    }
}
