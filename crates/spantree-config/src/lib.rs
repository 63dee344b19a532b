use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use spantree_engine::{EngineError, Ontology, PatternRule, RuleGraph};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid input pattern '{pattern}': {source}")]
    InputPatternError {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to read input path: {0}")]
    InputGlobError(#[from] glob::GlobError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest rule nesting a traversal may reach before failing.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: RuleGraph::DEFAULT_MAX_DEPTH,
        }
    }
}

/// A regular expression whose every match becomes a discovered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// The serialized shape of an [`Ontology`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologySpec {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, OntologySpec>,
}

impl OntologySpec {
    /// Compiles every pattern, failing on the first invalid one.
    pub fn build(&self) -> Result<Ontology, EngineError> {
        let mut ontology = Ontology::default();
        for rule in &self.rules {
            ontology = ontology.with_rule(PatternRule::new(&rule.pattern, rule.desc.as_deref())?);
        }
        for (name, child) in &self.children {
            ontology = ontology.with_child(name, child.build()?);
        }
        Ok(ontology)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob patterns for `discover`; `~` and `$VARS` are expanded.
    pub inputs: Vec<String>,
    pub engine: EngineConfig,
    pub ontology: OntologySpec,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

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
        let config_dir = shellexpand::tilde("~/.config/spantree");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands and globs every input pattern, in pattern order.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = vec![];
        for pattern in &self.inputs {
            let expanded = Self::expand_pattern(pattern);
            let paths = glob::glob(&expanded).map_err(|source| ConfigError::InputPatternError {
                pattern: pattern.clone(),
                source,
            })?;
            for path in paths {
                files.push(path?);
            }
        }
        Ok(files)
    }

    fn expand_pattern(pattern: &str) -> String {
        match shellexpand::full(pattern) {
            Ok(expanded) => expanded.into_owned(),
            Err(_) => pattern.to_owned(),
        }
    }
}
