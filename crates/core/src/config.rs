//! Configuration file parsing for .faultline.toml

use crate::archetypes::Archetype;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Name of the configuration file
pub const CONFIG_FILE: &str = ".faultline.toml";

/// Main configuration structure for .faultline.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultlineConfig {
    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub clusters: ClustersConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub diff: DiffConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Paths to ignore (gitignore-style; `dir/` excludes a directory)
    #[serde(default = "default_ignore_paths")]
    pub paths: Vec<String>,

    /// Archetype ids to leave out of classification (e.g. `"hermit"`)
    #[serde(default)]
    pub archetypes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Correlate the graph with commit history
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Size of the commit window
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,

    /// Commits touching more functions than this do not count as co-changes
    #[serde(default = "default_max_functions_per_commit")]
    pub max_functions_per_commit: usize,

    /// Shared commits needed before two functions count as partners
    #[serde(default = "default_min_co_commits")]
    pub min_co_commits: usize,

    /// Cache raw history under .faultline-cache/
    #[serde(default = "default_true")]
    pub cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClustersConfig {
    /// Smallest cluster reported
    #[serde(default = "default_min_cluster_size")]
    pub min_size: usize,

    /// Label propagation pass limit
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format ("terminal" or "json")
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable color output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Max items per terminal section (0 = unlimited)
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Exit non-zero from `faultline diff` when any function is stressed
    #[serde(default)]
    pub fail_on_stressed: bool,
}

// Default functions
fn default_true() -> bool {
    true
}

fn default_max_commits() -> usize {
    300
}

fn default_max_functions_per_commit() -> usize {
    50
}

fn default_min_co_commits() -> usize {
    3
}

fn default_min_cluster_size() -> usize {
    crate::clusters::DEFAULT_MIN_SIZE
}

fn default_max_iterations() -> usize {
    crate::clusters::DEFAULT_MAX_ITERATIONS
}

fn default_format() -> String {
    "terminal".to_string()
}

fn default_max_items() -> usize {
    15
}

fn default_ignore_paths() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        "vendor/".to_string(),
        "dist/".to_string(),
        "build/".to_string(),
        "out/".to_string(),
        "coverage/".to_string(),
        ".next/".to_string(),
        ".git/".to_string(),
        "*.min.js".to_string(),
        "*.d.ts".to_string(),
        ".faultline-cache/".to_string(),
    ]
}

impl Default for FaultlineConfig {
    fn default() -> Self {
        Self {
            ignore: IgnoreConfig::default(),
            git: GitConfig::default(),
            clusters: ClustersConfig::default(),
            output: OutputConfig::default(),
            diff: DiffConfig::default(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            paths: default_ignore_paths(),
            archetypes: Vec::new(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_commits: default_max_commits(),
            max_functions_per_commit: default_max_functions_per_commit(),
            min_co_commits: default_min_co_commits(),
            cache: true,
        }
    }
}

impl Default for ClustersConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_cluster_size(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: true,
            max_items: default_max_items(),
        }
    }
}

impl FaultlineConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: FaultlineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Find and load .faultline.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Archetypes listed under `[ignore] archetypes`. Unknown ids are
    /// reported and skipped.
    pub fn disabled_archetypes(&self) -> Vec<Archetype> {
        self.ignore
            .archetypes
            .iter()
            .filter_map(|id| {
                let parsed = Archetype::parse(id);
                if parsed.is_none() {
                    warn!("unknown archetype '{}' in [ignore] archetypes", id);
                }
                parsed
            })
            .collect()
    }
}
