//! Generator configuration module.
//!
//! Handles loading, validating, and merging `elicit.toml`. The file is
//! optional: stock defaults describe the standard layout, and a project only
//! overrides the keys it cares about.
//!
//! ## Config File Location
//!
//! Place `elicit.toml` in the project root:
//!
//! ```text
//! project/
//! ├── elicit.toml                                   # Optional overrides
//! └── src/core/workflows/advanced-elicitation/      # data_dir
//!     ├── methods.csv
//!     ├── mapping.yaml
//!     └── custom_lists.yaml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data_dir = "src/core/workflows/advanced-elicitation"
//! scheme = "lists"              # flags | mapping | lists
//!
//! [sources]
//! methods = "methods.csv"
//! mapping = "mapping.yaml"
//! custom_lists = "custom_lists.yaml"
//!
//! [output]
//! primary_verify = "primary_verify.md"
//! primary_discover = "primary_discover.md"
//! categories_dir = "ae_by_categories"
//! roles_dir = "ae_by_roles"
//! user_lists = "ae_user_lists.md"
//! category_index = true
//! role_index = true
//!
//! [limits]
//! pool_min = 10                 # Advisory primary pool size range
//! pool_max = 25
//! list_max = 10                 # Advisory custom list size
//!
//! [processing]
//! max_processes = 4             # Max render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file in the project root.
pub const CONFIG_FILENAME: &str = "elicit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which generation scheme the sources follow.
///
/// All three schemes feed the same canonical list model; they differ only in
/// which files are read and where pool membership comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// Pools come from `primary_verify` / `primary_discover` CSV columns.
    Flags,
    /// Pools, quick pools and roles come from a mandatory mapping YAML.
    Mapping,
    /// As `Mapping`, plus an optional custom lists YAML.
    #[default]
    Lists,
}

impl Scheme {
    pub fn reads_mapping(self) -> bool {
        matches!(self, Scheme::Mapping | Scheme::Lists)
    }

    pub fn reads_custom_lists(self) -> bool {
        matches!(self, Scheme::Lists)
    }
}

/// Generator configuration loaded from `elicit.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Data directory, relative to the project root. Sources are read from it
    /// and generated documents are written into it.
    pub data_dir: String,
    pub scheme: Scheme,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub limits: LimitsConfig,
    pub processing: ProcessingConfig,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            data_dir: "src/core/workflows/advanced-elicitation".to_string(),
            scheme: Scheme::default(),
            sources: SourcesConfig::default(),
            output: OutputConfig::default(),
            limits: LimitsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GenConfig {
    /// Absolute data directory for a project root.
    pub fn data_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation("data_dir must not be empty".into()));
        }
        if self.limits.pool_min > self.limits.pool_max {
            return Err(ConfigError::Validation(
                "limits.pool_min must not exceed limits.pool_max".into(),
            ));
        }
        if self.limits.list_max == 0 {
            return Err(ConfigError::Validation(
                "limits.list_max must be non-zero".into(),
            ));
        }
        let names = [
            ("sources.methods", &self.sources.methods),
            ("sources.mapping", &self.sources.mapping),
            ("sources.custom_lists", &self.sources.custom_lists),
            ("output.primary_verify", &self.output.primary_verify),
            ("output.primary_discover", &self.output.primary_discover),
            ("output.categories_dir", &self.output.categories_dir),
            ("output.roles_dir", &self.output.roles_dir),
            ("output.user_lists", &self.output.user_lists),
        ];
        for (key, value) in names {
            if !is_plain_file_name(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain file name, got '{value}'"
                )));
            }
        }
        // Every source and output occupies its own entry in the data dir.
        // Compared case-insensitively for case-insensitive filesystems.
        let mut claimed: HashMap<String, &str> = HashMap::new();
        for (key, value) in names {
            if let Some(first) = claimed.insert(value.trim().to_lowercase(), key) {
                return Err(ConfigError::Validation(format!(
                    "{key} and {first} must differ, both are '{value}'"
                )));
            }
        }
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Source file names inside the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub methods: String,
    pub mapping: String,
    pub custom_lists: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            methods: "methods.csv".to_string(),
            mapping: "mapping.yaml".to_string(),
            custom_lists: "custom_lists.yaml".to_string(),
        }
    }
}

/// Generated document names inside the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub primary_verify: String,
    pub primary_discover: String,
    pub categories_dir: String,
    pub roles_dir: String,
    /// Aggregate document holding every custom list.
    pub user_lists: String,
    /// Write `_index.md` into the categories directory.
    pub category_index: bool,
    /// Write `_index.md` into the roles directory.
    pub role_index: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            primary_verify: "primary_verify.md".to_string(),
            primary_discover: "primary_discover.md".to_string(),
            categories_dir: "ae_by_categories".to_string(),
            roles_dir: "ae_by_roles".to_string(),
            user_lists: "ae_user_lists.md".to_string(),
            category_index: true,
            role_index: true,
        }
    }
}

/// Advisory size bounds. Violations produce warnings, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub pool_min: usize,
    pub pool_max: usize,
    pub list_max: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            pool_min: 10,
            pool_max: 25,
            list_max: 10,
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GenConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `elicit.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GenConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GenConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `elicit.toml` in the project root, falling back to stock
/// defaults when the file is absent.
pub fn load_config(root: &Path) -> Result<GenConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    if overlay.is_none() {
        tracing::debug!(root = %root.display(), "no elicit.toml, using stock defaults");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `elicit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# elicit-gen Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Directory (relative to the project root) holding the sources. Generated
# documents are written into the same directory.
data_dir = "src/core/workflows/advanced-elicitation"

# Where pool and list membership comes from:
#   flags   - primary_verify / primary_discover columns in methods.csv
#   mapping - methods.csv + mapping.yaml (pools, quick pools, roles)
#   lists   - mapping + optional custom_lists.yaml
scheme = "lists"

# ---------------------------------------------------------------------------
# Source files (inside data_dir)
# ---------------------------------------------------------------------------
[sources]
methods = "methods.csv"
mapping = "mapping.yaml"
custom_lists = "custom_lists.yaml"

# ---------------------------------------------------------------------------
# Generated documents (inside data_dir)
# ---------------------------------------------------------------------------
[output]
primary_verify = "primary_verify.md"
primary_discover = "primary_discover.md"
categories_dir = "ae_by_categories"
roles_dir = "ae_by_roles"

# Single document aggregating every custom list.
user_lists = "ae_user_lists.md"

# Write an _index.md cross-reference into the category / role directories.
category_index = true
role_index = true

# ---------------------------------------------------------------------------
# Advisory limits (violations are warnings, never errors)
# ---------------------------------------------------------------------------
[limits]
pool_min = 10
pool_max = 25
list_max = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_standard_layout() {
        let config = GenConfig::default();
        assert_eq!(config.data_dir, "src/core/workflows/advanced-elicitation");
        assert_eq!(config.scheme, Scheme::Lists);
        assert_eq!(config.sources.methods, "methods.csv");
        assert_eq!(config.output.categories_dir, "ae_by_categories");
    }

    #[test]
    fn default_limits() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.pool_min, 10);
        assert_eq!(limits.pool_max, 25);
        assert_eq!(limits.list_max, 10);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
scheme = "flags"

[limits]
pool_max = 15
"#;
        let config: GenConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scheme, Scheme::Flags);
        assert_eq!(config.limits.pool_max, 15);
        // Defaults preserved
        assert_eq!(config.limits.pool_min, 10);
        assert_eq!(config.output.primary_verify, "primary_verify.md");
    }

    #[test]
    fn scheme_capabilities() {
        assert!(!Scheme::Flags.reads_mapping());
        assert!(Scheme::Mapping.reads_mapping());
        assert!(!Scheme::Mapping.reads_custom_lists());
        assert!(Scheme::Lists.reads_custom_lists());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.scheme, Scheme::Lists);
        assert_eq!(config.limits.list_max, 10);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
data_dir = "data"

[output]
roles_dir = "by_role"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.output.roles_dir, "by_role");
        assert_eq!(config.output.categories_dir, "ae_by_categories");
        assert_eq!(config.data_path(tmp.path()), tmp.path().join("data"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<GenConfig, _> = toml::from_str("[limits]\npool_mx = 3\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_scheme_rejected() {
        let result: Result<GenConfig, _> = toml::from_str(r#"scheme = "roles""#);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(GenConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_pool_range_inverted() {
        let mut config = GenConfig::default();
        config.limits.pool_min = 30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pool_min"));
    }

    #[test]
    fn validate_list_max_zero() {
        let mut config = GenConfig::default();
        config.limits.list_max = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_nested_output_names() {
        let mut config = GenConfig::default();
        config.output.primary_verify = "../primary_verify.md".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.primary_verify"));
    }

    #[test]
    fn validate_rejects_shared_family_dir() {
        let mut config = GenConfig::default();
        config.output.roles_dir = config.output.categories_dir.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.roles_dir and output.categories_dir"));
    }

    #[test]
    fn validate_rejects_output_shadowing_source() {
        let mut config = GenConfig::default();
        config.output.primary_discover = "mapping.yaml".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(
            err.to_string()
                .contains("output.primary_discover and sources.mapping must differ")
        );
    }

    #[test]
    fn validate_rejects_outputs_sharing_a_file() {
        let mut config = GenConfig::default();
        config.output.user_lists = config.output.primary_verify.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.user_lists and output.primary_verify"));
    }

    #[test]
    fn validate_rejects_names_differing_only_by_case() {
        let mut config = GenConfig::default();
        config.output.roles_dir = "AE_BY_CATEGORIES".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[limits]\nlist_max = 0\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[limits]\npool_min = 10\npool_max = 25\n").unwrap();
        let overlay: toml::Value = toml::from_str("[limits]\npool_max = 15\n").unwrap();
        let merged = merge_toml(base, overlay);
        let limits = merged.get("limits").unwrap();
        assert_eq!(limits.get("pool_max").unwrap().as_integer(), Some(15));
        assert_eq!(limits.get("pool_min").unwrap().as_integer(), Some(10));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"scheme = "lists""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"scheme = "flags""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("scheme").unwrap().as_str(), Some("flags"));
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(None).unwrap();
        assert_eq!(config.output.user_lists, "ae_user_lists.md");
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: GenConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = GenConfig::default();
        assert_eq!(config.data_dir, defaults.data_dir);
        assert_eq!(config.scheme, defaults.scheme);
        assert_eq!(config.output.roles_dir, defaults.output.roles_dir);
        assert_eq!(config.limits.pool_max, defaults.limits.pool_max);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[sources]", "[output]", "[limits]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
