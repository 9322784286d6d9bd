//! Shared test utilities for the elicit-gen test suite.
//!
//! Provides small in-memory sources, a project writer that lays them out in
//! a temp directory, and fixed banner values so rendered text is
//! deterministic.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
//! let report = generate_at(tmp.path(), &config, TEST_TIMESTAMP.into()).unwrap();
//! ```

use std::fs;
use std::path::Path;

use crate::config::GenConfig;
use crate::fingerprint::Fingerprint;
use crate::render::Banner;
use crate::source::MethodRow;

// =========================================================================
// Sources
// =========================================================================

/// Three methods over two categories; method 1 flagged for verify.
pub const SMALL_CSV: &str = "\
num,category,method_name,description,output_pattern,primary_verify,primary_discover
1,A,First Method,Checks the first thing,input → check,yes,no
2,A,Second Method,Checks the second thing,input → verdict,no,
3,B,Third Method,Explores the third thing,question → insight,,
";

/// Pools plus one plain role and one domain role.
pub const MAPPING_YAML: &str = "\
primary:
  verify: [1]
  discover: [3]
roles:
  - id: reviewer
    name: Reviewer
    description: Quality review set
    methods: [1, 2]
  - id: fintech
    name: FinTech Domain
    verify: [1]
    discover: [3]
";

pub const CUSTOM_LISTS_YAML: &str = "\
lists:
  - id: core-review
    name: Core Review
    description: Daily review set
    methods: [2, 1]
";

/// A fully populated row; tests blank out fields to provoke errors.
pub fn row(num: u32, category: &str, name: &str, line: usize) -> MethodRow {
    MethodRow {
        line,
        num: num.to_string(),
        category: category.to_string(),
        method_name: name.to_string(),
        description: format!("{name} description"),
        output_pattern: "input → output".to_string(),
        ..Default::default()
    }
}

// =========================================================================
// Projects
// =========================================================================

/// Stock config with the data directory at `data/`.
pub fn test_config() -> GenConfig {
    GenConfig {
        data_dir: "data".to_string(),
        ..Default::default()
    }
}

/// Write sources into `root/data/` and return the matching config.
///
/// `None` leaves the file out entirely.
pub fn write_project(
    root: &Path,
    csv: &str,
    mapping: Option<&str>,
    custom_lists: Option<&str>,
) -> GenConfig {
    let config = test_config();
    let data = config.data_path(root);
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join(&config.sources.methods), csv).unwrap();
    if let Some(mapping) = mapping {
        fs::write(data.join(&config.sources.mapping), mapping).unwrap();
    }
    if let Some(custom) = custom_lists {
        fs::write(data.join(&config.sources.custom_lists), custom).unwrap();
    }
    config
}

// =========================================================================
// Banner values
// =========================================================================

pub const TEST_TIMESTAMP: &str = "2026-01-01T00:00:00.000Z";

pub fn test_fingerprint() -> Fingerprint {
    Fingerprint::parse("1a2b3c4d").unwrap()
}

pub fn test_banner() -> Banner {
    Banner {
        generated_at: TEST_TIMESTAMP.to_string(),
        sources: vec!["methods.csv".to_string(), "mapping.yaml".to_string()],
        fingerprint: test_fingerprint(),
    }
}
