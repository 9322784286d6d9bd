//! Freshness checking.
//!
//! Answers "is the generated output stale?" without rendering anything. The
//! current fingerprint is recomputed from the source bytes and compared with
//! the one recorded in the header of the primary verify document.
//!
//! The check is a query: it never writes and never fails. Unreadable sources,
//! a missing document or a header without a recognizable hash all produce
//! [`FreshnessStatus::Unknown`] with a reason.

use crate::config::GenConfig;
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::source;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static RECORDED_HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^<!-- SOURCE: .* \(hash: ([0-9a-f]{8})\) -->$").expect("hash pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
    Fresh,
    Stale,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessReport {
    pub status: FreshnessStatus,
    pub reason: String,
    pub current_hash: Option<Fingerprint>,
    pub recorded_hash: Option<Fingerprint>,
}

impl FreshnessReport {
    pub fn is_fresh(&self) -> bool {
        self.status == FreshnessStatus::Fresh
    }

    fn unknown(reason: String, current_hash: Option<Fingerprint>) -> Self {
        Self {
            status: FreshnessStatus::Unknown,
            reason,
            current_hash,
            recorded_hash: None,
        }
    }
}

/// The leading run of `<!-- ... -->` lines.
fn header_block(document: &str) -> String {
    document
        .lines()
        .map(str::trim_end)
        .take_while(|line| line.starts_with("<!--"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the recorded fingerprint from a generated document's header.
///
/// Only the banner's `SOURCE:` line counts; `hash:` text in the body is
/// ignored.
pub fn recorded_fingerprint(document: &str) -> Option<Fingerprint> {
    RECORDED_HASH
        .captures(&header_block(document))
        .and_then(|c| c.get(1))
        .and_then(|m| Fingerprint::parse(m.as_str()))
}

/// Compare the current source fingerprint with the recorded one.
pub fn check(root: &Path, config: &GenConfig) -> FreshnessReport {
    let data_dir = config.data_path(root);

    let current = match source::read_source_files(&data_dir, config) {
        Ok(files) => fingerprint(&files),
        Err(e) => {
            tracing::debug!(error = %e, "sources unreadable");
            return FreshnessReport::unknown(format!("Sources unreadable: {e}"), None);
        }
    };

    let doc_path = data_dir.join(&config.output.primary_verify);
    let document = match fs::read_to_string(&doc_path) {
        Ok(text) => text,
        Err(e) => {
            return FreshnessReport::unknown(
                format!("Cannot read {}: {e}", doc_path.display()),
                Some(current),
            );
        }
    };

    let Some(recorded) = recorded_fingerprint(&document) else {
        return FreshnessReport::unknown(
            format!("No source hash found in {}", config.output.primary_verify),
            Some(current),
        );
    };

    let report = if recorded == current {
        FreshnessReport {
            status: FreshnessStatus::Fresh,
            reason: "Generated files are up to date".to_string(),
            current_hash: Some(current),
            recorded_hash: Some(recorded),
        }
    } else {
        FreshnessReport {
            status: FreshnessStatus::Stale,
            reason: format!("Source changed since last generation ({recorded} → {current})"),
            current_hash: Some(current),
            recorded_hash: Some(recorded),
        }
    };
    tracing::debug!(status = ?report.status, "freshness checked");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate_at;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn recorded_fingerprint_from_banner() {
        let doc = "<!-- GENERATED: x -->\n<!-- SOURCE: methods.csv (hash: 0badf00d) -->\n# Title\n";
        assert_eq!(recorded_fingerprint(doc).unwrap().as_str(), "0badf00d");
    }

    #[test]
    fn recorded_fingerprint_absent() {
        assert!(recorded_fingerprint("# Hand written\n").is_none());
        assert!(recorded_fingerprint("hash: XYZ").is_none());
    }

    #[test]
    fn recorded_fingerprint_ignores_body_text() {
        let doc = "# Primary Verify Methods\n\n### #1 Hashing\nCompute hash: deadbeef of input\n";
        assert!(recorded_fingerprint(doc).is_none());
    }

    #[test]
    fn recorded_fingerprint_rejects_long_hex() {
        let doc = "<!-- GENERATED: x -->\n<!-- SOURCE: methods.csv (hash: 0badf00d1) -->\n";
        assert!(recorded_fingerprint(doc).is_none());
    }

    #[test]
    fn recorded_fingerprint_only_in_leading_comments() {
        let doc = "# Title\n<!-- SOURCE: methods.csv (hash: 0badf00d) -->\n";
        assert!(recorded_fingerprint(doc).is_none());
    }

    #[test]
    fn recorded_fingerprint_tolerates_crlf() {
        let doc = "<!-- GENERATED: x -->\r\n<!-- SOURCE: methods.csv (hash: 0badf00d) -->\r\n# Title\r\n";
        assert_eq!(recorded_fingerprint(doc).unwrap().as_str(), "0badf00d");
    }

    #[test]
    fn unknown_when_hash_only_in_body() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
        fs::write(
            config.data_path(tmp.path()).join("primary_verify.md"),
            "# Primary Verify Methods\n\nCompute hash: deadbeef of input\n",
        )
        .unwrap();

        let report = check(tmp.path(), &config);
        assert_eq!(report.status, FreshnessStatus::Unknown);
        assert!(report.recorded_hash.is_none());
    }

    #[test]
    fn fresh_after_generation() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), Some(CUSTOM_LISTS_YAML));
        let generated = generate_at(tmp.path(), &config, TEST_TIMESTAMP.into()).unwrap();

        let report = check(tmp.path(), &config);
        assert_eq!(report.status, FreshnessStatus::Fresh);
        assert_eq!(report.current_hash.as_ref(), Some(&generated.fingerprint));
        assert_eq!(report.recorded_hash, report.current_hash);
    }

    #[test]
    fn stale_after_source_byte_changes() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
        generate_at(tmp.path(), &config, TEST_TIMESTAMP.into()).unwrap();

        let csv = config.data_path(tmp.path()).join("methods.csv");
        let mut bytes = fs::read(&csv).unwrap();
        bytes.push(b'\n');
        fs::write(&csv, bytes).unwrap();

        let report = check(tmp.path(), &config);
        assert_eq!(report.status, FreshnessStatus::Stale);
        assert_ne!(report.current_hash, report.recorded_hash);
        assert!(report.recorded_hash.is_some());
    }

    #[test]
    fn adding_optional_source_makes_output_stale() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
        generate_at(tmp.path(), &config, TEST_TIMESTAMP.into()).unwrap();

        fs::write(
            config.data_path(tmp.path()).join("custom_lists.yaml"),
            CUSTOM_LISTS_YAML,
        )
        .unwrap();

        assert_eq!(check(tmp.path(), &config).status, FreshnessStatus::Stale);
    }

    #[test]
    fn unknown_when_never_generated() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);

        let report = check(tmp.path(), &config);
        assert_eq!(report.status, FreshnessStatus::Unknown);
        assert!(report.current_hash.is_some());
        assert!(report.recorded_hash.is_none());
        assert!(report.reason.contains("primary_verify.md"));
    }

    #[test]
    fn unknown_when_sources_missing() {
        let tmp = TempDir::new().unwrap();
        let report = check(tmp.path(), &test_config());
        assert_eq!(report.status, FreshnessStatus::Unknown);
        assert!(report.current_hash.is_none());
        assert!(report.reason.starts_with("Sources unreadable"));
    }

    #[test]
    fn unknown_when_header_lacks_hash() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
        fs::write(
            config.data_path(tmp.path()).join("primary_verify.md"),
            "# Edited by hand\n",
        )
        .unwrap();

        let report = check(tmp.path(), &config);
        assert_eq!(report.status, FreshnessStatus::Unknown);
        assert!(report.reason.contains("No source hash"));
    }

    #[test]
    fn check_never_writes() {
        let tmp = TempDir::new().unwrap();
        let config = write_project(tmp.path(), SMALL_CSV, Some(MAPPING_YAML), None);
        check(tmp.path(), &config);
        assert!(!config.data_path(tmp.path()).join("primary_verify.md").exists());
        assert!(!config.data_path(tmp.path()).join("ae_by_categories").exists());
    }
}
