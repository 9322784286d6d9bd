//! Generation report.
//!
//! A transient summary of one run: counts per family, the identifiers that
//! were rendered, the fingerprint, files touched and the advisory warnings.
//! It is returned to the caller and printed (or serialized with `--json`),
//! never persisted.

use crate::catalog::MethodTable;
use crate::config::Scheme;
use crate::fingerprint::Fingerprint;
use crate::types::ListConfig;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub methods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub scheme: Scheme,
    pub fingerprint: Fingerprint,
    pub sources: Vec<String>,
    pub total_methods: usize,
    pub primary_verify_count: usize,
    pub primary_discover_count: usize,
    pub category_count: usize,
    pub categories: Vec<CategorySummary>,
    pub role_count: usize,
    pub roles: Vec<String>,
    pub custom_list_count: usize,
    pub custom_lists: Vec<String>,
    /// Paths relative to the data directory, sorted.
    pub files_written: Vec<PathBuf>,
    /// Stale outputs deleted and not rewritten, sorted.
    pub files_removed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Accumulates report fields as the pipeline progresses.
///
/// Every setter is additive and [`build`](Self::build) cannot fail, so a
/// report is always available once generation succeeds.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    report: GenerationReport,
}

impl ReportBuilder {
    pub fn new(scheme: Scheme, fingerprint: Fingerprint, sources: Vec<String>) -> Self {
        Self {
            report: GenerationReport {
                scheme,
                fingerprint,
                sources,
                total_methods: 0,
                primary_verify_count: 0,
                primary_discover_count: 0,
                category_count: 0,
                categories: Vec::new(),
                role_count: 0,
                roles: Vec::new(),
                custom_list_count: 0,
                custom_lists: Vec::new(),
                files_written: Vec::new(),
                files_removed: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    pub fn methods(mut self, table: &MethodTable) -> Self {
        self.report.total_methods = table.len();
        self.report.categories = table
            .by_category()
            .into_iter()
            .map(|(category, members)| CategorySummary {
                category: category.to_string(),
                methods: members.len(),
            })
            .collect();
        self.report.category_count = self.report.categories.len();
        self
    }

    /// Pool sizes count only references that resolve in `table`.
    pub fn lists(mut self, lists: &ListConfig, table: &MethodTable) -> Self {
        self.report.primary_verify_count = table.resolve(&lists.primary.verify).count();
        self.report.primary_discover_count = table.resolve(&lists.primary.discover).count();
        self.report.roles = lists.roles.iter().map(|r| r.id.clone()).collect();
        self.report.role_count = self.report.roles.len();
        self.report.custom_lists = lists.custom_lists.iter().map(|l| l.id.clone()).collect();
        self.report.custom_list_count = self.report.custom_lists.len();
        self
    }

    pub fn warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.report.warnings.extend(warnings);
        self
    }

    pub fn written(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.report.files_written.extend(paths);
        self
    }

    pub fn removed(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.report.files_removed.extend(paths);
        self
    }

    pub fn build(mut self) -> GenerationReport {
        self.report.files_written.sort();
        self.report.files_written.dedup();
        self.report.files_removed.sort();
        self.report.files_removed.dedup();
        self.report
    }
}
