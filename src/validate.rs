//! Source validation.
//!
//! A pure pass over the raw method rows and the canonical list configuration.
//! Problems are accumulated rather than returned on first sight, so a single
//! run reports everything that needs fixing.
//!
//! ## Rules
//!
//! Errors (block generation):
//! - required fields non-empty, `num` a positive integer, `num` unique
//! - category usable as a file stem, and not differing from another only by
//!   case
//! - flag columns (`primary_verify`, `primary_discover`) are `yes`, `no` or empty
//! - every method number in pools, roles and custom lists exists
//! - list ids match `^[a-z0-9]+(-[a-z0-9]+)*$` and are unique per namespace
//!   (case-insensitive)
//! - lists have a display name, expose at least one method, and do not mix
//!   `methods` with `verify`/`discover`
//!
//! Warnings (never block):
//! - primary pool size outside `limits.pool_min..=limits.pool_max`
//! - custom list larger than `limits.list_max`
//! - a method repeated within one sequence
//! - category metadata for a category that has no methods

use crate::config::LimitsConfig;
use crate::naming;
use crate::scheme::{DISCOVER_FLAG, VERIFY_FLAG};
use crate::source::{MethodRow, REQUIRED_COLUMNS};
use crate::types::{ListConfig, NamedList};
use std::collections::{HashMap, HashSet};

/// Accumulated validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate rows and list configuration.
pub fn validate(rows: &[MethodRow], lists: &ListConfig, limits: &LimitsConfig) -> Validation {
    let mut v = Validation::default();

    let known = check_rows(rows, &mut v);
    check_references(lists, &known, &mut v);
    check_list_ids("roles", &lists.roles, &mut v);
    check_list_ids("lists", &lists.custom_lists, &mut v);
    check_list_shapes("roles", &lists.roles, &mut v);
    check_list_shapes("lists", &lists.custom_lists, &mut v);
    check_advisories(rows, lists, limits, &mut v);

    v
}

/// Per-row checks. Returns the set of method numbers that resolve.
fn check_rows(rows: &[MethodRow], v: &mut Validation) -> HashSet<u32> {
    let mut known = HashSet::new();
    let mut category_stems: HashMap<String, &str> = HashMap::new();

    for row in rows {
        let line = row.line;

        if let Some(num) = row.parsed_num()
            && !known.insert(num)
        {
            v.errors.push(format!("Duplicate num: {num} at line {line}"));
        }

        for field in REQUIRED_COLUMNS {
            if row.field(field).trim().is_empty() {
                v.errors.push(format!("Missing {field} at line {line}"));
            }
        }

        if !row.num.is_empty() && row.parsed_num().is_none() {
            v.errors
                .push(format!("Invalid num '{}' at line {line}", row.num));
        }

        if !row.category.is_empty() && !naming::is_safe_file_stem(&row.category) {
            v.errors.push(format!(
                "Invalid category '{}' at line {line}: not usable as a file name",
                row.category
            ));
        }

        if !row.category.is_empty() {
            let first = *category_stems
                .entry(naming::category_key(&row.category))
                .or_insert(row.category.as_str());
            if first != row.category {
                v.errors.push(format!(
                    "Category '{}' at line {line} conflicts with '{first}': names differ only by case",
                    row.category
                ));
            }
        }

        for flag in [VERIFY_FLAG, DISCOVER_FLAG] {
            if let Some(value) = row.extra.get(flag)
                && !matches!(value.to_lowercase().as_str(), "yes" | "no" | "")
            {
                v.errors
                    .push(format!("Invalid {flag} value at line {line}: {value}"));
            }
        }
    }

    known
}

/// Every `(section, sequence)` pair in the list configuration.
fn sequences(lists: &ListConfig) -> Vec<(String, &[u32])> {
    let mut seqs: Vec<(String, &[u32])> = vec![
        ("primary.verify".to_string(), lists.primary.verify.as_slice()),
        ("primary.discover".to_string(), lists.primary.discover.as_slice()),
    ];
    if let Some(quick) = &lists.quick {
        seqs.push(("quick.verify".to_string(), quick.verify.as_slice()));
        seqs.push(("quick.discover".to_string(), quick.discover.as_slice()));
    }
    for (namespace, group) in [("roles", &lists.roles), ("lists", &lists.custom_lists)] {
        for list in group {
            for (label, nums) in list.sequences() {
                seqs.push((format!("{namespace}.{}.{label}", list.id), nums));
            }
        }
    }
    seqs
}

fn check_references(lists: &ListConfig, known: &HashSet<u32>, v: &mut Validation) {
    for (section, nums) in sequences(lists) {
        for num in nums {
            if !known.contains(num) {
                v.errors.push(format!("{section}: unknown method #{num}"));
            }
        }
    }
}

fn check_list_ids(namespace: &str, lists: &[NamedList], v: &mut Validation) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for list in lists {
        if !naming::is_valid_list_id(&list.id) {
            v.errors.push(format!(
                "Invalid list id '{}' in {namespace}: use lowercase letters, digits and hyphens",
                list.id
            ));
        }
        let key = naming::list_id_key(&list.id);
        if let Some(first) = seen.get(&key) {
            v.errors.push(format!(
                "Duplicate list id '{}' in {namespace} (conflicts with '{first}')",
                list.id
            ));
        } else {
            seen.insert(key, list.id.as_str());
        }
    }
}

fn check_list_shapes(namespace: &str, lists: &[NamedList], v: &mut Validation) {
    for list in lists {
        let id = &list.id;
        if list.name.trim().is_empty() {
            v.errors.push(format!("{namespace}.{id}: missing name"));
        }
        if list.method_count() == 0 {
            v.errors.push(format!("{namespace}.{id}: list has no methods"));
        }
        if !list.methods.is_empty() && list.is_domain() {
            v.errors.push(format!(
                "{namespace}.{id}: cannot combine methods with verify/discover"
            ));
        }
    }
}

fn check_advisories(
    rows: &[MethodRow],
    lists: &ListConfig,
    limits: &LimitsConfig,
    v: &mut Validation,
) {
    let range = limits.pool_min..=limits.pool_max;
    for (name, pool) in [
        ("primary_verify", &lists.primary.verify),
        ("primary_discover", &lists.primary.discover),
    ] {
        if !range.contains(&pool.len()) {
            v.warnings.push(format!(
                "{name} count is {}, recommended: {}-{}",
                pool.len(),
                limits.pool_min,
                limits.pool_max
            ));
        }
    }

    for list in &lists.custom_lists {
        if list.method_count() > limits.list_max {
            v.warnings.push(format!(
                "lists.{}: {} methods, recommended at most {}",
                list.id,
                list.method_count(),
                limits.list_max
            ));
        }
    }

    for (section, nums) in sequences(lists) {
        let mut seen = HashSet::new();
        for num in nums {
            if !seen.insert(num) {
                v.warnings
                    .push(format!("{section}: method #{num} listed more than once"));
            }
        }
    }

    let categories: HashSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    for meta in &lists.categories {
        if !categories.contains(meta.category.as_str()) {
            v.warnings.push(format!(
                "Category '{}' has metadata but no methods",
                meta.category
            ));
        }
    }
}
