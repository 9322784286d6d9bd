//! Validated method lookup and grouping.
//!
//! A [`MethodTable`] is built only after validation passes. It keeps the
//! source order for category documents and an index by number for pool and
//! list documents.

use crate::source::MethodRow;
use crate::types::{Badge, ListConfig, Method};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: Vec<Method>,
    by_num: HashMap<u32, usize>,
}

impl MethodTable {
    /// Promote rows into methods. Rows without a valid number are skipped
    /// and, on duplicate numbers, the first occurrence wins.
    pub fn from_rows(rows: &[MethodRow]) -> Self {
        let mut table = Self::default();
        for row in rows {
            let Some(num) = row.parsed_num() else {
                continue;
            };
            if table.by_num.contains_key(&num) {
                continue;
            }
            table.by_num.insert(num, table.methods.len());
            table.methods.push(Method {
                num,
                category: row.category.clone(),
                method_name: row.method_name.clone(),
                description: row.description.clone(),
                output_pattern: row.output_pattern.clone(),
                line: row.line,
            });
        }
        table
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn get(&self, num: u32) -> Option<&Method> {
        self.by_num.get(&num).map(|&i| &self.methods[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    /// Resolve a sequence of numbers, preserving its order.
    pub fn resolve<'a>(&'a self, nums: &'a [u32]) -> impl Iterator<Item = &'a Method> + 'a {
        nums.iter().filter_map(|n| self.get(*n))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.iter()
            .map(|m| m.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Methods grouped by category, groups in first-seen order and methods in
    /// source order within each group.
    pub fn by_category(&self) -> Vec<(&str, Vec<&Method>)> {
        self.categories()
            .into_iter()
            .map(|category| {
                let members = self.iter().filter(|m| m.category == category).collect();
                (category, members)
            })
            .collect()
    }
}

/// Badges a method earns from pool membership.
pub fn badges_for(num: u32, lists: &ListConfig) -> BTreeSet<Badge> {
    let mut badges = BTreeSet::new();
    if lists.primary.verify.contains(&num) {
        badges.insert(Badge::Verify);
    }
    if lists.primary.discover.contains(&num) {
        badges.insert(Badge::Discover);
    }
    if let Some(quick) = &lists.quick {
        if quick.verify.contains(&num) {
            badges.insert(Badge::QuickVerify);
        }
        if quick.discover.contains(&num) {
            badges.insert(Badge::QuickDiscover);
        }
    }
    badges
}

/// Render a badge set as ` [V][D]`, or an empty string when there are none.
pub fn badge_suffix(badges: &BTreeSet<Badge>) -> String {
    if badges.is_empty() {
        return String::new();
    }
    let tags: String = badges.iter().map(|b| b.tag()).collect();
    format!(" {tags}")
}
