//! Shared types used across all pipeline stages.
//!
//! Every scheme adapter produces a [`ListConfig`]; the validator and the
//! renderers only ever see this canonical form.

use serde::{Deserialize, Serialize};

/// One elicitation method, promoted from a validated CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub num: u32,
    pub category: String,
    pub method_name: String,
    pub description: String,
    pub output_pattern: String,
    /// 1-based physical line in the CSV (header is line 1).
    pub line: usize,
}

/// The two flagship pools, each an ordered sequence of method numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pools {
    pub verify: Vec<u32>,
    pub discover: Vec<u32>,
}

/// A named grouping of methods rendered as its own document or section.
///
/// Either `methods` is used (a plain list) or `verify`/`discover` are
/// (a domain list); the validator rejects lists that mix the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verify: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discover: Vec<u32>,
}

impl NamedList {
    pub fn is_domain(&self) -> bool {
        !self.verify.is_empty() || !self.discover.is_empty()
    }

    /// Number of method references the list exposes, across all sequences.
    pub fn method_count(&self) -> usize {
        self.methods.len() + self.verify.len() + self.discover.len()
    }

    /// Labeled sequences in render order: `("methods", ..)` for a plain
    /// list, `("verify", ..)` then `("discover", ..)` for a domain list.
    pub fn sequences(&self) -> Vec<(&'static str, &[u32])> {
        let mut seqs = Vec::new();
        if !self.methods.is_empty() {
            seqs.push(("methods", self.methods.as_slice()));
        }
        if !self.verify.is_empty() {
            seqs.push(("verify", self.verify.as_slice()));
        }
        if !self.discover.is_empty() {
            seqs.push(("discover", self.discover.as_slice()));
        }
        seqs
    }
}

/// Optional display metadata for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryMeta {
    pub category: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub when_to_use: String,
}

/// Canonical list/mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConfig {
    pub primary: Pools,
    /// Quick-recommended pools (mapping schemes only).
    pub quick: Option<Pools>,
    pub roles: Vec<NamedList>,
    pub custom_lists: Vec<NamedList>,
    pub categories: Vec<CategoryMeta>,
}

impl ListConfig {
    pub fn category_meta(&self, category: &str) -> Option<&CategoryMeta> {
        self.categories.iter().find(|m| m.category == category)
    }
}

/// Membership marker rendered next to a method in category documents.
///
/// Ordering is the render order, so a badge set always renders the same way
/// no matter how it was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Badge {
    Verify,
    Discover,
    QuickVerify,
    QuickDiscover,
}

impl Badge {
    pub fn tag(self) -> &'static str {
        match self {
            Badge::Verify => "[V]",
            Badge::Discover => "[D]",
            Badge::QuickVerify => "[QV]",
            Badge::QuickDiscover => "[QD]",
        }
    }
}
