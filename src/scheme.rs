//! Scheme adapters: raw sources → canonical [`ListConfig`].
//!
//! The methods table has carried pool membership in three shapes over time:
//!
//! | Scheme | Pools from | Roles | Custom lists |
//! |--------|-----------|-------|--------------|
//! | `flags` | `primary_verify` / `primary_discover` CSV columns | none | none |
//! | `mapping` | `mapping.yaml` (`primary`, `quick`) | `mapping.yaml` | none |
//! | `lists` | `mapping.yaml` | `mapping.yaml` | `custom_lists.yaml` |
//!
//! Each adapter fills the same canonical structure, so validation and
//! rendering never branch on the scheme. Adapters do not judge the data:
//! dangling references and malformed ids pass through untouched for the
//! validator to report.

use crate::config::Scheme;
use crate::source::{MethodRow, Sources};
use crate::types::{ListConfig, Pools};

/// CSV column marking membership in the verify pool (flags scheme).
pub const VERIFY_FLAG: &str = "primary_verify";
/// CSV column marking membership in the discover pool (flags scheme).
pub const DISCOVER_FLAG: &str = "primary_discover";

/// Build the canonical list configuration for a scheme.
pub fn adapt(scheme: Scheme, sources: &Sources) -> ListConfig {
    match scheme {
        Scheme::Flags => from_flags(&sources.methods),
        Scheme::Mapping => from_mapping(sources, false),
        Scheme::Lists => from_mapping(sources, true),
    }
}

/// Whether a flag cell marks membership (`yes`, case-insensitive).
pub fn flag_set(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}

fn from_flags(rows: &[MethodRow]) -> ListConfig {
    let pool = |column: &str| -> Vec<u32> {
        rows.iter()
            .filter(|r| flag_set(r.field(column)))
            .filter_map(MethodRow::parsed_num)
            .collect()
    };
    ListConfig {
        primary: Pools {
            verify: pool(VERIFY_FLAG),
            discover: pool(DISCOVER_FLAG),
        },
        ..Default::default()
    }
}

fn from_mapping(sources: &Sources, with_custom_lists: bool) -> ListConfig {
    let mut config = ListConfig::default();
    if let Some(mapping) = &sources.mapping {
        config.primary = mapping.primary.clone();
        config.quick = mapping.quick.clone();
        config.roles = mapping.roles.clone();
        config.categories = mapping.categories.clone();
    }
    if with_custom_lists && let Some(custom) = &sources.custom_lists {
        config.custom_lists = custom.lists.clone();
    }
    config
}
