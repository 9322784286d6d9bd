//! # elicit-gen
//!
//! Generates the advanced-elicitation method documents from a single CSV
//! source of truth plus optional YAML list files, and answers whether the
//! generated documents are stale.
//!
//! # Architecture: Load, Validate, Render
//!
//! ```text
//! 1. Load       methods.csv + *.yaml  →  rows + list documents
//! 2. Adapt      scheme-specific shape  →  canonical ListConfig
//! 3. Validate   rows + ListConfig      →  errors (fatal) + warnings
//! 4. Render     MethodTable + banner   →  Markdown documents (pure, parallel)
//! 5. Write      per family: clean directory, write documents
//! ```
//!
//! Every fatal condition surfaces before step 5, so a failed run never
//! leaves a half-written output directory. Rendering is a pure function of
//! immutable inputs; families run concurrently on the rayon pool.
//!
//! The freshness check is a separate, read-only path: it fingerprints the
//! sources and compares against the hash recorded in the verify document.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Optional `elicit.toml` loading, merging over stock defaults, validation |
//! | [`source`] | Reads and parses the methods CSV and YAML list documents |
//! | [`scheme`] | Adapts the three historical data shapes onto one [`types::ListConfig`] |
//! | [`validate`] | Accumulates schema/reference errors and advisory warnings |
//! | [`catalog`] | Validated method table, category grouping, badges |
//! | [`fingerprint`] | 8-hex SHA-256 fingerprint over the source bytes |
//! | [`render`] | Pure Markdown renderers and the shared header banner |
//! | [`generate`] | Orchestrates a run: prepare, render, clean, write |
//! | [`freshness`] | Tri-state fresh/stale/unknown query |
//! | [`report`] | Generation report returned to the caller |
//! | [`output`] | CLI output formatting |
//! | [`types`] | Canonical method and list types |
//! | [`naming`] | List id rules and output file naming |
//!
//! # Design Decisions
//!
//! ## Categories Are Data
//!
//! Categories are discovered from the CSV in first-seen order. Adding one is
//! a data change: a new row with a new category value produces a new file.
//!
//! ## One Canonical List Model
//!
//! Pool membership has lived in CSV flag columns, in a mapping YAML with
//! roles, and in a mapping YAML plus user lists. [`scheme::adapt`] maps each
//! onto [`types::ListConfig`], so validation and rendering never branch on
//! the scheme in use.
//!
//! ## Fingerprints, Not Timestamps
//!
//! Staleness is decided by content. The fingerprint covers source bytes only,
//! so checkouts, copies and touched files do not make output look stale.

pub mod catalog;
pub mod config;
pub mod fingerprint;
pub mod freshness;
pub mod generate;
pub mod naming;
pub mod output;
pub mod render;
pub mod report;
pub mod scheme;
pub mod source;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
