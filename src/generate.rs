//! Document generation.
//!
//! Orchestrates one generation run over the data directory:
//!
//! ```text
//! load → adapt → validate → fingerprint → render (parallel) → clean + write → report
//! ```
//!
//! Every fatal condition (unreadable source, syntax error, validation error)
//! is raised before the first output file is touched, so a failed run leaves
//! the previous output intact. Validation errors are accumulated and returned
//! together.
//!
//! ## Output Structure
//!
//! ```text
//! advanced-elicitation/
//! ├── primary_verify.md
//! ├── primary_discover.md
//! ├── ae_user_lists.md           # only when custom lists exist
//! ├── ae_by_categories/
//! │   ├── _index.md
//! │   ├── core.md
//! │   └── risk.md
//! └── ae_by_roles/
//!     ├── _index.md
//!     ├── architect.md
//!     └── fintech.md             # domain role: verify + discover sections
//! ```
//!
//! Family directories are owned by the generator: every `.md` file in them
//! is deleted before the family is written, so a category or role removed
//! from the sources disappears from the output.

use crate::catalog::MethodTable;
use crate::config::{ConfigError, GenConfig, OutputConfig, Scheme};
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::render::{Banner, Cleanup, RenderContext, RenderedFamily, render_all};
use crate::report::{GenerationReport, ReportBuilder};
use crate::scheme;
use crate::source::{self, SourceError, Sources};
use crate::types::ListConfig;
use crate::validate::{self, Validation};
use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Validation failed with {} error(s):\n  {}", .0.len(), .0.join("\n  "))]
    Validation(Vec<String>),
    #[error("Cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Validated inputs for one run, passed explicitly to every later stage.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub data_dir: PathBuf,
    pub scheme: Scheme,
    pub output: OutputConfig,
    pub source_names: Vec<String>,
    pub fingerprint: Fingerprint,
    pub lists: ListConfig,
    pub methods: MethodTable,
    pub warnings: Vec<String>,
}

/// Load and validate without writing anything.
///
/// Load failures are errors; validation problems are returned in the
/// [`Validation`] for the caller to display.
pub fn validate_sources(root: &Path, config: &GenConfig) -> Result<Validation, GenerateError> {
    let (_, lists, validation) = load_and_validate(root, config)?;
    tracing::debug!(roles = lists.roles.len(), lists = lists.custom_lists.len(), "validated");
    Ok(validation)
}

/// Build the generation context, failing on any load or validation error.
pub fn prepare(root: &Path, config: &GenConfig) -> Result<GenerationContext, GenerateError> {
    let (sources, lists, validation) = load_and_validate(root, config)?;
    if !validation.is_valid() {
        for error in &validation.errors {
            tracing::error!("{error}");
        }
        return Err(GenerateError::Validation(validation.errors));
    }

    let methods = MethodTable::from_rows(&sources.methods);
    let fingerprint = fingerprint(&sources.files);
    tracing::debug!(%fingerprint, methods = methods.len(), "sources fingerprinted");

    Ok(GenerationContext {
        data_dir: config.data_path(root),
        scheme: config.scheme,
        output: config.output.clone(),
        source_names: sources.file_names().into_iter().map(String::from).collect(),
        fingerprint,
        lists,
        methods,
        warnings: validation.warnings,
    })
}

fn load_and_validate(
    root: &Path,
    config: &GenConfig,
) -> Result<(Sources, ListConfig, Validation), GenerateError> {
    let data_dir = config.data_path(root);
    tracing::info!(data_dir = %data_dir.display(), scheme = ?config.scheme, "loading sources");

    let sources = source::load(&data_dir, config)?;
    let lists = scheme::adapt(config.scheme, &sources);
    let validation = validate::validate(&sources.methods, &lists, &config.limits);
    for warning in &validation.warnings {
        tracing::warn!("{warning}");
    }
    Ok((sources, lists, validation))
}

/// Current time in the banner's format.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run the full pipeline and write every document family.
pub fn generate(root: &Path, config: &GenConfig) -> Result<GenerationReport, GenerateError> {
    generate_at(root, config, timestamp_now())
}

/// [`generate`] with an explicit banner timestamp.
pub fn generate_at(
    root: &Path,
    config: &GenConfig,
    generated_at: String,
) -> Result<GenerationReport, GenerateError> {
    let ctx = prepare(root, config)?;
    let banner = Banner {
        generated_at,
        sources: ctx.source_names.clone(),
        fingerprint: ctx.fingerprint.clone(),
    };

    let families = render_all(RenderContext {
        methods: &ctx.methods,
        lists: &ctx.lists,
        banner: &banner,
        output: &ctx.output,
    });

    let outcomes = families
        .par_iter()
        .map(|family| write_family(&ctx.data_dir, family))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = ReportBuilder::new(ctx.scheme, ctx.fingerprint.clone(), ctx.source_names.clone())
        .methods(&ctx.methods)
        .lists(&ctx.lists, &ctx.methods)
        .warnings(ctx.warnings.clone());
    for outcome in outcomes {
        builder = builder.written(outcome.written).removed(outcome.removed);
    }
    let report = builder.build();

    tracing::info!(
        files = report.files_written.len(),
        removed = report.files_removed.len(),
        fingerprint = %report.fingerprint,
        "generation complete"
    );
    Ok(report)
}

/// Files touched by one family, relative to the data directory.
#[derive(Debug, Default)]
struct WriteOutcome {
    written: Vec<PathBuf>,
    removed: Vec<PathBuf>,
}

fn write_family(data_dir: &Path, family: &RenderedFamily) -> Result<WriteOutcome, GenerateError> {
    let deleted = match &family.cleanup {
        Cleanup::Nothing => Vec::new(),
        Cleanup::Directory(dir) => clean_directory(data_dir, dir)?,
        Cleanup::File(file) => remove_file(data_dir, file)?.into_iter().collect(),
    };

    let mut outcome = WriteOutcome::default();
    for doc in &family.documents {
        let path = data_dir.join(&doc.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &doc.content).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %doc.path.display(), bytes = doc.content.len(), "wrote");
        outcome.written.push(doc.path.clone());
    }

    outcome.removed = deleted
        .into_iter()
        .filter(|p| !outcome.written.contains(p))
        .collect();

    tracing::info!(
        family = ?family.family,
        written = outcome.written.len(),
        removed = outcome.removed.len(),
        "family written"
    );
    Ok(outcome)
}

/// Delete every `.md` file directly inside `dir`. Returns the deleted paths
/// relative to the data directory.
fn clean_directory(data_dir: &Path, dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let abs = data_dir.join(dir);
    if !abs.is_dir() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for entry in WalkDir::new(&abs).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| GenerateError::Io {
            path: abs.clone(),
            source: e.into(),
        })?;
        let path = entry.path();
        let is_markdown = path.extension().and_then(|e| e.to_str()) == Some("md");
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }
        fs::remove_file(path).map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        removed.push(dir.join(entry.file_name()));
    }
    Ok(removed)
}

fn remove_file(data_dir: &Path, file: &Path) -> Result<Option<PathBuf>, GenerateError> {
    let abs = data_dir.join(file);
    match fs::remove_file(&abs) {
        Ok(()) => Ok(Some(file.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GenerateError::Io { path: abs, source }),
    }
}
