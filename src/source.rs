//! Source loading.
//!
//! Stage 1 of the generation pipeline. Reads the methods table and the YAML
//! list documents from the data directory and produces raw, unvalidated
//! records that later stages consume.
//!
//! ## Data Directory
//!
//! ```text
//! advanced-elicitation/            # data_dir
//! ├── methods.csv                  # Source of truth (mandatory)
//! ├── mapping.yaml                 # Pools, quick pools, roles (mapping/lists schemes)
//! └── custom_lists.yaml            # User lists (lists scheme, optional)
//! ```
//!
//! ## Failure Modes
//!
//! Loading is all-or-nothing. A missing mandatory file, a malformed CSV row
//! structure, a missing required column, or invalid YAML fails the whole run
//! with an error naming the file (and the line/column when the parser
//! reports one). Field-level problems such as an empty description are not
//! load errors; they are collected by the validator.
//!
//! ## Fingerprint Bytes
//!
//! [`Sources::files`] keeps the exact bytes of every file that was present,
//! in the scheme's fixed order, so the fingerprint can be computed without
//! reading anything twice.

use crate::config::GenConfig;
use crate::types::{CategoryMeta, NamedList, Pools};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns every methods table must declare.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "num",
    "category",
    "method_name",
    "description",
    "output_pattern",
];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV syntax error in {}{}: {message}", .path.display(), location(.line, &None))]
    Csv {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },
    #[error("Missing column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("YAML syntax error in {}{}: {message}", .path.display(), location(.line, .column))]
    Yaml {
        path: PathBuf,
        line: Option<u64>,
        column: Option<u64>,
        message: String,
    },
}

fn location(line: &Option<u64>, column: &Option<u64>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!(" (line {l}, column {c})"),
        (Some(l), None) => format!(" (line {l})"),
        _ => String::new(),
    }
}

/// One row of the methods table, trimmed but otherwise unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodRow {
    /// 1-based physical line (header is line 1).
    pub line: usize,
    pub num: String,
    pub category: String,
    pub method_name: String,
    pub description: String,
    pub output_pattern: String,
    /// Any additional columns, e.g. `primary_verify` flags.
    pub extra: BTreeMap<String, String>,
}

impl MethodRow {
    /// Value of a required column by name.
    pub fn field(&self, column: &str) -> &str {
        match column {
            "num" => &self.num,
            "category" => &self.category,
            "method_name" => &self.method_name,
            "description" => &self.description,
            "output_pattern" => &self.output_pattern,
            other => self.extra.get(other).map(String::as_str).unwrap_or(""),
        }
    }

    /// Parsed method number, if the column holds a positive integer.
    pub fn parsed_num(&self) -> Option<u32> {
        self.num.parse::<u32>().ok().filter(|n| *n > 0)
    }
}

/// `mapping.yaml`: pools, quick pools, roles and category metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingDoc {
    pub primary: Pools,
    pub quick: Option<Pools>,
    pub categories: Vec<CategoryMeta>,
    pub roles: Vec<NamedList>,
}

/// `custom_lists.yaml`: user-declared lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomListsDoc {
    pub lists: Vec<NamedList>,
}

/// Exact bytes of one source file, for fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Everything read from the data directory for one run.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub methods: Vec<MethodRow>,
    pub mapping: Option<MappingDoc>,
    pub custom_lists: Option<CustomListsDoc>,
    /// Present files in fingerprint order.
    pub files: Vec<SourceFile>,
}

impl Sources {
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Load and parse all sources the configured scheme declares.
pub fn load(data_dir: &Path, config: &GenConfig) -> Result<Sources, SourceError> {
    let files = read_source_files(data_dir, config)?;

    let mut sources = Sources::default();
    for file in &files {
        let path = data_dir.join(&file.name);
        if file.name == config.sources.methods {
            sources.methods = parse_methods(&path, &file.bytes)?;
        } else if file.name == config.sources.mapping {
            sources.mapping = Some(parse_yaml(&path, &file.bytes)?);
        } else if file.name == config.sources.custom_lists {
            sources.custom_lists = Some(parse_yaml(&path, &file.bytes)?);
        }
    }
    sources.files = files;

    tracing::debug!(
        methods = sources.methods.len(),
        files = ?sources.file_names(),
        "sources loaded"
    );
    Ok(sources)
}

/// Read the raw bytes of every source file in fingerprint order.
///
/// The files are independent, so they are read in parallel. A missing
/// optional file is skipped; a missing mandatory file is an error.
pub fn read_source_files(
    data_dir: &Path,
    config: &GenConfig,
) -> Result<Vec<SourceFile>, SourceError> {
    let scheme = config.scheme;
    let names = &config.sources;

    let (methods, (mapping, custom)) = rayon::join(
        || read_required(data_dir, &names.methods),
        || {
            rayon::join(
                || {
                    if scheme.reads_mapping() {
                        read_required(data_dir, &names.mapping).map(Some)
                    } else {
                        Ok(None)
                    }
                },
                || {
                    if scheme.reads_custom_lists() {
                        read_optional(data_dir, &names.custom_lists)
                    } else {
                        Ok(None)
                    }
                },
            )
        },
    );

    let mut files = vec![methods?];
    files.extend(mapping?);
    files.extend(custom?);
    Ok(files)
}

fn read_required(data_dir: &Path, name: &str) -> Result<SourceFile, SourceError> {
    let path = data_dir.join(name);
    let bytes = fs::read(&path).map_err(|source| SourceError::Unreadable { path, source })?;
    Ok(SourceFile {
        name: name.to_string(),
        bytes,
    })
}

fn read_optional(data_dir: &Path, name: &str) -> Result<Option<SourceFile>, SourceError> {
    match read_required(data_dir, name) {
        Ok(file) => Ok(Some(file)),
        Err(SourceError::Unreadable { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(file = name, "optional source absent");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Parse the methods table.
///
/// Fields are trimmed and blank lines skipped. Each row keeps the physical
/// line it started on for validation messages.
pub fn parse_methods(path: &Path, bytes: &[u8]) -> Result<Vec<MethodRow>, SourceError> {
    let csv_error = |e: csv::Error| SourceError::Csv {
        path: path.to_path_buf(),
        line: e.position().map(|p| p.line()),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(SourceError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);

        let mut row = MethodRow {
            line,
            ..Default::default()
        };
        for (header, value) in headers.iter().zip(record.iter()) {
            let value = value.to_string();
            match header.as_str() {
                "num" => row.num = value,
                "category" => row.category = value,
                "method_name" => row.method_name = value,
                "description" => row.description = value,
                "output_pattern" => row.output_pattern = value,
                _ => {
                    row.extra.insert(header.clone(), value);
                }
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse a YAML document, mapping parser errors to a located [`SourceError`].
///
/// An empty document is treated as an empty configuration.
pub fn parse_yaml<T>(path: &Path, bytes: &[u8]) -> Result<T, SourceError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_yaml::from_slice(bytes).map_err(|e| {
        let loc = e.location();
        SourceError::Yaml {
            path: path.to_path_buf(),
            line: loc.as_ref().map(|l| l.line() as u64),
            column: loc.as_ref().map(|l| l.column() as u64),
            message: e.to_string(),
        }
    })
}
