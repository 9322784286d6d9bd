//! Markdown document rendering.
//!
//! Every renderer is a pure function from the validated method table, the
//! canonical list configuration and the shared [`Banner`] to a set of
//! [`Document`]s. Nothing here touches the filesystem; the generate stage
//! decides what to clean and writes the results.
//!
//! ## Document Families
//!
//! | Family | Output (relative to data dir) |
//! |--------|-------------------------------|
//! | Primary pools | `primary_verify.md`, `primary_discover.md` |
//! | Categories | `ae_by_categories/<category>.md` + `_index.md` |
//! | Roles | `ae_by_roles/<id>.md` + `_index.md` |
//! | Custom lists | `ae_user_lists.md` (single aggregate) |
//!
//! Families share no mutable state, so [`render_all`] renders them in
//! parallel.
//!
//! ## Header Banner
//!
//! ```text
//! <!-- GENERATED: 2026-01-01T00:00:00.000Z -->
//! <!-- SOURCE: methods.csv, mapping.yaml (hash: 1a2b3c4d) -->
//! <!-- DO NOT EDIT MANUALLY - regenerate with: elicit-gen generate -->
//! ```
//!
//! The `hash: <8 hex>` token is what the freshness check reads back.

use crate::catalog::{MethodTable, badge_suffix, badges_for};
use crate::config::OutputConfig;
use crate::fingerprint::Fingerprint;
use crate::naming;
use crate::types::{ListConfig, Method, NamedList};
use rayon::prelude::*;
use std::path::PathBuf;

/// File name of the cross-reference index inside family directories.
pub const INDEX_FILE: &str = "_index.md";

/// Command shown in the regeneration notice.
pub const REGENERATE_COMMAND: &str = "elicit-gen generate";

/// Header stamped on every generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub generated_at: String,
    pub sources: Vec<String>,
    pub fingerprint: Fingerprint,
}

impl Banner {
    pub fn render(&self) -> String {
        format!(
            "<!-- GENERATED: {} -->\n<!-- SOURCE: {} (hash: {}) -->\n<!-- DO NOT EDIT MANUALLY - regenerate with: {} -->\n\n",
            self.generated_at,
            self.sources.join(", "),
            self.fingerprint,
            REGENERATE_COMMAND
        )
    }
}

/// A rendered document, path relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    PrimaryPools,
    Categories,
    Roles,
    CustomLists,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::PrimaryPools,
        Family::Categories,
        Family::Roles,
        Family::CustomLists,
    ];
}

/// What must be removed before a family's documents are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    /// Documents are overwritten in place.
    Nothing,
    /// Remove every `.md` file in this directory.
    Directory(PathBuf),
    /// Remove this file if present.
    File(PathBuf),
}

/// One family's documents plus the cleanup that precedes writing them.
#[derive(Debug, Clone)]
pub struct RenderedFamily {
    pub family: Family,
    pub cleanup: Cleanup,
    pub documents: Vec<Document>,
}

/// Read-only inputs shared by all renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub methods: &'a MethodTable,
    pub lists: &'a ListConfig,
    pub banner: &'a Banner,
    pub output: &'a OutputConfig,
}

/// Render every family in parallel. Output order follows [`Family::ALL`].
pub fn render_all(ctx: RenderContext<'_>) -> Vec<RenderedFamily> {
    Family::ALL
        .par_iter()
        .map(|family| render_family(*family, ctx))
        .collect()
}

pub fn render_family(family: Family, ctx: RenderContext<'_>) -> RenderedFamily {
    match family {
        Family::PrimaryPools => RenderedFamily {
            family,
            cleanup: Cleanup::Nothing,
            documents: render_primary_pools(ctx),
        },
        Family::Categories => RenderedFamily {
            family,
            cleanup: Cleanup::Directory(PathBuf::from(&ctx.output.categories_dir)),
            documents: render_categories(ctx),
        },
        Family::Roles => RenderedFamily {
            family,
            cleanup: Cleanup::Directory(PathBuf::from(&ctx.output.roles_dir)),
            documents: render_roles(ctx),
        },
        Family::CustomLists => RenderedFamily {
            family,
            cleanup: Cleanup::File(PathBuf::from(&ctx.output.user_lists)),
            documents: render_custom_lists(ctx).into_iter().collect(),
        },
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

/// One method as a titled subsection.
///
/// ```text
/// ### #12 Pre-mortem Analysis [V]
/// Imagine the project failed and work backwards.
///
/// **Pattern:** failure → causes → mitigations
///
/// ---
/// ```
fn method_entry(method: &Method, level: usize, badges: &str) -> String {
    format!(
        "{} #{} {}{}\n{}\n\n**Pattern:** {}\n\n---\n\n",
        "#".repeat(level),
        method.num,
        method.method_name,
        badges,
        method.description,
        method.output_pattern
    )
}

fn method_entries(methods: &MethodTable, nums: &[u32], level: usize) -> String {
    methods
        .resolve(nums)
        .map(|m| method_entry(m, level, ""))
        .collect()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Make a value safe inside a Markdown table cell.
fn table_cell(value: &str) -> String {
    value.replace(';', ",").replace('|', "\\|").replace('\n', " ")
}

// ============================================================================
// Primary pools
// ============================================================================

struct PoolDoc<'a> {
    file: &'a str,
    title: &'a str,
    purpose: &'a str,
    guidance: &'a str,
    nums: &'a [u32],
}

fn render_primary_pools(ctx: RenderContext<'_>) -> Vec<Document> {
    let pools = [
        PoolDoc {
            file: &ctx.output.primary_verify,
            title: "Primary Verify Methods",
            purpose: "optimized for verification and quality checking",
            guidance: "Use these methods to validate generated content, find inconsistencies, identify risks, and ensure quality.",
            nums: &ctx.lists.primary.verify,
        },
        PoolDoc {
            file: &ctx.output.primary_discover,
            title: "Primary Discover Methods",
            purpose: "optimized for discovery and requirements elicitation",
            guidance: "Use these methods to explore requirements, uncover hidden assumptions, and deepen understanding.",
            nums: &ctx.lists.primary.discover,
        },
    ];
    pools
        .iter()
        .map(|pool| Document {
            path: PathBuf::from(pool.file),
            content: render_pool(ctx, pool),
        })
        .collect()
}

fn render_pool(ctx: RenderContext<'_>, pool: &PoolDoc<'_>) -> String {
    let count = ctx.methods.resolve(pool.nums).count();
    let mut out = ctx.banner.render();
    out.push_str(&format!(
        "# {}\n\n{} {}.\n\n{}\n\n---\n\n",
        pool.title,
        plural(count, "method"),
        pool.purpose,
        pool.guidance
    ));
    out.push_str(&method_entries(ctx.methods, pool.nums, 3));
    out
}

// ============================================================================
// Categories
// ============================================================================

fn category_heading(category: &str, lists: &ListConfig) -> String {
    match lists.category_meta(category) {
        Some(meta) if !meta.display_name.is_empty() => {
            if meta.icon.is_empty() {
                meta.display_name.clone()
            } else {
                format!("{} {}", meta.icon, meta.display_name)
            }
        }
        _ => format!("{} Methods", naming::display_title(category)),
    }
}

fn when_to_use<'a>(category: &str, lists: &'a ListConfig) -> Option<&'a str> {
    lists
        .category_meta(category)
        .map(|m| m.when_to_use.as_str())
        .filter(|w| !w.is_empty())
}

fn render_categories(ctx: RenderContext<'_>) -> Vec<Document> {
    let dir = PathBuf::from(&ctx.output.categories_dir);
    let grouped = ctx.methods.by_category();

    let mut documents: Vec<Document> = grouped
        .iter()
        .map(|(category, members)| Document {
            path: dir.join(naming::category_file_name(category)),
            content: render_category(ctx, category, members),
        })
        .collect();

    if ctx.output.category_index && !grouped.is_empty() {
        documents.push(Document {
            path: dir.join(INDEX_FILE),
            content: render_category_index(ctx, &grouped),
        });
    }
    documents
}

fn render_category(ctx: RenderContext<'_>, category: &str, members: &[&Method]) -> String {
    let mut out = ctx.banner.render();
    out.push_str(&format!("# {}\n\n", category_heading(category, ctx.lists)));
    if let Some(when) = when_to_use(category, ctx.lists) {
        out.push_str(&format!("> **When to use:** {}\n\n", when.replace(';', ",")));
    }
    out.push_str(&format!(
        "{} in the {} category.\n\n---\n\n",
        plural(members.len(), "method"),
        naming::display_title(category)
    ));
    for method in members {
        let badges = badge_suffix(&badges_for(method.num, ctx.lists));
        out.push_str(&method_entry(method, 3, &badges));
    }
    out
}

fn render_category_index(ctx: RenderContext<'_>, grouped: &[(&str, Vec<&Method>)]) -> String {
    let mut out = ctx.banner.render();
    out.push_str(&format!(
        "# Elicitation Method Categories\n\n{} across {}.\n\n",
        plural(ctx.methods.len(), "method"),
        plural(grouped.len(), "category file")
    ));
    out.push_str("| Category | Methods | When to Use |\n|----------|---------|-------------|\n");
    for (category, members) in grouped {
        out.push_str(&format!(
            "| [{}](./{}) | {} | {} |\n",
            table_cell(&category_heading(category, ctx.lists)),
            naming::category_file_name(category),
            members.len(),
            table_cell(when_to_use(category, ctx.lists).unwrap_or(""))
        ));
    }
    out.push_str(
        "\n## Badges\n\n\
         - `[V]` in the primary verify pool\n\
         - `[D]` in the primary discover pool\n",
    );
    if ctx.lists.quick.is_some() {
        out.push_str(
            "- `[QV]` quick-recommended for verification\n\
             - `[QD]` quick-recommended for discovery\n",
        );
    }
    out.push_str(
        "\n## Usage\n\n\
         Load the category file that matches the current context, then pick \
         methods from it. Badged methods are the flagship choices.\n",
    );
    out
}

// ============================================================================
// Roles
// ============================================================================

fn list_summary(list: &NamedList) -> String {
    if list.is_domain() {
        format!(
            "{} and {}.",
            plural(list.verify.len(), "verify method"),
            plural(list.discover.len(), "discover method")
        )
    } else {
        format!("{}.", plural(list.methods.len(), "method"))
    }
}

/// Body of a list: flat entries, or labeled verify/discover sections for a
/// domain list. `level` is the heading level of the list itself.
fn list_body(methods: &MethodTable, list: &NamedList, level: usize) -> String {
    if !list.is_domain() {
        return method_entries(methods, &list.methods, level + 1);
    }
    let mut out = String::new();
    for (label, nums) in [("Verify", &list.verify), ("Discover", &list.discover)] {
        if nums.is_empty() {
            continue;
        }
        out.push_str(&format!("{} {label}\n\n", "#".repeat(level + 1)));
        out.push_str(&method_entries(methods, nums, level + 2));
    }
    out
}

fn render_roles(ctx: RenderContext<'_>) -> Vec<Document> {
    let dir = PathBuf::from(&ctx.output.roles_dir);
    let mut documents: Vec<Document> = ctx
        .lists
        .roles
        .iter()
        .map(|role| Document {
            path: dir.join(naming::role_file_name(&role.id)),
            content: render_role(ctx, role),
        })
        .collect();

    if ctx.output.role_index && !ctx.lists.roles.is_empty() {
        documents.push(Document {
            path: dir.join(INDEX_FILE),
            content: render_role_index(ctx),
        });
    }
    documents
}

fn render_role(ctx: RenderContext<'_>, role: &NamedList) -> String {
    let mut out = ctx.banner.render();
    out.push_str(&format!("# {}\n\n", role.name));
    if !role.description.is_empty() {
        out.push_str(&format!("{}\n\n", role.description));
    }
    out.push_str(&format!("{}\n\n---\n\n", list_summary(role)));
    out.push_str(&list_body(ctx.methods, role, 1));
    out
}

fn render_role_index(ctx: RenderContext<'_>) -> String {
    let mut out = ctx.banner.render();
    out.push_str(&format!(
        "# Elicitation Methods by Role\n\n{} declared.\n\n",
        plural(ctx.lists.roles.len(), "role")
    ));
    out.push_str("| Role | Methods | Description |\n|------|---------|-------------|\n");
    for role in &ctx.lists.roles {
        out.push_str(&format!(
            "| [{}](./{}) | {} | {} |\n",
            table_cell(&role.name),
            naming::role_file_name(&role.id),
            role.method_count(),
            table_cell(&role.description)
        ));
    }
    out
}

// ============================================================================
// Custom lists
// ============================================================================

fn render_custom_lists(ctx: RenderContext<'_>) -> Option<Document> {
    let lists = &ctx.lists.custom_lists;
    if lists.is_empty() {
        return None;
    }
    let mut out = ctx.banner.render();
    out.push_str(&format!(
        "# Custom Method Lists\n\n{} declared.\n\n",
        plural(lists.len(), "list")
    ));
    for list in lists {
        out.push_str(&format!("## {} (`{}`)\n\n", list.name, list.id));
        if !list.description.is_empty() {
            out.push_str(&format!("{}\n\n", list.description));
        }
        out.push_str(&format!("{}\n\n", list_summary(list)));
        out.push_str(&list_body(ctx.methods, list, 2));
    }
    Some(Document {
        path: PathBuf::from(&ctx.output.user_lists),
        content: out,
    })
}
