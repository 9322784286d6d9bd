//! Naming conventions for identifiers that end up in file names or titles.
//!
//! List identifiers (roles and custom lists) become file names, so they are
//! restricted to lowercase letters, digits and single hyphens:
//! - `core-review` → valid
//! - `Core-Review` → invalid (uppercase)
//! - `core--review`, `-core`, `core_review` → invalid
//!
//! Categories are free-form data values. They only need to be usable as a
//! file stem, and are capitalized for display:
//! - `risk` → "Risk"
//! - `creative` → "Creative"

use regex::Regex;
use std::sync::LazyLock;

static LIST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("list id pattern must compile"));

/// Whether `id` matches the list identifier pattern.
pub fn is_valid_list_id(id: &str) -> bool {
    LIST_ID.is_match(id)
}

/// Key used for case-insensitive uniqueness checks within a namespace.
pub fn list_id_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Whether a category value can be used as a file stem inside a
/// generated directory without colliding with its `_index.md`.
pub fn is_safe_file_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem != "_index"
        && !stem.starts_with('.')
        && !stem.contains(['/', '\\', '\0'])
        && !stem.chars().any(char::is_control)
}

/// Key under which category file names collide on a case-insensitive
/// filesystem.
pub fn category_key(category: &str) -> String {
    category.to_lowercase()
}

/// File name of a category document.
pub fn category_file_name(category: &str) -> String {
    format!("{category}.md")
}

/// File name of a role document.
pub fn role_file_name(id: &str) -> String {
    format!("{id}.md")
}

/// Capitalize the first character for display: `risk` → `Risk`.
pub fn display_title(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
