// crates/version-override-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Keep operator-facing strings in one place.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Operator-facing strings live in a static English catalog and are rendered
//! through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys render as the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `model`).
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in the template.
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.usage", "usage: force-agent-version <model-id> <version>"),
    ("output.stream.stdout", "stdout"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("override.input.parsing", "parsing arguments"),
    ("override.identity.searching", "finding machine tag in {dir}"),
    ("override.identity.found", "current machine tag: {tag}"),
    ("override.config.loading", "loading agent config from {path}"),
    ("override.config.loaded", "loaded state credentials for {tag}"),
    ("override.connect.opening", "opening state connection to {endpoints}"),
    ("override.connect.opened", "opened state connection"),
    ("override.close.closing", "closing state connection"),
    ("override.close.failed", "closing state connection failed: {error}"),
    ("override.done", "forced agent-version of model {model} to {version}"),
    ("override.failed", "force-agent-version failed"),
];

/// Returns the message catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
