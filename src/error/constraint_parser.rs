use std::sync::OnceLock;

use regex::Regex;

/// Extracts entity, field and value out of PostgreSQL constraint violation
/// messages so they can be surfaced as client errors.
pub struct ConstraintParser;

struct Patterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            // DETAIL: Key (email)=(a@b.c) already exists.
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)")?,
            column_name: Regex::new(r#"column "([^"]+)""#)?,
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#)?,
        })
    }
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: [&str; 5] = ["_key", "_pkey", "_fkey", "_idx", "_check"];

impl ConstraintParser {
    fn patterns() -> Option<&'static Patterns> {
        PATTERNS.get_or_init(|| Patterns::compile().ok()).as_ref()
    }

    /// Returns `(entity, field, value)` for a unique violation.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let from_message = Self::extract_key_value(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = from_message
                .map(|(_, v)| v)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = from_message?;
        let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Returns `(entity, field)` for a not-null violation.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column(message)?;
        let entity = Self::extract_table(message)
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Returns `(entity, field, referenced_value)` for a foreign key violation.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let from_message = Self::extract_key_value(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = from_message
                .map(|(_, v)| v)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = from_message?;
        let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Returns `(entity, field)` for a check violation.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }
        let field = Self::extract_column(message)?;
        let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits a generated constraint name into table and column parts.
    ///
    /// `payments_external_id_key` becomes `("payments", "external_id")`.
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;
        let (table, column) = stem.split_once('_')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some((table.to_string(), column.to_string()))
    }

    pub fn extract_column(message: &str) -> Option<String> {
        Self::patterns()?
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_table(message: &str) -> Option<String> {
        Self::patterns()?
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        Self::patterns()?.key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}
