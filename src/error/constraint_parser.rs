use regex::Regex;
use std::sync::OnceLock;

/// Parses PostgreSQL constraint violation messages into `(entity, field, value)`
/// parts so the repositories can report structured errors.
pub struct ConstraintParser;

struct Patterns {
    key_value: Regex,
    column: Regex,
    relation: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_check", "_fkey", "_pkey", "_idx"];

impl ConstraintParser {
    fn patterns() -> &'static Patterns {
        PATTERNS.get_or_init(|| Patterns {
            // Key (account)=(alice)
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("static regex"),
            column: Regex::new(r#"column "([^"]+)""#).expect("static regex"),
            // `table "users"` or `relation "users"`
            relation: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("static regex"),
        })
    }

    /// Unique violation, e.g. constraint `users_account_key` with
    /// `Key (account)=(alice) already exists.`
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::extract_relation(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Not-null violation: `null value in column "name" of relation "users" ...`
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column(message)?;
        let entity = Self::extract_relation(message)
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Check violation, e.g. constraint `users_status_check`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }
        let field = Self::extract_column(message)?;
        let entity = Self::extract_relation(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits `<table>_<column...>_<suffix>` into `(table, column)`.
    ///
    /// Multi-word columns are kept whole: `users_updated_by_check` gives
    /// `("users", "updated_by")`.
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

    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        let caps = Self::patterns().key_value.captures(message)?;
        Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
    }

    pub fn extract_column(message: &str) -> Option<String> {
        Self::patterns()
            .column
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_relation(message: &str) -> Option<String> {
        Self::patterns()
            .relation
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constraint_name() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("users_account_key"),
            Some(("users".to_string(), "account".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("users_updated_by_check"),
            Some(("users".to_string(), "updated_by".to_string()))
        );
        assert_eq!(ConstraintParser::parse_constraint_name("users_key"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("no_suffix_here"), None);
    }

    #[test]
    fn test_unique_violation_from_constraint_name() {
        let message = "duplicate key value violates unique constraint \"users_account_key\"\nDETAIL: Key (account)=(alice) already exists.";
        assert_eq!(
            ConstraintParser::parse_unique_violation(message, Some("users_account_key")),
            Some(("users".to_string(), "account".to_string(), "alice".to_string()))
        );
    }

    #[test]
    fn test_unique_violation_without_constraint_name() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (account)=(bob) already exists.";
        assert_eq!(
            ConstraintParser::parse_unique_violation(message, None),
            Some(("resource".to_string(), "account".to_string(), "bob".to_string()))
        );
    }

    #[test]
    fn test_not_null_violation() {
        let message = "null value in column \"name\" of relation \"users\" violates not-null constraint";
        assert_eq!(
            ConstraintParser::parse_not_null_violation(message, None),
            Some(("users".to_string(), "name".to_string()))
        );
    }

    #[test]
    fn test_check_violation_falls_back_to_message() {
        let message = "new row for relation \"users\" violates check constraint on column \"status\"";
        assert_eq!(
            ConstraintParser::parse_check_violation(message, None),
            Some(("users".to_string(), "status".to_string()))
        );
    }

    #[test]
    fn test_unparseable_message() {
        assert_eq!(ConstraintParser::parse_unique_violation("boom", None), None);
        assert_eq!(ConstraintParser::parse_not_null_violation("boom", None), None);
    }
}
