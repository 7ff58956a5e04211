//! Safe SQL identifier handling.
//!
//! Table and field names in this crate are single bare identifiers validated
//! against: `[A-Za-z_][A-Za-z0-9_$]*`. Anything else (dots, quotes, spaces,
//! NUL) is rejected before it can reach rendered SQL.

use crate::error::{SqlError, SqlResult};

/// Validate a bare SQL identifier (table or field name).
///
/// - Must be non-empty.
/// - First character: ASCII letter or underscore.
/// - Subsequent characters: ASCII letter, digit, underscore, or `$`.
pub fn validate_identifier(name: &str) -> SqlResult<()> {
    let mut chars = name.chars();

    // First char: letter or underscore.
    let Some(first) = chars.next() else {
        return Err(SqlError::structural("Identifier cannot be empty"));
    };
    if first != '_' && !first.is_ascii_alphabetic() {
        return Err(SqlError::structural(format!(
            "Invalid identifier start character: '{first}'"
        )));
    }

    // Subsequent chars: letter, digit, underscore, or $.
    for c in chars {
        if c != '_' && c != '$' && !c.is_ascii_alphanumeric() {
            return Err(SqlError::structural(format!(
                "Invalid character in identifier: '{c}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert!(validate_identifier("users").is_ok());
    }

    #[test]
    fn ident_underscore_start() {
        assert!(validate_identifier("_private").is_ok());
    }

    #[test]
    fn ident_with_dollar() {
        assert!(validate_identifier("my_var$1").is_ok());
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(validate_identifier("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(validate_identifier("my table").is_err());
    }

    #[test]
    fn ident_rejects_dot() {
        assert!(validate_identifier("schema.table").is_err());
    }

    #[test]
    fn ident_rejects_quote() {
        assert!(validate_identifier(r#""users""#).is_err());
    }
}
