//! Identifier quoting for PostgreSQL.

/// Quotes an identifier so it can be interpolated into DDL.
///
/// The name is cut at the first NUL character (PostgreSQL identifiers cannot
/// contain one), embedded double quotes are doubled and the result is wrapped
/// in double quotes.
///
/// ```rust
/// use pgtable_core::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "\"users\"");
/// assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
/// ```
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let name = name.split('\0').next().unwrap_or_default();
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_wrapped() {
        assert_eq!(quote_identifier("id"), "\"id\"");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote_identifier("a\"b\"c"), "\"a\"\"b\"\"c\"");
    }

    #[test]
    fn truncated_at_nul() {
        assert_eq!(quote_identifier("name\0; DROP TABLE x"), "\"name\"");
    }

    #[test]
    fn case_and_spaces_preserved() {
        assert_eq!(quote_identifier("First Name"), "\"First Name\"");
    }

    #[test]
    fn empty_name() {
        assert_eq!(quote_identifier(""), "\"\"");
    }
}
