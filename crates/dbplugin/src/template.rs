//! Statement template expansion.
//!
//! Substitution is literal text replacement, not SQL escaping: the template
//! author is responsible for quoting (`'{{password}}'`, `"{{name}}"`). A
//! token with no entry in the placeholder map is left unresolved rather than
//! rejected: hosts rely on this when the same template is reused across
//! operations that fill different subsets of tokens.
//!
//! Keeping all substitution in this one module means the replacement
//! strategy can be hardened (e.g. moved to bound parameters where the
//! statement syntax allows) without touching the lifecycle engine.

use std::collections::HashMap;

/// Replaces every `{{token}}` occurrence with its mapped value.
///
/// Tokens absent from `values` stay in the output verbatim.
pub fn expand(template: &str, values: &HashMap<&str, String>) -> String {
    let mut expanded = template.to_string();
    for (token, value) in values {
        expanded = expanded.replace(&format!("{{{{{token}}}}}"), value);
    }
    expanded
}

/// Splits a template on the statement delimiter, dropping whitespace-only
/// segments.
///
/// Each surviving segment is executed independently. Dollar-quoted blocks
/// containing inner semicolons must be supplied as separate list entries;
/// the split is deliberately naive for compatibility with existing
/// statement sets.
pub fn split(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|stmt| !stmt.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs
            .iter()
            .map(|(token, value)| (*token, (*value).to_string()))
            .collect()
    }

    #[rstest]
    #[case("CREATE USER \"{{name}}\"", &[("name", "v-abc")], "CREATE USER \"v-abc\"")]
    #[case(
        "PASSWORD '{{password}}' VALID UNTIL '{{expiration}}'",
        &[("password", "A1a-x"), ("expiration", "2026-08-06 12:00:00+0000")],
        "PASSWORD 'A1a-x' VALID UNTIL '2026-08-06 12:00:00+0000'"
    )]
    #[case("GRANT \"{{name}}\" TO \"{{name}}2\"", &[("name", "u")], "GRANT \"u\" TO \"u2\"")]
    fn test_expand(
        #[case] template: &str,
        #[case] pairs: &[(&'static str, &str)],
        #[case] expected: &str,
    ) {
        assert_eq!(expand(template, &values(pairs)), expected);
    }

    #[test]
    fn test_unknown_token_left_unresolved() {
        let expanded = expand("ALTER USER \"{{name}}\" SET x = '{{mystery}}'", &values(&[("name", "u")]));
        assert_eq!(expanded, "ALTER USER \"u\" SET x = '{{mystery}}'");
    }

    #[test]
    fn test_expand_with_empty_map_is_identity() {
        let template = "SELECT {{anything}}";
        assert_eq!(expand(template, &HashMap::new()), template);
    }

    #[test]
    fn test_split_drops_whitespace_segments() {
        let segments: Vec<&str> =
            split("CREATE USER \"u\";\n\nGRANT SELECT TO \"u\";\n   ;\n").collect();
        assert_eq!(segments, vec!["CREATE USER \"u\"", "GRANT SELECT TO \"u\""]);
    }

    #[test]
    fn test_split_single_statement_without_delimiter() {
        let segments: Vec<&str> = split("SELECT 1").collect();
        assert_eq!(segments, vec!["SELECT 1"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert_eq!(split("  \n ").count(), 0);
    }
}
