//! Quoting and escaping boundaries for generated SQL.
//!
//! Generated statements are assembled from planner-supplied expression text,
//! which is spliced verbatim, and identifiers or string literals, which must
//! always pass through one of these helpers. Keeping the boundaries in one
//! place is what lets the dialects interpolate freely everywhere else.

/// Quote an identifier with backticks (BigQuery style).
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "\\`"))
}

/// Quote an identifier with double quotes (Postgres and DuckDB style).
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote each dot-separated segment of a table path independently, so that
/// `analytics.events` becomes `"analytics"."events"`.
pub fn quote_table_path(path: &str, quote: fn(&str) -> String) -> String {
    path.split('.').map(quote).collect::<Vec<_>>().join(".")
}

/// Render a single-quoted SQL string literal, doubling embedded quotes.
pub fn string_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Comma-join rendered pieces of a select list, struct body or argument list.
pub fn comma_list<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_quoting_escapes_backticks() {
        assert_eq!(quote_backtick("events"), "`events`");
        assert_eq!(quote_backtick("we`ird"), "`we\\`ird`");
    }

    #[test]
    fn double_quoting_doubles_quotes() {
        assert_eq!(quote_double("events"), "\"events\"");
        assert_eq!(quote_double("col\"umn"), "\"col\"\"umn\"");
    }

    #[test]
    fn table_paths_quote_per_segment() {
        assert_eq!(
            quote_table_path("analytics.events", quote_double),
            "\"analytics\".\"events\""
        );
        assert_eq!(quote_table_path("events", quote_double), "\"events\"");
    }

    #[test]
    fn string_literals_double_embedded_quotes() {
        assert_eq!(string_literal("it's"), "'it''s'");
    }

    #[test]
    fn comma_list_joins_in_order() {
        assert_eq!(comma_list(["a", "b", "c"]), "a, b, c");
        assert_eq!(comma_list(Vec::<String>::new()), "");
    }
}
