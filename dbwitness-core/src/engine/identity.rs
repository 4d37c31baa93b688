//! Row identity resolution.
//!
//! Every evidence record carries a (table, column, row identity) provenance
//! triple, so each scanned table needs a per-row identity expression that is
//! unique within the table for the scanned snapshot. Identity correctness is
//! mandatory: when no strategy holds, the table is skipped rather than given
//! an approximated identity.

use crate::models::{Column, PrimaryKeySpec};

/// Literal separator joining the text-cast members of a composite key.
///
/// Two distinct composite keys can only collide when the member values
/// themselves contain the separator; an accepted, documented limitation.
pub const IDENTITY_SEPARATOR: &str = "|";

/// Resolves the identity strategy for a table from its column metadata.
///
/// Declared primary-key members are collected in key order: exactly one
/// yields [`PrimaryKeySpec::SingleColumn`], more than one
/// [`PrimaryKeySpec::CompositeColumns`], none the rowid fallback.
pub fn resolve_primary_key(columns: &[Column]) -> PrimaryKeySpec {
    let mut pk_columns: Vec<(u32, String)> = columns
        .iter()
        .filter(|c| c.is_primary_key())
        .map(|c| (c.pk_ordinal, c.name.clone()))
        .collect();
    pk_columns.sort_by_key(|(ordinal, _)| *ordinal);

    let mut names: Vec<String> = pk_columns.into_iter().map(|(_, name)| name).collect();
    match names.len() {
        0 => PrimaryKeySpec::RowIdentityFallback,
        1 => PrimaryKeySpec::SingleColumn(names.remove(0)),
        _ => PrimaryKeySpec::CompositeColumns(names),
    }
}

/// Builds the SQL expression that yields the row identity as text.
///
/// The expression always produces TEXT so that identities round-trip
/// without precision loss regardless of the underlying key type.
pub fn identity_expression(spec: &PrimaryKeySpec) -> String {
    match spec {
        PrimaryKeySpec::SingleColumn(name) => {
            format!("CAST({} AS TEXT)", super::quote_ident(name))
        }
        PrimaryKeySpec::CompositeColumns(names) => names
            .iter()
            .map(|name| format!("CAST({} AS TEXT)", super::quote_ident(name)))
            .collect::<Vec<_>>()
            .join(&format!(" || '{}' || ", IDENTITY_SEPARATOR)),
        PrimaryKeySpec::RowIdentityFallback => "CAST(rowid AS TEXT)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnHints, TypeClass};

    fn column(name: &str, pk_ordinal: u32) -> Column {
        Column {
            name: name.to_string(),
            declared_type: "INTEGER".to_string(),
            type_class: TypeClass::Integer,
            pk_ordinal,
            hints: ColumnHints::default(),
        }
    }

    #[test]
    fn test_resolve_single_primary_key() {
        let columns = vec![column("id", 1), column("body", 0)];
        assert_eq!(
            resolve_primary_key(&columns),
            PrimaryKeySpec::SingleColumn("id".to_string())
        );
    }

    #[test]
    fn test_resolve_composite_primary_key_ordered() {
        // Declaration order differs from key order; key order wins
        let columns = vec![column("b", 2), column("a", 1), column("x", 0)];
        assert_eq!(
            resolve_primary_key(&columns),
            PrimaryKeySpec::CompositeColumns(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_resolve_no_primary_key() {
        let columns = vec![column("x", 0), column("y", 0)];
        assert_eq!(
            resolve_primary_key(&columns),
            PrimaryKeySpec::RowIdentityFallback
        );
    }

    #[test]
    fn test_identity_expression_single() {
        let spec = PrimaryKeySpec::SingleColumn("id".to_string());
        assert_eq!(identity_expression(&spec), "CAST(\"id\" AS TEXT)");
    }

    #[test]
    fn test_identity_expression_composite() {
        let spec =
            PrimaryKeySpec::CompositeColumns(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            identity_expression(&spec),
            "CAST(\"a\" AS TEXT) || '|' || CAST(\"b\" AS TEXT)"
        );
    }

    #[test]
    fn test_identity_expression_fallback() {
        assert_eq!(
            identity_expression(&PrimaryKeySpec::RowIdentityFallback),
            "CAST(rowid AS TEXT)"
        );
    }

    #[test]
    fn test_identity_expression_escapes_quotes() {
        let spec = PrimaryKeySpec::SingleColumn("weird\"col".to_string());
        assert_eq!(
            identity_expression(&spec),
            "CAST(\"weird\"\"col\" AS TEXT)"
        );
    }
}
