//! Field type wrapping.
//!
//! Converts a field's nullability/list modifier chain into the final wrapped
//! expression, outward-in: every nullable position gets an explicit `Maybe`,
//! non-null strips exactly its immediately enclosing `Maybe`, and list item
//! nullability stays independent of list nullability.

use crate::schema::FieldType;

const NULLABLE_OPEN: &str = "Maybe<";
const LIST_OPEN: &str = "Array<";

/// Apply the modifier chain of `ty` around an already-resolved base
/// expression.
pub fn wrap_field_type(ty: &FieldType, base_expr: &str) -> String {
    match ty {
        FieldType::Named(_) => format!("{NULLABLE_OPEN}{base_expr}>"),
        FieldType::List(item) => {
            format!("{NULLABLE_OPEN}{LIST_OPEN}{}>>", wrap_field_type(item, base_expr))
        }
        FieldType::NonNull(inner) => strip_nullable(wrap_field_type(inner, base_expr)),
    }
}

/// Remove the nearest enclosing nullable marker, if there is one.
fn strip_nullable(expr: String) -> String {
    expr.strip_prefix(NULLABLE_OPEN)
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::to_string)
        .unwrap_or(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped(raw: &str, base: &str) -> String {
        wrap_field_type(&FieldType::parse(raw).unwrap(), base)
    }

    #[test]
    fn bare_named_type_is_nullable() {
        assert_eq!(wrapped("User", "ResolversTypes['User']"), "Maybe<ResolversTypes['User']>");
    }

    #[test]
    fn non_null_strips_its_own_marker() {
        assert_eq!(wrapped("User!", "E"), "E");
    }

    #[test]
    fn list_nullability_is_independent_of_item_nullability() {
        assert_eq!(wrapped("[User]", "E"), "Maybe<Array<Maybe<E>>>");
        assert_eq!(wrapped("[User!]", "E"), "Maybe<Array<E>>");
        assert_eq!(wrapped("[User]!", "E"), "Array<Maybe<E>>");
        assert_eq!(wrapped("[User!]!", "E"), "Array<E>");
    }

    #[test]
    fn nested_lists_keep_every_position_explicit() {
        assert_eq!(wrapped("[[Int]]", "E"), "Maybe<Array<Maybe<Array<Maybe<E>>>>>");
        assert_eq!(wrapped("[[Int!]!]!", "E"), "Array<Array<E>>");
    }

    #[test]
    fn double_non_null_is_a_no_op_after_the_first() {
        // Not valid syntax via the parser, but the wrapper itself tolerates it.
        let ty = FieldType::NonNull(Box::new(FieldType::NonNull(Box::new(FieldType::Named(
            "X".into(),
        )))));
        assert_eq!(wrap_field_type(&ty, "E"), "E");
    }
}
