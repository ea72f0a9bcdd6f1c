//! Type dependency analysis.
//!
//! Decides, per type, whether its resolver-visible shape must diverge from
//! the default generated shape — either directly (an explicit mapper is
//! registered for it) or transitively (some field's base type requires a
//! non-default representation). Memoized depth-first walk with an explicit
//! in-progress stack; a base type currently on the stack contributes
//! nothing (conservative cycle break, never an error).

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::mappers::MapperRegistry;
use crate::schema::{is_introspection, Schema, TypeKind};

/// Scalars with a built-in representation; they never force a divergence
/// on their own.
static BUILTIN_SCALARS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["ID", "String", "Boolean", "Int", "Float"]));

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(name)
}

/// Type name → "requires a non-default representation". Total over all
/// non-introspection names, read-only once computed.
pub type DependencyTable = IndexMap<String, bool>;

/// Mutable walk state, passed by reference; keeps the analysis a function of
/// (schema, registry, accumulator).
#[derive(Debug, Default)]
struct WalkState {
    memo: IndexMap<String, bool>,
    in_progress: Vec<String>,
}

pub struct DependencyAnalyzer<'a> {
    schema: &'a Schema,
    registry: &'a MapperRegistry,
}

impl<'a> DependencyAnalyzer<'a> {
    pub fn new(schema: &'a Schema, registry: &'a MapperRegistry) -> Self {
        DependencyAnalyzer { schema, registry }
    }

    /// Compute the full table. Must finish before table construction begins;
    /// the builder treats the result as a finished oracle.
    pub fn analyze(&self) -> DependencyTable {
        let mut state = WalkState::default();
        for name in self.schema.table_names() {
            self.requires(name, &mut state);
        }
        // Re-key in schema order; memo insertion order is walk completion order.
        self.schema
            .table_names()
            .map(|name| (name.to_string(), state.memo[name]))
            .collect()
    }

    fn requires(&self, name: &str, state: &mut WalkState) -> bool {
        if let Some(&known) = state.memo.get(name) {
            return known;
        }
        let result = self.walk(name, state);
        state.memo.insert(name.to_string(), result);
        result
    }

    fn walk(&self, name: &str, state: &mut WalkState) -> bool {
        if is_introspection(name) || is_builtin_scalar(name) {
            return false;
        }
        if self.registry.has_mapper(name) {
            return true;
        }
        match self.schema.get(name).map(|t| &t.kind) {
            Some(
                TypeKind::Object { fields }
                | TypeKind::Interface { fields }
                | TypeKind::Root { fields },
            ) => {
                state.in_progress.push(name.to_string());
                let mut required = false;
                for field_type in fields.values() {
                    let base = field_type.base();
                    if state.in_progress.iter().any(|n| n == base) {
                        continue;
                    }
                    if self.requires(base, state) {
                        required = true;
                        break;
                    }
                }
                state.in_progress.pop();
                required
            }
            // Union, Enum, unoverridden Scalar, or a name the schema does
            // not declare (e.g. an implicit built-in).
            _ => false,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::{RawSchemaType, Schema};
    use indexmap::IndexMap as Map;

    fn raw(name: &str, kind: &str, fields: &[(&str, &str)]) -> RawSchemaType {
        RawSchemaType {
            name: name.into(),
            kind: kind.into(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            members: vec![],
            values: vec![],
        }
    }

    fn schema(types: Vec<RawSchemaType>) -> Schema {
        Schema::from_raw(types).unwrap()
    }

    fn config_with_mappers(mappers: &[(&str, &str)]) -> Config {
        let mut cfg = Config::default();
        cfg.mappers = mappers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Map<_, _>>();
        cfg
    }

    fn analyze(sch: &Schema, cfg: &Config) -> DependencyTable {
        let registry = MapperRegistry::from_config(cfg);
        DependencyAnalyzer::new(sch, &registry).analyze()
    }

    #[test]
    fn mapped_type_is_required() {
        let sch = schema(vec![raw("User", "object", &[("id", "ID!")])]);
        let table = analyze(&sch, &config_with_mappers(&[("User", "./models#UserModel")]));
        assert_eq!(table["User"], true);
    }

    #[test]
    fn requirement_propagates_through_fields() {
        let sch = schema(vec![
            raw("Query", "root", &[("feed", "[Post!]!")]),
            raw("Post", "object", &[("author", "User")]),
            raw("User", "object", &[("id", "ID!")]),
        ]);
        let table = analyze(&sch, &config_with_mappers(&[("User", "UserModel")]));
        assert_eq!(table["User"], true);
        assert_eq!(table["Post"], true, "transitive via author");
        assert_eq!(table["Query"], true, "transitive via feed");
    }

    #[test]
    fn unmapped_graph_is_all_false() {
        let sch = schema(vec![
            raw("Query", "root", &[("me", "User")]),
            raw("User", "object", &[("id", "ID!"), ("name", "String")]),
        ]);
        let table = analyze(&sch, &Config::default());
        assert!(table.values().all(|&v| !v));
    }

    #[test]
    fn mutual_recursion_terminates_conservatively() {
        let sch = schema(vec![
            raw("A", "object", &[("b", "B")]),
            raw("B", "object", &[("a", "A")]),
        ]);
        let table = analyze(&sch, &Config::default());
        assert_eq!(table["A"], false);
        assert_eq!(table["B"], false);
    }

    #[test]
    fn cycle_with_a_mapped_member_still_propagates() {
        // A -> B -> A is broken conservatively, but B -> C (mapped) wins.
        let sch = schema(vec![
            raw("A", "object", &[("b", "B")]),
            raw("B", "object", &[("a", "A"), ("c", "C")]),
            raw("C", "object", &[("id", "ID!")]),
        ]);
        let table = analyze(&sch, &config_with_mappers(&[("C", "CModel")]));
        assert_eq!(table["C"], true);
        assert_eq!(table["B"], true);
        assert_eq!(table["A"], true);
    }

    #[test]
    fn table_is_total_and_in_schema_order() {
        let sch = schema(vec![
            raw("Zeta", "object", &[("id", "ID!")]),
            raw("Alpha", "object", &[("z", "Zeta")]),
            RawSchemaType {
                name: "__Schema".into(),
                kind: "object".into(),
                fields: Map::new(),
                members: vec![],
                values: vec![],
            },
        ]);
        let table = analyze(&sch, &Config::default());
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn builtin_and_custom_scalars_do_not_require() {
        let sch = schema(vec![
            raw("Date", "scalar", &[]),
            raw("Event", "object", &[("at", "Date!"), ("id", "ID!")]),
        ]);
        let table = analyze(&sch, &Config::default());
        assert_eq!(table["Date"], false);
        assert_eq!(table["Event"], false);
    }

    #[test]
    fn mapped_scalar_requires_and_propagates() {
        let sch = schema(vec![
            raw("Date", "scalar", &[]),
            raw("Event", "object", &[("at", "Date!")]),
        ]);
        let table = analyze(&sch, &config_with_mappers(&[("Date", "luxon#DateTime")]));
        assert_eq!(table["Date"], true);
        assert_eq!(table["Event"], true);
    }
}
