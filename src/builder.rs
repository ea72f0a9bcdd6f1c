//! Resolver type-table construction.
//!
//! Runs the same precedence chain twice — once for `ResolversTypes` (every
//! entry wrapped in the resolver return marker) and once for
//! `ResolversParentTypes` (identity, no wrapper) — consuming the finished
//! dependency table and the mapper registry. First matching step wins:
//!
//! 1. root type              → wrap(root-value expression)
//! 2. enum with override     → override identifier, unwrapped
//! 3. explicit mapper        → wrap(expression), mark used
//! 4. literal default mapper → wrap(default expression) verbatim
//! 5. scalar                 → wrap(`Scalars['Name']`)
//! 6. union                  → member lookups joined with ` | `, never wrapped
//! 7. otherwise              → converted identifier, field overrides applied

use indexmap::IndexMap;

use crate::analysis::DependencyTable;
use crate::config::Config;
use crate::mappers::MapperRegistry;
use crate::names::convert_name;
use crate::schema::{Schema, SchemaType, TypeKind};
use crate::usage::UsageTracker;
use crate::wrap::wrap_field_type;

/// Which of the two parallel tables is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableVariant {
    /// What a computed-field resolver may return.
    ResolverTypes,
    /// What a child resolver sees as its parent value.
    ParentTypes,
}

impl TableVariant {
    pub fn table_name(self) -> &'static str {
        match self {
            TableVariant::ResolverTypes => "ResolversTypes",
            TableVariant::ParentTypes => "ResolversParentTypes",
        }
    }

    /// The wrapper marker distinguishing an already-resolved resolver return
    /// shape from the bare expression. Identity for the parent table.
    fn wrap(self, expr: &str) -> String {
        match self {
            TableVariant::ResolverTypes => format!("ResolverTypeWrapper<{expr}>"),
            TableVariant::ParentTypes => expr.to_string(),
        }
    }

    /// Indexed lookup into the table being emitted.
    fn lookup(self, type_name: &str) -> String {
        format!("{}['{type_name}']", self.table_name())
    }
}

/// Both output tables; parallel, total, identical key sets.
#[derive(Debug, Clone)]
pub struct ResolverTables {
    pub resolvers_types: IndexMap<String, String>,
    pub resolvers_parent_types: IndexMap<String, String>,
}

pub struct TableBuilder<'a> {
    schema: &'a Schema,
    config: &'a Config,
    registry: &'a MapperRegistry,
    dependencies: &'a DependencyTable,
}

impl<'a> TableBuilder<'a> {
    pub fn new(
        schema: &'a Schema,
        config: &'a Config,
        registry: &'a MapperRegistry,
        dependencies: &'a DependencyTable,
    ) -> Self {
        TableBuilder { schema, config, registry, dependencies }
    }

    /// Build both tables. `usage` accumulates dereferenced mapper names
    /// across both runs.
    pub fn build(&self, usage: &mut UsageTracker) -> ResolverTables {
        ResolverTables {
            resolvers_types: self.build_variant(TableVariant::ResolverTypes, usage),
            resolvers_parent_types: self.build_variant(TableVariant::ParentTypes, usage),
        }
    }

    fn build_variant(
        &self,
        variant: TableVariant,
        usage: &mut UsageTracker,
    ) -> IndexMap<String, String> {
        self.schema
            .table_names()
            .map(|name| {
                let ty = &self.schema.types[name];
                (name.to_string(), self.entry(ty, variant, usage))
            })
            .collect()
    }

    fn entry(&self, ty: &SchemaType, variant: TableVariant, usage: &mut UsageTracker) -> String {
        let name = ty.name.as_str();

        // 1. Root types resolve via the root-value mapper irrespective of
        //    their own fields.
        if matches!(ty.kind, TypeKind::Root { .. }) {
            let expr = self.registry.root_value().template.substitute(&convert_name(name));
            return variant.wrap(&expr);
        }

        // 2. Enum override replaces the whole representation, never wrapped.
        if matches!(ty.kind, TypeKind::Enum { .. }) {
            if let Some(identifier) = self.registry.enum_override(name) {
                return identifier.to_string();
            }
        }

        // 3. Explicit mapper; a leftover placeholder takes the type's own
        //    converted name.
        if let Some(mapper) = self
            .registry
            .mapper(name)
            .filter(|m| !m.template.expression().is_empty())
        {
            usage.mark_used(name);
            let expr = mapper.template.substitute(&convert_name(name));
            return variant.wrap(&expr);
        }

        // 4. A literal default mapper applies verbatim.
        if let Some(default) = self.registry.default_mapper() {
            if !default.template.is_templated() {
                return variant.wrap(default.template.expression());
            }
        }

        // 5/6/7. Unwrapped base representation.
        let is_union = matches!(ty.kind, TypeKind::Union { .. });
        let base = self.base_representation(ty, variant, usage);

        // Templated default mapper wraps the base representation in its
        // slot; unions skip the outer wrap since each member already
        // carries one.
        if let Some(default) = self.registry.default_mapper() {
            let substituted = default.template.substitute(&base);
            return if is_union { substituted } else { variant.wrap(&substituted) };
        }

        if is_union { base } else { variant.wrap(&base) }
    }

    /// Steps 5–7: the representation before the wrapper marker.
    fn base_representation(
        &self,
        ty: &SchemaType,
        variant: TableVariant,
        usage: &mut UsageTracker,
    ) -> String {
        match &ty.kind {
            TypeKind::Scalar => format!("Scalars['{}']", ty.name),
            TypeKind::Union { members } => members
                .iter()
                .map(|member| variant.lookup(member))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeKind::Object { fields } | TypeKind::Interface { fields } => {
                self.fielded_identifier(&ty.name, fields, variant, usage)
            }
            // Enums without an override, and anything the chain does not
            // recognize, fall through to the plain converted identifier.
            _ => convert_name(&ty.name),
        }
    }

    /// Step 7 plus field-level override: fields whose base type is mapped,
    /// dependency-marked, or a union are structurally replaced; the rest
    /// keep their declared shape through the base identifier.
    fn fielded_identifier(
        &self,
        type_name: &str,
        fields: &IndexMap<String, crate::schema::FieldType>,
        variant: TableVariant,
        usage: &mut UsageTracker,
    ) -> String {
        let identifier = convert_name(type_name);

        let mut replaced: Vec<(String, bool, String)> = Vec::new();
        for (field_name, field_type) in fields {
            let base = field_type.base();
            let is_union = matches!(
                self.schema.get(base).map(|t| &t.kind),
                Some(TypeKind::Union { .. })
            );
            let relevant = self.registry.has_mapper(base)
                || self.dependencies.get(base).copied().unwrap_or(false)
                || is_union;
            if !relevant {
                continue;
            }
            // A mapper on a base type the schema never declares is not
            // dereferenced here (the lookup would dangle); leave it for the
            // unused-mapper diagnostic.
            if self.registry.has_mapper(base) && self.schema.get(base).is_some() {
                usage.mark_used(base);
            }
            let optional = !(self.config.avoid_optionals || field_type.is_non_null());
            let expr = wrap_field_type(field_type, &variant.lookup(base));
            replaced.push((field_name.clone(), optional, expr));
        }

        if replaced.is_empty() {
            return identifier;
        }

        let omitted = replaced
            .iter()
            .map(|(field, _, _)| format!("'{field}'"))
            .collect::<Vec<_>>()
            .join(" | ");
        let entries = replaced
            .iter()
            .map(|(field, optional, expr)| {
                let marker = if *optional { "?" } else { "" };
                format!("{field}{marker}: {expr}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("Omit<{identifier}, {omitted}> & {{ {entries} }}")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

/// One full derivation pass: registry and dependency table computed eagerly,
/// both output tables built, usage accumulated. Everything but `usage` is
/// immutable afterward.
#[derive(Debug)]
pub struct Derivation {
    pub registry: MapperRegistry,
    pub dependencies: DependencyTable,
    pub resolvers_types: IndexMap<String, String>,
    pub resolvers_parent_types: IndexMap<String, String>,
    pub usage: UsageTracker,
}

impl Derivation {
    pub fn run(schema: &Schema, config: &Config) -> Self {
        let registry = MapperRegistry::from_config(config);
        let dependencies =
            crate::analysis::DependencyAnalyzer::new(schema, &registry).analyze();
        let mut usage = UsageTracker::new();
        let tables = TableBuilder::new(schema, config, &registry, &dependencies).build(&mut usage);
        Derivation {
            registry,
            dependencies,
            resolvers_types: tables.resolvers_types,
            resolvers_parent_types: tables.resolvers_parent_types,
            usage,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
