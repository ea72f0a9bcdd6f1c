//! Override-string parsing.
//!
//! An override is a bare literal expression, `modulePath#Identifier` (named
//! external reference), or `modulePath#default` (default external reference);
//! any of these may embed one `{T}` placeholder. Parsing never fails —
//! malformed input degrades to a literal, non-external expression.

use indexmap::IndexMap;

/// Placeholder token inside an override or default-mapper expression.
pub const PLACEHOLDER: &str = "{T}";
/// Separator between a module path and the imported identifier.
const MODULE_SEPARATOR: char = '#';
/// Reserved identifier marking a default import.
const DEFAULT_IMPORT: &str = "default";

/// A type expression that may carry one substitution slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Literal(String),
    Templated(String),
}

impl Template {
    pub fn new(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        if expression.contains(PLACEHOLDER) {
            Template::Templated(expression)
        } else {
            Template::Literal(expression)
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            Template::Literal(e) | Template::Templated(e) => e,
        }
    }

    pub fn is_templated(&self) -> bool {
        matches!(self, Template::Templated(_))
    }

    /// Fill the slot. Literals come back unchanged.
    pub fn substitute(&self, value: &str) -> String {
        match self {
            Template::Literal(e) => e.clone(),
            Template::Templated(e) => e.replace(PLACEHOLDER, value),
        }
    }
}

/// One parsed override: what expression to substitute for a type, and where
/// the identifier comes from if it is externally sourced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperDescriptor {
    pub template: Template,
    /// Imported symbol for external references (`Wrap` for `./m#Wrap<{T}>`).
    pub ident: Option<String>,
    pub source_module: Option<String>,
    pub is_external: bool,
    pub is_default_import: bool,
}

impl MapperDescriptor {
    fn literal(expression: impl Into<String>) -> Self {
        MapperDescriptor {
            template: Template::new(expression),
            ident: None,
            source_module: None,
            is_external: false,
            is_default_import: false,
        }
    }
}

/// Parse one raw override. `fallback_ident` stands in when the raw string is
/// empty, and becomes the local binding for `modulePath#default`.
pub fn parse_override(raw: &str, fallback_ident: &str) -> MapperDescriptor {
    match raw.split_once(MODULE_SEPARATOR) {
        None => {
            if raw.is_empty() {
                MapperDescriptor::literal(fallback_ident)
            } else {
                MapperDescriptor::literal(raw)
            }
        }
        Some((module, identifier)) if !module.is_empty() && !identifier.is_empty() => {
            let is_default_import = identifier == DEFAULT_IMPORT;
            let expression = if is_default_import {
                fallback_ident.to_string()
            } else {
                identifier.to_string()
            };
            // `Wrap<{T}>` imports `Wrap`.
            let ident = expression
                .split_once('<')
                .map(|(head, _)| head)
                .unwrap_or(&expression)
                .to_string();
            MapperDescriptor {
                template: Template::new(expression),
                ident: Some(ident),
                source_module: Some(module.to_string()),
                is_external: true,
                is_default_import,
            }
        }
        // Dangling separator (`#X`, `m#`) degrades to a literal.
        Some(_) => MapperDescriptor::literal(raw),
    }
}

/// All parsed overrides for one generation pass, built once from
/// configuration and immutable thereafter.
#[derive(Debug, Clone)]
pub struct MapperRegistry {
    mappers: IndexMap<String, MapperDescriptor>,
    enum_overrides: IndexMap<String, String>,
    context: MapperDescriptor,
    root_value: MapperDescriptor,
    default_mapper: Option<MapperDescriptor>,
}

impl MapperRegistry {
    pub fn from_config(config: &crate::config::Config) -> Self {
        let mappers = register_all(&config.mappers);
        // The absent-option path takes the bare display default; a configured
        // override gets an identifier-like fallback so `module#default` binds
        // a usable import symbol.
        let context = match config.context_type.as_deref() {
            None => parse_override("", crate::config::DEFAULT_CONTEXT_TYPE),
            Some(raw) => parse_override(raw, "ContextType"),
        };
        let root_value = match config.root_value_type.as_deref() {
            None => parse_override("", crate::config::DEFAULT_ROOT_VALUE_TYPE),
            Some(raw) => parse_override(raw, "RootValueType"),
        };
        let default_mapper = config
            .default_mapper
            .as_deref()
            .map(|raw| parse_override(raw, "DefaultMapperType"));
        MapperRegistry {
            mappers,
            enum_overrides: config.enum_values.clone(),
            context,
            root_value,
            default_mapper,
        }
    }

    pub fn mapper(&self, type_name: &str) -> Option<&MapperDescriptor> {
        self.mappers.get(type_name)
    }

    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.mappers
            .get(type_name)
            .is_some_and(|m| !m.template.expression().is_empty())
    }

    pub fn enum_override(&self, enum_name: &str) -> Option<&str> {
        self.enum_overrides.get(enum_name).map(String::as_str)
    }

    pub fn context(&self) -> &MapperDescriptor {
        &self.context
    }

    pub fn root_value(&self) -> &MapperDescriptor {
        &self.root_value
    }

    /// Absent unless configured; callers check presence before use.
    pub fn default_mapper(&self) -> Option<&MapperDescriptor> {
        self.default_mapper.as_ref()
    }

    /// Registered per-type mapper names, registration order.
    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.mappers.keys().map(String::as_str)
    }

    /// External descriptors (per-type plus the singleton slots), for the
    /// import-emitting collaborator.
    pub fn external_descriptors(&self) -> impl Iterator<Item = &MapperDescriptor> {
        self.mappers
            .values()
            .chain([&self.context, &self.root_value])
            .chain(self.default_mapper.as_ref())
            .filter(|m| m.is_external)
    }
}

/// Parse every entry of a raw override map. The type name doubles as the
/// fallback identifier.
pub fn register_all(raw: &IndexMap<String, String>) -> IndexMap<String, MapperDescriptor> {
    raw.iter()
        .map(|(type_name, raw_override)| {
            (type_name.clone(), parse_override(raw_override, type_name))
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
