// Strongly-typed schema graph for table derivation. No serde_json::Value here.

use indexmap::IndexMap;
use serde::Deserialize;

/// A field's type reference: a chain of modifiers around one named base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Named(String),
    List(Box<FieldType>),
    NonNull(Box<FieldType>),
}

impl FieldType {
    /// The named type with list/non-null modifiers stripped.
    pub fn base(&self) -> &str {
        match self {
            FieldType::Named(name) => name,
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.base(),
        }
    }

    /// True when the outermost modifier is non-null.
    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }
}

/// What a named type *is*. Exactly one arm per schema construct; the
/// builder pattern-matches on this and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Object { fields: IndexMap<String, FieldType> },
    Interface { fields: IndexMap<String, FieldType> },
    Union { members: Vec<String> },
    Scalar,
    Enum { values: Vec<String> },
    /// A designated entry-point type (query/mutation/subscription-equivalent).
    /// Carries fields like an object, but resolves via the root-value mapper.
    Root { fields: IndexMap<String, FieldType> },
}

impl TypeKind {
    pub fn fields(&self) -> Option<&IndexMap<String, FieldType>> {
        match self {
            TypeKind::Object { fields }
            | TypeKind::Interface { fields }
            | TypeKind::Root { fields } => Some(fields),
            TypeKind::Union { .. } | TypeKind::Scalar | TypeKind::Enum { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    pub name: String,
    pub kind: TypeKind,
}

/// The full type graph. Iteration order is input order (stable for
/// deterministic table emission).
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub types: IndexMap<String, SchemaType>,
}

/// The GraphQL reserved prefix; such types never enter the tables.
pub const INTROSPECTION_PREFIX: &str = "__";

pub fn is_introspection(name: &str) -> bool {
    name.starts_with(INTROSPECTION_PREFIX)
}

impl Schema {
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    /// All table keys: every non-introspection named type, input order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.types
            .keys()
            .map(String::as_str)
            .filter(|n| !is_introspection(n))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE-REFERENCE SYNTAX
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("empty type reference")]
    EmptyTypeRef,
    #[error("unbalanced brackets in type reference: {0:?}")]
    UnbalancedBrackets(String),
    #[error("trailing characters in type reference: {0:?}")]
    TrailingChars(String),
}

impl FieldType {
    /// Parse the compact reference syntax: `Name`, `Name!`, `[Name]`,
    /// `[Name!]!`, arbitrarily nested.
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let raw = raw.trim();
        let (ty, rest) = parse_type_ref(raw)?;
        if !rest.is_empty() {
            return Err(SchemaError::TrailingChars(raw.to_string()));
        }
        Ok(ty)
    }
}

fn parse_type_ref(s: &str) -> Result<(FieldType, &str), SchemaError> {
    if s.is_empty() {
        return Err(SchemaError::EmptyTypeRef);
    }
    let (inner, mut rest) = if let Some(tail) = s.strip_prefix('[') {
        let (item, tail) = parse_type_ref(tail)?;
        let tail = tail
            .strip_prefix(']')
            .ok_or_else(|| SchemaError::UnbalancedBrackets(s.to_string()))?;
        (FieldType::List(Box::new(item)), tail)
    } else {
        let end = s
            .find(|c: char| c == '!' || c == ']')
            .unwrap_or(s.len());
        if end == 0 {
            return Err(SchemaError::EmptyTypeRef);
        }
        (FieldType::Named(s[..end].to_string()), &s[end..])
    };
    let ty = if let Some(tail) = rest.strip_prefix('!') {
        rest = tail;
        FieldType::NonNull(Box::new(inner))
    } else {
        inner
    };
    Ok((ty, rest))
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Named(name) => write!(f, "{name}"),
            FieldType::List(inner) => write!(f, "[{inner}]"),
            FieldType::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INPUT FORMAT (JSON)
// ————————————————————————————————————————————————————————————————————————————

/// On-disk description of one type, as written in the schema JSON file.
/// Field references use the compact syntax above.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchemaType {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Schema {
    pub fn from_raw(raw_types: Vec<RawSchemaType>) -> Result<Self, SchemaError> {
        let mut types = IndexMap::with_capacity(raw_types.len());
        for raw in raw_types {
            let parse_fields = |fields: &IndexMap<String, String>| {
                fields
                    .iter()
                    .map(|(name, ty)| Ok((name.clone(), FieldType::parse(ty)?)))
                    .collect::<Result<IndexMap<_, _>, SchemaError>>()
            };
            let kind = match raw.kind.as_str() {
                "object" => TypeKind::Object { fields: parse_fields(&raw.fields)? },
                "interface" => TypeKind::Interface { fields: parse_fields(&raw.fields)? },
                "root" => TypeKind::Root { fields: parse_fields(&raw.fields)? },
                "union" => TypeKind::Union { members: raw.members },
                "scalar" => TypeKind::Scalar,
                "enum" => TypeKind::Enum { values: raw.values },
                // Permissive default: an unrecognized kind behaves like a
                // plain object and ends up as its converted identifier.
                _ => TypeKind::Object { fields: parse_fields(&raw.fields)? },
            };
            let name = raw.name.clone();
            types.insert(name.clone(), SchemaType { name, kind });
        }
        Ok(Schema { types })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_named_type() {
        assert_eq!(FieldType::parse("User").unwrap(), FieldType::Named("User".into()));
    }

    #[test]
    fn parse_non_null_list_of_non_null() {
        let ty = FieldType::parse("[Episode!]!").unwrap();
        assert_eq!(
            ty,
            FieldType::NonNull(Box::new(FieldType::List(Box::new(FieldType::NonNull(
                Box::new(FieldType::Named("Episode".into()))
            )))))
        );
        assert_eq!(ty.base(), "Episode");
        assert!(ty.is_non_null());
    }

    #[test]
    fn parse_nested_lists() {
        let ty = FieldType::parse("[[Int]]").unwrap();
        assert_eq!(ty.to_string(), "[[Int]]");
        assert_eq!(ty.base(), "Int");
        assert!(!ty.is_non_null());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(FieldType::parse("").is_err());
        assert!(FieldType::parse("[User").is_err());
        assert!(FieldType::parse("User]").is_err());
        assert!(FieldType::parse("!").is_err());
    }

    #[test]
    fn display_round_trips() {
        for raw in ["User", "User!", "[User]", "[User!]!", "[[ID!]]!"] {
            assert_eq!(FieldType::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn table_names_skip_introspection() {
        let raw = vec![
            RawSchemaType {
                name: "User".into(),
                kind: "object".into(),
                fields: IndexMap::new(),
                members: vec![],
                values: vec![],
            },
            RawSchemaType {
                name: "__Schema".into(),
                kind: "object".into(),
                fields: IndexMap::new(),
                members: vec![],
                values: vec![],
            },
        ];
        let schema = Schema::from_raw(raw).unwrap();
        let names: Vec<&str> = schema.table_names().collect();
        assert_eq!(names, vec!["User"]);
    }

    #[test]
    fn unknown_kind_falls_through_to_a_plain_object() {
        let raw = vec![RawSchemaType {
            name: "X".into(),
            kind: "directive".into(),
            fields: IndexMap::new(),
            members: vec![],
            values: vec![],
        }];
        let schema = Schema::from_raw(raw).unwrap();
        assert_eq!(
            schema.get("X").unwrap().kind,
            TypeKind::Object { fields: IndexMap::new() }
        );
    }
}
