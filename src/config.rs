//! Generator configuration: one explicit record, every option defaulted,
//! deserialized once at load time.

use indexmap::IndexMap;
use serde::Deserialize;

/// Expression used for the context type when none is configured.
pub const DEFAULT_CONTEXT_TYPE: &str = "any";
/// Expression used for the root value when none is configured.
pub const DEFAULT_ROOT_VALUE_TYPE: &str = "{}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Separate generated args-type names with an underscore
    /// (`Query_UserArgs` instead of `QueryUserArgs`).
    #[serde(default)]
    pub add_underscore_to_args_type: bool,

    /// Override for the resolver context type. Plain expression or
    /// `modulePath#Identifier` / `modulePath#default`.
    #[serde(default)]
    pub context_type: Option<String>,

    /// Override for the root value type (what root resolvers receive).
    #[serde(default)]
    pub root_value_type: Option<String>,

    /// Per-type overrides replacing the default generated representation.
    /// Same syntax as `context_type`; may embed the `{T}` placeholder.
    #[serde(default)]
    pub mappers: IndexMap<String, String>,

    /// Fallback override for every type without an explicit mapper.
    /// With a `{T}` placeholder it acts as a template around the default
    /// representation; without one it replaces it verbatim.
    #[serde(default)]
    pub default_mapper: Option<String>,

    /// Generate required (non-optional) replacement fields.
    #[serde(default)]
    pub avoid_optionals: bool,

    /// Report mappers that were configured but never consumed.
    #[serde(default)]
    pub show_unused_mappers: bool,

    /// Per-enum identifier substitution. Replaces the whole representation.
    #[serde(default)]
    pub enum_values: IndexMap<String, String>,
}

impl Config {
    /// Deserialize from JSON with path-qualified error messages.
    pub fn from_json(source: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
        let de = &mut serde_json::Deserializer::from_str(source);
        serde_path_to_error::deserialize(de)
    }
}
