//! Identifier conversion seam.
//!
//! Naming conventions proper belong to the surrounding generator; the table
//! derivation only needs one hook: the converted identifier a type's default
//! generated declaration will carry.

/// Converted identifier for a named type. GraphQL type names are already
/// Pascal-cased in practice; this uppercases the first scalar and keeps the
/// rest verbatim (underscores included).
pub fn convert_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Name of the generated arguments type for a field, honoring the
/// underscore-separator option (`Query_UserArgs` vs `QueryUserArgs`).
pub fn args_type_name(type_name: &str, field_name: &str, add_underscore: bool) -> String {
    let sep = if add_underscore { "_" } else { "" };
    format!("{}{sep}{}Args", convert_name(type_name), convert_name(field_name))
}
