//! Usage tracking boundary.
//!
//! Records which registered mappers were actually dereferenced while the
//! tables were built, and exposes the grouped external references the
//! import-emitting collaborator consumes. Append-only; correct under the
//! sequential visitation the derivation guarantees.

use std::collections::{BTreeMap, BTreeSet};

use crate::mappers::MapperRegistry;

#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    used: BTreeSet<String>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_used(&mut self, type_name: &str) {
        self.used.insert(type_name.to_string());
    }

    pub fn is_used(&self, type_name: &str) -> bool {
        self.used.contains(type_name)
    }

    pub fn used_names(&self) -> impl Iterator<Item = &str> {
        self.used.iter().map(String::as_str)
    }

    /// Configured-but-unused mapper names, sorted. Diagnostic only.
    pub fn unused_mappers(&self, registry: &MapperRegistry) -> Vec<String> {
        let mut unused: Vec<String> = registry
            .registered_names()
            .filter(|name| !self.used.contains(*name))
            .map(str::to_string)
            .collect();
        unused.sort();
        unused
    }
}

/// One externally-sourced identifier, ready for import aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExternalReference {
    pub ident: String,
    pub is_default_import: bool,
}

/// Externally-sourced descriptors grouped by source module, deduplicated,
/// deterministic order.
pub fn grouped_external_references(
    registry: &MapperRegistry,
) -> BTreeMap<String, Vec<ExternalReference>> {
    let mut grouped: BTreeMap<String, BTreeSet<ExternalReference>> = BTreeMap::new();
    for descriptor in registry.external_descriptors() {
        let (Some(module), Some(ident)) = (&descriptor.source_module, &descriptor.ident) else {
            continue;
        };
        grouped.entry(module.clone()).or_default().insert(ExternalReference {
            ident: ident.clone(),
            is_default_import: descriptor.is_default_import,
        });
    }
    grouped
        .into_iter()
        .map(|(module, refs)| (module, refs.into_iter().collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn registry(json: &str) -> MapperRegistry {
        MapperRegistry::from_config(&Config::from_json(json).unwrap())
    }

    #[test]
    fn unused_is_registered_minus_used() {
        let reg = registry(
            r#"{ "mappers": {
                "User": "./models#UserModel",
                "Post": "./models#PostModel",
                "Tag": "TagShape"
            } }"#,
        );
        let mut tracker = UsageTracker::new();
        tracker.mark_used("User");
        assert_eq!(tracker.unused_mappers(&reg), vec!["Post".to_string(), "Tag".to_string()]);
        assert!(tracker.is_used("User"));
        assert!(!tracker.is_used("Post"));
    }

    #[test]
    fn grouping_collects_by_module_and_dedups() {
        let reg = registry(
            r#"{
                "contextType": "./ctx#AppContext",
                "mappers": {
                    "User": "./models#UserModel",
                    "Post": "./models#PostModel",
                    "Admin": "./models#UserModel",
                    "Profile": "./profile#default",
                    "Tag": "TagShape"
                }
            }"#,
        );
        let grouped = grouped_external_references(&reg);
        let modules: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(modules, vec!["./ctx", "./models", "./profile"]);

        let models = &grouped["./models"];
        assert_eq!(
            models,
            &vec![
                ExternalReference { ident: "PostModel".into(), is_default_import: false },
                ExternalReference { ident: "UserModel".into(), is_default_import: false },
            ]
        );

        let profile = &grouped["./profile"];
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].ident, "Profile");
        assert!(profile[0].is_default_import);
    }

    #[test]
    fn literal_mappers_never_group() {
        let reg = registry(r#"{ "mappers": { "Tag": "TagShape" } }"#);
        assert!(grouped_external_references(&reg).is_empty());
    }
}
