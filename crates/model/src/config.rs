use crate::resource::{ResourceRef, Role};
use crate::vocab::skos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of hierarchy a view renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HierarchyKind {
    Class,
    Concept,
    Property,
}

impl HierarchyKind {
    /// Role of the resources populating this hierarchy
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            HierarchyKind::Class => Role::Class,
            HierarchyKind::Concept => Role::Concept,
            HierarchyKind::Property => Role::Property,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HierarchyKind::Class => "class",
            HierarchyKind::Concept => "concept",
            HierarchyKind::Property => "property",
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope the top level of a hierarchy is fetched for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyScope {
    /// Root resource (e.g. a root class); None = server default
    #[serde(default)]
    pub root: Option<ResourceRef>,

    /// Concept schemes; empty = "no scheme"
    #[serde(default)]
    pub schemes: Vec<ResourceRef>,
}

impl HierarchyScope {
    #[must_use]
    pub fn unscoped() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rooted_at(root: ResourceRef) -> Self {
        Self {
            root: Some(root),
            schemes: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_schemes(schemes: Vec<ResourceRef>) -> Self {
        Self { root: None, schemes }
    }
}

/// Properties and flags defining parent/child edges of a hierarchy.
///
/// When `sync_inverse` is set, every broader property with a declared inverse
/// has that inverse in `narrower_props`, and the other way round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyConfiguration {
    #[serde(default = "default_true")]
    pub include_sub_properties: bool,

    #[serde(default = "default_true")]
    pub sync_inverse: bool,

    #[serde(default)]
    pub broader_props: Vec<ResourceRef>,

    #[serde(default)]
    pub narrower_props: Vec<ResourceRef>,
}

fn default_true() -> bool {
    true
}

impl Default for HierarchyConfiguration {
    fn default() -> Self {
        Self {
            include_sub_properties: true,
            sync_inverse: true,
            broader_props: vec![ResourceRef::new(skos::BROADER, Role::Property).with_show("skos:broader")],
            narrower_props: vec![
                ResourceRef::new(skos::NARROWER, Role::Property).with_show("skos:narrower"),
            ],
        }
    }
}

impl HierarchyConfiguration {
    /// Configuration with no edge properties at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            include_sub_properties: false,
            sync_inverse: false,
            broader_props: Vec::new(),
            narrower_props: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_broader(&self, id: &str) -> bool {
        self.broader_props.iter().any(|p| p.same_identity(id))
    }

    #[must_use]
    pub fn has_narrower(&self, id: &str) -> bool {
        self.narrower_props.iter().any(|p| p.same_identity(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_pairs_skos_broader_and_narrower() {
        let config = HierarchyConfiguration::default();
        assert!(config.sync_inverse);
        assert!(config.has_broader(skos::BROADER));
        assert!(config.has_narrower(skos::NARROWER));
        assert!(!config.has_broader(skos::NARROWER));
    }

    #[test]
    fn missing_flags_default_to_true() {
        let json = r#"{ "broaderProps": [], "narrowerProps": [] }"#;
        let config: HierarchyConfiguration = serde_json::from_str(json).expect("parse config");
        assert_eq!(
            config,
            HierarchyConfiguration {
                include_sub_properties: true,
                sync_inverse: true,
                broader_props: vec![],
                narrower_props: vec![],
            }
        );
    }
}
