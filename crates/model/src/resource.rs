use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Prefix of synthetic blank-node identities
pub const BLANK_NODE_PREFIX: &str = "_:";

/// Role of a resource in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Class,
    Concept,
    ConceptScheme,
    Property,
    Individual,
    XLabel,
    SkosCollection,
    Ontology,
    Datatype,
    Undetermined,
}

/// Mutable view state and server-provided flags of a resource.
///
/// Never part of identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceAttributes {
    /// Asserted in the working graph (as opposed to imported / inferred)
    pub explicit: bool,

    /// Server forbids deletion
    pub delete_forbidden: bool,

    /// Number of children known to the server, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<u32>,

    /// Expanded in the owning view
    pub open: bool,

    /// Selected in the owning view
    pub selected: bool,

    /// Language of a lexicalization resource (e.g. an xLabel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_tag: Option<String>,

    /// Identity of the property this one was returned as the inverse of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_of: Option<String>,

    /// Any other attribute the server attached
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Reference to a graph resource: identity, role, label and attribute bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// IRI, or a blank-node id starting with [`BLANK_NODE_PREFIX`]
    pub id: String,

    pub role: Role,

    /// Display label; falls back to the identity when empty
    #[serde(default)]
    pub show: String,

    #[serde(default)]
    pub attributes: ResourceAttributes,
}

impl ResourceRef {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            show: String::new(),
            attributes: ResourceAttributes::default(),
        }
    }

    /// Blank node with the given local id (prefix added when missing)
    #[must_use]
    pub fn blank(local: impl AsRef<str>, role: Role) -> Self {
        let local = local.as_ref();
        let id = if local.starts_with(BLANK_NODE_PREFIX) {
            local.to_string()
        } else {
            format!("{BLANK_NODE_PREFIX}{local}")
        };
        Self::new(id, role)
    }

    #[must_use]
    pub fn with_show(mut self, show: impl Into<String>) -> Self {
        self.show = show.into();
        self
    }

    #[must_use]
    pub fn with_child_count(mut self, count: u32) -> Self {
        self.attributes.child_count = Some(count);
        self
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.id.starts_with(BLANK_NODE_PREFIX)
    }

    /// Same identity, regardless of attributes
    #[must_use]
    pub fn same_identity(&self, id: &str) -> bool {
        self.id == id
    }

    /// Label to render
    #[must_use]
    pub fn display(&self) -> &str {
        if self.show.is_empty() {
            &self.id
        } else {
            &self.show
        }
    }
}

impl PartialEq for ResourceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceRef {}

impl Hash for ResourceRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
