use crate::resource::ResourceRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Literal value with optional language tag and datatype
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Literal {
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    #[must_use]
    pub fn lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: Some(lang.into()),
            datatype: None,
        }
    }
}

/// Object position of a predicate/object pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectNode {
    Resource(ResourceRef),
    Literal(Literal),
}

impl ObjectNode {
    /// Language tag of a literal, or of a lexicalization resource
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Literal(lit) => lit.lang.as_deref(),
            Self::Resource(res) => res.attributes.language_tag.as_deref(),
        }
    }

    /// Lexical value (literal form or identity)
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Literal(lit) => &lit.value,
            Self::Resource(res) => &res.id,
        }
    }

    /// Value + language equality, used when merging objects
    #[must_use]
    pub fn same_value(&self, other: &ObjectNode) -> bool {
        self.value() == other.value() && self.language() == other.language()
    }
}

impl From<Literal> for ObjectNode {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<ResourceRef> for ObjectNode {
    fn from(res: ResourceRef) -> Self {
        Self::Resource(res)
    }
}

/// One predicate and its objects, in server order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateObjectsGroup {
    pub predicate: ResourceRef,

    #[serde(default)]
    pub objects: Vec<ObjectNode>,
}

impl PredicateObjectsGroup {
    #[must_use]
    pub fn new(predicate: ResourceRef, objects: Vec<ObjectNode>) -> Self {
        Self { predicate, objects }
    }

    /// Whether an object with the same value and language is already listed
    #[must_use]
    pub fn contains(&self, object: &ObjectNode) -> bool {
        self.objects.iter().any(|o| o.same_value(object))
    }
}

/// Closed set of description partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Partition {
    Types,
    ClassAxioms,
    TopConceptOf,
    Schemes,
    Broaders,
    Superproperties,
    EquivalentProperties,
    DisjointProperties,
    SubPropertyChains,
    Subterms,
    Domains,
    Ranges,
    Facets,
    DatatypeDefinitions,
    Lexicalizations,
    LexicalForms,
    LexicalSenses,
    Denotations,
    EvokedLexicalConcepts,
    Notes,
    Members,
    MembersOrdered,
    LabelRelations,
    FormBasedPreview,
    Imports,
    RdfsMembers,
    Constituents,
    Properties,
}

impl Partition {
    pub const ALL: [Partition; 28] = [
        Partition::Types,
        Partition::ClassAxioms,
        Partition::TopConceptOf,
        Partition::Schemes,
        Partition::Broaders,
        Partition::Superproperties,
        Partition::EquivalentProperties,
        Partition::DisjointProperties,
        Partition::SubPropertyChains,
        Partition::Subterms,
        Partition::Domains,
        Partition::Ranges,
        Partition::Facets,
        Partition::DatatypeDefinitions,
        Partition::Lexicalizations,
        Partition::LexicalForms,
        Partition::LexicalSenses,
        Partition::Denotations,
        Partition::EvokedLexicalConcepts,
        Partition::Notes,
        Partition::Members,
        Partition::MembersOrdered,
        Partition::LabelRelations,
        Partition::FormBasedPreview,
        Partition::Imports,
        Partition::RdfsMembers,
        Partition::Constituents,
        Partition::Properties,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Partition::Types => "types",
            Partition::ClassAxioms => "classAxioms",
            Partition::TopConceptOf => "topConceptOf",
            Partition::Schemes => "schemes",
            Partition::Broaders => "broaders",
            Partition::Superproperties => "superproperties",
            Partition::EquivalentProperties => "equivalentProperties",
            Partition::DisjointProperties => "disjointProperties",
            Partition::SubPropertyChains => "subPropertyChains",
            Partition::Subterms => "subterms",
            Partition::Domains => "domains",
            Partition::Ranges => "ranges",
            Partition::Facets => "facets",
            Partition::DatatypeDefinitions => "datatypeDefinitions",
            Partition::Lexicalizations => "lexicalizations",
            Partition::LexicalForms => "lexicalForms",
            Partition::LexicalSenses => "lexicalSenses",
            Partition::Denotations => "denotations",
            Partition::EvokedLexicalConcepts => "evokedLexicalConcepts",
            Partition::Notes => "notes",
            Partition::Members => "members",
            Partition::MembersOrdered => "membersOrdered",
            Partition::LabelRelations => "labelRelations",
            Partition::FormBasedPreview => "formBasedPreview",
            Partition::Imports => "imports",
            Partition::RdfsMembers => "rdfsMembers",
            Partition::Constituents => "constituents",
            Partition::Properties => "properties",
        }
    }
}

/// Partitioned description of one resource, as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub resource: ResourceRef,

    #[serde(default)]
    pub partitions: BTreeMap<Partition, Vec<PredicateObjectsGroup>>,
}

impl ResourceDescription {
    #[must_use]
    pub fn new(resource: ResourceRef) -> Self {
        Self {
            resource,
            partitions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_partition(mut self, partition: Partition, groups: Vec<PredicateObjectsGroup>) -> Self {
        self.partitions.insert(partition, groups);
        self
    }

    /// Groups of a partition; empty when the partition is absent
    #[must_use]
    pub fn partition(&self, partition: Partition) -> &[PredicateObjectsGroup] {
        self.partitions
            .get(&partition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
