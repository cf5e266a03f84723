use crate::error::Result as HierarchyResult;
use crate::service::{ChildrenPage, DescriptionService, InverseOracle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use vocab_model::vocab::{rdfs, skos};
use vocab_model::{
    FetchError, HierarchyConfiguration, HierarchyKind, HierarchyScope, ResourceDescription,
    ResourceRef, Result,
};

/// `subject predicate object` statement between two resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl FixtureEdge {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Declared `owl:inverseOf` between two properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversePair {
    pub property: String,
    pub inverse: String,
}

impl InversePair {
    pub fn new(property: impl Into<String>, inverse: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            inverse: inverse.into(),
        }
    }
}

/// JSON shape of an in-memory graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFixture {
    #[serde(default)]
    pub resources: Vec<ResourceRef>,

    #[serde(default)]
    pub edges: Vec<FixtureEdge>,

    #[serde(default)]
    pub inverses: Vec<InversePair>,

    #[serde(default)]
    pub descriptions: Vec<ResourceDescription>,
}

/// In-memory [`DescriptionService`] and [`InverseOracle`].
///
/// Counts `children` calls per parent and can fail the next call of a named
/// operation, which makes it the test double of the remote service.
pub struct MemoryGraph {
    resources: Vec<ResourceRef>,
    index: HashMap<String, usize>,
    edges: Vec<FixtureEdge>,
    inverses: HashMap<String, String>,
    descriptions: HashMap<String, ResourceDescription>,
    children_calls: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashSet<String>>,
}

impl MemoryGraph {
    pub fn from_fixture(fixture: GraphFixture) -> Self {
        let index = fixture
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        let mut inverses = HashMap::new();
        for pair in fixture.inverses {
            inverses.insert(pair.inverse.clone(), pair.property.clone());
            inverses.insert(pair.property, pair.inverse);
        }
        let descriptions = fixture
            .descriptions
            .into_iter()
            .map(|d| (d.resource.id.clone(), d))
            .collect();

        Self {
            resources: fixture.resources,
            index,
            edges: fixture.edges,
            inverses,
            descriptions,
            children_calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> HierarchyResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let fixture: GraphFixture = serde_json::from_str(&raw)?;
        log::debug!(
            "loaded graph fixture {}: {} resources, {} edges",
            path.as_ref().display(),
            fixture.resources.len(),
            fixture.edges.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Make the next call of `operation` fail
    pub fn fail_next(&self, operation: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation.to_string());
    }

    /// Number of `children` calls issued for `parent_id`
    pub fn children_calls(&self, parent_id: &str) -> usize {
        self.children_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(parent_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceRef> {
        self.index.get(id).map(|i| &self.resources[*i])
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        let injected = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operation);
        if injected {
            return Err(FetchError::new(operation, "injected failure"));
        }
        Ok(())
    }

    /// Properties whose statements count as edges, sub-properties included
    fn edge_properties(&self, props: &[ResourceRef], include_sub: bool) -> HashSet<String> {
        let mut found: HashSet<String> = props.iter().map(|p| p.id.clone()).collect();
        if !include_sub {
            return found;
        }
        let mut frontier: Vec<String> = found.iter().cloned().collect();
        while let Some(current) = frontier.pop() {
            for edge in &self.edges {
                if edge.predicate == rdfs::SUB_PROPERTY_OF
                    && edge.object == current
                    && found.insert(edge.subject.clone())
                {
                    frontier.push(edge.subject.clone());
                }
            }
        }
        found
    }

    /// (upward, downward) edge predicates of a hierarchy
    fn edge_predicates(
        &self,
        kind: HierarchyKind,
        config: &HierarchyConfiguration,
    ) -> (HashSet<String>, HashSet<String>) {
        match kind {
            HierarchyKind::Class => (
                HashSet::from([rdfs::SUB_CLASS_OF.to_string()]),
                HashSet::new(),
            ),
            HierarchyKind::Property => (
                HashSet::from([rdfs::SUB_PROPERTY_OF.to_string()]),
                HashSet::new(),
            ),
            HierarchyKind::Concept => (
                self.edge_properties(&config.broader_props, config.include_sub_properties),
                self.edge_properties(&config.narrower_props, config.include_sub_properties),
            ),
        }
    }

    fn child_ids(
        &self,
        parent: &str,
        upward: &HashSet<String>,
        downward: &HashSet<String>,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for edge in &self.edges {
            let child = if upward.contains(&edge.predicate) && edge.object == parent {
                &edge.subject
            } else if downward.contains(&edge.predicate) && edge.subject == parent {
                &edge.object
            } else {
                continue;
            };
            if seen.insert(child.clone()) {
                ids.push(child.clone());
            }
        }
        ids
    }

    fn has_parent(&self, id: &str, upward: &HashSet<String>, downward: &HashSet<String>) -> bool {
        self.edges.iter().any(|edge| {
            (upward.contains(&edge.predicate) && edge.subject == id)
                || (downward.contains(&edge.predicate) && edge.object == id)
        })
    }

    fn in_schemes(&self, id: &str, schemes: &[ResourceRef]) -> bool {
        schemes.is_empty()
            || self.edges.iter().any(|edge| {
                edge.subject == id
                    && (edge.predicate == skos::IN_SCHEME || edge.predicate == skos::TOP_CONCEPT_OF)
                    && schemes.iter().any(|s| s.same_identity(&edge.object))
            })
    }

    fn counted(
        &self,
        id: &str,
        upward: &HashSet<String>,
        downward: &HashSet<String>,
    ) -> ResourceRef {
        let mut resource = self
            .resource(id)
            .cloned()
            .unwrap_or_else(|| ResourceRef::new(id, vocab_model::Role::Undetermined));
        let count = self.child_ids(id, upward, downward).len();
        resource.attributes.child_count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        resource
    }
}

#[async_trait]
impl DescriptionService for MemoryGraph {
    async fn describe(
        &self,
        resource: &ResourceRef,
        _scope: Option<&HierarchyScope>,
    ) -> Result<ResourceDescription> {
        self.check_failure("describe")?;
        if let Some(description) = self.descriptions.get(&resource.id) {
            return Ok(description.clone());
        }
        match self.resource(&resource.id) {
            Some(known) => Ok(ResourceDescription::new(known.clone())),
            None => Err(FetchError::new(
                "describe",
                format!("unknown resource {}", resource.id),
            )),
        }
    }

    async fn roots(
        &self,
        kind: HierarchyKind,
        scope: &HierarchyScope,
        config: &HierarchyConfiguration,
    ) -> Result<Vec<ResourceRef>> {
        self.check_failure("roots")?;
        let (upward, downward) = self.edge_predicates(kind, config);
        if let Some(root) = &scope.root {
            return Ok(vec![self.counted(&root.id, &upward, &downward)]);
        }
        Ok(self
            .resources
            .iter()
            .filter(|r| r.role == kind.role())
            .filter(|r| !self.has_parent(&r.id, &upward, &downward))
            .filter(|r| kind != HierarchyKind::Concept || self.in_schemes(&r.id, &scope.schemes))
            .map(|r| self.counted(&r.id, &upward, &downward))
            .collect())
    }

    async fn children(
        &self,
        kind: HierarchyKind,
        parent: &ResourceRef,
        config: &HierarchyConfiguration,
    ) -> Result<ChildrenPage> {
        *self
            .children_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(parent.id.clone())
            .or_default() += 1;
        self.check_failure("children")?;

        let (upward, downward) = self.edge_predicates(kind, config);
        let children: Vec<ResourceRef> = self
            .child_ids(&parent.id, &upward, &downward)
            .iter()
            .map(|id| self.counted(id, &upward, &downward))
            .collect();
        Ok(ChildrenPage {
            has_more: !children.is_empty(),
            children,
        })
    }
}

#[async_trait]
impl InverseOracle for MemoryGraph {
    async fn get_inverses(&self, props: &[ResourceRef]) -> Result<Vec<ResourceRef>> {
        self.check_failure("getInverses")?;
        Ok(props
            .iter()
            .filter_map(|prop| {
                let inverse_id = self.inverses.get(&prop.id)?;
                let mut inverse = self.resource(inverse_id).cloned().unwrap_or_else(|| {
                    ResourceRef::new(inverse_id.as_str(), vocab_model::Role::Property)
                });
                inverse.attributes.inverse_of = Some(prop.id.clone());
                Some(inverse)
            })
            .collect())
    }
}
