use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vocab_model::{
    HierarchyConfiguration, HierarchyKind, HierarchyScope, ResourceDescription, ResourceRef,
    Result,
};

/// One level of children as returned by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenPage {
    pub children: Vec<ResourceRef>,

    /// Whether the parent has descendants at all
    pub has_more: bool,
}

/// Remote graph access used by the views.
///
/// Implementations turn these calls into transport requests; failures come
/// back as [`vocab_model::FetchError`].
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Partitioned description of a resource
    async fn describe(
        &self,
        resource: &ResourceRef,
        scope: Option<&HierarchyScope>,
    ) -> Result<ResourceDescription>;

    /// Top level of a hierarchy
    async fn roots(
        &self,
        kind: HierarchyKind,
        scope: &HierarchyScope,
        config: &HierarchyConfiguration,
    ) -> Result<Vec<ResourceRef>>;

    /// Direct children of `parent` under the given configuration
    async fn children(
        &self,
        kind: HierarchyKind,
        parent: &ResourceRef,
        config: &HierarchyConfiguration,
    ) -> Result<ChildrenPage>;
}

/// Resolves declared inverse properties.
#[async_trait]
pub trait InverseOracle: Send + Sync {
    /// For each input property with a known inverse, the inverse with its
    /// `inverse_of` attribute set to the input property's identity.
    async fn get_inverses(&self, props: &[ResourceRef]) -> Result<Vec<ResourceRef>>;
}
