//! # Vocab Model
//!
//! Shared data model for the hierarchy views and the resource-description panel.
//!
//! ## Types
//!
//! ```text
//! ResourceRef ── identity (IRI / blank node) + role + label + attributes
//!     │
//!     ├──> PredicateObjectsGroup (predicate + ordered objects)
//!     │      └─ ObjectNode = ResourceRef | Literal
//!     │
//!     ├──> ResourceDescription (Partition -> groups)
//!     │
//!     └──> HierarchyConfiguration (broader / narrower properties)
//! ```
//!
//! Equality of [`ResourceRef`] is identity-only: attributes such as `open` or
//! `selected` are view state and never take part in comparisons.

mod config;
mod description;
mod error;
mod resource;
pub mod vocab;

pub use config::{HierarchyConfiguration, HierarchyKind, HierarchyScope};
pub use description::{
    Literal, ObjectNode, Partition, PredicateObjectsGroup, ResourceDescription,
};
pub use error::{FetchError, Result};
pub use resource::{ResourceAttributes, ResourceRef, Role, BLANK_NODE_PREFIX};
