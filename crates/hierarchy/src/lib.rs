//! # Vocab Hierarchy
//!
//! Client-side hierarchy cache for the class, concept and property trees.
//!
//! ## Architecture
//!
//! ```text
//! UI action (select / create / delete)
//!     │
//!     ├──> Forest (one per view)
//!     │      ├─ roots + lazily fetched children (DescriptionService)
//!     │      └─ single selection
//!     │
//!     ├──> EventBus (ChildCreated / NodeDeleted / EdgeRemoved / SelectionRequested)
//!     │      └─ every live Forest of the same kind patches its cached subtree
//!     │
//!     └──> InverseSynchronizer
//!            └─ keeps broader / narrower property lists paired (InverseOracle)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vocab_hierarchy::{EventBus, Forest, MemoryGraph};
//! use vocab_model::{HierarchyConfiguration, HierarchyKind, HierarchyScope};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let graph = Arc::new(MemoryGraph::from_json_file("graph.json")?);
//!     let bus = EventBus::new();
//!     let forest = Forest::new(
//!         HierarchyKind::Concept,
//!         graph,
//!         &bus,
//!         HierarchyConfiguration::default(),
//!     );
//!     forest.init_roots(HierarchyScope::unscoped()).await?;
//!     for root in forest.roots() {
//!         forest.expand(root).await?;
//!     }
//!     println!("{}", forest.outline());
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod forest;
mod inverse;
mod memory;
mod service;
mod store;

pub use bus::{EventBus, HierarchyEvent, Subscription};
pub use error::{ConfigError, HierarchyError, Result};
pub use forest::{Forest, NodeId, TreeNode};
pub use inverse::InverseSynchronizer;
pub use memory::{FixtureEdge, GraphFixture, InversePair, MemoryGraph};
pub use service::{ChildrenPage, DescriptionService, InverseOracle};
pub use store::{ConfigStore, MemoryConfigStore, TomlConfigStore};
