use crate::bus::{EventBus, HierarchyEvent, Subscription};
use crate::error::{HierarchyError, Result};
use crate::service::DescriptionService;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use vocab_model::{HierarchyConfiguration, HierarchyKind, HierarchyScope, ResourceRef};

/// Handle of a node inside one [`Forest`]; never reused within that Forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cached node of a hierarchy view
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub resource: ResourceRef,

    /// `None` = not fetched yet; `Some(vec![])` = fetched, no children
    pub children: Option<Vec<NodeId>>,

    /// Known to have descendants, independently of `children`
    pub has_more: bool,

    parent: Option<NodeId>,
}

impl TreeNode {
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.resource.attributes.open
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.resource.attributes.selected
    }
}

struct ForestState {
    nodes: BTreeMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    selected: Option<NodeId>,
    next_id: usize,
    scope: Option<HierarchyScope>,
    config: HierarchyConfiguration,
    in_flight: HashSet<NodeId>,
}

impl ForestState {
    fn new(config: HierarchyConfiguration) -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            selected: None,
            next_id: 0,
            scope: None,
            config,
            in_flight: HashSet::new(),
        }
    }

    fn insert_node(&mut self, mut resource: ResourceRef, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        // View state never comes from the server.
        resource.attributes.open = false;
        resource.attributes.selected = false;
        // Unknown count: assume descendants until the node's own expand says otherwise.
        let has_more = resource.attributes.child_count.map_or(true, |n| n > 0);

        self.nodes.insert(
            id,
            TreeNode {
                resource,
                children: None,
                has_more,
                parent,
            },
        );
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes.get_mut(&id).ok_or(HierarchyError::NodeNotFound(id))
    }

    /// Drop every node; returns true when a selection was cleared
    fn clear(&mut self) -> bool {
        self.nodes.clear();
        self.roots.clear();
        self.in_flight.clear();
        self.selected.take().is_some()
    }

    /// Remove `id` and its cached descendants; true when the selection went with them
    fn drop_subtree(&mut self, id: NodeId) -> bool {
        let mut cleared = false;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(&current) else {
                continue;
            };
            self.in_flight.remove(&current);
            if self.selected == Some(current) {
                self.selected = None;
                cleared = true;
            }
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
        cleared
    }

    fn matching(&self, resource: &ResourceRef) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.resource == *resource)
            .map(|(id, _)| *id)
            .collect()
    }

    fn select(&mut self, id: NodeId) -> Result<ResourceRef> {
        if !self.nodes.contains_key(&id) {
            return Err(HierarchyError::NodeNotFound(id));
        }
        if let Some(previous) = self.selected.filter(|prev| *prev != id) {
            if let Some(node) = self.nodes.get_mut(&previous) {
                node.resource.attributes.selected = false;
            }
        }
        let node = self.node_mut(id)?;
        node.resource.attributes.selected = true;
        let target = node.resource.clone();
        self.selected = Some(id);
        self.enforce_single_selection();
        Ok(target)
    }

    /// Clear `selected` on every node but the tracked one
    fn enforce_single_selection(&mut self) -> usize {
        let keep = self.selected;
        let mut corrected = 0;
        for (id, node) in &mut self.nodes {
            if node.resource.attributes.selected && Some(*id) != keep {
                node.resource.attributes.selected = false;
                corrected += 1;
            }
        }
        if corrected > 0 {
            log::warn!(
                "invariant violation: {corrected} extra selected node(s) cleared, kept {:?}",
                keep
            );
        }
        corrected
    }

    fn on_child_created(&mut self, child: &ResourceRef, parent: Option<&ResourceRef>) {
        let Some(parent) = parent else {
            let exists = self
                .roots
                .iter()
                .any(|id| self.nodes.get(id).is_some_and(|n| n.resource == *child));
            if exists {
                log::trace!("root {child} already listed");
                return;
            }
            let id = self.insert_node(child.clone(), None);
            self.roots.push(id);
            return;
        };

        let targets = self.matching(parent);
        if targets.is_empty() {
            log::trace!("stale reference ignored: parent {parent} not in this forest");
        }
        for parent_id in targets {
            let children = {
                let Some(node) = self.nodes.get_mut(&parent_id) else {
                    continue;
                };
                let Some(children) = node.children.clone() else {
                    log::trace!("parent {parent} not loaded, dropping created child {child}");
                    continue;
                };
                children
            };
            let already_listed = children
                .iter()
                .any(|c| self.nodes.get(c).is_some_and(|n| n.resource == *child));
            if already_listed {
                continue;
            }
            let child_id = self.insert_node(child.clone(), Some(parent_id));
            if let Some(node) = self.nodes.get_mut(&parent_id) {
                node.children.get_or_insert_with(Vec::new).push(child_id);
                node.has_more = true;
            }
        }
    }

    /// Remove direct children equal to `target`, under every loaded node or
    /// only under nodes equal to `parent`. Returns true when the selection was
    /// removed.
    fn on_removed(&mut self, target: &ResourceRef, parent: Option<&ResourceRef>) -> bool {
        let mut removed = Vec::new();

        if parent.is_none() {
            let (gone, kept): (Vec<NodeId>, Vec<NodeId>) = self
                .roots
                .iter()
                .copied()
                .partition(|id| self.nodes.get(id).is_some_and(|n| n.resource == *target));
            self.roots = kept;
            removed.extend(gone);
        }

        let parents: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.children.is_some())
            .filter(|(_, node)| parent.map_or(true, |p| node.resource == *p))
            .map(|(id, _)| *id)
            .collect();

        for parent_id in parents {
            let Some(children) = self.nodes.get(&parent_id).and_then(|n| n.children.clone())
            else {
                continue;
            };
            let (gone, kept): (Vec<NodeId>, Vec<NodeId>) = children
                .into_iter()
                .partition(|id| self.nodes.get(id).is_some_and(|n| n.resource == *target));
            if gone.is_empty() {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(&parent_id) {
                if kept.is_empty() {
                    node.has_more = false;
                    node.resource.attributes.open = false;
                }
                node.children = Some(kept);
            }
            removed.extend(gone);
        }

        if removed.is_empty() {
            log::trace!("stale reference ignored: {target} not loaded in this forest");
        }

        let mut selection_cleared = false;
        for id in removed {
            selection_cleared |= self.drop_subtree(id);
        }
        selection_cleared
    }

    fn write_outline(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let marker = match (&node.children, node.has_more, node.is_open()) {
            (Some(_), true, true) => '-',
            (_, true, _) => '+',
            _ => ' ',
        };
        out.push_str(&"  ".repeat(depth));
        out.push(marker);
        out.push(' ');
        out.push_str(node.resource.display());
        if node.is_selected() {
            out.push_str(" *");
        }
        out.push('\n');
        if node.is_open() {
            for child in node.children.iter().flatten() {
                self.write_outline(*child, depth + 1, out);
            }
        }
    }
}

struct ForestShared {
    kind: HierarchyKind,
    state: Mutex<ForestState>,
    disposed: AtomicBool,
    selection_tx: watch::Sender<Option<ResourceRef>>,
}

impl ForestShared {
    fn lock(&self) -> MutexGuard<'_, ForestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn handle(&self, event: &HierarchyEvent) {
        if self.is_disposed() {
            return;
        }
        let selection_cleared = {
            let mut state = self.lock();
            match event {
                HierarchyEvent::ChildCreated { child, parent } => {
                    state.on_child_created(child, parent.as_ref());
                    false
                }
                HierarchyEvent::NodeDeleted { target } => state.on_removed(target, None),
                HierarchyEvent::EdgeRemoved { child, parent } => {
                    if self.kind != HierarchyKind::Concept {
                        return;
                    }
                    state.on_removed(child, Some(parent))
                }
                HierarchyEvent::SelectionRequested { .. } => false,
            }
        };
        if selection_cleared {
            log::debug!("{} forest: selected node removed", self.kind);
            self.selection_tx.send_replace(None);
        }
    }
}

/// Cached, lazily populated state of one hierarchy view.
///
/// Each view owns its Forest; nodes are never shared across Forests even when
/// they show the same resources. Handlers registered on the [`EventBus`] keep
/// the cache consistent with mutations announced by any view, and are
/// deregistered by [`Forest::dispose`] or on drop.
pub struct Forest {
    shared: Arc<ForestShared>,
    service: Arc<dyn DescriptionService>,
    bus: EventBus,
    subscription: Mutex<Option<Subscription>>,
}

impl Forest {
    pub fn new(
        kind: HierarchyKind,
        service: Arc<dyn DescriptionService>,
        bus: &EventBus,
        config: HierarchyConfiguration,
    ) -> Self {
        let (selection_tx, _) = watch::channel(None);
        let shared = Arc::new(ForestShared {
            kind,
            state: Mutex::new(ForestState::new(config)),
            disposed: AtomicBool::new(false),
            selection_tx,
        });

        let weak: Weak<ForestShared> = Arc::downgrade(&shared);
        let subscription = bus.subscribe(kind, move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle(event);
            }
        });

        Self {
            shared,
            service,
            bus: bus.clone(),
            subscription: Mutex::new(Some(subscription)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> HierarchyKind {
        self.shared.kind
    }

    fn ensure_live(&self) -> Result<()> {
        if self.shared.is_disposed() {
            return Err(HierarchyError::Disposed);
        }
        Ok(())
    }

    /// Fetch the top level for `scope`, replacing any cached content.
    ///
    /// On failure the Forest is left empty and the error is returned.
    pub async fn init_roots(&self, scope: HierarchyScope) -> Result<()> {
        self.ensure_live()?;
        let config = {
            let mut state = self.shared.lock();
            state.scope = Some(scope.clone());
            state.config.clone()
        };

        let fetched = self.service.roots(self.kind(), &scope, &config).await;

        let selection_cleared = {
            let mut state = self.shared.lock();
            if self.shared.is_disposed() {
                log::debug!("{} forest disposed while fetching roots", self.kind());
                return Ok(());
            }
            let cleared = state.clear();
            if let Ok(roots) = &fetched {
                for resource in roots {
                    let id = state.insert_node(resource.clone(), None);
                    state.roots.push(id);
                }
                log::debug!("{} forest: {} root(s) loaded", self.kind(), roots.len());
            }
            cleared
        };
        if selection_cleared {
            self.shared.selection_tx.send_replace(None);
        }

        if let Err(err) = fetched {
            log::warn!("{} forest: {err}", self.kind());
            return Err(err.into());
        }
        Ok(())
    }

    /// Load (once) and open the children of `id`.
    pub async fn expand(&self, id: NodeId) -> Result<()> {
        self.ensure_live()?;
        let (parent, config) = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let node = state.nodes.get_mut(&id).ok_or(HierarchyError::NodeNotFound(id))?;
            if !node.has_more {
                return Ok(());
            }
            if node.children.is_some() {
                node.resource.attributes.open = true;
                return Ok(());
            }
            let parent = node.resource.clone();
            if !state.in_flight.insert(id) {
                log::trace!("children of {parent} already being fetched");
                return Ok(());
            }
            (parent, state.config.clone())
        };

        let fetched = self.service.children(self.kind(), &parent, &config).await;

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state.in_flight.remove(&id);
        if self.shared.is_disposed() {
            log::debug!("{} forest disposed while expanding {parent}", self.kind());
            return Ok(());
        }
        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                log::warn!("{} forest: expanding {parent}: {err}", self.kind());
                return Err(err.into());
            }
        };
        if !state.nodes.contains_key(&id) {
            log::trace!("stale reference ignored: {parent} removed while expanding");
            return Ok(());
        }

        let children: Vec<NodeId> = page
            .children
            .into_iter()
            .map(|child| state.insert_node(child, Some(id)))
            .collect();
        log::debug!("{} forest: {} child(ren) under {parent}", self.kind(), children.len());

        let node = state.node_mut(id)?;
        node.children = Some(children);
        node.has_more = page.has_more;
        node.resource.attributes.open = true;
        Ok(())
    }

    /// Close `id`; cached children are kept
    pub fn collapse(&self, id: NodeId) -> Result<()> {
        let mut state = self.shared.lock();
        state.node_mut(id)?.resource.attributes.open = false;
        Ok(())
    }

    /// Make `id` the only selected node and announce it on the bus
    pub fn select(&self, id: NodeId) -> Result<()> {
        self.ensure_live()?;
        let target = self.shared.lock().select(id)?;
        self.shared.selection_tx.send_replace(Some(target.clone()));
        self.bus
            .publish(self.kind(), HierarchyEvent::SelectionRequested { target });
        Ok(())
    }

    /// Forget the cached children of `id`; the next `expand` refetches them
    pub fn invalidate(&self, id: NodeId) -> Result<()> {
        let selection_cleared = {
            let mut state = self.shared.lock();
            let children = {
                let node = state.node_mut(id)?;
                node.has_more = true;
                node.resource.attributes.open = false;
                node.children.take().unwrap_or_default()
            };
            let mut cleared = false;
            for child in children {
                cleared |= state.drop_subtree(child);
            }
            cleared
        };
        if selection_cleared {
            self.shared.selection_tx.send_replace(None);
        }
        Ok(())
    }

    /// Replace the hierarchy configuration and reload from the last scope
    pub async fn reconfigure(&self, config: HierarchyConfiguration) -> Result<()> {
        self.ensure_live()?;
        let scope = {
            let mut state = self.shared.lock();
            state.config = config;
            state.scope.clone()
        };
        match scope {
            Some(scope) => self.init_roots(scope).await,
            None => Ok(()),
        }
    }

    /// Deregister from the bus and discard late fetch results
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(subscription);
        log::debug!("{} forest disposed", self.kind());
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    #[must_use]
    pub fn config(&self) -> HierarchyConfiguration {
        self.shared.lock().config.clone()
    }

    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.shared.lock().roots.clone()
    }

    /// Snapshot of a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<TreeNode> {
        self.shared.lock().nodes.get(&id).cloned()
    }

    /// Children of a node, if loaded
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<Vec<NodeId>> {
        self.shared.lock().nodes.get(&id)?.children.clone()
    }

    /// Every cached node showing `resource`
    #[must_use]
    pub fn find(&self, resource: &ResourceRef) -> Vec<NodeId> {
        self.shared.lock().matching(resource)
    }

    #[must_use]
    pub fn selected(&self) -> Option<ResourceRef> {
        let state = self.shared.lock();
        state
            .selected
            .and_then(|id| state.nodes.get(&id))
            .map(|node| node.resource.clone())
    }

    /// Selection changes, including the selected node being deleted
    #[must_use]
    pub fn selection_stream(&self) -> watch::Receiver<Option<ResourceRef>> {
        self.shared.selection_tx.subscribe()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.shared.lock().nodes.len()
    }

    /// Indented rendering of the open part of the tree
    #[must_use]
    pub fn outline(&self) -> String {
        let state = self.shared.lock();
        let mut out = String::new();
        for root in &state.roots {
            state.write_outline(*root, 0, &mut out);
        }
        out
    }
}

impl Drop for Forest {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest")
            .field("kind", &self.kind())
            .field("nodes", &self.node_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FixtureEdge, GraphFixture, MemoryGraph};
    use pretty_assertions::assert_eq;
    use vocab_model::vocab::skos;
    use vocab_model::Role;

    const EX: &str = "http://ex.org/";

    fn concept(local: &str) -> ResourceRef {
        ResourceRef::new(format!("{EX}{local}"), Role::Concept).with_show(local)
    }

    fn broader(child: &str, parent: &str) -> FixtureEdge {
        FixtureEdge::new(format!("{EX}{child}"), skos::BROADER, format!("{EX}{parent}"))
    }

    // animal -> {cat, dog}; plant (leaf)
    fn graph() -> Arc<MemoryGraph> {
        let fixture = GraphFixture {
            resources: vec![concept("animal"), concept("plant"), concept("cat"), concept("dog")],
            edges: vec![broader("cat", "animal"), broader("dog", "animal")],
            ..GraphFixture::default()
        };
        Arc::new(MemoryGraph::from_fixture(fixture))
    }

    fn labels(forest: &Forest, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| forest.node(*id))
            .map(|n| n.resource.show)
            .collect()
    }

    async fn concept_forest(graph: &Arc<MemoryGraph>, bus: &EventBus) -> Forest {
        let forest = Forest::new(
            HierarchyKind::Concept,
            graph.clone(),
            bus,
            HierarchyConfiguration::default(),
        );
        forest
            .init_roots(HierarchyScope::unscoped())
            .await
            .expect("init roots");
        forest
    }

    fn root_named(forest: &Forest, name: &str) -> NodeId {
        forest
            .find(&concept(name))
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("{name} not cached"))
    }

    #[tokio::test]
    async fn roots_have_has_more_from_child_count() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;

        assert_eq!(labels(&forest, &forest.roots()), vec!["animal", "plant"]);
        let animal = forest.node(root_named(&forest, "animal")).unwrap();
        let plant = forest.node(root_named(&forest, "plant")).unwrap();
        assert!(animal.has_more);
        assert!(animal.children.is_none());
        assert!(!plant.has_more);
    }

    #[tokio::test]
    async fn expand_collapse_expand_fetches_once() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");

        forest.expand(animal).await.expect("expand");
        forest.collapse(animal).expect("collapse");
        assert!(!forest.node(animal).unwrap().is_open());
        assert_eq!(forest.children(animal).map(|c| c.len()), Some(2));

        forest.expand(animal).await.expect("re-expand");
        assert!(forest.node(animal).unwrap().is_open());
        assert_eq!(graph.children_calls(&format!("{EX}animal")), 1);
    }

    #[tokio::test]
    async fn expand_without_more_is_noop() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let plant = root_named(&forest, "plant");

        forest.expand(plant).await.expect("expand leaf");
        assert_eq!(graph.children_calls(&format!("{EX}plant")), 0);
        assert!(forest.node(plant).unwrap().children.is_none());
    }

    #[tokio::test]
    async fn only_one_node_is_ever_selected() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        forest.expand(animal).await.expect("expand");

        let mut order = forest.roots();
        order.extend(forest.children(animal).unwrap());
        order.push(animal);
        for id in order {
            forest.select(id).expect("select");
            let upper = forest.shared.lock().next_id;
            let selected: Vec<_> = (0..upper)
                .filter_map(|n| forest.node(NodeId(n)))
                .filter(TreeNode::is_selected)
                .collect();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].resource, forest.node(id).unwrap().resource);
        }
        assert_eq!(forest.selected(), Some(concept("animal")));
    }

    #[tokio::test]
    async fn stray_selection_flag_is_corrected() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        let plant = root_named(&forest, "plant");

        forest
            .shared
            .lock()
            .node_mut(plant)
            .unwrap()
            .resource
            .attributes
            .selected = true;
        forest.select(animal).expect("select");

        assert!(!forest.node(plant).unwrap().is_selected());
        assert!(forest.node(animal).unwrap().is_selected());
    }

    #[tokio::test]
    async fn select_publishes_selection_requested() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let requested = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let requested = Arc::clone(&requested);
            bus.subscribe(HierarchyKind::Concept, move |event| {
                if let HierarchyEvent::SelectionRequested { target } = event {
                    requested.lock().unwrap().push(target.id.clone());
                }
            })
        };

        forest.select(root_named(&forest, "plant")).expect("select");
        assert_eq!(*requested.lock().unwrap(), vec![format!("{EX}plant")]);
        assert_eq!(*forest.selection_stream().borrow(), Some(concept("plant")));
    }

    #[tokio::test]
    async fn created_root_is_appended_not_sorted() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::ChildCreated {
                child: concept("aardvark"),
                parent: None,
            },
        );
        assert_eq!(
            labels(&forest, &forest.roots()),
            vec!["animal", "plant", "aardvark"]
        );

        // Same root again is not duplicated.
        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::ChildCreated {
                child: concept("aardvark"),
                parent: None,
            },
        );
        assert_eq!(forest.roots().len(), 3);
    }

    #[tokio::test]
    async fn created_child_goes_only_into_loaded_parents() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        let plant = root_named(&forest, "plant");

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::ChildCreated {
                child: concept("bird"),
                parent: Some(concept("animal")),
            },
        );
        assert!(forest.children(animal).is_none(), "unfetched subtree untouched");

        forest.expand(animal).await.expect("expand");
        forest.expand(plant).await.expect("expand leaf");
        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::ChildCreated {
                child: concept("bird"),
                parent: Some(concept("animal")),
            },
        );
        assert_eq!(
            labels(&forest, &forest.children(animal).unwrap()),
            vec!["cat", "dog", "bird"]
        );
        assert!(forest.node(animal).unwrap().has_more);
    }

    #[tokio::test]
    async fn created_child_under_unfetched_parent_is_dropped() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        forest.expand(animal).await.expect("expand");
        let cat = forest.children(animal).unwrap()[0];
        forest.expand(cat).await.expect("expand cat");
        assert_eq!(forest.children(cat), None, "cat has no descendants, expand is a no-op");
        assert!(!forest.node(cat).unwrap().has_more);

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::ChildCreated {
                child: concept("kitten"),
                parent: Some(concept("cat")),
            },
        );
        let node = forest.node(cat).unwrap();
        assert_eq!(node.children, None);
        assert!(!node.has_more);
        assert!(forest.find(&concept("kitten")).is_empty());
    }

    #[tokio::test]
    async fn deletion_empties_parent_and_spares_unloaded_twin() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let other = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        forest.expand(animal).await.expect("expand");

        for name in ["cat", "dog"] {
            bus.publish(
                HierarchyKind::Concept,
                HierarchyEvent::NodeDeleted {
                    target: concept(name),
                },
            );
        }

        let node = forest.node(animal).unwrap();
        assert_eq!(node.children, Some(vec![]));
        assert!(!node.has_more);
        assert!(!node.is_open());

        // The other view never loaded animal: it keeps its lazy state.
        let twin = other.node(root_named(&other, "animal")).unwrap();
        assert!(twin.children.is_none());
        assert!(twin.has_more);
    }

    #[tokio::test]
    async fn deleting_root_clears_selection() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let mut selection = forest.selection_stream();
        forest.select(root_named(&forest, "plant")).expect("select");
        selection.borrow_and_update();

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::NodeDeleted {
                target: concept("plant"),
            },
        );

        assert_eq!(labels(&forest, &forest.roots()), vec!["animal"]);
        assert_eq!(forest.selected(), None);
        assert!(selection.has_changed().unwrap());
        assert_eq!(*selection.borrow(), None);
    }

    #[tokio::test]
    async fn edge_removal_is_scoped_to_named_parent() {
        let fixture = GraphFixture {
            resources: vec![concept("pet"), concept("animal"), concept("cat")],
            edges: vec![broader("cat", "animal"), broader("cat", "pet")],
            ..GraphFixture::default()
        };
        let graph = Arc::new(MemoryGraph::from_fixture(fixture));
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let pet = root_named(&forest, "pet");
        let animal = root_named(&forest, "animal");
        forest.expand(pet).await.expect("expand pet");
        forest.expand(animal).await.expect("expand animal");

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::EdgeRemoved {
                child: concept("cat"),
                parent: concept("pet"),
            },
        );

        assert_eq!(forest.children(pet), Some(vec![]));
        assert_eq!(labels(&forest, &forest.children(animal).unwrap()), vec!["cat"]);
    }

    #[tokio::test]
    async fn edge_removal_is_ignored_outside_concepts() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = Forest::new(
            HierarchyKind::Class,
            graph.clone(),
            &bus,
            HierarchyConfiguration::default(),
        );
        forest.shared.lock().on_child_created(&concept("root"), None);
        let root = forest.roots()[0];
        forest.shared.lock().node_mut(root).unwrap().children = Some(vec![]);
        forest.shared.lock().on_child_created(&concept("leaf"), Some(&concept("root")));

        bus.publish(
            HierarchyKind::Class,
            HierarchyEvent::EdgeRemoved {
                child: concept("leaf"),
                parent: concept("root"),
            },
        );
        assert_eq!(forest.children(root).map(|c| c.len()), Some(1));
    }

    #[tokio::test]
    async fn failed_roots_fetch_leaves_forest_empty() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        assert_eq!(forest.roots().len(), 2);

        graph.fail_next("roots");
        let err = forest
            .init_roots(HierarchyScope::unscoped())
            .await
            .expect_err("injected failure");
        assert!(matches!(err, HierarchyError::Fetch(ref e) if e.operation == "roots"));
        assert!(forest.roots().is_empty());
        assert_eq!(forest.node_count(), 0);
    }

    #[tokio::test]
    async fn failed_expand_keeps_cache_and_allows_retry() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");

        graph.fail_next("children");
        assert!(forest.expand(animal).await.is_err());
        let node = forest.node(animal).unwrap();
        assert!(node.children.is_none());
        assert!(!node.is_open());

        forest.expand(animal).await.expect("retry by caller");
        assert_eq!(forest.children(animal).map(|c| c.len()), Some(2));
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        forest.expand(animal).await.expect("expand");
        let before = forest.node_count();

        forest.invalidate(animal).expect("invalidate");
        assert_eq!(forest.node_count(), before - 2);
        forest.expand(animal).await.expect("expand again");
        assert_eq!(graph.children_calls(&format!("{EX}animal")), 2);
    }

    #[tokio::test]
    async fn disposed_forest_stops_listening() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        assert_eq!(bus.listener_count(HierarchyKind::Concept), 1);

        forest.dispose();
        assert_eq!(bus.listener_count(HierarchyKind::Concept), 0);
        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::NodeDeleted {
                target: concept("plant"),
            },
        );
        assert_eq!(forest.roots().len(), 2);
        assert!(matches!(
            forest.expand(forest.roots()[0]).await,
            Err(HierarchyError::Disposed)
        ));

        let again = concept_forest(&graph, &bus).await;
        drop(again);
        assert_eq!(bus.listener_count(HierarchyKind::Concept), 0);
    }

    #[tokio::test]
    async fn reconfigure_reloads_roots_with_new_properties() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;

        forest
            .reconfigure(HierarchyConfiguration::empty())
            .await
            .expect("reconfigure");
        // Without edge properties every concept is a root.
        assert_eq!(
            labels(&forest, &forest.roots()),
            vec!["animal", "plant", "cat", "dog"]
        );
        assert!(forest.config().broader_props.is_empty());
    }

    #[tokio::test]
    async fn outline_renders_open_nodes() {
        let graph = graph();
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        forest.expand(animal).await.expect("expand");
        forest.select(animal).expect("select");

        assert_eq!(forest.outline(), "- animal *\n    cat\n    dog\n  plant\n");
    }

    // Holds `roots` and `children` calls until released once armed.
    struct GatedGraph {
        inner: Arc<MemoryGraph>,
        armed: AtomicBool,
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    impl GatedGraph {
        fn new(inner: Arc<MemoryGraph>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                armed: AtomicBool::new(false),
                entered: tokio::sync::Notify::new(),
                release: tokio::sync::Notify::new(),
            })
        }

        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }

        async fn hold(&self) {
            if self.armed.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
        }
    }

    #[async_trait::async_trait]
    impl DescriptionService for GatedGraph {
        async fn describe(
            &self,
            resource: &ResourceRef,
            scope: Option<&HierarchyScope>,
        ) -> vocab_model::Result<vocab_model::ResourceDescription> {
            self.inner.describe(resource, scope).await
        }

        async fn roots(
            &self,
            kind: HierarchyKind,
            scope: &HierarchyScope,
            config: &HierarchyConfiguration,
        ) -> vocab_model::Result<Vec<ResourceRef>> {
            self.hold().await;
            self.inner.roots(kind, scope, config).await
        }

        async fn children(
            &self,
            kind: HierarchyKind,
            parent: &ResourceRef,
            config: &HierarchyConfiguration,
        ) -> vocab_model::Result<crate::service::ChildrenPage> {
            self.hold().await;
            self.inner.children(kind, parent, config).await
        }
    }

    async fn gated_forest(gate: &Arc<GatedGraph>, bus: &EventBus) -> Forest {
        let forest = Forest::new(
            HierarchyKind::Concept,
            gate.clone(),
            bus,
            HierarchyConfiguration::default(),
        );
        forest
            .init_roots(HierarchyScope::unscoped())
            .await
            .expect("init roots");
        forest
    }

    #[tokio::test]
    async fn expand_finishing_after_dispose_is_discarded() {
        let gate = GatedGraph::new(graph());
        let bus = EventBus::new();
        let forest = gated_forest(&gate, &bus).await;
        let animal = root_named(&forest, "animal");
        let before = forest.node_count();
        gate.arm();

        let (expanded, ()) = tokio::join!(forest.expand(animal), async {
            gate.entered.notified().await;
            forest.dispose();
            gate.release.notify_one();
        });

        assert!(expanded.is_ok());
        assert_eq!(forest.children(animal), None);
        assert!(!forest.node(animal).unwrap().is_open());
        assert_eq!(forest.node_count(), before);
    }

    #[tokio::test]
    async fn init_roots_finishing_after_dispose_is_discarded() {
        let gate = GatedGraph::new(graph());
        gate.arm();
        let bus = EventBus::new();
        let forest = Forest::new(
            HierarchyKind::Concept,
            gate.clone(),
            &bus,
            HierarchyConfiguration::default(),
        );

        let (loaded, ()) = tokio::join!(forest.init_roots(HierarchyScope::unscoped()), async {
            gate.entered.notified().await;
            forest.dispose();
            gate.release.notify_one();
        });

        assert!(loaded.is_ok());
        assert!(forest.roots().is_empty());
        assert_eq!(forest.node_count(), 0);
    }

    #[tokio::test]
    async fn second_expand_while_fetching_is_noop() {
        let graph = graph();
        let gate = GatedGraph::new(graph.clone());
        let bus = EventBus::new();
        let forest = gated_forest(&gate, &bus).await;
        let animal = root_named(&forest, "animal");
        gate.arm();

        let (first, second) = tokio::join!(forest.expand(animal), async {
            gate.entered.notified().await;
            let second = forest.expand(animal).await;
            assert_eq!(forest.children(animal), None, "first fetch still pending");
            gate.release.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(labels(&forest, &forest.children(animal).unwrap()), vec!["cat", "dog"]);
        assert_eq!(graph.children_calls(&format!("{EX}animal")), 1);
    }

    // animal -> cat, pet -> cat, cat -> kitten
    #[tokio::test]
    async fn deletion_spares_unloaded_twin_in_same_forest() {
        let graph = Arc::new(MemoryGraph::from_fixture(GraphFixture {
            resources: vec![
                concept("animal"),
                concept("pet"),
                concept("cat"),
                concept("kitten"),
            ],
            edges: vec![
                broader("cat", "animal"),
                broader("cat", "pet"),
                broader("kitten", "cat"),
            ],
            ..GraphFixture::default()
        }));
        let bus = EventBus::new();
        let forest = concept_forest(&graph, &bus).await;
        let animal = root_named(&forest, "animal");
        let pet = root_named(&forest, "pet");
        forest.expand(animal).await.expect("expand animal");
        forest.expand(pet).await.expect("expand pet");
        let loaded_cat = forest.children(animal).unwrap()[0];
        let unloaded_cat = forest.children(pet).unwrap()[0];
        forest.expand(loaded_cat).await.expect("expand cat");

        bus.publish(
            HierarchyKind::Concept,
            HierarchyEvent::NodeDeleted {
                target: concept("kitten"),
            },
        );

        let loaded = forest.node(loaded_cat).unwrap();
        assert_eq!(loaded.children, Some(vec![]));
        assert!(!loaded.has_more);
        assert!(!loaded.is_open());

        let twin = forest.node(unloaded_cat).unwrap();
        assert_eq!(twin.children, None);
        assert!(twin.has_more);
    }
}
