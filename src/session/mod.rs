//! Design session: source text, object model and the edit transaction
//!
//! A session owns the [`SourceEditor`] and the [`NodeTree`] built from it.
//! Every structural operation runs between `start_edit` and `end_edit`; the
//! outermost transaction snapshots text and model so a failing operation
//! leaves both exactly as they were. Deferred tasks run once the outermost
//! transaction ends.

mod discovery;
mod references;

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::config::DesignerConfig;
use crate::descriptor::DescriptorService;
use crate::editor::SourceEditor;
use crate::error::{DesignError, Diagnostic};
use crate::model::{
    CreationStrategy, DeferredQueue, DesignEvent, EventBus, Instantiator, Node, NodeId, NodeTree,
    PreviewInstantiator, PropertyValue, Verdict,
};
use crate::naming::short_class;
use crate::syntax::{ExecutionFlow, SyntaxTree};
use crate::variable::HandleStrategy;

/// Property key holding the live instance built by [`Session::refresh`]
pub const INSTANCE_PROPERTY: &str = "instance";

struct Snapshot {
    editor: SourceEditor,
    nodes: NodeTree,
    diagnostics: Vec<Diagnostic>,
}

pub struct Session {
    pub(crate) editor: SourceEditor,
    pub(crate) nodes: NodeTree,
    pub(crate) catalog: Box<dyn DescriptorService>,
    pub(crate) config: DesignerConfig,
    pub(crate) bus: EventBus,
    root: NodeId,
    deferred: DeferredQueue<Session>,
    instantiator: Box<dyn Instantiator>,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
    snapshot: Option<Snapshot>,
}

impl Session {
    /// Parse `source` and bind it to an object model
    pub fn open(
        source: &str,
        catalog: impl DescriptorService + 'static,
        config: DesignerConfig,
    ) -> Result<Self, DesignError> {
        Self::open_with(
            source,
            Box::new(catalog),
            config,
            Box::new(PreviewInstantiator::new()),
        )
    }

    pub fn open_with(
        source: &str,
        catalog: Box<dyn DescriptorService>,
        config: DesignerConfig,
        instantiator: Box<dyn Instantiator>,
    ) -> Result<Self, DesignError> {
        let editor = SourceEditor::new(source, &config.generation)?;
        let class = root_class(editor.tree(), catalog.as_ref());
        let mut nodes = NodeTree::new();
        let root = nodes.set_root(Node::new(class, CreationStrategy::This, HandleStrategy::This));

        let mut session = Session {
            editor,
            nodes,
            catalog,
            config,
            bus: EventBus::new(),
            root,
            deferred: DeferredQueue::new(),
            instantiator,
            diagnostics: Vec::new(),
            depth: 0,
            snapshot: None,
        };
        session.edit(|s| {
            s.discover()?;
            s.schedule_refresh();
            Ok(())
        })?;
        debug!(nodes = session.nodes.len(), "session opened");
        Ok(session)
    }

    // ---- transactions ----

    /// Open an edit transaction; the outermost one snapshots text and model
    pub fn start_edit(&mut self) {
        if self.depth == 0 {
            self.snapshot = Some(Snapshot {
                editor: self.editor.clone(),
                nodes: self.nodes.clone(),
                diagnostics: self.diagnostics.clone(),
            });
        }
        self.depth += 1;
    }

    /// Close an edit transaction; the outermost one syncs references and
    /// drains the deferred queue
    pub fn end_edit(&mut self) -> Result<(), DesignError> {
        if self.depth == 0 {
            return Err(DesignError::invalid_target("no edit in progress"));
        }
        self.depth -= 1;
        if self.depth > 0 {
            return Ok(());
        }
        self.sync_related();
        self.snapshot = None;
        self.run_deferred()
    }

    /// Abandon an edit transaction; the outermost one restores the snapshot
    pub fn abort_edit(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            if let Some(snapshot) = self.snapshot.take() {
                warn!("edit failed, restoring source and model");
                self.editor = snapshot.editor;
                self.nodes = snapshot.nodes;
                self.diagnostics = snapshot.diagnostics;
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.depth > 0
    }

    /// Run `f` inside an edit transaction
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, DesignError>) -> Result<T, DesignError> {
        self.start_edit();
        match f(self) {
            Ok(value) => {
                self.end_edit()?;
                Ok(value)
            }
            Err(err) => {
                self.abort_edit();
                Err(err)
            }
        }
    }

    /// Queue a task to run after the current structural pass
    pub fn run_later(
        &mut self,
        label: &'static str,
        task: impl FnOnce(&mut Session) -> Result<(), DesignError> + 'static,
    ) {
        self.deferred.push(label, task);
        if self.depth == 0 {
            if let Err(err) = self.run_deferred() {
                warn!(%err, "deferred task failed");
            }
        }
    }

    fn run_deferred(&mut self) -> Result<(), DesignError> {
        while let Some((label, task)) = self.deferred.pop() {
            debug!(task = label, "running deferred task");
            task(self)?;
        }
        Ok(())
    }

    pub(crate) fn schedule_refresh(&mut self) {
        if !self.deferred.contains("refresh") {
            self.deferred.push("refresh", |s: &mut Session| s.refresh());
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DesignEvent) -> Verdict + 'static) {
        self.bus.subscribe(listener);
    }

    pub(crate) fn publish(&mut self, event: DesignEvent) -> Result<(), DesignError> {
        self.bus.publish(&event)
    }

    /// Rebuild live instances for every node
    pub fn refresh(&mut self) -> Result<(), DesignError> {
        for id in self.nodes.subtree(self.root) {
            let node = self.nodes.node(id)?;
            let class = node.class.clone();
            let creation = node.creation.clone();
            let tree = self.editor.tree();
            let args: Vec<String> = creation
                .expression()
                .filter(|e| tree.is_live(*e))
                .map(|e| {
                    tree.arguments(e)
                        .iter()
                        .map(|a| self.editor.source_of(*a).to_string())
                        .collect()
                })
                .unwrap_or_default();
            let instance = self.instantiator.instantiate(id, &class, &creation, &args)?;
            self.nodes
                .node_mut(id)?
                .properties
                .insert(INSTANCE_PROPERTY.to_string(), PropertyValue::Instance(instance));
        }
        Ok(())
    }

    // ---- queries ----

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    pub fn editor(&self) -> &SourceEditor {
        &self.editor
    }

    pub fn tree(&self) -> &SyntaxTree {
        self.editor.tree()
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn DescriptorService {
        self.catalog.as_ref()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, DesignError> {
        self.nodes.node(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.children(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.parent(id)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        warn!(code = diagnostic.code, message = %diagnostic.message, "binding diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Execution flow of the current source
    pub fn flow(&self) -> ExecutionFlow {
        let tree = self.editor.tree();
        ExecutionFlow::compute(tree, self.editor.text(), &self.config.flow.roots)
    }

    /// Variable name of a node, if its handle has one
    pub fn name_of(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(id)?;
        node.handle.name(self.editor.tree()).map(str::to_string)
    }

    /// First node whose variable is called `name`
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .subtree(self.root)
            .into_iter()
            .find(|id| self.name_of(*id).as_deref() == Some(name))
    }

    /// Indented hierarchy with handle, creation and association kinds
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let name = self
            .name_of(id)
            .map(|n| format!(" {}", n))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}{}{} [{}, {}, {}]{}",
            "  ".repeat(depth),
            short_class(&node.class),
            name,
            node.handle.kind(),
            node.creation.kind(),
            node.association.kind(),
            if node.placeholder { " placeholder" } else { "" },
        );
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }
}

/// Model class of the designed class: its superclass when the catalog knows it
fn root_class(tree: &SyntaxTree, catalog: &dyn DescriptorService) -> String {
    match tree.superclass() {
        Some(superclass) if catalog.is_known(superclass) => catalog
            .component(superclass)
            .map(|d| d.class.clone())
            .unwrap_or_else(|| superclass.to_string()),
        _ => tree.class_name().unwrap_or("java.lang.Object").to_string(),
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nodes", &self.nodes.len())
            .field("depth", &self.depth)
            .field("deferred", &self.deferred)
            .finish()
    }
}
