//! Node - a proxy for one engine layout node.
//!
//! A [`Node`] owns its engine node through a [`NativeHandle`], mirrors the
//! engine's child list with its own list of child proxies, and keeps a weak
//! link to its parent. Parents hold their children strongly, so a subtree
//! stays alive as long as its root does.
//!
//! # Tree mutation
//!
//! Every structural change runs against the engine first. If the engine
//! rejects it (a `Fatal` log escalated to [`Error::LogEscalation`]), the
//! managed list is left untouched, so both lists always agree.
//!
//! ```ignore
//! let root = Node::new()?;
//! let child = Node::new()?;
//! child.set_measure_function(|_, _, _, _, _| Size::new(10.0, 10.0))?;
//! root.add_child(&child)?;
//! root.calculate_layout(100.0, UNDEFINED)?;
//! ```

mod spacing;
mod style;

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::thread::LocalKey;

use crate::bridge;
use crate::config::{Config, Logger};
use crate::context::ContextRegistry;
use crate::error::{Error, Result};
use crate::handle::{NativeHandle, ResourceKind};
use crate::native::{self, RawNode};
use crate::types::{LogLevel, MeasureMode, PrintOptions, Size};
use crate::value::UNDEFINED;

/// Measure function: `(node, width, width_mode, height, height_mode) -> size`.
pub type MeasureFunction = Rc<dyn Fn(&Node, f32, MeasureMode, f32, MeasureMode) -> Size>;

/// Baseline function: `(node, width, height) -> baseline`.
pub type BaselineFunction = Rc<dyn Fn(&Node, f32, f32) -> f32>;

// =============================================================================
// Resource Kind
// =============================================================================

thread_local! {
    static NODE_CONTEXTS: RefCell<ContextRegistry<NodeInner>> =
        const { RefCell::new(ContextRegistry::new()) };
}

pub(crate) struct NodeKind;

impl ResourceKind for NodeKind {
    type Raw = RawNode;
    type Proxy = NodeInner;

    const NAME: &'static str = "node";
    const NULL: RawNode = RawNode::NULL;

    fn free(raw: RawNode) {
        native::node_free(raw);
    }

    fn set_native_context(raw: RawNode, token: u64) {
        native::node_set_context(raw, token);
    }

    fn native_context(raw: RawNode) -> u64 {
        native::node_get_context(raw)
    }

    fn registry() -> &'static LocalKey<RefCell<ContextRegistry<NodeInner>>> {
        &NODE_CONTEXTS
    }
}

pub(crate) type NodeHandle = NativeHandle<NodeKind>;

// =============================================================================
// Node
// =============================================================================

pub(crate) struct NodeInner {
    // Declared first: the engine node is freed before the children drop.
    handle: NodeHandle,
    config: Config,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    measure: RefCell<Option<MeasureFunction>>,
    baseline: RefCell<Option<BaselineFunction>>,
    data: RefCell<Option<Box<dyn Any>>>,
}

/// A layout node.
///
/// Cloning is cheap and yields the same node; equality is identity.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    /// Create a node bound to the shared default config.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::shared())
    }

    /// Create a node bound to `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        let handle = NodeHandle::acquire(native::node_new_with_config(config.raw()))?;
        let inner = Rc::new(NodeInner {
            handle,
            config: config.clone(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            measure: RefCell::new(None),
            baseline: RefCell::new(None),
            data: RefCell::new(None),
        });
        inner.handle.set_context(Rc::downgrade(&inner));
        Ok(Self { inner })
    }

    /// Create a node with a copy of `source`'s style and config. The copy has
    /// no children, no parent and no callbacks.
    pub fn from_style(source: &Node) -> Result<Self> {
        let node = Self::with_config(source.config())?;
        native::node_copy_style(node.raw(), source.raw());
        Ok(node)
    }

    pub(crate) fn from_inner(inner: Rc<NodeInner>) -> Self {
        Self { inner }
    }

    /// Number of live engine nodes on this thread.
    pub fn instance_count() -> usize {
        native::node_instance_count()
    }

    /// Raw engine handle.
    #[inline]
    pub fn raw(&self) -> RawNode {
        self.inner.handle.raw()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Reset to the config's default style, dropping callbacks and user data.
    ///
    /// The node must have no children and no parent; otherwise the engine
    /// rejects the reset and nothing changes.
    pub fn reset(&self) -> Result<()> {
        // The engine clears the context slot; relink afterwards
        self.inner.handle.release_context();
        let result = native::node_reset(self.raw());
        self.inner.handle.set_context(Rc::downgrade(&self.inner));
        result?;

        self.inner.measure.replace(None);
        self.inner.baseline.replace(None);
        self.inner.data.replace(None);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    /// Insert `child` at `index` (`0..=count`).
    pub fn insert(&self, index: usize, child: &Node) -> Result<()> {
        let count = self.count();
        if index > count {
            return Err(Error::IndexOutOfRange { index, count });
        }

        native::node_insert_child(self.raw(), child.raw(), index)?;
        self.inner.children.borrow_mut().insert(index, child.clone());
        child.inner.parent.replace(Rc::downgrade(&self.inner));
        Ok(())
    }

    /// Remove and return the child at `index`.
    pub fn remove_at(&self, index: usize) -> Result<Node> {
        let child = self.get(index).ok_or(Error::IndexOutOfRange { index, count: self.count() })?;

        native::node_remove_child(self.raw(), child.raw())?;
        self.inner.children.borrow_mut().remove(index);
        child.inner.parent.replace(Weak::new());
        Ok(child)
    }

    pub fn add_child(&self, child: &Node) -> Result<()> {
        self.insert(self.count(), child)
    }

    /// Remove `child` if it is a child of this node.
    pub fn remove_child(&self, child: &Node) -> Result<()> {
        match self.index_of(child) {
            Some(index) => self.remove_at(index).map(drop),
            None => Ok(()),
        }
    }

    /// Remove every child, last first.
    pub fn clear(&self) -> Result<()> {
        while let Some(last) = self.count().checked_sub(1) {
            self.remove_at(last)?;
        }
        Ok(())
    }

    pub fn index_of(&self, child: &Node) -> Option<usize> {
        self.inner.children.borrow().iter().position(|c| c == child)
    }

    pub fn get(&self, index: usize) -> Option<Node> {
        self.inner.children.borrow().get(index).cloned()
    }

    pub fn count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner.parent.borrow().upgrade().map(Self::from_inner)
    }

    /// Snapshot of the children at the time of the call. Later mutations do
    /// not affect an iterator already handed out.
    pub fn children(&self) -> std::vec::IntoIter<Node> {
        self.inner.children.borrow().clone().into_iter()
    }

    // -------------------------------------------------------------------------
    // Dirtiness
    // -------------------------------------------------------------------------

    /// Ask for the measure function to run again on the next layout pass.
    /// Only valid on nodes with a measure function.
    pub fn mark_dirty(&self) -> Result<()> {
        native::node_mark_dirty(self.raw())
    }

    pub fn is_dirty(&self) -> bool {
        native::node_is_dirty(self.raw())
    }

    pub fn has_new_layout(&self) -> bool {
        native::node_has_new_layout(self.raw())
    }

    pub fn mark_has_new_layout(&self) {
        native::node_set_has_new_layout(self.raw(), true);
    }

    pub fn mark_layout_seen(&self) {
        native::node_set_has_new_layout(self.raw(), false);
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Lay out the subtree rooted here. [`UNDEFINED`] means unconstrained.
    pub fn calculate_layout(&self, width: f32, height: f32) -> Result<()> {
        native::node_calculate_layout(self.raw(), width, height, self.style_direction())
    }

    /// Lay out the subtree rooted here without size constraints.
    pub fn calculate(&self) -> Result<()> {
        self.calculate_layout(UNDEFINED, UNDEFINED)
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Make this node a measured leaf. Rejected if it has children.
    pub fn set_measure_function<F>(&self, measure: F) -> Result<()>
    where
        F: Fn(&Node, f32, MeasureMode, f32, MeasureMode) -> Size + 'static,
    {
        native::node_set_measure_func(self.raw(), Some(bridge::measure_trampoline))?;
        let measure: MeasureFunction = Rc::new(measure);
        self.inner.measure.replace(Some(measure));
        Ok(())
    }

    /// Remove the measure function from both the node and the engine.
    pub fn clear_measure_function(&self) -> Result<()> {
        native::node_set_measure_func(self.raw(), None)?;
        self.inner.measure.replace(None);
        Ok(())
    }

    pub fn set_baseline_function<F>(&self, baseline: F)
    where
        F: Fn(&Node, f32, f32) -> f32 + 'static,
    {
        native::node_set_baseline_func(self.raw(), Some(bridge::baseline_trampoline));
        let baseline: BaselineFunction = Rc::new(baseline);
        self.inner.baseline.replace(Some(baseline));
    }

    pub fn clear_baseline_function(&self) {
        native::node_set_baseline_func(self.raw(), None);
        self.inner.baseline.replace(None);
    }

    pub fn is_measure_defined(&self) -> bool {
        native::node_has_measure_func(self.raw())
    }

    pub fn is_baseline_defined(&self) -> bool {
        native::node_has_baseline_func(self.raw())
    }

    pub(crate) fn measure_function(&self) -> Option<MeasureFunction> {
        self.inner.measure.borrow().clone()
    }

    pub(crate) fn baseline_function(&self) -> Option<BaselineFunction> {
        self.inner.baseline.borrow().clone()
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Describe the subtree as text.
    ///
    /// The config's logger is swapped for a capture while the engine prints,
    /// and restored afterwards, also when printing fails.
    pub fn print(&self, options: PrintOptions) -> Result<String> {
        let captured = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&captured);
        let capture: Logger =
            Rc::new(move |_: &Config, _: Option<&Node>, _: LogLevel, message: &str| {
                sink.borrow_mut().push_str(message);
            });

        let previous = self.config().replace_logger(Some(capture));
        let result = native::node_print(self.raw(), options);
        self.config().replace_logger(previous);
        result?;

        let text = captured.borrow().clone();
        Ok(text)
    }

    // -------------------------------------------------------------------------
    // User Data
    // -------------------------------------------------------------------------

    pub fn set_data<T: Any>(&self, data: T) {
        self.inner.data.replace(Some(Box::new(data)));
    }

    /// Run `f` on the user data if it is a `T`.
    pub fn with_data<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.inner.data.borrow().as_ref().and_then(|data| data.downcast_ref::<T>()).map(f)
    }

    pub fn has_data(&self) -> bool {
        self.inner.data.borrow().is_some()
    }

    pub fn clear_data(&self) {
        self.inner.data.replace(None);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("handle", &self.inner.handle)
            .field("children", &self.count())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children()
    }
}
