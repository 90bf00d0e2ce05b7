//! Batch operations.
//!
//! Within a batch the document can't change, so accessible names and
//! locator lookups are memoised. The caches live in an explicit
//! [`BatchContext`] and are cleared when the batch ends, however it ends.

use crate::accessible_name::accessible_name;
use crate::lookup_result::LookupResult;
use crate::result::{SemlocError, SemlocResult};
use ego_tree::{NodeId, Tree};
use scraper::{ElementRef, Node};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::trace;

/// Identifies a node across documents: the address of its tree plus its id.
/// Addresses are stable because every tree a context has seen stays
/// borrowed for the context's lifetime.
type NodeKey = (usize, NodeId);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct LookupKey {
    tree: usize,
    root: NodeId,
    locator: String,
    include_hidden: bool,
    include_presentational: bool,
}

impl LookupKey {
    pub(crate) fn new(
        root: &ElementRef<'_>,
        locator: String,
        include_hidden: bool,
        include_presentational: bool,
    ) -> Self {
        Self {
            tree: tree_address(root.tree()),
            root: root.id(),
            locator,
            include_hidden,
            include_presentational,
        }
    }
}

fn tree_address(tree: &Tree<Node>) -> usize {
    std::ptr::from_ref(tree) as usize
}

fn node_key(el: &ElementRef<'_>) -> NodeKey {
    (tree_address(el.tree()), el.id())
}

/// Memoisation scope for a group of related operations.
///
/// The context borrows every document it looks at for as long as it lives,
/// so no document can be changed or dropped while the context could still
/// serve cached results for it:
///
/// ```compile_fail
/// use semloc::{find_by_semantic_locator, parse, BatchContext, Document, FindOptions};
///
/// let locator = parse("{button 'OK'}").unwrap();
/// let context = BatchContext::new();
/// let first = Document::parse("<button>OK</button>");
/// find_by_semantic_locator(&context, &locator, first.default_root(), FindOptions::default()).unwrap();
/// drop(first);
/// let second = Document::parse("<p>OK</p>");
/// find_by_semantic_locator(&context, &locator, second.default_root(), FindOptions::default()).unwrap();
/// ```
///
/// Documents therefore need to be declared before a batch begins, and a
/// document changed between batches needs a new context.
#[derive(Debug, Default)]
pub struct BatchContext<'doc> {
    active: Cell<bool>,
    names: RefCell<HashMap<NodeKey, String>>,
    lookups: RefCell<HashMap<LookupKey, LookupResult<NodeId>>>,
    // Invariant, so 'doc can't shrink to let a borrowed tree go
    documents: PhantomData<Cell<&'doc Tree<Node>>>,
}

impl<'doc> BatchContext<'doc> {
    /// A context with no batch running
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch is running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Start a batch which ends when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// [`SemlocError::BatchInProgress`] if a batch is already running.
    pub fn begin(&self) -> SemlocResult<BatchGuard<'_, 'doc>> {
        if self.active.replace(true) {
            return Err(SemlocError::BatchInProgress);
        }
        trace!("batch started");
        Ok(BatchGuard { context: self })
    }

    /// Run `f` inside a batch.
    ///
    /// # Errors
    ///
    /// [`SemlocError::BatchInProgress`] if a batch is already running.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> SemlocResult<T> {
        let _guard = self.begin()?;
        Ok(f())
    }

    /// Accessible name of `el`, memoised while a batch runs
    #[must_use]
    pub fn accessible_name(&self, el: ElementRef<'doc>) -> String {
        if !self.is_active() {
            return accessible_name(el);
        }
        let key = node_key(&el);
        if let Some(name) = self.names.borrow().get(&key) {
            trace!(node = ?el.id(), "accessible name cache hit");
            return name.clone();
        }
        let name = accessible_name(el);
        self.names.borrow_mut().insert(key, name.clone());
        name
    }

    /// Look `key` up in the lookup cache, computing and storing it on a miss.
    /// Outside a batch nothing is memoised.
    pub(crate) fn cached_lookup(
        &self,
        key: LookupKey,
        root: ElementRef<'doc>,
        compute: impl FnOnce() -> SemlocResult<LookupResult<ElementRef<'doc>>>,
    ) -> SemlocResult<LookupResult<ElementRef<'doc>>> {
        if !self.is_active() {
            return compute();
        }
        let cached = self.lookups.borrow().get(&key).cloned();
        if let Some(cached) = cached {
            trace!(locator = %key.locator, "lookup cache hit");
            let tree = root.tree();
            return Ok(cached.filter_map(|id| tree.get(id).and_then(ElementRef::wrap)));
        }
        let result = compute()?;
        let ids = result.clone().map(|el| el.id());
        self.lookups.borrow_mut().insert(key, ids);
        Ok(result)
    }

    fn clear(&self) {
        self.names.borrow_mut().clear();
        self.lookups.borrow_mut().clear();
    }
}

/// Ends its batch when dropped
#[derive(Debug)]
#[must_use = "the batch ends as soon as the guard is dropped"]
pub struct BatchGuard<'c, 'doc> {
    context: &'c BatchContext<'doc>,
}

impl Drop for BatchGuard<'_, '_> {
    fn drop(&mut self) {
        debug_assert!(self.context.is_active(), "Not in a batch operation");
        self.context.active.set(false);
        self.context.clear();
        trace!("batch finished");
    }
}
