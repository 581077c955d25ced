use std::hash::Hash;

use rustc_hash::{FxBuildHasher, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::action::{TreeAction, TreeEvent};
use crate::error::TreeError;
use crate::model::TreeModel;
use crate::traversal::Traversal;

/// Tree state: roots, expanded nodes, cursor and focus.
///
/// This is the single source of truth mutated by navigation and UI intents.
/// Nodes themselves belong to the data source and are only referenced by id.
#[derive(Clone, Debug)]
pub struct TreeState<Id> {
    roots: SmallVec<[Id; 4]>,
    // Never contains a leaf: enforced in `expand`, not re-checked on removal.
    expanded: FxHashSet<Id>,
    cursor: Option<Id>,
    has_focus: bool,
    // Bumped whenever the expansion set changes so render caches can tell they are stale.
    revision: u64,
}

impl<Id: Copy + Eq + Hash> TreeState<Id> {
    /// Creates a state over the given roots.
    ///
    /// Fails with [`TreeError::EmptyRoots`] if `roots` is empty.
    pub fn new(roots: impl IntoIterator<Item = Id>) -> Result<Self, TreeError> {
        Self::with_capacity(roots, 0)
    }

    /// Creates a state with preallocated capacity for the given number of expanded nodes.
    pub fn with_capacity(
        roots: impl IntoIterator<Item = Id>,
        capacity: usize,
    ) -> Result<Self, TreeError> {
        let roots: SmallVec<[Id; 4]> = roots.into_iter().collect();
        if roots.is_empty() {
            return Err(TreeError::EmptyRoots);
        }
        Ok(Self {
            roots,
            expanded: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
            cursor: None,
            has_focus: false,
            revision: 0,
        })
    }

    /// Returns the root nodes in order. Never empty.
    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    /// Returns a traversal view over `model` using the current expansion state.
    pub const fn traverse<'a, T: TreeModel<Id = Id>>(&'a self, model: &'a T) -> Traversal<'a, T> {
        Traversal::new(model, self)
    }

    /// Returns a counter that changes whenever the expansion set changes.
    #[inline]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Forces dependent caches to rebuild, e.g. after the model's structure changed.
    pub const fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Returns `true` if the node is in the expanded set.
    #[inline]
    pub fn is_expanded(&self, id: Id) -> bool {
        self.expanded.contains(&id)
    }

    pub(crate) fn expanded_nodes(&self) -> impl Iterator<Item = Id> + '_ {
        self.expanded.iter().copied()
    }

    /// Returns the number of expanded nodes.
    pub fn expanded_len(&self) -> usize {
        self.expanded.len()
    }

    /// Expands the node. Idempotent.
    ///
    /// Fails with [`TreeError::ExpandLeaf`] if the node is a leaf.
    pub fn expand<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id) -> Result<(), TreeError> {
        if model.is_leaf(id) {
            debug!("rejected expand of a leaf node");
            return Err(TreeError::ExpandLeaf);
        }
        if self.expanded.insert(id) {
            self.invalidate();
        }
        Ok(())
    }

    /// Removes only this node from the expanded set.
    ///
    /// Descendants keep their expansion and reappear expanded once the node is
    /// expanded again. Rarely what a UI wants; see [`collapse`](Self::collapse).
    pub fn collapse_without_descendants(&mut self, id: Id) {
        if self.expanded.remove(&id) {
            self.invalidate();
        }
    }

    /// Collapses the node and every expanded node below it.
    ///
    /// No-op if the node is not expanded. The walk only descends through expanded
    /// children, so a node left expanded below a child collapsed with
    /// [`collapse_without_descendants`](Self::collapse_without_descendants) keeps
    /// its flag.
    pub fn collapse<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id) {
        if !self.expanded.contains(&id) {
            return;
        }
        self.collapse_subtree(model, id);
        self.invalidate();
    }

    fn collapse_subtree<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id) {
        // Post-order: children first, then the node itself.
        for child in model.children(id).iter().copied() {
            if self.expanded.contains(&child) {
                self.collapse_subtree(model, child);
            }
        }
        self.expanded.remove(&id);
    }

    /// Collapses the node if expanded, expands it otherwise.
    pub fn toggle_expanded<T: TreeModel<Id = Id>>(
        &mut self,
        model: &T,
        id: Id,
    ) -> Result<(), TreeError> {
        if self.is_expanded(id) {
            self.collapse(model, id);
            Ok(())
        } else {
            self.expand(model, id)
        }
    }

    /// Expands the node and every non-leaf node below it.
    pub fn expand_with_descendants<T: TreeModel<Id = Id>>(
        &mut self,
        model: &T,
        id: Id,
    ) -> Result<(), TreeError> {
        if model.is_leaf(id) {
            debug!("rejected recursive expand of a leaf node");
            return Err(TreeError::ExpandLeaf);
        }
        let mut stack: SmallVec<[Id; 32]> = SmallVec::new();
        stack.push(id);
        while let Some(node) = stack.pop() {
            self.expanded.insert(node);
            stack.extend(
                model
                    .children(node)
                    .iter()
                    .copied()
                    .filter(|child| !model.is_leaf(*child)),
            );
        }
        self.invalidate();
        Ok(())
    }

    /// Expands every ancestor of the node so that it becomes visible.
    pub fn expand_to<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id) {
        let mut current = model.parent(id);
        while let Some(ancestor) = current {
            self.expanded.insert(ancestor);
            current = model.parent(ancestor);
        }
        self.invalidate();
    }

    /// Collapses every node. The cursor is left where it is, possibly hidden.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.invalidate();
    }

    /// Returns the cursor node, if any.
    #[inline]
    pub const fn cursor(&self) -> Option<Id> {
        self.cursor
    }

    /// Sets the cursor. The node is not validated against the tree.
    pub fn set_cursor(&mut self, cursor: Option<Id>) {
        self.cursor = cursor;
    }

    /// Returns `true` if the node is the cursor.
    #[inline]
    pub fn is_cursor(&self, id: Id) -> bool {
        self.cursor == Some(id)
    }

    /// Returns whether the tree currently holds input focus.
    #[inline]
    pub const fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Sets whether the tree holds input focus. Independent of the cursor.
    pub const fn set_focus(&mut self, focused: bool) {
        self.has_focus = focused;
    }

    // Appends a top-level node unless it is already a root.
    pub(crate) fn attach_root(&mut self, id: Id) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    // Drops a node from the roots. Fails if it is the only one.
    pub(crate) fn detach_root(&mut self, id: Id) -> Result<(), TreeError> {
        let Some(pos) = self.roots.iter().position(|&root| root == id) else {
            return Ok(());
        };
        if self.roots.len() == 1 {
            return Err(TreeError::EmptyRoots);
        }
        self.roots.remove(pos);
        Ok(())
    }

    /// Forgets a node that is no longer part of the data source.
    ///
    /// Removes it from the expanded set and clears the cursor if it pointed at it.
    /// Must be called by the data-source owner for every removed node, before or
    /// together with the removal; nothing detects disappearance automatically.
    pub fn on_node_disappeared(&mut self, id: Id) {
        if self.expanded.remove(&id) {
            self.invalidate();
        }
        if self.cursor == Some(id) {
            self.cursor = None;
        }
    }

    /// Handles a navigation or expansion intent and returns the resulting event.
    ///
    /// `page_size` is the step used by [`TreeAction::PageUp`] and
    /// [`TreeAction::PageDown`].
    pub fn handle_action<T: TreeModel<Id = Id>, C>(
        &mut self,
        model: &T,
        action: TreeAction<C>,
        page_size: usize,
    ) -> TreeEvent<C> {
        if let TreeAction::Custom(_) = action {
            return TreeEvent::Action(action);
        }

        let Some(cursor) = self.cursor else {
            if matches!(action, TreeAction::CollapseAll) {
                self.collapse_all();
                return TreeEvent::Handled;
            }
            // First intent only places the cursor.
            let start = match action {
                TreeAction::SelectLast => self.traverse(model).last_visible(),
                _ => self.roots[0],
            };
            self.set_cursor(Some(start));
            return TreeEvent::Handled;
        };

        match action {
            TreeAction::SelectPrev => self.move_cursor(self.traverse(model).predecessor(cursor, 1)),
            TreeAction::SelectNext => self.move_cursor(self.traverse(model).successor(cursor, 1)),
            TreeAction::PageUp => {
                let page = page_size.max(1);
                self.move_cursor(self.traverse(model).predecessor(cursor, page))
            }
            TreeAction::PageDown => {
                let page = page_size.max(1);
                self.move_cursor(self.traverse(model).successor(cursor, page))
            }
            TreeAction::SelectFirst => self.move_cursor(self.roots[0]),
            TreeAction::SelectLast => self.move_cursor(self.traverse(model).last_visible()),
            TreeAction::CollapseOrParent => {
                if self.is_expanded(cursor) {
                    self.collapse(model, cursor);
                    TreeEvent::Handled
                } else if let Some(parent) = model.parent(cursor) {
                    self.move_cursor(parent)
                } else {
                    TreeEvent::Unhandled
                }
            }
            TreeAction::ExpandOrChild => {
                if model.is_leaf(cursor) {
                    return TreeEvent::Unhandled;
                }
                if !self.is_expanded(cursor) {
                    self.expanded.insert(cursor);
                    self.invalidate();
                    return TreeEvent::Handled;
                }
                match model.children(cursor).first() {
                    Some(&child) => self.move_cursor(child),
                    None => TreeEvent::Unhandled,
                }
            }
            TreeAction::ToggleNode => match self.toggle_expanded(model, cursor) {
                Ok(()) => TreeEvent::Handled,
                Err(_) => TreeEvent::Unhandled,
            },
            TreeAction::ExpandRecursive => match self.expand_with_descendants(model, cursor) {
                Ok(()) => TreeEvent::Handled,
                Err(_) => TreeEvent::Unhandled,
            },
            TreeAction::CollapseAll => {
                self.collapse_all();
                // Only roots stay visible.
                let root = Self::root_of(model, cursor);
                self.set_cursor(Some(root));
                TreeEvent::Handled
            }
            TreeAction::Custom(_) => TreeEvent::Action(action),
        }
    }

    fn root_of<T: TreeModel<Id = Id>>(model: &T, id: Id) -> Id {
        let mut current = id;
        while let Some(parent) = model.parent(current) {
            current = parent;
        }
        current
    }

    fn move_cursor<C>(&mut self, target: Id) -> TreeEvent<C> {
        if self.cursor == Some(target) {
            return TreeEvent::Unhandled;
        }
        self.set_cursor(Some(target));
        TreeEvent::Handled
    }
}
