use std::hash::Hash;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::TreeError;
use crate::model::TreeModel;
use crate::state::TreeState;

/// Structural change announced by the owner of a dynamic data source.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeChange<Id> {
    /// A node was inserted under `parent` (or as a root when `None`).
    Added { parent: Option<Id>, id: Id },
    /// A node and its whole subtree are about to be removed.
    Removed { id: Id },
    /// A node was moved under a new parent. Identity, and with it expansion, is kept.
    Moved { id: Id, new_parent: Option<Id> },
}

impl<Id: Copy + Eq + Hash> TreeState<Id> {
    /// Reacts to a structural change of the data source.
    ///
    /// For [`TreeChange::Removed`] this must run while the subtree is still
    /// reachable through `model`: every expanded node below the removed one, and the
    /// node itself, is passed to [`on_node_disappeared`](Self::on_node_disappeared).
    /// This includes expanded nodes hidden below a collapsed one. A cursor resting
    /// on a hidden node inside the subtree is cleared as well.
    ///
    /// Nodes added or moved to the top level are appended to the roots. Fails with
    /// [`TreeError::EmptyRoots`], leaving the state untouched, if the change would
    /// take away the last root.
    pub fn apply_change<T: TreeModel<Id = Id>>(
        &mut self,
        model: &T,
        change: TreeChange<Id>,
    ) -> Result<(), TreeError> {
        match change {
            TreeChange::Removed { id } => {
                self.detach_root(id)?;
                if let Some(cursor) = self.cursor()
                    && Self::is_within(model, cursor, id)
                {
                    self.set_cursor(None);
                }
                // Expanded nodes can hide below collapsed ones, so the expanded set is
                // scanned instead of walking the subtree.
                let mut gone: SmallVec<[Id; 16]> = self
                    .expanded_nodes()
                    .filter(|&node| Self::is_within(model, node, id))
                    .collect();
                if !gone.contains(&id) {
                    gone.push(id);
                }
                let forgotten = gone.len();
                for node in gone {
                    self.on_node_disappeared(node);
                }
                debug!(forgotten, "forgot removed subtree");
            }
            TreeChange::Added { parent: None, id }
            | TreeChange::Moved {
                id,
                new_parent: None,
            } => self.attach_root(id),
            TreeChange::Moved {
                id,
                new_parent: Some(_),
            } => self.detach_root(id)?,
            TreeChange::Added { .. } => {}
        }
        self.invalidate();
        Ok(())
    }

    fn is_within<T: TreeModel<Id = Id>>(model: &T, node: Id, ancestor: Id) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = model.parent(id);
        }
        false
    }
}
