use std::hash::Hash;

/// Opaque per-node category tag handed to the rendering host together with each
/// render unit, so that nodes of the same kind can share render machinery.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentType(pub u32);

impl ContentType {
    /// Tag used when the model does not distinguish node kinds.
    pub const DEFAULT: Self = Self(0);
}

/// Minimal tree contract required by the tree state and its traversals.
///
/// A proper forest is expected (not a DAG):
/// - no cycles (traversals follow `parent` and `children` directly);
/// - each node has exactly one parent, roots have none;
/// - identifiers are stable for as long as the node takes part in the tree,
///   since expansion and cursor state are keyed by them.
///
/// All methods must be side-effect free and return the same answer between calls
/// unless the data source performed an explicit structural change.
pub trait TreeModel {
    /// Node identifier type.
    type Id: Copy + Eq + Hash;

    /// Returns the parent of the node, or `None` for a root.
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;
    /// Returns the node's children in a deterministic order.
    ///
    /// Never called for nodes where [`is_leaf`](Self::is_leaf) returns `true`.
    fn children(&self, id: Self::Id) -> &[Self::Id];
    /// Returns `true` if the node can never have children.
    ///
    /// A non-leaf may still have an empty child list (an empty folder).
    fn is_leaf(&self, id: Self::Id) -> bool;
    /// Returns the category tag for the node.
    fn content_type(&self, _id: Self::Id) -> ContentType {
        ContentType::DEFAULT
    }
    /// Returns an approximate size hint (not required to be exact).
    fn size_hint(&self) -> usize {
        0
    }
}
