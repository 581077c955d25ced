use thiserror::Error;

/// Precondition violations reported by [`TreeState`](crate::TreeState).
///
/// These indicate a programming error in the caller. The offending call has no
/// effect; the state stays as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A tree state was constructed without any root nodes.
    #[error("tree state requires at least one root node")]
    EmptyRoots,
    /// `expand` (or an operation built on it) was called on a leaf node.
    #[error("leaf nodes cannot be expanded")]
    ExpandLeaf,
}
