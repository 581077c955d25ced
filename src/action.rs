/// Navigation and expansion intents produced by key or pointer input.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction<Custom = ()> {
    /// Move the cursor to the previous visible node.
    SelectPrev,
    /// Move the cursor to the next visible node.
    SelectNext,
    /// Move the cursor one page up.
    PageUp,
    /// Move the cursor one page down.
    PageDown,
    /// Move the cursor to the first root.
    SelectFirst,
    /// Move the cursor to the last visible node.
    SelectLast,
    /// Collapse the cursor node if expanded, otherwise move to its parent.
    CollapseOrParent,
    /// Expand the cursor node if collapsed, otherwise move to its first child.
    ExpandOrChild,
    /// Toggle expansion of the cursor node.
    ToggleNode,
    /// Expand the cursor node and all of its descendants.
    ExpandRecursive,
    /// Collapse every node in the tree.
    CollapseAll,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent<Custom = ()> {
    /// The action was handled internally and state was updated.
    Handled,
    /// The action was ignored (e.g., leaf node / already at the boundary).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(TreeAction<Custom>),
}
