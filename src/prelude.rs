pub use crate::{
    ContentType, PageSize, ScrollMode, ScrollTarget, TreeAction, TreeChange, TreeError,
    TreeEvent, TreeGlyphs, TreeLabelParts, TreeLabelProvider, TreeLabelRenderer, TreeModel,
    TreeRowContext, TreeState, TreeView, TreeViewConfig, TreeViewState, TreeViewStyle,
    UnitForm, tree_label_line,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};
