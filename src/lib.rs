//! Virtualized tree state, lazy traversal and windowed rendering for ratatui.
//!
//! The crate never owns the tree. Hosts describe it through [`TreeModel`] and keep
//! a [`TreeState`] (expansion set, cursor, focus) next to it. Visible nodes are
//! computed on demand by [`Traversal`], so trees with millions of collapsed nodes
//! cost nothing until they are expanded. [`EmissionPlan`] turns the visible
//! sequence into keyed render units and [`plan_scroll`] decides how to bring an
//! item into view from the geometry measured during the last frame.
//!
//! [`TreeView`] and [`TreeViewState`] wire everything into a ratatui
//! `StatefulWidget`.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `TreeViewState::handle_key*` helpers.
//! - `serde`: serde support for actions, changes, content types and configuration.

mod action;
mod change;
mod config;
mod context;
mod emit;
mod error;
mod glyphs;
#[cfg(feature = "keymap")]
mod keymap;
mod model;
pub mod prelude;
mod scroll;
mod state;
mod style;
mod traversal;
mod view_state;
mod widget;

pub use action::{TreeAction, TreeEvent};
pub use change::TreeChange;
pub use config::{ScrollMode, TreeViewConfig};
pub use context::TreeRowContext;
pub use emit::{EmissionPlan, GroupKind, PlanCache, RenderUnit, UnitForm, UnitGroup};
pub use error::TreeError;
pub use glyphs::{
    TreeGlyphs, TreeLabelParts, TreeLabelProvider, TreeLabelRenderer, tree_indent,
    tree_label_line,
};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use model::{ContentType, TreeModel};
pub use scroll::{
    FALLBACK_PAGE_SIZE, MeasuredItem, PageSize, ScrollCase, ScrollDriver, ScrollPlan,
    ScrollRequest, ScrollTarget, ViewportLayout, plan_scroll, realized_page_size,
    scroll_into_view, windowed_page_size,
};
pub use state::TreeState;
pub use style::TreeViewStyle;
pub use traversal::{Traversal, VisibleNode, VisibleNodes};
pub use view_state::TreeViewState;
pub use widget::TreeView;
