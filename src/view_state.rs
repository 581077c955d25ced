use std::hash::Hash;

use tracing::debug;

use crate::action::{TreeAction, TreeEvent};
use crate::change::TreeChange;
use crate::config::{ScrollMode, TreeViewConfig};
use crate::emit::{EmissionPlan, PlanCache};
use crate::error::TreeError;
use crate::model::TreeModel;
use crate::scroll::{ScrollDriver, ScrollTarget, ViewportLayout, plan_scroll};
use crate::state::TreeState;

#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

/// Widget state: the tree state plus everything the windowed host remembers
/// between frames (emission plan, scroll position, last measured layout).
pub struct TreeViewState<Id> {
    pub(crate) tree: TreeState<Id>,
    pub(crate) plan: PlanCache<Id>,
    // Top item and how many rows of it are scrolled off.
    pub(crate) position: ScrollTarget,
    // Measured during the last render; indices refer to the plan of that render.
    pub(crate) layout: ViewportLayout,
    // Plan generation the layout indices refer to.
    pub(crate) layout_generation: u64,
    pub(crate) driver: ScrollDriver,
    config: TreeViewConfig,
    #[cfg(feature = "keymap")]
    keymap: TreeKeyBindings,
}

impl<Id: Copy + Eq + Hash> TreeViewState<Id> {
    /// Creates a state over the given roots with the default configuration.
    pub fn new(roots: impl IntoIterator<Item = Id>) -> Result<Self, TreeError> {
        Self::with_config(roots, TreeViewConfig::default())
    }

    pub fn with_config(
        roots: impl IntoIterator<Item = Id>,
        config: TreeViewConfig,
    ) -> Result<Self, TreeError> {
        Ok(Self {
            tree: TreeState::new(roots)?,
            plan: PlanCache::default(),
            position: ScrollTarget::default(),
            layout: ViewportLayout::default(),
            layout_generation: 0,
            driver: ScrollDriver::new(),
            config,
            #[cfg(feature = "keymap")]
            keymap: TreeKeyBindings::new(),
        })
    }

    #[cfg(feature = "keymap")]
    pub const fn keymap(&self) -> &TreeKeyBindings {
        &self.keymap
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut TreeKeyBindings {
        &mut self.keymap
    }

    pub const fn tree(&self) -> &TreeState<Id> {
        &self.tree
    }

    /// Direct access to the tree state. Cursor changes made here are not scrolled
    /// into view; use [`reveal`](Self::reveal) for that.
    pub const fn tree_mut(&mut self) -> &mut TreeState<Id> {
        &mut self.tree
    }

    pub const fn config(&self) -> &TreeViewConfig {
        &self.config
    }

    pub const fn config_mut(&mut self) -> &mut TreeViewConfig {
        &mut self.config
    }

    /// Current scroll position (top item index and row offset into it).
    pub const fn scroll_position(&self) -> ScrollTarget {
        self.position
    }

    /// Geometry measured during the last render.
    pub const fn layout(&self) -> &ViewportLayout {
        &self.layout
    }

    /// Returns `true` while an animated scroll is still running.
    pub const fn is_scrolling(&self) -> bool {
        self.driver.in_flight().is_some()
    }

    /// Returns the emission plan, rebuilt if the tree changed.
    pub fn plan<T: TreeModel<Id = Id>>(&mut self, model: &T) -> &EmissionPlan<Id> {
        self.plan.get(model, &self.tree)
    }

    /// Step used by page-up/page-down, from the configured policy.
    pub fn page_size(&self) -> usize {
        if self.layout.is_empty() {
            return self.config.fallback_page_size.max(1);
        }
        self.config.page_size.windowed(&self.layout)
    }

    pub const fn set_focus(&mut self, focused: bool) {
        self.tree.set_focus(focused);
    }

    /// Handles a tree action and scrolls the cursor into view if it moved.
    pub fn handle_action<T: TreeModel<Id = Id>, C>(
        &mut self,
        model: &T,
        action: TreeAction<C>,
    ) -> TreeEvent<C> {
        let before = self.tree.cursor();
        let page_size = self.page_size();
        let event = self.tree.handle_action(model, action, page_size);
        if self.tree.cursor() != before {
            self.scroll_cursor_into_view(model);
        }
        event
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event into an action and handles it.
    pub fn handle_key<T: TreeModel<Id = Id>>(&mut self, model: &T, key: KeyEvent) -> TreeEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(model, action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event with a custom mapping and handles it.
    pub fn handle_key_with<T, C, F>(&mut self, model: &T, key: KeyEvent, custom: F) -> TreeEvent<C>
    where
        T: TreeModel<Id = Id>,
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(model, action)
    }

    /// Expands the node's ancestors, moves the cursor onto it and scrolls to it.
    pub fn reveal<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id) {
        self.tree.expand_to(model, id);
        self.tree.set_cursor(Some(id));
        self.scroll_cursor_into_view(model);
    }

    /// Forwards a structural change to the tree state.
    pub fn apply_change<T: TreeModel<Id = Id>>(
        &mut self,
        model: &T,
        change: TreeChange<Id>,
    ) -> Result<(), TreeError> {
        self.tree.apply_change(model, change)?;
        self.plan.invalidate();
        Ok(())
    }

    /// Puts the cursor on the node drawn at `row` (relative to the viewport) and
    /// takes focus. Returns `false` if no node is drawn there, or if the tree
    /// changed since the last render so the drawn rows no longer match the plan.
    pub fn click(&mut self, row: u16) -> bool {
        let stale =
            self.layout_generation != self.plan.generation() || !self.plan.is_current(&self.tree);
        if stale {
            debug!("click on a stale layout ignored");
            return false;
        }
        let row = i32::from(row);
        let hit = self
            .layout
            .items
            .iter()
            .find(|item| item.offset <= row && row < item.offset + item.extent)
            .and_then(|item| self.plan.plan().get(item.index))
            .map(|unit| unit.node);
        let Some(node) = hit else {
            return false;
        };
        self.tree.set_focus(true);
        self.tree.set_cursor(Some(node));
        true
    }

    /// Scrolls the viewport down by `amount` items.
    pub fn scroll_down_by(&mut self, amount: usize) {
        self.driver.cancel();
        self.position = ScrollTarget::top(self.position.index.saturating_add(amount));
    }

    /// Scrolls the viewport up by `amount` items.
    pub fn scroll_up_by(&mut self, amount: usize) {
        self.driver.cancel();
        self.position = ScrollTarget::top(self.position.index.saturating_sub(amount));
    }

    /// Brings the cursor into view using the last measured layout.
    ///
    /// Does nothing when the cursor is unset or hidden under a collapsed ancestor.
    pub fn scroll_cursor_into_view<T: TreeModel<Id = Id>>(&mut self, model: &T) {
        let Some(cursor) = self.tree.cursor() else {
            return;
        };
        let plan = self.plan.get(model, &self.tree);
        let Some(index) = plan.position(cursor) else {
            debug!("cursor is not visible, skipping scroll");
            return;
        };
        let is_last = index + 1 == plan.len();
        if let Some(target) = plan_scroll(&self.layout, index, is_last).target {
            let animate = self.config.scroll_mode == ScrollMode::Animate;
            self.driver.request(target, animate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixture::DigitTree;
    use crate::scroll::MeasuredItem;

    fn state_with_layout(tree: &DigitTree) -> TreeViewState<u32> {
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.tree_mut().expand_with_descendants(tree, 1).unwrap();
        // Rows 0..10 show items 0..10, one row each.
        state.layout = ViewportLayout::from_extents(0, 0, std::iter::repeat_n(1, 10), 10);
        state
    }

    #[test]
    fn cursor_move_below_window_requests_scroll() {
        let tree = DigitTree::new();
        let mut state = state_with_layout(&tree);
        // 1, 10, 100..=109, 11, ...: index 7 is node 105.
        state.tree_mut().set_cursor(Some(105));

        state.handle_action::<_, ()>(&tree, TreeAction::SelectNext);
        assert_eq!(state.tree().cursor(), Some(106));
        assert!(!state.is_scrolling());

        state.handle_action::<_, ()>(&tree, TreeAction::SelectNext);
        assert_eq!(state.tree().cursor(), Some(107));
        assert!(!state.is_scrolling());

        state.handle_action::<_, ()>(&tree, TreeAction::SelectNext);
        assert_eq!(state.tree().cursor(), Some(108));
        assert_eq!(
            state.driver.in_flight().map(|request| request.target),
            Some(ScrollTarget::top(1))
        );
    }

    #[test]
    fn page_down_uses_measured_window() {
        let tree = DigitTree::new();
        let mut state = state_with_layout(&tree);
        state.tree_mut().set_cursor(Some(1));

        assert_eq!(state.page_size(), 9);
        state.handle_action::<_, ()>(&tree, TreeAction::PageDown);

        assert_eq!(state.tree().cursor(), Some(107));
        assert!(!state.is_scrolling());

        state.handle_action::<_, ()>(&tree, TreeAction::PageDown);
        assert_eq!(state.tree().cursor(), Some(115));
        assert_eq!(
            state.driver.in_flight().map(|request| request.target),
            Some(ScrollTarget::top(9))
        );
    }

    #[test]
    fn page_size_falls_back_before_first_layout() {
        let tree = DigitTree::new();
        let state = TreeViewState::new(tree.roots().iter().copied()).unwrap();

        assert_eq!(state.page_size(), 10);
    }

    #[test]
    fn click_moves_cursor_and_focus() {
        let tree = DigitTree::new();
        let mut state = state_with_layout(&tree);
        let _ = state.plan(&tree);
        state.layout_generation = state.plan.generation();
        state.layout = ViewportLayout::new(
            vec![
                MeasuredItem {
                    index: 0,
                    offset: 0,
                    extent: 2,
                },
                MeasuredItem {
                    index: 1,
                    offset: 2,
                    extent: 3,
                },
            ],
            10,
        );

        assert!(state.click(4));
        assert_eq!(state.tree().cursor(), Some(10));
        assert!(state.tree().has_focus());
        assert!(!state.click(7));
    }

    #[test]
    fn click_after_tree_change_is_ignored() {
        let tree = DigitTree::new();
        let mut state = state_with_layout(&tree);
        let _ = state.plan(&tree);
        state.layout_generation = state.plan.generation();
        state.tree_mut().set_cursor(Some(1));

        // Collapsing 1 changes the tree; the measured rows belong to the old plan.
        state.handle_action::<_, ()>(&tree, TreeAction::CollapseOrParent);
        assert!(!state.click(3));
        assert_eq!(state.tree().cursor(), Some(1));

        // Rebuilt without a render in between.
        let _ = state.plan(&tree);
        assert!(!state.click(3));
    }

    #[test]
    fn reveal_expands_ancestors_and_scrolls() {
        let tree = DigitTree::new();
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.layout = ViewportLayout::from_extents(0, 0, std::iter::repeat_n(1, 5), 5);

        state.reveal(&tree, 83);

        assert!(state.tree().is_expanded(8));
        assert_eq!(state.tree().cursor(), Some(83));
        // Visible: 1..=8, 80..=89, 9; node 83 sits at index 11.
        assert_eq!(
            state.driver.in_flight().map(|request| request.target),
            Some(ScrollTarget::top(7))
        );
    }
}
