use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::{Line, Text};
use ratatui::widgets::{
    Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
};

use crate::context::TreeRowContext;
use crate::emit::RenderUnit;
use crate::glyphs::{TreeGlyphs, TreeLabelRenderer};
use crate::model::TreeModel;
use crate::scroll::{MeasuredItem, ScrollTarget, ViewportLayout};
use crate::state::TreeState;
use crate::style::TreeViewStyle;
use crate::view_state::TreeViewState;

/// Windowed tree widget: only the units that intersect the viewport are turned
/// into text, and their measured rows are stored back into the state for the
/// next scroll decision.
pub struct TreeView<'a, T, L>
where
    T: TreeModel,
    L: TreeLabelRenderer<T>,
{
    model: &'a T,
    label: &'a L,
    style: TreeViewStyle<'a>,
    glyphs: TreeGlyphs<'a>,
}

impl<'a, T, L> TreeView<'a, T, L>
where
    T: TreeModel,
    L: TreeLabelRenderer<T>,
{
    pub const fn new(model: &'a T, label: &'a L, style: TreeViewStyle<'a>) -> Self {
        Self {
            model,
            label,
            style,
            glyphs: TreeGlyphs::unicode(),
        }
    }

    #[must_use]
    pub const fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    #[inline]
    fn unit_text(&self, unit: &RenderUnit<T::Id>, tree: &TreeState<T::Id>) -> Text<'a> {
        let ctx = TreeRowContext {
            depth: unit.depth,
            form: unit.form,
            is_leaf: self.model.is_leaf(unit.node),
            is_cursor: tree.is_cursor(unit.node),
            has_focus: tree.has_focus(),
            content_type: unit.content_type,
        };
        self.label.text(self.model, unit.node, &ctx, &self.glyphs)
    }

    #[inline]
    fn unit_extent(&self, unit: &RenderUnit<T::Id>, tree: &TreeState<T::Id>) -> i32 {
        text_extent(&self.unit_text(unit, tree))
    }

    // Pulls the position back so the last unit ends at the viewport bottom instead
    // of leaving blank rows below it. Positions past the end are clamped first.
    fn clamp_position(
        &self,
        units: &[RenderUnit<T::Id>],
        tree: &TreeState<T::Id>,
        position: ScrollTarget,
        viewport: i32,
    ) -> ScrollTarget {
        if units.is_empty() {
            return ScrollTarget::default();
        }
        let (mut index, mut offset) = if position.index >= units.len() {
            (units.len(), 0)
        } else {
            (position.index, position.offset.max(0))
        };

        let mut filled = -offset;
        for unit in &units[index..] {
            if filled >= viewport {
                return ScrollTarget::new(index, offset);
            }
            filled = filled.saturating_add(self.unit_extent(unit, tree));
        }
        let mut missing = viewport - filled;
        if missing <= 0 {
            return ScrollTarget::new(index, offset);
        }

        let shift = offset.min(missing);
        offset -= shift;
        missing -= shift;
        while missing > 0 && index > 0 {
            index -= 1;
            let extent = self.unit_extent(&units[index], tree);
            if extent >= missing {
                offset = extent - missing;
                missing = 0;
            } else {
                missing -= extent;
                offset = 0;
            }
        }
        ScrollTarget::new(index.min(units.len() - 1), offset)
    }

    #[inline]
    fn render_scrollbar(
        area: Rect,
        buf: &mut Buffer,
        total: usize,
        position: usize,
        window_len: usize,
    ) {
        let mut scrollbar_state = ScrollbarState::new(total)
            .position(position.min(total.saturating_sub(1)))
            .viewport_content_length(window_len);
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .render(area, buf, &mut scrollbar_state);
    }
}

fn text_extent(text: &Text<'_>) -> i32 {
    i32::try_from(text.height()).unwrap_or(i32::MAX).max(1)
}

impl<T, L> StatefulWidget for TreeView<'_, T, L>
where
    T: TreeModel,
    L: TreeLabelRenderer<T>,
{
    type State = TreeViewState<T::Id>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let show_scrollbar = state.config().show_scrollbar;
        if let Some(next) = state.driver.step(state.position) {
            state.position = next;
        }

        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);

        let viewport = i32::from(block.inner(area).height);
        let units = state.plan.get(self.model, &state.tree).units();
        let position = self.clamp_position(units, &state.tree, state.position, viewport);
        state.position = position;

        let mut rows: Vec<(MeasuredItem, Text<'_>)> = Vec::new();
        let mut y = -position.offset;
        let mut index = position.index;
        while y < viewport
            && let Some(unit) = units.get(index)
        {
            let text = self.unit_text(unit, &state.tree);
            let extent = text_extent(&text);
            rows.push((
                MeasuredItem {
                    index,
                    offset: y,
                    extent,
                },
                text,
            ));
            y = y.saturating_add(extent);
            index += 1;
        }

        let total = units.len();
        let scrollable = position != ScrollTarget::default() || index < total || y > viewport;
        let scrollbar_area = (scrollable && show_scrollbar && area.width > 1).then(|| Rect {
            x: area.x + area.width - 1,
            y: area.y,
            width: 1,
            height: area.height,
        });

        let (list_area, list_block) = if scrollbar_area.is_some() {
            let mut borders = self.style.borders;
            borders.remove(Borders::RIGHT);
            let list_area = Rect {
                width: area.width.saturating_sub(1),
                ..area
            };
            (list_area, block.borders(borders))
        } else {
            (area, block)
        };
        let inner = list_block.inner(list_area);
        list_block.render(list_area, buf);

        let cursor = state.tree.cursor();
        let symbol_width = if cursor.is_some() {
            u16::try_from(Line::from(self.style.cursor_symbol).width()).unwrap_or(u16::MAX)
        } else {
            0
        };
        let cursor_style = if state.tree.has_focus() {
            self.style.cursor_style
        } else {
            self.style.unfocused_cursor_style
        };

        for (item, text) in &rows {
            let is_cursor = units
                .get(item.index)
                .is_some_and(|unit| Some(unit.node) == cursor);
            for (line_no, line) in text.lines.iter().enumerate() {
                let row = item
                    .offset
                    .saturating_add(i32::try_from(line_no).unwrap_or(i32::MAX));
                let Ok(row) = u16::try_from(row) else {
                    continue;
                };
                if row >= inner.height {
                    break;
                }
                let row_area = Rect {
                    y: inner.y + row,
                    height: 1,
                    ..inner
                };
                buf.set_style(row_area, text.style);
                if is_cursor {
                    buf.set_style(row_area, cursor_style);
                    if line_no == 0 {
                        buf.set_stringn(
                            row_area.x,
                            row_area.y,
                            self.style.cursor_symbol,
                            usize::from(row_area.width),
                            cursor_style,
                        );
                    }
                }
                let label_x = row_area.x.saturating_add(symbol_width);
                let label_width = row_area.width.saturating_sub(symbol_width);
                if label_width > 0 {
                    buf.set_line(label_x, row_area.y, line, label_width);
                }
            }
        }

        if let Some(scrollbar_area) = scrollbar_area {
            Self::render_scrollbar(scrollbar_area, buf, total, position.index, rows.len());
        }

        state.layout = ViewportLayout::new(rows.into_iter().map(|(item, _)| item).collect(), viewport);
        state.layout_generation = state.plan.generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::{TreeLabelParts, TreeLabelProvider};
    use crate::model::fixture::DigitTree;
    use crate::scroll::ScrollTarget;

    struct DigitLabel;

    impl TreeLabelProvider<DigitTree> for DigitLabel {
        fn label_parts<'a>(&'a self, _model: &'a DigitTree, id: u32) -> TreeLabelParts<'a> {
            TreeLabelParts::new(id.to_string())
        }
    }

    // Every node is two lines tall.
    struct TallLabel;

    impl TreeLabelRenderer<DigitTree> for TallLabel {
        fn text<'a>(
            &'a self,
            _model: &'a DigitTree,
            id: u32,
            _ctx: &TreeRowContext,
            _glyphs: &TreeGlyphs<'a>,
        ) -> Text<'a> {
            Text::from(vec![Line::from(id.to_string()), Line::from("..")])
        }
    }

    fn plain_style() -> TreeViewStyle<'static> {
        TreeViewStyle {
            borders: Borders::NONE,
            ..TreeViewStyle::default()
        }
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        let width = buffer.area.width;
        (0..width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn render_smoke_with_scrollbar() {
        let tree = DigitTree::new();
        let label = DigitLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.tree_mut().expand(&tree, 1).unwrap();

        let area = Rect::new(0, 0, 20, 6);
        let mut buffer = Buffer::empty(area);
        TreeView::new(&tree, &label, TreeViewStyle::default()).render(area, &mut buffer, &mut state);

        // Four inner rows: 1, 10, 11, 12.
        let indices: Vec<_> = state.layout().items.iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(state.layout().viewport_extent, 4);
    }

    #[test]
    fn draws_labels_and_cursor_symbol() {
        let tree = DigitTree::new();
        let label = DigitLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.config_mut().show_scrollbar = false;
        state.tree_mut().set_cursor(Some(2));

        let area = Rect::new(0, 0, 12, 3);
        let mut buffer = Buffer::empty(area);
        TreeView::new(&tree, &label, plain_style())
            .glyphs(TreeGlyphs::ascii())
            .render(area, &mut buffer, &mut state);

        assert_eq!(row_text(&buffer, 0), "   > 1");
        assert_eq!(row_text(&buffer, 1), ">> > 2");
    }

    #[test]
    fn multi_line_items_are_measured_by_height() {
        let tree = DigitTree::new();
        let label = TallLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();

        let area = Rect::new(0, 0, 10, 5);
        let mut buffer = Buffer::empty(area);
        TreeView::new(&tree, &label, plain_style()).render(area, &mut buffer, &mut state);

        let layout = state.layout();
        assert_eq!(layout.items.len(), 3);
        assert_eq!(layout.items[2].offset, 4);
        assert_eq!(layout.items[2].extent, 2);
    }

    #[test]
    fn overscroll_is_clamped_to_the_last_item() {
        let tree = DigitTree::new();
        let label = DigitLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.scroll_down_by(100);

        let area = Rect::new(0, 0, 10, 4);
        let mut buffer = Buffer::empty(area);
        TreeView::new(&tree, &label, plain_style()).render(area, &mut buffer, &mut state);

        // Nine roots in four rows: 6..=9 end at the bottom.
        assert_eq!(state.scroll_position(), ScrollTarget::top(5));
        assert_eq!(state.layout().items.last().map(|item| item.index), Some(8));
    }

    #[test]
    fn clicks_map_to_the_rendered_plan_only() {
        let tree = DigitTree::new();
        let label = DigitLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        let area = Rect::new(0, 0, 10, 4);
        let mut buffer = Buffer::empty(area);
        TreeView::new(&tree, &label, plain_style()).render(area, &mut buffer, &mut state);

        assert!(state.click(1));
        assert_eq!(state.tree().cursor(), Some(2));

        state.tree_mut().expand(&tree, 1).unwrap();
        assert!(!state.click(2));
        assert_eq!(state.tree().cursor(), Some(2));

        TreeView::new(&tree, &label, plain_style()).render(area, &mut buffer, &mut state);
        // Rows are now 1, 10, 11, 12.
        assert!(state.click(2));
        assert_eq!(state.tree().cursor(), Some(11));
    }

    #[test]
    fn pending_scroll_is_applied_on_render() {
        let tree = DigitTree::new();
        let label = DigitLabel;
        let mut state = TreeViewState::new(tree.roots().iter().copied()).unwrap();
        state.tree_mut().expand_with_descendants(&tree, 1).unwrap();

        let area = Rect::new(0, 0, 10, 5);
        let mut buffer = Buffer::empty(area);
        let widget = || TreeView::new(&tree, &label, plain_style());
        widget().render(area, &mut buffer, &mut state);

        state.reveal(&tree, 11);
        assert!(state.is_scrolling());
        widget().render(area, &mut buffer, &mut state);

        assert!(!state.is_scrolling());
        let last = state.layout().items.last().copied();
        // 1, 10, 100..=109, 11: node 11 is index 12 and ends on the last row.
        assert_eq!(last.map(|item| item.index), Some(12));
        assert_eq!(last.map(|item| item.offset), Some(4));
    }
}
