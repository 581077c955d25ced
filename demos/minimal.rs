// Minimal example: a tiny forest rendered once into an in-memory buffer.
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;

use tui_lazytree::{
    TreeAction, TreeLabelParts, TreeLabelProvider, TreeModel, TreeView, TreeViewState,
    TreeViewStyle,
};

// Simple in-memory forest with fixed parent and children lists.
struct Model {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    names: Vec<&'static str>,
}

impl Model {
    // Two roots: docs -> {intro.md, guide.md}, and Cargo.toml.
    fn new() -> Self {
        Self {
            parents: vec![None, Some(0), Some(0), None],
            children: vec![vec![1, 2], vec![], vec![], vec![]],
            names: vec!["docs", "intro.md", "guide.md", "Cargo.toml"],
        }
    }
}

// The state and widget query the tree through this trait only.
impl TreeModel for Model {
    type Id = usize;

    fn parent(&self, id: Self::Id) -> Option<Self::Id> {
        self.parents[id]
    }

    fn children(&self, id: Self::Id) -> &[Self::Id] {
        &self.children[id]
    }

    fn is_leaf(&self, id: Self::Id) -> bool {
        id != 0
    }
}

// Label provider: the blanket renderer adds indentation and expander glyphs.
struct Label;

impl TreeLabelProvider<Model> for Label {
    fn label_parts<'a>(&'a self, model: &'a Model, id: usize) -> TreeLabelParts<'a> {
        TreeLabelParts::new(model.names[id])
    }
}

fn main() {
    let model = Model::new();
    let label = Label;

    // State holds expansion, cursor and scroll position; it must live across frames.
    let Ok(mut state) = TreeViewState::new([0, 3]) else {
        return;
    };
    state.set_focus(true);
    // The first intent places the cursor on the first root; the second expands it.
    state.handle_action::<_, ()>(&model, TreeAction::ExpandOrChild);
    state.handle_action::<_, ()>(&model, TreeAction::ExpandOrChild);

    let widget = TreeView::new(&model, &label, TreeViewStyle::default());

    // Render into an in-memory buffer (no terminal required for the example).
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);
    widget.render(area, &mut buffer, &mut state);

    for y in 0..area.height {
        let row: String = (0..area.width).map(|x| buffer[(x, y)].symbol()).collect();
        println!("{row}");
    }
}
