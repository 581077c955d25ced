// Dynamic tree: nodes are added and removed while the view is live. Every
// structural change is announced to the state, removals before the data goes away.
use std::io;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::text::Line;
use ratatui::{DefaultTerminal, Frame};

use tui_lazytree::{
    TreeAction, TreeChange, TreeLabelParts, TreeLabelProvider, TreeModel, TreeView,
    TreeViewState, TreeViewStyle,
};

#[derive(Default)]
struct Slot {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    alive: bool,
}

// Arena with tombstones so identifiers stay stable after removals.
#[derive(Default)]
struct Forest {
    slots: Vec<Slot>,
    roots: Vec<usize>,
}

impl Forest {
    fn insert(&mut self, parent: Option<usize>) -> usize {
        let id = self.slots.len();
        let name = parent.map_or_else(|| format!("group {id}"), |_| format!("item {id}"));
        self.slots.push(Slot {
            name,
            parent,
            children: Vec::new(),
            alive: true,
        });
        match parent {
            Some(parent) => self.slots[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn remove(&mut self, id: usize) {
        match self.slots[id].parent {
            Some(parent) => self.slots[parent].children.retain(|&child| child != id),
            None => self.roots.retain(|&root| root != id),
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let slot = &mut self.slots[node];
            slot.alive = false;
            stack.append(&mut slot.children);
        }
    }
}

impl TreeModel for Forest {
    type Id = usize;

    fn parent(&self, id: Self::Id) -> Option<Self::Id> {
        self.slots[id].parent
    }

    fn children(&self, id: Self::Id) -> &[Self::Id] {
        &self.slots[id].children
    }

    fn is_leaf(&self, _id: Self::Id) -> bool {
        false
    }

    fn size_hint(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }
}

struct Label;

impl TreeLabelProvider<Forest> for Label {
    fn label_parts<'a>(&'a self, model: &'a Forest, id: usize) -> TreeLabelParts<'a> {
        TreeLabelParts::new(model.slots[id].name.as_str())
    }
}

fn render(frame: &mut Frame, forest: &Forest, state: &mut TreeViewState<usize>) {
    let style = TreeViewStyle {
        title: Some(Line::from(
            " a: add child | r: add root | d: delete | arrows: move | q: quit ",
        )),
        ..TreeViewStyle::default()
    };
    let widget = TreeView::new(forest, &Label, style);
    frame.render_stateful_widget(widget, frame.area(), state);
}

fn tree_action(code: KeyCode) -> Option<TreeAction> {
    match code {
        KeyCode::Up => Some(TreeAction::SelectPrev),
        KeyCode::Down => Some(TreeAction::SelectNext),
        KeyCode::Left => Some(TreeAction::CollapseOrParent),
        KeyCode::Right => Some(TreeAction::ExpandOrChild),
        KeyCode::Enter | KeyCode::Char(' ') => Some(TreeAction::ToggleNode),
        KeyCode::PageUp => Some(TreeAction::PageUp),
        KeyCode::PageDown => Some(TreeAction::PageDown),
        _ => None,
    }
}

fn run_app(
    mut terminal: DefaultTerminal,
    mut forest: Forest,
    mut state: TreeViewState<usize>,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, &forest, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('a') => {
                if let Some(parent) = state.tree().cursor() {
                    let id = forest.insert(Some(parent));
                    let change = TreeChange::Added {
                        parent: Some(parent),
                        id,
                    };
                    if state.apply_change(&forest, change).is_ok() {
                        state.reveal(&forest, id);
                    }
                }
            }
            KeyCode::Char('r') => {
                let id = forest.insert(None);
                if state
                    .apply_change(&forest, TreeChange::Added { parent: None, id })
                    .is_ok()
                {
                    state.reveal(&forest, id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = state.tree().cursor() {
                    let traversal = state.tree().traverse(&forest);
                    let neighbours = [traversal.successor(id, 1), traversal.predecessor(id, 1)];
                    // Announced while the subtree is still reachable; the last
                    // root is refused and stays.
                    if state
                        .apply_change(&forest, TreeChange::Removed { id })
                        .is_ok()
                    {
                        forest.remove(id);
                        if let Some(&next) = neighbours.iter().find(|&&n| forest.slots[n].alive) {
                            state.reveal(&forest, next);
                        }
                    }
                }
            }
            code => {
                if let Some(action) = tree_action(code) {
                    state.handle_action(&forest, action);
                }
            }
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let mut forest = Forest::default();
    for _ in 0..3 {
        let group = forest.insert(None);
        for _ in 0..4 {
            forest.insert(Some(group));
        }
    }

    let mut state = TreeViewState::new(forest.roots.iter().copied())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    state.set_focus(true);

    let terminal = ratatui::init();
    let result = run_app(terminal, forest, state);
    ratatui::restore();
    result
}
