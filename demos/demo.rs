use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::{DefaultTerminal, Frame};
use tracing_subscriber::EnvFilter;

use tui_lazytree::{
    ContentType, KeymapProfile, ScrollMode, TreeAction, TreeEvent, TreeLabelParts, TreeLabelProvider,
    TreeModel, TreeView, TreeViewConfig, TreeViewState, TreeViewStyle,
};

const DIRECTORY: ContentType = ContentType(1);

struct Node {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    is_dir: bool,
    size: String,
}

struct FsModel {
    nodes: Vec<Node>,
    roots: Vec<usize>,
}

impl FsModel {
    const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn push_node(&mut self, node: Node) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }
}

impl TreeModel for FsModel {
    type Id = usize;

    fn parent(&self, id: Self::Id) -> Option<Self::Id> {
        self.nodes[id].parent
    }

    fn children(&self, id: Self::Id) -> &[Self::Id] {
        &self.nodes[id].children
    }

    fn is_leaf(&self, id: Self::Id) -> bool {
        !self.nodes[id].is_dir
    }

    fn content_type(&self, id: Self::Id) -> ContentType {
        if self.nodes[id].is_dir {
            DIRECTORY
        } else {
            ContentType::DEFAULT
        }
    }

    fn size_hint(&self) -> usize {
        self.nodes.len()
    }
}

struct Label;

impl TreeLabelProvider<FsModel> for Label {
    fn label_parts<'a>(&'a self, model: &'a FsModel, id: usize) -> TreeLabelParts<'a> {
        let node = &model.nodes[id];
        let parts = TreeLabelParts::new(node.name.as_str());
        if node.is_dir {
            parts
        } else {
            parts.badge(node.size.as_str())
        }
    }
}

struct DemoArgs {
    root: PathBuf,
    max_depth: usize,
    animate: bool,
    log: Option<PathBuf>,
}

impl DemoArgs {
    fn usage() {
        eprintln!("Usage: demo [PATH] [DEPTH]");
        eprintln!("  PATH   Root directory (default: current dir)");
        eprintln!("  DEPTH  Max depth from root (default: 4)");
        eprintln!("Options:");
        eprintln!("  -d, --depth <N>   Max depth from root");
        eprintln!("  -a, --animate     Animate scrolling");
        eprintln!("      --log <FILE>  Write tracing output to FILE (filter via RUST_LOG)");
        eprintln!("  -h, --help        Show this help");
    }

    fn parse() -> Self {
        let mut path: Option<PathBuf> = None;
        let mut depth: Option<usize> = None;
        let mut animate = false;
        let mut log = None;

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    Self::usage();
                    std::process::exit(0);
                }
                "-d" | "--depth" => {
                    if let Some(value) = args.next() {
                        depth = value.parse().ok();
                    }
                }
                "-a" | "--animate" => animate = true,
                "--log" => log = args.next().map(PathBuf::from),
                _ => {
                    if path.is_none() {
                        path = Some(PathBuf::from(arg));
                    } else if depth.is_none() {
                        depth = arg.parse().ok();
                    }
                }
            }
        }

        let root =
            path.unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let max_depth = depth.unwrap_or(4);

        Self {
            root,
            max_depth,
            animate,
            log,
        }
    }
}

// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> io::Result<()> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tui_lazytree=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(tracing_appender::rolling::never(directory, file_name))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}

struct EntryInfo {
    name: String,
    path: PathBuf,
    metadata: fs::Metadata,
}

fn build_model(root: &Path, max_depth: usize) -> io::Result<FsModel> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let metadata = fs::symlink_metadata(&root)?;

    let mut model = FsModel::new();
    let root_id = model.push_node(node_from_meta(root.display().to_string(), None, &metadata));
    model.roots.push(root_id);

    if metadata.is_dir() {
        build_children(&mut model, root_id, &root, 0, max_depth);
    }

    Ok(model)
}

fn build_children(
    model: &mut FsModel,
    parent_id: usize,
    path: &Path,
    depth: usize,
    max_depth: usize,
) {
    if depth >= max_depth {
        return;
    }

    let Ok(read_dir) = fs::read_dir(path) else {
        return;
    };
    let mut entries: Vec<EntryInfo> = read_dir
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let metadata = fs::symlink_metadata(&path).ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            Some(EntryInfo {
                name,
                path,
                metadata,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.metadata
            .is_dir()
            .cmp(&a.metadata.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    });

    for entry in entries {
        let is_dir = entry.metadata.is_dir();
        let node_id = model.push_node(node_from_meta(entry.name, Some(parent_id), &entry.metadata));
        model.nodes[parent_id].children.push(node_id);

        if is_dir {
            build_children(model, node_id, &entry.path, depth + 1, max_depth);
        }
    }
}

fn node_from_meta(name: String, parent: Option<usize>, metadata: &fs::Metadata) -> Node {
    let is_dir = metadata.is_dir();
    Node {
        name,
        parent,
        children: Vec::new(),
        is_dir,
        size: if is_dir {
            String::new()
        } else {
            format_size(metadata.len())
        },
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("[{bytes} B]")
    } else {
        format!("[{value:.1} {}]", UNITS[unit])
    }
}

fn next_profile(profile: KeymapProfile) -> KeymapProfile {
    match profile {
        KeymapProfile::Default => KeymapProfile::Vim,
        KeymapProfile::Vim => KeymapProfile::Arrows,
        KeymapProfile::Arrows => KeymapProfile::Default,
    }
}

enum DemoAction {
    Quit,
    CycleProfile,
    ToggleFocus,
}

fn demo_key(key: KeyEvent) -> Option<DemoAction> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(DemoAction::Quit),
        KeyCode::Char('p') => Some(DemoAction::CycleProfile),
        KeyCode::Tab => Some(DemoAction::ToggleFocus),
        _ => None,
    }
}

struct App<'a> {
    model: FsModel,
    label: Label,
    state: TreeViewState<usize>,
    style: TreeViewStyle<'a>,
    title: String,
    tree_area: Rect,
}

impl App<'_> {
    fn render(&mut self, frame: &mut Frame) {
        self.tree_area = frame.area();
        let title = format!(" {} | {:?} keys ", self.title, self.state.keymap().profile());
        let style = TreeViewStyle {
            title: Some(Line::from(title)),
            ..self.style.clone()
        };
        let widget = TreeView::new(&self.model, &self.label, style);
        frame.render_stateful_widget(widget, self.tree_area, &mut self.state);
    }

    // Returns `false` when the app should exit.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match self.state.handle_key_with(&self.model, key, demo_key) {
                    TreeEvent::Action(TreeAction::Custom(DemoAction::Quit)) => return false,
                    TreeEvent::Action(TreeAction::Custom(DemoAction::CycleProfile)) => {
                        let keymap = self.state.keymap_mut();
                        keymap.set_profile(next_profile(keymap.profile()));
                    }
                    TreeEvent::Action(TreeAction::Custom(DemoAction::ToggleFocus)) => {
                        let focused = self.state.tree().has_focus();
                        self.state.set_focus(!focused);
                    }
                    TreeEvent::Action(_) | TreeEvent::Handled | TreeEvent::Unhandled => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    // One row of border above the first item.
                    if let Some(row) = mouse.row.checked_sub(self.tree_area.y + 1) {
                        self.state.click(row);
                    }
                }
                MouseEventKind::ScrollDown => self.state.scroll_down_by(3),
                MouseEventKind::ScrollUp => self.state.scroll_up_by(3),
                _ => {}
            },
            _ => {}
        }
        true
    }
}

fn run_app(mut terminal: DefaultTerminal, mut app: App<'_>) -> io::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Keep redrawing while an animated scroll is running.
        let timeout = if app.state.is_scrolling() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(200)
        };
        if event::poll(timeout)? && !app.handle_event(event::read()?) {
            break;
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = DemoArgs::parse();
    if !args.root.is_dir() {
        eprintln!("Path is not a directory: {}", args.root.display());
        return Ok(());
    }
    if let Some(log) = &args.log {
        init_logging(log)?;
    }

    let model = build_model(&args.root, args.max_depth)?;
    tracing::info!(nodes = model.nodes.len(), "model loaded");

    let config = TreeViewConfig {
        scroll_mode: if args.animate {
            ScrollMode::Animate
        } else {
            ScrollMode::Jump
        },
        ..TreeViewConfig::default()
    };
    let mut state = TreeViewState::with_config(model.roots.iter().copied(), config)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    for &root in &model.roots {
        // Roots are directories here, so expanding cannot fail.
        let _ = state.tree_mut().expand(&model, root);
    }
    state.tree_mut().set_cursor(model.roots.first().copied());
    state.set_focus(true);

    let style = TreeViewStyle {
        block_style: Style::default()
            .fg(Color::Rgb(221, 227, 235))
            .bg(Color::Rgb(24, 28, 36)),
        border_style: Style::default().fg(Color::Rgb(92, 110, 140)),
        cursor_style: Style::default()
            .fg(Color::Rgb(255, 255, 255))
            .bg(Color::Rgb(52, 66, 96))
            .add_modifier(Modifier::BOLD),
        unfocused_cursor_style: Style::default().bg(Color::Rgb(40, 46, 58)),
        ..TreeViewStyle::default()
    };

    let app = App {
        model,
        label: Label,
        state,
        style,
        title: format!("{} (depth {})", args.root.display(), args.max_depth),
        tree_area: Rect::default(),
    };

    let terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;
    let result = run_app(terminal, app);
    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();
    result
}
