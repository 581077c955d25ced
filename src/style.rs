use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Borders;

/// Visual settings for the tree widget.
#[derive(Clone)]
pub struct TreeViewStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    /// Cursor row while the tree holds focus.
    pub cursor_style: Style,
    /// Cursor row while focus is elsewhere.
    pub unfocused_cursor_style: Style,
    pub cursor_symbol: &'a str,
    pub borders: Borders,
}

impl Default for TreeViewStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            cursor_style: Style::default(),
            unfocused_cursor_style: Style::default(),
            cursor_symbol: ">> ",
            borders: Borders::ALL,
        }
    }
}
