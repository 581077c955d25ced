use crate::scroll::{FALLBACK_PAGE_SIZE, PageSize};

/// How scroll requests triggered by cursor movement are executed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollMode {
    /// Jump straight to the target. Preferred under rapid input.
    #[default]
    Jump,
    /// Move towards the target over several frames; a newer request replaces
    /// the running one.
    Animate,
}

/// Behavior settings for [`TreeViewState`](crate::TreeViewState).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug)]
pub struct TreeViewConfig {
    pub scroll_mode: ScrollMode,
    /// Page-size override; function-valued policies cannot be serialized.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub page_size: PageSize,
    /// Page size used before the first layout pass has measured anything.
    pub fallback_page_size: usize,
    pub show_scrollbar: bool,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            scroll_mode: ScrollMode::Jump,
            page_size: PageSize::Auto,
            fallback_page_size: FALLBACK_PAGE_SIZE,
            show_scrollbar: true,
        }
    }
}
