use crate::emit::UnitForm;
use crate::model::ContentType;

#[derive(Clone, Copy, Debug)]
pub struct TreeRowContext {
    pub depth: u16,
    pub form: UnitForm,
    pub is_leaf: bool,
    pub is_cursor: bool,
    pub has_focus: bool,
    pub content_type: ContentType,
}
