use std::borrow::Cow;

use ratatui::text::{Line, Span, Text};

use crate::context::TreeRowContext;
use crate::emit::UnitForm;
use crate::model::TreeModel;

#[derive(Clone, Copy)]
pub struct TreeGlyphs<'a> {
    pub indent: &'a str,
    pub leaf: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "  ",
            leaf: "•",
            expanded: "▼",
            collapsed: "▶",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "  ",
            leaf: "-",
            expanded: "v",
            collapsed: ">",
        }
    }
}

impl<'a> TreeGlyphs<'a> {
    pub const fn expander(&self, ctx: &TreeRowContext) -> &'a str {
        if ctx.is_leaf {
            self.leaf
        } else {
            match ctx.form {
                UnitForm::Expanded => self.expanded,
                UnitForm::Collapsed => self.collapsed,
            }
        }
    }
}

#[derive(Clone)]
pub struct TreeLabelParts<'a> {
    pub name: Cow<'a, str>,
    pub badge: Option<Cow<'a, str>>,
}

impl<'a> TreeLabelParts<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            badge: None,
        }
    }

    #[must_use]
    pub fn badge(mut self, badge: impl Into<Cow<'a, str>>) -> Self {
        self.badge = Some(badge.into());
        self
    }
}

/// Supplies the name (and optional badge) of a node; rendered as a single line.
pub trait TreeLabelProvider<T: TreeModel> {
    fn label_parts<'a>(&'a self, model: &'a T, id: T::Id) -> TreeLabelParts<'a>;
}

/// Renders a node. The number of lines returned is the item's extent in the viewport.
pub trait TreeLabelRenderer<T: TreeModel> {
    fn text<'a>(
        &'a self,
        model: &'a T,
        id: T::Id,
        ctx: &TreeRowContext,
        glyphs: &TreeGlyphs<'a>,
    ) -> Text<'a>;
}

impl<T, P> TreeLabelRenderer<T> for P
where
    T: TreeModel,
    P: TreeLabelProvider<T>,
{
    fn text<'a>(
        &'a self,
        model: &'a T,
        id: T::Id,
        ctx: &TreeRowContext,
        glyphs: &TreeGlyphs<'a>,
    ) -> Text<'a> {
        let parts = self.label_parts(model, id);
        Text::from(tree_label_line(ctx, parts, glyphs))
    }
}

pub fn tree_indent<'a>(ctx: &TreeRowContext, glyphs: &TreeGlyphs<'a>) -> Span<'a> {
    Span::raw(glyphs.indent.repeat(usize::from(ctx.depth)))
}

pub fn tree_label_line<'a>(
    ctx: &TreeRowContext,
    parts: TreeLabelParts<'a>,
    glyphs: &TreeGlyphs<'a>,
) -> Line<'a> {
    let TreeLabelParts { name, badge } = parts;
    let badge = badge.filter(|value| !value.is_empty());

    let mut spans = Vec::with_capacity(5);
    if ctx.depth > 0 {
        spans.push(tree_indent(ctx, glyphs));
    }
    let expander = glyphs.expander(ctx);
    if !expander.is_empty() {
        spans.push(Span::raw(expander));
        spans.push(Span::raw(" "));
    }
    if let Some(badge) = badge {
        spans.push(Span::raw(badge));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(name));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentType;

    fn ctx(depth: u16, form: UnitForm, is_leaf: bool) -> TreeRowContext {
        TreeRowContext {
            depth,
            form,
            is_leaf,
            is_cursor: false,
            has_focus: false,
            content_type: ContentType::DEFAULT,
        }
    }

    #[test]
    fn label_line_indents_and_marks_expansion() {
        let glyphs = TreeGlyphs::ascii();

        let line = tree_label_line(
            &ctx(2, UnitForm::Expanded, false),
            TreeLabelParts::new("src").badge("[3]"),
            &glyphs,
        );
        assert_eq!(line.to_string(), "    v [3] src");

        let line = tree_label_line(
            &ctx(0, UnitForm::Collapsed, true),
            TreeLabelParts::new("Cargo.toml"),
            &glyphs,
        );
        assert_eq!(line.to_string(), "- Cargo.toml");
    }
}
