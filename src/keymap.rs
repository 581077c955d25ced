use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::TreeAction;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    #[default]
    Default,
    Vim,
    Arrows,
}

#[derive(Clone, Copy, Debug)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => return Some(TreeAction::PageUp),
                KeyCode::Char('d') => return Some(TreeAction::PageDown),
                _ => {}
            }
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => self.resolve_default_nav(key),
            KeymapProfile::Vim => self.resolve_vim_nav(key),
            KeymapProfile::Arrows => self.resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        self.resolve_common(key)
    }

    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<TreeAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Some(action) = custom(key) {
            return Some(TreeAction::Custom(action));
        }

        self.resolve(key)
    }

    const fn resolve_default_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(TreeAction::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(TreeAction::SelectNext),
            KeyCode::Left | KeyCode::Char('h') => Some(TreeAction::CollapseOrParent),
            KeyCode::Right | KeyCode::Char('l') => Some(TreeAction::ExpandOrChild),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(TreeAction::SelectPrev),
            KeyCode::Char('j') => Some(TreeAction::SelectNext),
            KeyCode::Char('h') => Some(TreeAction::CollapseOrParent),
            KeyCode::Char('l') => Some(TreeAction::ExpandOrChild),
            KeyCode::Char('g') => Some(TreeAction::SelectFirst),
            KeyCode::Char('G') => Some(TreeAction::SelectLast),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up => Some(TreeAction::SelectPrev),
            KeyCode::Down => Some(TreeAction::SelectNext),
            KeyCode::Left => Some(TreeAction::CollapseOrParent),
            KeyCode::Right => Some(TreeAction::ExpandOrChild),
            _ => None,
        }
    }

    fn resolve_common<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(TreeAction::ToggleNode),
            KeyCode::Char('*') => Some(TreeAction::ExpandRecursive),
            KeyCode::Char('-') => Some(TreeAction::CollapseAll),
            KeyCode::PageUp => Some(TreeAction::PageUp),
            KeyCode::PageDown => Some(TreeAction::PageDown),
            KeyCode::Home => Some(TreeAction::SelectFirst),
            KeyCode::End => Some(TreeAction::SelectLast),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_profile_maps_arrows_and_letters() {
        let bindings = TreeKeyBindings::new();

        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Down)),
            Some(TreeAction::SelectNext)
        );
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Char('h'))),
            Some(TreeAction::CollapseOrParent)
        );
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::PageDown)),
            Some(TreeAction::PageDown)
        );
    }

    #[test]
    fn arrows_profile_ignores_letters() {
        let bindings = TreeKeyBindings::with_profile(KeymapProfile::Arrows);

        assert_eq!(bindings.resolve::<()>(key(KeyCode::Char('j'))), None);
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Right)),
            Some(TreeAction::ExpandOrChild)
        );
    }

    #[test]
    fn control_paging_and_custom_mapping() {
        let bindings = TreeKeyBindings::with_profile(KeymapProfile::Vim);
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);

        assert_eq!(bindings.resolve::<()>(ctrl_d), Some(TreeAction::PageDown));

        let custom = |event: KeyEvent| (event.code == KeyCode::Char('r')).then_some("reload");
        assert_eq!(
            bindings.resolve_with(key(KeyCode::Char('r')), custom),
            Some(TreeAction::Custom("reload"))
        );
        assert_eq!(
            bindings.resolve_with(key(KeyCode::Char('G')), custom),
            Some(TreeAction::SelectLast)
        );
    }
}
