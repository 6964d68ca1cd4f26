use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    BreedListAction, DialogAction, DisplayAction, FilterAction, GlobalAction, NavAction,
    SearchAction, TabAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to the actions bound to them in the config.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Back => &kb.back,
            GlobalAction::Suspend => &kb.suspend,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    fn filter(&self, action: FilterAction) -> &KeyBinding {
        let kb = &self.keybindings.filter;
        match action {
            FilterAction::Toggle => &kb.toggle,
            FilterAction::Exit => &kb.exit,
        }
    }

    pub fn matches_filter(&self, event: &KeyEvent, action: FilterAction) -> bool {
        self.filter(action).matches(event)
    }

    pub fn display_filter(&self, action: FilterAction) -> String {
        self.filter(action).display()
    }

    fn tab(&self, action: TabAction) -> &KeyBinding {
        let kb = &self.keybindings.tabs;
        match action {
            TabAction::List => &kb.list,
            TabAction::Search => &kb.search,
        }
    }

    pub fn matches_tab(&self, event: &KeyEvent, action: TabAction) -> bool {
        self.tab(action).matches(event)
    }

    pub fn display_tab(&self, action: TabAction) -> String {
        self.tab(action).display()
    }

    fn breeds(&self, action: BreedListAction) -> &KeyBinding {
        match action {
            BreedListAction::Reload => &self.keybindings.breeds.reload,
        }
    }

    pub fn matches_breeds(&self, event: &KeyEvent, action: BreedListAction) -> bool {
        self.breeds(action).matches(event)
    }

    pub fn display_breeds(&self, action: BreedListAction) -> String {
        self.breeds(action).display()
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Focus => &kb.focus,
            SearchAction::Submit => &kb.submit,
        }
    }

    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).display()
    }

    fn display(&self, action: DisplayAction) -> &KeyBinding {
        match action {
            DisplayAction::Copy => &self.keybindings.display.copy,
        }
    }

    pub fn matches_display(&self, event: &KeyEvent, action: DisplayAction) -> bool {
        self.display(action).matches(event)
    }

    pub fn display_display(&self, action: DisplayAction) -> String {
        self.display(action).display()
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        match action {
            DialogAction::Dismiss => &self.keybindings.dialog.dismiss,
        }
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_tabs() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_tab(&key(KeyCode::Char('1')), TabAction::List));
        assert!(resolver.matches_tab(&key(KeyCode::Char('2')), TabAction::Search));
        assert!(!resolver.matches_tab(&key(KeyCode::Char('2')), TabAction::List));
        assert_eq!(resolver.display_tab(TabAction::Search), "2");
    }

    #[test]
    fn test_nav_alternatives() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_nav(&key(KeyCode::Char('j')), NavAction::Down));
        assert!(resolver.matches_nav(&key(KeyCode::Down), NavAction::Down));
        assert_eq!(resolver.display_nav(NavAction::Up), "k/Up");
    }

    #[test]
    fn test_global_suspend_needs_ctrl() {
        let resolver = KeyResolver::default();
        let plain = key(KeyCode::Char('z'));
        let ctrl = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert!(!resolver.matches_global(&plain, GlobalAction::Suspend));
        assert!(resolver.matches_global(&ctrl, GlobalAction::Suspend));
    }
}
