use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub back: KeyBinding,
    pub suspend: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabKeybindings {
    pub list: KeyBinding,
    pub search: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedListKeybindings {
    pub reload: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub focus: KeyBinding,
    pub submit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayKeybindings {
    pub copy: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub filter: FilterKeybindings,
    pub tabs: TabKeybindings,
    pub breeds: BreedListKeybindings,
    pub search: SearchKeybindings,
    pub display: DisplayKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            back: Key::new(KeyCode::Esc).into(),
            suspend: Key::ctrl('z').into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::any([Key::char('k'), Key::new(KeyCode::Up)]),
            down: KeyBinding::any([Key::char('j'), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::any([Key::char('g'), Key::new(KeyCode::Home)]),
            end: KeyBinding::any([Key::char('G'), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for FilterKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::char('/').into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for TabKeybindings {
    fn default() -> Self {
        Self {
            list: Key::char('1').into(),
            search: Key::char('2').into(),
        }
    }
}

impl Default for BreedListKeybindings {
    fn default() -> Self {
        Self {
            reload: Key::char('r').into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            focus: KeyBinding::any([Key::char('/'), Key::char('i')]),
            submit: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for DisplayKeybindings {
    fn default() -> Self {
        Self {
            copy: Key::char('y').into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            dismiss: KeyBinding::any([
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::char('q'),
            ]),
        }
    }
}
