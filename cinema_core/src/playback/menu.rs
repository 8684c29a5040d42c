// Settings menus of the player. At most one panel is open at a time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A panel of the settings menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingsPanel {
    Settings,
    PlaybackSpeed,
    Quality,
}

/// A requested menu state: one panel open, or all closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuState {
    CloseAll,
    Open(SettingsPanel),
}

impl FromStr for MenuState {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "CloseAll" => Ok(MenuState::CloseAll),
            "Settings" => Ok(MenuState::Open(SettingsPanel::Settings)),
            "PlaybackSpeed" => Ok(MenuState::Open(SettingsPanel::PlaybackSpeed)),
            "Quality" => Ok(MenuState::Open(SettingsPanel::Quality)),
            _ => Err(()),
        }
    }
}

/// Open flags, one per panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuFlags {
    pub is_settings_menu_open: bool,
    pub is_playback_speed_menu_open: bool,
    pub is_quality_menu_open: bool,
}

impl MenuFlags {
    fn for_open(open: Option<SettingsPanel>) -> Self {
        MenuFlags {
            is_settings_menu_open: open == Some(SettingsPanel::Settings),
            is_playback_speed_menu_open: open == Some(SettingsPanel::PlaybackSpeed),
            is_quality_menu_open: open == Some(SettingsPanel::Quality),
        }
    }

    pub fn open_count(&self) -> usize {
        [
            self.is_settings_menu_open,
            self.is_playback_speed_menu_open,
            self.is_quality_menu_open,
        ]
        .iter()
        .filter(|open| **open)
        .count()
    }
}

type Effect = Box<dyn FnMut(MenuFlags)>;

/// One-of-N panel selector.
///
/// Every transition hands the resulting flags to the `on_change` effect
/// injected at construction; resetting hands them to the `on_reset` effect.
pub struct ExclusiveMenu {
    open: Option<SettingsPanel>,
    on_change: Effect,
    on_reset: Effect,
}

impl ExclusiveMenu {
    pub fn new() -> Self {
        Self::with_effects(|_| {}, |_| {})
    }

    pub fn with_effects(
        on_change: impl FnMut(MenuFlags) + 'static,
        on_reset: impl FnMut(MenuFlags) + 'static,
    ) -> Self {
        ExclusiveMenu {
            open: None,
            on_change: Box::new(on_change),
            on_reset: Box::new(on_reset),
        }
    }

    pub fn open_panel(&self) -> Option<SettingsPanel> {
        self.open
    }

    pub fn flags(&self) -> MenuFlags {
        MenuFlags::for_open(self.open)
    }

    pub fn set(&mut self, state: MenuState) {
        self.open = match state {
            MenuState::CloseAll => None,
            MenuState::Open(panel) => Some(panel),
        };
        let flags = self.flags();
        (self.on_change)(flags);
    }

    /// Switch by panel name. Unknown names are ignored.
    pub fn set_state(&mut self, name: &str) {
        if let Ok(state) = name.parse() {
            self.set(state);
        }
    }

    /// Close every panel through the reset effect.
    pub fn reset_to_default(&mut self) {
        self.open = None;
        let flags = self.flags();
        (self.on_reset)(flags);
    }
}

impl Default for ExclusiveMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExclusiveMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusiveMenu")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn quality_leaves_exactly_one_flag_set() {
        let mut menu = ExclusiveMenu::new();
        menu.set_state("Settings");
        menu.set_state("Quality");

        let flags = menu.flags();
        assert_eq!(flags.open_count(), 1);
        assert!(flags.is_quality_menu_open);
        assert!(!flags.is_settings_menu_open);
        assert!(!flags.is_playback_speed_menu_open);
    }

    #[test]
    fn unknown_name_is_ignored() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut menu = ExclusiveMenu::with_effects(move |_| seen.set(seen.get() + 1), |_| {});

        menu.set_state("PlaybackSpeed");
        menu.set_state("Subtitles");
        menu.set_state("quality");

        assert_eq!(menu.open_panel(), Some(SettingsPanel::PlaybackSpeed));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn close_all_closes_every_panel() {
        let mut menu = ExclusiveMenu::new();
        menu.set(MenuState::Open(SettingsPanel::Settings));
        menu.set_state("CloseAll");
        assert_eq!(menu.flags(), MenuFlags::default());
    }

    #[test]
    fn effects_receive_resulting_flags() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let resets = Rc::new(Cell::new(0));
        let (log, reset_count) = (changes.clone(), resets.clone());
        let mut menu = ExclusiveMenu::with_effects(
            move |flags| log.borrow_mut().push(flags),
            move |flags: MenuFlags| {
                assert_eq!(flags.open_count(), 0);
                reset_count.set(reset_count.get() + 1);
            },
        );

        menu.set(MenuState::Open(SettingsPanel::Quality));
        menu.reset_to_default();

        assert_eq!(changes.borrow().len(), 1);
        assert!(changes.borrow()[0].is_quality_menu_open);
        assert_eq!(resets.get(), 1);
        assert_eq!(menu.open_panel(), None);
    }

    #[test]
    fn each_switch_reports_its_own_flags() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = changes.clone();
        let mut menu = ExclusiveMenu::with_effects(move |flags| log.borrow_mut().push(flags), |_| {});

        menu.set_state("Settings");
        menu.set_state("PlaybackSpeed");
        menu.set(MenuState::CloseAll);

        let changes = changes.borrow();
        assert_eq!(changes.len(), 3);
        assert!(changes[0].is_settings_menu_open);
        assert!(changes[1].is_playback_speed_menu_open && !changes[1].is_settings_menu_open);
        assert_eq!(changes[2].open_count(), 0);
    }
}
