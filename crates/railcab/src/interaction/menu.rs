use crate::controls::InterfaceStrings;
use crate::sim::Station;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTag {
    Back,
    JumpToStation,
    ExitToMainMenu,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// Unselectable heading.
    Caption { text: String },
    Command { text: String, tag: MenuTag, data: usize },
    Submenu { text: String, entries: Vec<MenuEntry> },
}

impl MenuEntry {
    pub fn text(&self) -> &str {
        match self {
            Self::Caption { text } | Self::Command { text, .. } | Self::Submenu { text, .. } => {
                text
            }
        }
    }

    pub fn is_caption(&self) -> bool {
        matches!(self, Self::Caption { .. })
    }

    fn command(text: &str, tag: MenuTag, data: usize) -> Self {
        Self::Command {
            text: text.to_string(),
            tag,
            data,
        }
    }

    fn caption(text: &str) -> Self {
        Self::Caption {
            text: text.to_string(),
        }
    }
}

/// What the session should do after a menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    Close,
    JumpToStation(usize),
    ExitToMainMenu,
    Quit,
}

/// A menu tree plus the selection path into it, one index per open level.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
    selection: Vec<usize>,
}

impl Menu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        let first = first_selectable(&entries);
        Self {
            entries,
            selection: vec![first],
        }
    }

    /// The in-game menu. The station jump submenu lists every stop of the
    /// player's train and is left out when jumping is not allowed.
    pub fn root(strings: &InterfaceStrings, stations: &[Station], jump_available: bool) -> Self {
        let mut entries = vec![MenuEntry::command(
            strings.get("menu_resume"),
            MenuTag::Back,
            0,
        )];

        if jump_available {
            let mut jump = vec![
                MenuEntry::caption(strings.get("menu_jump")),
                MenuEntry::command(strings.get("menu_jump_back"), MenuTag::Back, 0),
            ];
            jump.extend(
                stations
                    .iter()
                    .enumerate()
                    .filter(|(_, station)| station.stops_for_player)
                    .map(|(index, station)| {
                        MenuEntry::command(&station.name, MenuTag::JumpToStation, index)
                    }),
            );
            entries.push(MenuEntry::Submenu {
                text: strings.get("menu_jump").to_string(),
                entries: jump,
            });
        }

        entries.push(MenuEntry::Submenu {
            text: strings.get("menu_exit").to_string(),
            entries: vec![
                MenuEntry::caption(strings.get("menu_exit_question")),
                MenuEntry::command(strings.get("menu_exit_no"), MenuTag::Back, 0),
                MenuEntry::command(strings.get("menu_exit_yes"), MenuTag::ExitToMainMenu, 0),
            ],
        });
        entries.push(MenuEntry::Submenu {
            text: strings.get("menu_quit").to_string(),
            entries: quit_entries(strings),
        });
        Self::new(entries)
    }

    pub fn quit_confirmation(strings: &InterfaceStrings) -> Self {
        Self::new(quit_entries(strings))
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn depth(&self) -> usize {
        self.selection.len()
    }

    /// Entries of the innermost open level.
    pub fn current_entries(&self) -> &[MenuEntry] {
        let mut level = self.entries.as_slice();
        for &index in &self.selection[..self.selection.len() - 1] {
            match level.get(index) {
                Some(MenuEntry::Submenu { entries, .. }) => level = entries,
                _ => break,
            }
        }
        level
    }

    pub fn selected_index(&self) -> usize {
        self.selection.last().copied().unwrap_or(0)
    }

    pub fn selected(&self) -> Option<&MenuEntry> {
        self.current_entries().get(self.selected_index())
    }

    pub fn move_up(&mut self) {
        let index = self.selected_index();
        let can_move = index > 0
            && self
                .current_entries()
                .get(index - 1)
                .is_some_and(|entry| !entry.is_caption());
        if can_move {
            self.set_selected(index - 1);
        }
    }

    pub fn move_down(&mut self) {
        let index = self.selected_index();
        if index + 1 < self.current_entries().len() {
            self.set_selected(index + 1);
        }
    }

    /// Activates the selected entry. `next_stop` is the next station the
    /// player stops at; opening the jump submenu preselects the last station
    /// at or before it.
    pub fn enter(&mut self, next_stop: Option<usize>) -> MenuOutcome {
        let (submenu_start, preselect) = match self.selected() {
            None | Some(MenuEntry::Caption { .. }) => return MenuOutcome::Stay,
            Some(MenuEntry::Command { tag, data, .. }) => {
                let (tag, data) = (*tag, *data);
                return match tag {
                    MenuTag::Back => self.back(),
                    MenuTag::JumpToStation => MenuOutcome::JumpToStation(data),
                    MenuTag::ExitToMainMenu => MenuOutcome::ExitToMainMenu,
                    MenuTag::Quit => MenuOutcome::Quit,
                };
            }
            Some(MenuEntry::Submenu { entries, .. }) => {
                let start = first_selectable(entries);
                let preselect = next_stop.and_then(|next| {
                    entries
                        .iter()
                        .enumerate()
                        .skip(start + 1)
                        .filter(|(_, entry)| {
                            matches!(
                                entry,
                                MenuEntry::Command {
                                    tag: MenuTag::JumpToStation,
                                    data,
                                    ..
                                } if *data <= next
                            )
                        })
                        .map(|(index, _)| index)
                        .last()
                });
                (start, preselect)
            }
        };
        self.selection.push(preselect.unwrap_or(submenu_start));
        MenuOutcome::Stay
    }

    /// Pops one level; closing the last level leaves the menu.
    pub fn back(&mut self) -> MenuOutcome {
        if self.selection.len() <= 1 {
            MenuOutcome::Close
        } else {
            self.selection.pop();
            MenuOutcome::Stay
        }
    }

    fn set_selected(&mut self, index: usize) {
        if let Some(last) = self.selection.last_mut() {
            *last = index;
        }
    }
}

fn quit_entries(strings: &InterfaceStrings) -> Vec<MenuEntry> {
    vec![
        MenuEntry::caption(strings.get("menu_quit_question")),
        MenuEntry::command(strings.get("menu_quit_no"), MenuTag::Back, 0),
        MenuEntry::command(strings.get("menu_quit_yes"), MenuTag::Quit, 0),
    ]
}

fn first_selectable(entries: &[MenuEntry]) -> usize {
    entries
        .iter()
        .position(|entry| !entry.is_caption())
        .unwrap_or(0)
}
